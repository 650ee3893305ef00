//! Prediction Service - request validation and inference dispatch
//!
//! Takes the raw request body, narrows it step by step from untyped JSON into a
//! [`FeatureVector`], and hands that to the model. The checks run in a fixed
//! order and the first failing one decides the error the client sees.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::engine::ModelProvider;

use super::types::*;

/// Key holding the feature list in the request envelope
pub const FEATURES_KEY: &str = "features";

pub struct PredictionService {
    provider: Arc<ModelProvider>,
}

impl PredictionService {
    pub fn new(provider: Arc<ModelProvider>) -> Self {
        Self { provider }
    }

    /// Number of features every request must carry
    pub fn n_features(&self) -> usize {
        self.provider.n_features()
    }

    /// Validate a raw body and run the model on it
    pub async fn predict_body(&self, body: &[u8]) -> Result<PredictionResult, PredictError> {
        let features = self.parse_request(body)?;
        self.predict(features).await
    }

    /// Validate a raw request body into a feature vector
    pub fn parse_request(&self, body: &[u8]) -> Result<FeatureVector, PredictError> {
        let envelope: Value = serde_json::from_slice(body).map_err(|e| {
            warn!("Request body is not valid JSON: {}", e);
            PredictError::MalformedRequest
        })?;

        self.extract_features(&envelope)
    }

    /// Run the ordered checks on an already decoded envelope
    pub fn extract_features(&self, envelope: &Value) -> Result<FeatureVector, PredictError> {
        if !envelope.is_object() {
            warn!("Request body is JSON but not an object");
            return Err(PredictError::MalformedRequest);
        }

        let features = envelope.get(FEATURES_KEY).ok_or_else(|| {
            warn!("Missing '{}' key", FEATURES_KEY);
            PredictError::MissingField
        })?;
        info!("Received features: {}", features);

        let items = features.as_array().ok_or_else(|| {
            error!("'{}' is not a list", FEATURES_KEY);
            PredictError::TypeMismatch
        })?;
        debug!("'{}' is a list of {} items", FEATURES_KEY, items.len());

        let expected = self.n_features();
        if items.len() != expected {
            error!(
                "Unexpected feature count: expected {}, received {}",
                expected,
                items.len()
            );
            return Err(PredictError::Cardinality {
                expected,
                received: items.len(),
            });
        }

        let values = items
            .iter()
            .map(to_f64)
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| {
                error!("'{}' contains non-numeric values", FEATURES_KEY);
                PredictError::NonNumericValue
            })?;

        Ok(FeatureVector::new(values))
    }

    /// Run the model on a validated vector
    pub async fn predict(&self, features: FeatureVector) -> Result<PredictionResult, PredictError> {
        let start = Instant::now();

        let provider = self.provider.clone();
        let label = tokio::task::spawn_blocking(move || provider.predict(features.as_slice()))
            .await
            .map_err(|e| {
                error!("Inference worker failed: {}", e);
                PredictError::from(e)
            })?
            .map_err(|e| {
                error!("Inference failed: {}", e);
                PredictError::from(e)
            })?;

        info!("Prediction {} in {:?}", label, start.elapsed());
        Ok(PredictionResult { label })
    }

    pub fn health(&self) -> HealthResult {
        HealthResult {
            healthy: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            model: ModelInfo {
                kind: self.provider.kind().to_string(),
                n_features: self.provider.n_features(),
                classes: self.provider.classes().to_vec(),
            },
        }
    }
}

/// Numeric coercion of one element
///
/// Numbers, numeric strings (surrounding whitespace allowed) and booleans
/// convert; anything else, or a non-finite result, does not.
fn to_f64(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    x.is_finite().then_some(x)
}
