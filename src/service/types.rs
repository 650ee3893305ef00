//! Service layer types

/// Ordered, validated model input; every value finite
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Label predicted for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionResult {
    pub label: i64,
}

/// Loaded model description
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub kind: String,
    pub n_features: usize,
    pub classes: Vec<i64>,
}

/// Health check result
#[derive(Debug, Clone)]
pub struct HealthResult {
    pub healthy: bool,
    pub version: String,
    pub model: ModelInfo,
}

/// Every way a prediction request can fail
///
/// The display strings of the client-side variants are the exact messages
/// returned in the `error` field.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("El cuerpo de la petición no es un JSON válido")]
    MalformedRequest,

    #[error("El cuerpo de la petición excede el tamaño máximo permitido")]
    PayloadTooLarge,

    #[error("Falta la clave 'features' en el JSON")]
    MissingField,

    #[error("'features' debe ser una lista")]
    TypeMismatch,

    #[error("Se esperaban {expected} valores, pero se recibieron {received}")]
    Cardinality { expected: usize, received: usize },

    #[error("Todos los valores en 'features' deben ser numéricos")]
    NonNumericValue,

    #[error("Error interno: {0}")]
    Internal(String),
}

impl PredictError {
    /// True for faults the client can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PredictError::Internal(_))
    }
}

impl From<crate::engine::ModelError> for PredictError {
    fn from(e: crate::engine::ModelError) -> Self {
        PredictError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for PredictError {
    fn from(e: tokio::task::JoinError) -> Self {
        PredictError::Internal(e.to_string())
    }
}
