//! Model Provider
//!
//! Owns the classifier for the lifetime of the process. The model is loaded
//! once before the server binds and never mutated afterwards, so it is shared
//! between requests through `Arc` without any locking.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ndarray::Array2;
use tracing::info;

use super::model::{Classifier, ModelArtifact};
use super::ModelError;

pub struct ModelProvider {
    model: Box<dyn Classifier>,
    source: Option<PathBuf>,
}

impl ModelProvider {
    /// Load and validate the artifact at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        info!("Loading model from {}", path.display());
        let start = Instant::now();

        let text = std::fs::read_to_string(path)?;
        let model = ModelArtifact::from_json(&text)?.into_classifier()?;

        info!(
            "Model {} loaded in {:?} ({} features, classes {:?})",
            model.kind(),
            start.elapsed(),
            model.n_features(),
            model.classes()
        );

        Ok(Self {
            model,
            source: Some(path.to_path_buf()),
        })
    }

    /// Wrap an already constructed classifier
    pub fn from_classifier(model: Box<dyn Classifier>) -> Self {
        Self { model, source: None }
    }

    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    pub fn classes(&self) -> &[i64] {
        self.model.classes()
    }

    /// Path the model was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Predict the label of a single sample
    ///
    /// The vector is reshaped into a 1×N matrix (one row, one column per
    /// feature) before it reaches the classifier.
    pub fn predict(&self, features: &[f64]) -> Result<i64, ModelError> {
        let expected = self.model.n_features();
        if features.len() != expected {
            return Err(ModelError::InvalidInput {
                expected,
                received: features.len(),
            });
        }

        let sample = Array2::from_shape_vec((1, expected), features.to_vec())
            .map_err(|e| ModelError::Invalid(e.to_string()))?;
        let labels = self.model.predict(sample.view())?;

        labels.first().copied().ok_or(ModelError::EmptyOutput)
    }
}

impl std::fmt::Debug for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelProvider")
            .field("kind", &self.kind())
            .field("n_features", &self.n_features())
            .field("source", &self.source)
            .finish()
    }
}
