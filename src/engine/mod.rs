//! Inference engine module
//!
//! Loads the classifier artifact once at startup and serves read-only
//! predictions to every request.

pub mod model;
pub mod provider;

pub use model::{Classifier, ModelArtifact};
pub use provider::ModelProvider;

/// Errors raised while loading or running a classifier
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("model expects {expected} features, received {received}")]
    InvalidInput { expected: usize, received: usize },

    #[error("model returned no prediction")]
    EmptyOutput,
}
