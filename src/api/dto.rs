//! REST API request/response data transfer objects

use serde::{Deserialize, Serialize};

/// Ready marker returned by `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub mensaje: String,
}

impl ReadyResponse {
    pub fn ready() -> Self {
        Self {
            mensaje: "✅ API lista".to_string(),
        }
    }
}

/// Predict response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: i64,
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub model: ModelInfoDto,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfoDto {
    pub kind: String,
    pub n_features: usize,
    pub classes: Vec<i64>,
}

/// Error response, the only key is `error`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
