//! Axum REST API handlers

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
    extract::{State, DefaultBodyLimit, rejection::BytesRejection},
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::service::{PredictError, PredictionService};

use super::dto::*;

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<PredictionService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

/// Create the REST API router
pub fn create_rest_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        // Middleware
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::new().allow_origin(cors::Any).allow_methods(cors::Any).allow_headers(cors::Any))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = match &self {
            PredictError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}

/// Last line of defence: a panic anywhere in a handler becomes a 500
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Request handler panicked: {}", detail);
    PredictError::Internal(detail).into_response()
}

/// Readiness marker
async fn home_handler() -> Json<ReadyResponse> {
    info!("GET / accessed");
    Json(ReadyResponse::ready())
}

/// Validate the feature vector and run the model
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictResponse>, PredictError> {
    let body = body.map_err(|e| {
        warn!("Failed to read request body: {}", e);
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            PredictError::PayloadTooLarge
        } else {
            PredictError::MalformedRequest
        }
    })?;

    let result = state.service.predict_body(&body).await?;

    Ok(Json(PredictResponse {
        prediction: result.label,
    }))
}

/// Health check
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.service.health();

    Json(HealthResponse {
        healthy: health.healthy,
        version: health.version,
        model: ModelInfoDto {
            kind: health.model.kind,
            n_features: health.model.n_features,
            classes: health.model.classes,
        },
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
