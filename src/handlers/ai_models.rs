use axum::extract::OriginalUri;
use axum::Json;
use serde_json::{json, Value};
use crate::error::AppError;

// GET /api/
pub async fn api_root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the EcoPulse API" }))
}

/// Shared handler for the model endpoints. No model backend is wired into
/// this server, so every call answers 501 naming the endpoint.
pub async fn model_unavailable(OriginalUri(uri): OriginalUri) -> AppError {
    let endpoint = uri.path().to_string();
    tracing::warn!(%endpoint, "Model endpoint called without a model backend");
    AppError::NotImplemented {
        message: "This model endpoint is not available on this server".to_string(),
        endpoint,
    }
}
