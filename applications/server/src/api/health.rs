/// Health check API routes
use crate::response::ApiResponse;
use serde_json::json;

/// GET /health - Health check endpoint
pub async fn health() -> ApiResponse {
    ApiResponse::data(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
