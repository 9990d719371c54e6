//! Health check endpoint
//!
//! Simple liveness probe for monitoring.

use axum::{response::IntoResponse, routing::get, Router};

use crate::AppState;

/// Health check router
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Basic health check (always returns OK if the server is running)
pub async fn health_check() -> impl IntoResponse {
    "OK"
}
