//! Liveness endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::config;

/// `GET /` — plain-text greeting.
pub async fn welcome() -> String {
    format!("Welcome to {}!", config::APP_NAME)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub version: &'static str,
}

/// `GET /health` — readiness check. Reports `ok` even without a model;
/// `model_loaded` tells whether `/diagnose` can succeed.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: ctx.service.model_loaded(),
        version: config::APP_VERSION,
    })
}
