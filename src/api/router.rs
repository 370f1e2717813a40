//! Router for the checkup API.
//!
//! Routes are mounted at the root. Middleware (outermost → innermost):
//! CORS → access log → handler.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::welcome))
        .route("/health", get(endpoints::health::check))
        .route("/diagnose", post(endpoints::diagnose::diagnose))
        .route("/find_hospitals", post(endpoints::hospitals::find_hospitals))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::access::log_access))
        .layer(CorsLayer::permissive())
}
