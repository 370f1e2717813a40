//! API error type with structured JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::checkup::CheckupError;
use crate::maps::{STATUS_INVALID_REQUEST, STATUS_ZERO_RESULTS};

/// Error body: `{ "error": "<message>", "code": "<KIND>" }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Diagnosis model is not available")]
    ModelUnavailable,
    #[error("Location could not be resolved ({status}): {reason}")]
    GeocodeFailed { status: String, reason: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GeocodeFailed { status, .. }
                if status == STATUS_ZERO_RESULTS || status == STATUS_INVALID_REQUEST =>
            {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::GeocodeFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, error) = match &self {
            ApiError::BadRequest(detail) => ("INVALID_INPUT", detail.clone()),
            ApiError::ModelUnavailable => (
                "MODEL_UNAVAILABLE",
                "Diagnosis model is not loaded".to_string(),
            ),
            ApiError::GeocodeFailed { status, reason } => {
                tracing::warn!(%status, reason = %reason, "Location resolution failed");
                (
                    "GEOCODE_FAILED",
                    format!("Could not resolve location ({status})"),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                ("INTERNAL", "An internal error occurred".to_string())
            }
        };

        (status, Json(ErrorBody { error, code })).into_response()
    }
}

impl From<CheckupError> for ApiError {
    fn from(err: CheckupError) -> Self {
        match err {
            CheckupError::InvalidInput(msg) => ApiError::BadRequest(msg),
            CheckupError::ModelUnavailable => ApiError::ModelUnavailable,
            CheckupError::GeocodeFailed { status, reason } => {
                ApiError::GeocodeFailed { status, reason }
            }
            CheckupError::Internal(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
