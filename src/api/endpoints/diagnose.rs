//! `POST /diagnose` — symptoms → label, distribution, advice.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::checkup::DiagnosisReport;

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    pub symptoms: String,
}

pub async fn diagnose(
    State(ctx): State<ApiContext>,
    payload: Result<Json<DiagnoseRequest>, JsonRejection>,
) -> Result<Json<DiagnosisReport>, ApiError> {
    let Json(request) = payload?;
    let service = ctx.service.clone();

    let report = tokio::task::spawn_blocking(move || service.diagnose(&request.symptoms))
        .await
        .map_err(|e| ApiError::Internal(format!("diagnosis task failed: {e}")))??;

    Ok(Json(report))
}
