//! `POST /find_hospitals` — location → hospitals ranked by distance.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::HospitalRecord;

#[derive(Debug, Deserialize)]
pub struct FindHospitalsRequest {
    pub location: String,
    #[serde(default)]
    pub radius_meters: Option<u32>,
}

/// One hospital on the wire. `distance` is in kilometres from the
/// resolved location.
#[derive(Debug, Serialize)]
pub struct HospitalView {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl From<HospitalRecord> for HospitalView {
    fn from(record: HospitalRecord) -> Self {
        let distance_km = record.distance_meters.unwrap_or_default() / 1000.0;
        Self {
            name: record.name,
            address: record.address,
            latitude: record.latitude,
            longitude: record.longitude,
            distance: (distance_km * 1000.0).round() / 1000.0,
            place_id: record.place_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FindHospitalsResponse {
    pub hospitals: Vec<HospitalView>,
}

pub async fn find_hospitals(
    State(ctx): State<ApiContext>,
    payload: Result<Json<FindHospitalsRequest>, JsonRejection>,
) -> Result<Json<FindHospitalsResponse>, ApiError> {
    let Json(request) = payload?;
    let service = ctx.service.clone();

    let report = tokio::task::spawn_blocking(move || {
        service.find_hospitals(&request.location, request.radius_meters)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("hospital search task failed: {e}")))??;

    Ok(Json(FindHospitalsResponse {
        hospitals: report.hospitals.into_iter().map(HospitalView::from).collect(),
    }))
}
