//! Request orchestration for the two checkup flows.
//!
//! Diagnosis: validate → classify → look up advice.
//! Hospitals: resolve location → search both sources.
//!
//! `CheckupService` owns every collaborator explicitly and holds no
//! mutable state, so one instance serves all requests concurrently.
//! All calls block; async callers go through `spawn_blocking`.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::advice::{AdviceLookup, AdviceStore};
use crate::diagnosis::{DiagnosisEngine, DiagnosisError};
use crate::hospitals::{HospitalFinder, HospitalStore, PlacesSearch, SourceFailure};
use crate::location::{Geocoder, LocationError, LocationResolver};
use crate::models::{AdviceRecord, Distribution, GeoPoint, HospitalRecord};

/// Upper bound accepted for a caller-supplied search radius.
pub const MAX_SEARCH_RADIUS_METERS: u32 = 50_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckupError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Diagnosis model is not available")]
    ModelUnavailable,

    #[error("Could not resolve location ({status}): {reason}")]
    GeocodeFailed { status: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DiagnosisError> for CheckupError {
    fn from(err: DiagnosisError) -> Self {
        match err {
            DiagnosisError::InvalidInput(msg) => CheckupError::InvalidInput(msg),
            DiagnosisError::ModelUnavailable => CheckupError::ModelUnavailable,
            other => CheckupError::Internal(other.to_string()),
        }
    }
}

impl From<LocationError> for CheckupError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::InvalidInput(msg) => CheckupError::InvalidInput(msg),
            LocationError::MalformedCoordinates(msg) => {
                CheckupError::InvalidInput(format!("Malformed coordinates: {msg}"))
            }
            LocationError::GeocodeFailed { status, reason } => {
                CheckupError::GeocodeFailed { status, reason }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Reports
// ═══════════════════════════════════════════════════════════

/// Outcome of the diagnosis flow. `advice` is `None` (serialized as
/// `null`) when no curated advice exists or the lookup failed.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    pub label: String,
    pub confidence: f64,
    pub probabilities: Distribution,
    pub advice: Option<AdviceRecord>,
}

/// Outcome of the hospital flow.
#[derive(Debug, Clone)]
pub struct HospitalReport {
    pub point: GeoPoint,
    pub radius_meters: u32,
    pub hospitals: Vec<HospitalRecord>,
    /// Sources that could not contribute. Never sent to the caller.
    pub failures: Vec<SourceFailure>,
}

// ═══════════════════════════════════════════════════════════
// CheckupService
// ═══════════════════════════════════════════════════════════

pub struct CheckupService {
    engine: DiagnosisEngine,
    advice: AdviceLookup,
    resolver: LocationResolver,
    finder: HospitalFinder,
    default_radius_meters: u32,
}

impl CheckupService {
    pub fn new(
        engine: DiagnosisEngine,
        advice: AdviceLookup,
        resolver: LocationResolver,
        finder: HospitalFinder,
        default_radius_meters: u32,
    ) -> Self {
        Self {
            engine,
            advice,
            resolver,
            finder,
            default_radius_meters,
        }
    }

    /// Wire a service from its collaborators. `store` backs both the
    /// advice lookup and the stored half of the hospital search; `maps`
    /// provides geocoding and nearby search.
    pub fn assemble<S, M>(
        engine: DiagnosisEngine,
        store: Arc<S>,
        maps: Arc<M>,
        default_radius_meters: u32,
    ) -> Self
    where
        S: AdviceStore + HospitalStore + 'static,
        M: Geocoder + PlacesSearch + 'static,
    {
        Self::new(
            engine,
            AdviceLookup::new(store.clone()),
            LocationResolver::new(maps.clone()),
            HospitalFinder::new(store, maps),
            default_radius_meters,
        )
    }

    pub fn model_loaded(&self) -> bool {
        self.engine.is_loaded()
    }

    pub fn diagnose(&self, symptoms: &str) -> Result<DiagnosisReport, CheckupError> {
        let diagnosis = self.engine.diagnose(symptoms)?;

        let advice = match self.advice.get_advice(&diagnosis.label) {
            Ok(advice) => advice,
            Err(e) => {
                tracing::warn!(label = %diagnosis.label, error = %e, "Advice lookup failed");
                None
            }
        };

        tracing::info!(
            label = %diagnosis.label,
            confidence = diagnosis.confidence,
            has_advice = advice.is_some(),
            "Diagnosis complete"
        );

        Ok(DiagnosisReport {
            label: diagnosis.label,
            confidence: diagnosis.confidence,
            probabilities: diagnosis.probabilities,
            advice,
        })
    }

    pub fn find_hospitals(
        &self,
        location: &str,
        radius_meters: Option<u32>,
    ) -> Result<HospitalReport, CheckupError> {
        let radius_meters = match radius_meters {
            None => self.default_radius_meters,
            Some(r) if (1..=MAX_SEARCH_RADIUS_METERS).contains(&r) => r,
            Some(r) => {
                return Err(CheckupError::InvalidInput(format!(
                    "radius_meters must be between 1 and {MAX_SEARCH_RADIUS_METERS}, got {r}"
                )))
            }
        };

        let point = self.resolver.resolve(location)?;
        let found = self.finder.find_nearby(point, radius_meters);

        tracing::info!(
            lat = point.latitude,
            lng = point.longitude,
            radius_meters,
            count = found.hospitals.len(),
            degraded = found.is_degraded(),
            "Hospital search complete"
        );

        Ok(HospitalReport {
            point,
            radius_meters,
            hospitals: found.hospitals,
            failures: found.failures,
        })
    }
}
