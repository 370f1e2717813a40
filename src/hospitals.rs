//! Hospital finder: persisted store + nearby-search collaborator,
//! merged, deduplicated and ranked by distance.
//!
//! Either source may fail without failing the search. Failures are
//! logged and returned alongside the (possibly empty) list.

use std::collections::HashMap;
use std::sync::Arc;

use crate::db::StoreError;
use crate::maps::{MapsError, STATUS_OK, STATUS_TRANSPORT_ERROR, STATUS_ZERO_RESULTS};
use crate::models::{GeoPoint, HospitalRecord};

/// Persisted store scan used by the finder.
pub trait HospitalStore: Send + Sync {
    fn all_hospitals(&self) -> Result<Vec<HospitalRecord>, StoreError>;
}

/// Collaborator answer to a nearby search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyOutcome {
    pub status: String,
    pub places: Vec<HospitalRecord>,
    pub error_message: Option<String>,
}

/// Nearby-search collaborator scoped to a point and radius.
pub trait PlacesSearch: Send + Sync {
    fn nearby_hospitals(
        &self,
        point: GeoPoint,
        radius_meters: u32,
    ) -> Result<NearbyOutcome, MapsError>;
}

/// A hospital source that could not contribute to a search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceFailure {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("nearby search failed ({status}): {reason}")]
    PlacesFailed { status: String, reason: String },
}

/// Result of a search: always a valid list, plus what went wrong.
#[derive(Debug, Clone, Default)]
pub struct NearbyHospitals {
    pub hospitals: Vec<HospitalRecord>,
    pub failures: Vec<SourceFailure>,
}

impl NearbyHospitals {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct HospitalFinder {
    store: Arc<dyn HospitalStore>,
    places: Arc<dyn PlacesSearch>,
}

impl HospitalFinder {
    pub fn new(store: Arc<dyn HospitalStore>, places: Arc<dyn PlacesSearch>) -> Self {
        Self { store, places }
    }

    pub fn find_nearby(&self, point: GeoPoint, radius_meters: u32) -> NearbyHospitals {
        let mut failures = Vec::new();

        let stored = match self.store.all_hospitals() {
            Ok(all) => within_radius(all, point, radius_meters),
            Err(e) => {
                tracing::warn!(error = %e, "Hospital store unavailable, using nearby search only");
                failures.push(SourceFailure::StoreUnavailable(e.to_string()));
                Vec::new()
            }
        };

        let nearby = match self.places.nearby_hospitals(point, radius_meters) {
            Ok(outcome) if outcome.status == STATUS_OK => outcome.places,
            Ok(outcome) if outcome.status == STATUS_ZERO_RESULTS => Vec::new(),
            Ok(outcome) => {
                tracing::warn!(status = %outcome.status, "Nearby search returned non-OK status");
                failures.push(SourceFailure::PlacesFailed {
                    reason: outcome
                        .error_message
                        .unwrap_or_else(|| format!("places returned {}", outcome.status)),
                    status: outcome.status,
                });
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Nearby search failed, using stored hospitals only");
                failures.push(SourceFailure::PlacesFailed {
                    status: STATUS_TRANSPORT_ERROR.into(),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };

        if failures.len() == 2 {
            tracing::error!(
                store = %failures[0],
                places = %failures[1],
                "Both hospital sources failed"
            );
        }

        let hospitals = rank_by_distance(merge(stored, nearby), point);
        tracing::debug!(count = hospitals.len(), degraded = !failures.is_empty(), "Hospital search done");

        NearbyHospitals {
            hospitals,
            failures,
        }
    }
}

fn within_radius(
    hospitals: Vec<HospitalRecord>,
    point: GeoPoint,
    radius_meters: u32,
) -> Vec<HospitalRecord> {
    hospitals
        .into_iter()
        .filter(|h| h.location().distance_meters(&point) <= f64::from(radius_meters))
        .collect()
}

/// Concatenate store then collaborator records, deduplicating by
/// (name, address). The collaborator's record replaces a store record
/// in place; within one source the first occurrence wins.
pub fn merge(stored: Vec<HospitalRecord>, nearby: Vec<HospitalRecord>) -> Vec<HospitalRecord> {
    let mut merged: Vec<HospitalRecord> = Vec::with_capacity(stored.len() + nearby.len());
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for record in stored {
        let key = (record.name.clone(), record.address.clone());
        if !index.contains_key(&key) {
            index.insert(key, merged.len());
            merged.push(record);
        }
    }

    let store_count = merged.len();
    let mut replaced = vec![false; store_count];

    for record in nearby {
        let key = (record.name.clone(), record.address.clone());
        match index.get(&key) {
            Some(&i) if i < store_count && !replaced[i] => {
                merged[i] = record;
                replaced[i] = true;
            }
            Some(_) => {}
            None => {
                index.insert(key, merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

/// Fill in great-circle distance from `point` and sort ascending.
/// The sort is stable, so equal distances keep merge order.
pub fn rank_by_distance(mut hospitals: Vec<HospitalRecord>, point: GeoPoint) -> Vec<HospitalRecord> {
    for hospital in &mut hospitals {
        hospital.distance_meters = Some(hospital.location().distance_meters(&point));
    }
    hospitals.sort_by(|a, b| {
        let da = a.distance_meters.unwrap_or(f64::INFINITY);
        let db = b.distance_meters.unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });
    hospitals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;

    const CENTER: GeoPoint = GeoPoint {
        latitude: 34.0522,
        longitude: -118.2437,
    };

    struct FailingStore;

    impl HospitalStore for FailingStore {
        fn all_hospitals(&self) -> Result<Vec<HospitalRecord>, StoreError> {
            Err(StoreError::Unavailable("database is locked".into()))
        }
    }

    struct MockPlaces {
        outcome: Result<NearbyOutcome, String>,
    }

    impl MockPlaces {
        fn ok(places: Vec<HospitalRecord>) -> Self {
            Self {
                outcome: Ok(NearbyOutcome {
                    status: STATUS_OK.into(),
                    places,
                    error_message: None,
                }),
            }
        }

        fn status(status: &str) -> Self {
            Self {
                outcome: Ok(NearbyOutcome {
                    status: status.into(),
                    places: vec![],
                    error_message: None,
                }),
            }
        }

        fn failing() -> Self {
            Self {
                outcome: Err("maps.example".into()),
            }
        }
    }

    impl PlacesSearch for MockPlaces {
        fn nearby_hospitals(
            &self,
            _point: GeoPoint,
            _radius_meters: u32,
        ) -> Result<NearbyOutcome, MapsError> {
            self.outcome.clone().map_err(MapsError::Connection)
        }
    }

    /// `d_lat` degrees north of CENTER (~111 km per degree).
    fn hospital(name: &str, address: &str, d_lat: f64) -> HospitalRecord {
        HospitalRecord::new(
            name,
            address,
            GeoPoint::new(CENTER.latitude + d_lat, CENTER.longitude),
        )
    }

    fn store_with(hospitals: &[HospitalRecord]) -> Arc<SqliteStore> {
        let store = SqliteStore::in_memory().unwrap();
        for h in hospitals {
            store.insert_hospital(h).unwrap();
        }
        Arc::new(store)
    }

    #[test]
    fn duplicate_keeps_collaborator_copy() {
        let store = store_with(&[hospital("A", "Addr1", 0.001)]);
        let places = MockPlaces::ok(vec![
            hospital("A", "Addr1", 0.001).with_place_id("place-a"),
            hospital("B", "Addr2", 0.002).with_place_id("place-b"),
        ]);
        let result = HospitalFinder::new(store, Arc::new(places)).find_nearby(CENTER, 5000);

        assert_eq!(result.hospitals.len(), 2);
        let a = result.hospitals.iter().find(|h| h.name == "A").unwrap();
        assert_eq!(a.place_id.as_deref(), Some("place-a"));
        assert!(!result.is_degraded());
    }

    #[test]
    fn both_sources_failing_is_empty_not_error() {
        let finder = HospitalFinder::new(Arc::new(FailingStore), Arc::new(MockPlaces::failing()));
        let result = finder.find_nearby(CENTER, 5000);
        assert!(result.hospitals.is_empty());
        assert_eq!(result.failures.len(), 2);
        assert!(matches!(result.failures[0], SourceFailure::StoreUnavailable(_)));
    }

    #[test]
    fn source_failures_describe_themselves() {
        let failure = SourceFailure::PlacesFailed {
            status: "OVER_QUERY_LIMIT".into(),
            reason: "quota".into(),
        };
        assert_eq!(
            failure.to_string(),
            "nearby search failed (OVER_QUERY_LIMIT): quota"
        );
        assert_eq!(
            SourceFailure::StoreUnavailable("locked".into()).to_string(),
            "store unavailable: locked"
        );
    }

    #[test]
    fn empty_store_and_failing_places_is_empty() {
        let finder = HospitalFinder::new(store_with(&[]), Arc::new(MockPlaces::failing()));
        let result = finder.find_nearby(CENTER, 5000);
        assert!(result.hospitals.is_empty());
        assert_eq!(result.failures.len(), 1);
    }

    #[test]
    fn store_failure_keeps_places_results() {
        let places = MockPlaces::ok(vec![hospital("B", "Addr2", 0.01)]);
        let result = HospitalFinder::new(Arc::new(FailingStore), Arc::new(places))
            .find_nearby(CENTER, 5000);
        assert_eq!(result.hospitals.len(), 1);
        assert_eq!(result.failures.len(), 1);
    }

    #[test]
    fn non_ok_places_status_keeps_store_results() {
        let store = store_with(&[hospital("A", "Addr1", 0.01)]);
        let result = HospitalFinder::new(store, Arc::new(MockPlaces::status("OVER_QUERY_LIMIT")))
            .find_nearby(CENTER, 5000);
        assert_eq!(result.hospitals.len(), 1);
        match &result.failures[0] {
            SourceFailure::PlacesFailed { status, .. } => assert_eq!(status, "OVER_QUERY_LIMIT"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_results_is_not_a_failure() {
        let store = store_with(&[hospital("A", "Addr1", 0.01)]);
        let result = HospitalFinder::new(store, Arc::new(MockPlaces::status(STATUS_ZERO_RESULTS)))
            .find_nearby(CENTER, 5000);
        assert_eq!(result.hospitals.len(), 1);
        assert!(!result.is_degraded());
    }

    #[test]
    fn sorted_by_computed_distance() {
        let store = store_with(&[hospital("Far", "F", 0.03), hospital("Near", "N", 0.005)]);
        let places = MockPlaces::ok(vec![hospital("Mid", "M", 0.01)]);
        let result = HospitalFinder::new(store, Arc::new(places)).find_nearby(CENTER, 5000);

        let names: Vec<&str> = result.hospitals.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["Near", "Mid", "Far"]);
        let near = result.hospitals[0].distance_meters.unwrap();
        assert!((near - 556.0).abs() < 5.0, "got {near}");
        assert!(result.hospitals.iter().all(|h| h.distance_meters.is_some()));
    }

    #[test]
    fn store_hospitals_outside_radius_are_dropped() {
        let store = store_with(&[hospital("Close", "C", 0.01), hospital("Remote", "R", 1.0)]);
        let result = HospitalFinder::new(store, Arc::new(MockPlaces::ok(vec![])))
            .find_nearby(CENTER, 5000);
        assert_eq!(result.hospitals.len(), 1);
        assert_eq!(result.hospitals[0].name, "Close");
    }

    #[test]
    fn merge_requires_exact_name_and_address() {
        let merged = merge(
            vec![hospital("A", "Addr1", 0.0)],
            vec![hospital("A", "addr1", 0.0), hospital("a", "Addr1", 0.0)],
        );
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn merge_dedups_within_a_source() {
        let merged = merge(
            vec![hospital("A", "Addr1", 0.0), hospital("A", "Addr1", 0.5)],
            vec![
                hospital("B", "Addr2", 0.0).with_place_id("first"),
                hospital("B", "Addr2", 0.0).with_place_id("second"),
            ],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].place_id.as_deref(), Some("first"));
    }

    #[test]
    fn merge_without_ranking_is_store_then_collaborator() {
        let merged = merge(
            vec![hospital("S1", "x", 0.0), hospital("S2", "y", 0.0)],
            vec![hospital("P1", "z", 0.0)],
        );
        let names: Vec<&str> = merged.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["S1", "S2", "P1"]);
    }
}
