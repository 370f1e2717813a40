//! Location resolver: free-form location string → `GeoPoint`.
//!
//! Strings in strict `"<lat>,<lng>"` decimal form are parsed locally.
//! Anything else is sent to the geocoding collaborator as an address.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::maps::{
    MapsError, STATUS_INVALID_RESPONSE, STATUS_OK, STATUS_TRANSPORT_ERROR, STATUS_ZERO_RESULTS,
};
use crate::models::GeoPoint;

static COORDINATE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+))\s*,\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+))\s*$")
        .expect("coordinate pattern is valid")
});

/// Collaborator answer to a geocoding request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeOutcome {
    pub status: String,
    pub points: Vec<GeoPoint>,
    pub error_message: Option<String>,
}

/// Geocoding collaborator: free-text address → candidate points.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Result<GeocodeOutcome, MapsError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed coordinates: {0}")]
    MalformedCoordinates(String),

    #[error("Geocoding failed ({status}): {reason}")]
    GeocodeFailed { status: String, reason: String },
}

/// Parse a strict `"<lat>,<lng>"` pair.
///
/// Returns `None` when the input is not in that form (it should be
/// geocoded instead), `Some(Err)` when it is but the values are out
/// of range.
pub fn parse_coordinates(input: &str) -> Option<Result<GeoPoint, LocationError>> {
    let captures = COORDINATE_PAIR.captures(input)?;
    let parse = |i: usize| captures.get(i).and_then(|m| m.as_str().parse::<f64>().ok());

    let point = match (parse(1), parse(2)) {
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng),
        _ => {
            return Some(Err(LocationError::MalformedCoordinates(
                input.trim().to_string(),
            )))
        }
    };

    if !point.is_valid() {
        return Some(Err(LocationError::MalformedCoordinates(format!(
            "{} is outside latitude [-90, 90] / longitude [-180, 180]",
            input.trim()
        ))));
    }
    Some(Ok(point))
}

pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    pub fn resolve(&self, location: &str) -> Result<GeoPoint, LocationError> {
        if location.trim().is_empty() {
            return Err(LocationError::InvalidInput(
                "Location cannot be empty".into(),
            ));
        }

        if let Some(parsed) = parse_coordinates(location) {
            return parsed;
        }

        let address = location.trim();
        let outcome = self.geocoder.geocode(address).map_err(|e| {
            tracing::warn!(error = %e, "Geocoding request failed");
            LocationError::GeocodeFailed {
                status: STATUS_TRANSPORT_ERROR.into(),
                reason: e.to_string(),
            }
        })?;

        if outcome.status != STATUS_OK {
            return Err(LocationError::GeocodeFailed {
                reason: outcome
                    .error_message
                    .unwrap_or_else(|| format!("geocoder returned {}", outcome.status)),
                status: outcome.status,
            });
        }

        let point = outcome
            .points
            .first()
            .copied()
            .ok_or_else(|| LocationError::GeocodeFailed {
                status: STATUS_ZERO_RESULTS.into(),
                reason: "geocoder returned no results".into(),
            })?;

        if !point.is_valid() {
            return Err(LocationError::GeocodeFailed {
                status: STATUS_INVALID_RESPONSE.into(),
                reason: format!("geocoder returned out-of-range point {}", point.to_query_string()),
            });
        }

        tracing::debug!(lat = point.latitude, lng = point.longitude, "Address geocoded");
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Geocoder returning a canned outcome and counting calls.
    struct MockGeocoder {
        outcome: Result<GeocodeOutcome, String>,
        calls: AtomicUsize,
    }

    impl MockGeocoder {
        fn ok(points: Vec<GeoPoint>) -> Self {
            Self::with_status(STATUS_OK, points)
        }

        fn with_status(status: &str, points: Vec<GeoPoint>) -> Self {
            Self {
                outcome: Ok(GeocodeOutcome {
                    status: status.into(),
                    points,
                    error_message: None,
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                outcome: Err("127.0.0.1:9".into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Geocoder for MockGeocoder {
        fn geocode(&self, _address: &str) -> Result<GeocodeOutcome, MapsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map_err(MapsError::Connection)
        }
    }

    fn resolver(geocoder: &Arc<MockGeocoder>) -> LocationResolver {
        LocationResolver::new(geocoder.clone())
    }

    #[test]
    fn coordinate_pair_skips_geocoder() {
        let geocoder = Arc::new(MockGeocoder::failing());
        let point = resolver(&geocoder).resolve("34.0522,-118.2437").unwrap();
        assert_eq!(point, GeoPoint::new(34.0522, -118.2437));
        assert_eq!(geocoder.calls(), 0);
    }

    #[test]
    fn coordinate_forms_accepted() {
        for (input, expected) in [
            ("  34.0522 , -118.2437  ", GeoPoint::new(34.0522, -118.2437)),
            ("+10,20", GeoPoint::new(10.0, 20.0)),
            ("-.5,7.", GeoPoint::new(-0.5, 7.0)),
        ] {
            assert_eq!(parse_coordinates(input), Some(Ok(expected)), "{input}");
        }
    }

    #[test]
    fn non_decimal_forms_are_addresses() {
        for input in ["1e3,5", "inf,5", "34.05", "1,2,3", "Los Angeles, CA", "NaN,NaN", "٣٤,٥"] {
            assert!(parse_coordinates(input).is_none(), "{input}");
        }
    }

    #[test]
    fn out_of_range_pair_is_malformed() {
        let geocoder = Arc::new(MockGeocoder::ok(vec![]));
        let err = resolver(&geocoder).resolve("95.0,200.0").unwrap_err();
        assert!(matches!(err, LocationError::MalformedCoordinates(_)));
        assert_eq!(geocoder.calls(), 0);
    }

    #[test]
    fn empty_input_rejected_without_geocoding() {
        let geocoder = Arc::new(MockGeocoder::ok(vec![GeoPoint::new(1.0, 1.0)]));
        for input in ["", "   \t"] {
            assert!(matches!(
                resolver(&geocoder).resolve(input),
                Err(LocationError::InvalidInput(_))
            ));
        }
        assert_eq!(geocoder.calls(), 0);
    }

    #[test]
    fn address_uses_first_geocoder_result() {
        let geocoder = Arc::new(MockGeocoder::ok(vec![
            GeoPoint::new(34.05, -118.24),
            GeoPoint::new(0.0, 0.0),
        ]));
        let point = resolver(&geocoder).resolve("Los Angeles").unwrap();
        assert_eq!(point, GeoPoint::new(34.05, -118.24));
        assert_eq!(geocoder.calls(), 1);
    }

    #[test]
    fn zero_results_status_fails() {
        let geocoder = Arc::new(MockGeocoder::with_status(STATUS_ZERO_RESULTS, vec![]));
        let err = resolver(&geocoder).resolve("some unparseable place").unwrap_err();
        match err {
            LocationError::GeocodeFailed { status, .. } => assert_eq!(status, "ZERO_RESULTS"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(geocoder.calls(), 1);
    }

    #[test]
    fn ok_status_without_results_fails() {
        let geocoder = Arc::new(MockGeocoder::ok(vec![]));
        assert!(matches!(
            resolver(&geocoder).resolve("nowhere"),
            Err(LocationError::GeocodeFailed { .. })
        ));
    }

    #[test]
    fn transport_failure_is_geocode_failed() {
        let geocoder = Arc::new(MockGeocoder::failing());
        match resolver(&geocoder).resolve("Paris").unwrap_err() {
            LocationError::GeocodeFailed { status, reason } => {
                assert_eq!(status, STATUS_TRANSPORT_ERROR);
                assert!(reason.contains("unreachable"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn denied_status_carries_upstream_message() {
        let geocoder = Arc::new(MockGeocoder {
            outcome: Ok(GeocodeOutcome {
                status: "REQUEST_DENIED".into(),
                points: vec![],
                error_message: Some("The provided API key is invalid.".into()),
            }),
            calls: AtomicUsize::new(0),
        });
        match resolver(&geocoder).resolve("Berlin").unwrap_err() {
            LocationError::GeocodeFailed { status, reason } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(reason.contains("API key"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
