//! Wire types for the geocoding and nearby-search JSON responses.

use serde::Deserialize;

use crate::models::{GeoPoint, HospitalRecord};

pub const STATUS_OK: &str = "OK";
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
pub const STATUS_INVALID_REQUEST: &str = "INVALID_REQUEST";
/// Reported when the collaborator could not be reached at all.
pub const STATUS_TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
/// Reported when the collaborator answered with unusable data.
pub const STATUS_INVALID_RESPONSE: &str = "INVALID_RESPONSE";

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for GeoPoint {
    fn from(value: LatLng) -> Self {
        GeoPoint::new(value.lat, value.lng)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeEntry {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeEntry>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceEntry {
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub place_id: Option<String>,
}

impl From<PlaceEntry> for HospitalRecord {
    fn from(place: PlaceEntry) -> Self {
        let address = place
            .vicinity
            .or(place.formatted_address)
            .unwrap_or_default();
        HospitalRecord {
            name: place.name,
            address,
            latitude: place.geometry.location.lat,
            longitude: place.geometry.location.lng,
            distance_meters: None,
            place_id: place.place_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceEntry>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_response_parses() {
        let json = r#"{
            "status": "OK",
            "results": [
                {"formatted_address": "Los Angeles, CA, USA",
                 "geometry": {"location": {"lat": 34.0522, "lng": -118.2437}, "location_type": "APPROXIMATE"}}
            ]
        }"#;
        let parsed: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, STATUS_OK);
        let point: GeoPoint = parsed.results[0].geometry.location.into();
        assert_eq!(point, GeoPoint::new(34.0522, -118.2437));
    }

    #[test]
    fn zero_results_has_no_results_field() {
        let parsed: GeocodeResponse = serde_json::from_str(r#"{"status":"ZERO_RESULTS"}"#).unwrap();
        assert!(parsed.results.is_empty());
        assert!(parsed.error_message.is_none());
    }

    #[test]
    fn place_maps_to_hospital_record() {
        let json = r#"{
            "status": "OK",
            "results": [
                {"name": "General Hospital", "vicinity": "1 Main St",
                 "geometry": {"location": {"lat": 1.0, "lng": 2.0}}, "place_id": "abc"},
                {"name": "Clinic", "formatted_address": "2 Side St",
                 "geometry": {"location": {"lat": 3.0, "lng": 4.0}}}
            ]
        }"#;
        let parsed: PlacesResponse = serde_json::from_str(json).unwrap();
        let records: Vec<HospitalRecord> = parsed.results.into_iter().map(Into::into).collect();
        assert_eq!(records[0].address, "1 Main St");
        assert_eq!(records[0].place_id.as_deref(), Some("abc"));
        assert_eq!(records[1].address, "2 Side St");
        assert!(records[1].place_id.is_none());
    }

    #[test]
    fn request_denied_carries_message() {
        let parsed: PlacesResponse = serde_json::from_str(
            r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid.","results":[]}"#,
        )
        .unwrap();
        assert_eq!(parsed.status, "REQUEST_DENIED");
        assert!(parsed.error_message.unwrap().contains("API key"));
    }
}
