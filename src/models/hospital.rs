use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// A hospital from the persisted store or the places collaborator.
///
/// `distance_meters` is filled in by the finder relative to the
/// searched point. Two records describe the same hospital when
/// name and address match exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl HospitalRecord {
    pub fn new(name: impl Into<String>, address: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            latitude: point.latitude,
            longitude: point.longitude,
            distance_meters: None,
            place_id: None,
        }
    }

    pub fn with_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.place_id = Some(place_id.into());
        self
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
