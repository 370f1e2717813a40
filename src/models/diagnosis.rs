use std::collections::BTreeMap;

use serde::Serialize;

/// Probability per diagnosis label, ordered by label.
pub type Distribution = BTreeMap<String, f64>;

/// Best label plus the full distribution it was drawn from.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub label: String,
    pub confidence: f64,
    pub probabilities: Distribution,
}
