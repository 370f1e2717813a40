use serde::{Deserialize, Serialize};

/// Curated health advice for one diagnosis label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceRecord {
    pub advice: String,
    pub source: String,
}

impl AdviceRecord {
    pub fn new(advice: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            advice: advice.into(),
            source: source.into(),
        }
    }
}
