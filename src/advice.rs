//! Advice lookup: diagnosis label → curated (advice, source).
//!
//! "No curated advice" and "could not read the store" are different
//! outcomes: the first is `Ok(None)`, the second `AdviceError`.

use std::sync::Arc;

use crate::db::StoreError;
use crate::models::AdviceRecord;

/// Persisted store read used by the lookup.
pub trait AdviceStore: Send + Sync {
    fn advice_for(&self, label: &str) -> Result<Option<AdviceRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AdviceError {
    #[error("Advice lookup failed for '{label}': {reason}")]
    LookupFailed { label: String, reason: String },
}

pub struct AdviceLookup {
    store: Arc<dyn AdviceStore>,
}

impl AdviceLookup {
    pub fn new(store: Arc<dyn AdviceStore>) -> Self {
        Self { store }
    }

    /// Exact-match lookup. Never fabricates a default record.
    pub fn get_advice(&self, label: &str) -> Result<Option<AdviceRecord>, AdviceError> {
        self.store
            .advice_for(label)
            .map_err(|e| AdviceError::LookupFailed {
                label: label.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;

    struct FailingStore;

    impl AdviceStore for FailingStore {
        fn advice_for(&self, _label: &str) -> Result<Option<AdviceRecord>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    fn curated_lookup() -> AdviceLookup {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert_advice("migraine", &AdviceRecord::new("Rest in a dark, quiet room.", "WHO"))
            .unwrap();
        AdviceLookup::new(Arc::new(store))
    }

    #[test]
    fn curated_label_returns_record() {
        let advice = curated_lookup().get_advice("migraine").unwrap().unwrap();
        assert_eq!(advice.source, "WHO");
    }

    #[test]
    fn unknown_label_is_none_not_error() {
        assert!(curated_lookup()
            .get_advice("Unknown-Label-XYZ")
            .unwrap()
            .is_none());
    }

    #[test]
    fn store_failure_is_lookup_failed() {
        let lookup = AdviceLookup::new(Arc::new(FailingStore));
        let err = lookup.get_advice("migraine").unwrap_err();
        let AdviceError::LookupFailed { label, reason } = err;
        assert_eq!(label, "migraine");
        assert!(reason.contains("connection refused"));
    }
}
