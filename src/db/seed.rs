//! Seeding the store from JSON files (advice table, hospital list).
//!
//! Advice rows are upserted by label. Hospitals already present with
//! the same name and address are skipped, so seeding is repeatable.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::repository::{hospital_exists, insert_hospital, upsert_advice};
use super::store::SqliteStore;
use super::DatabaseError;
use crate::models::{AdviceRecord, HospitalRecord};

/// One row of an advice seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct AdviceSeed {
    pub label: String,
    pub advice: String,
    pub source: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub advice_upserted: usize,
    pub hospitals_inserted: usize,
    pub hospitals_skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Read a JSON array from `path`.
pub fn read_seed_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SeedError> {
    let bytes = std::fs::read(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl SqliteStore {
    /// Apply both seed lists in one transaction.
    pub fn seed(
        &self,
        advice: &[AdviceSeed],
        hospitals: &[HospitalRecord],
    ) -> Result<SeedSummary, DatabaseError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut summary = SeedSummary::default();

        for row in advice {
            upsert_advice(&tx, &row.label, &AdviceRecord::new(&row.advice, &row.source))?;
            summary.advice_upserted += 1;
        }

        for hospital in hospitals {
            if hospital_exists(&tx, &hospital.name, &hospital.address)? {
                summary.hospitals_skipped += 1;
                continue;
            }
            insert_hospital(&tx, hospital)?;
            summary.hospitals_inserted += 1;
        }

        tx.commit()?;
        tracing::info!(
            advice = summary.advice_upserted,
            hospitals = summary.hospitals_inserted,
            skipped = summary.hospitals_skipped,
            "Store seeded"
        );
        Ok(summary)
    }
}
