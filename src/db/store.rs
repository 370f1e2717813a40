//! SQLite-backed persisted store shared by all requests.
//!
//! rusqlite connections are `Send` but not `Sync`, so access is
//! serialized through a `Mutex`. Reads are short single statements.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::Connection;

use super::repository::{get_advice, insert_hospital, list_hospitals, upsert_advice};
use super::sqlite::{open_database, open_memory_database};
use super::{DatabaseError, StoreError};
use crate::advice::AdviceStore;
use crate::hospitals::HospitalStore;
use crate::models::{AdviceRecord, HospitalRecord};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open (or create) the store file and run migrations.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        Ok(Self::new(open_database(path, busy_timeout)?))
    }

    /// Fresh in-memory store (for testing).
    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(open_memory_database()?))
    }

    pub(super) fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    pub fn upsert_advice(&self, label: &str, record: &AdviceRecord) -> Result<(), DatabaseError> {
        let conn = self.lock()?;
        upsert_advice(&conn, label, record)
    }

    pub fn insert_hospital(&self, hospital: &HospitalRecord) -> Result<i64, DatabaseError> {
        let conn = self.lock()?;
        insert_hospital(&conn, hospital)
    }
}

impl AdviceStore for SqliteStore {
    fn advice_for(&self, label: &str) -> Result<Option<AdviceRecord>, StoreError> {
        let conn = self.lock()?;
        Ok(get_advice(&conn, label)?)
    }
}

impl HospitalStore for SqliteStore {
    fn all_hospitals(&self) -> Result<Vec<HospitalRecord>, StoreError> {
        let conn = self.lock()?;
        Ok(list_hospitals(&conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    #[test]
    fn store_round_trips_advice() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert_advice("migraine", &AdviceRecord::new("Rest.", "WHO"))
            .unwrap();
        let got = store.advice_for("migraine").unwrap().unwrap();
        assert_eq!(got.source, "WHO");
        assert!(store.advice_for("cold").unwrap().is_none());
    }

    #[test]
    fn store_lists_hospitals() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert_hospital(&HospitalRecord::new("A", "Addr1", GeoPoint::new(1.0, 2.0)))
            .unwrap();
        assert_eq!(store.all_hospitals().unwrap().len(), 1);
    }

    #[test]
    fn missing_table_reports_unavailable() {
        let conn = Connection::open_in_memory().unwrap();
        let store = SqliteStore::new(conn);
        let err = store.all_hospitals().unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.advice_for("migraine").is_err());
    }
}
