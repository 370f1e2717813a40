use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::AdviceRecord;

/// Exact-match lookup of curated advice for a diagnosis label.
pub fn get_advice(conn: &Connection, label: &str) -> Result<Option<AdviceRecord>, DatabaseError> {
    let record = conn
        .query_row(
            "SELECT advice, source FROM health_advice WHERE label = ?1",
            params![label],
            |row| {
                Ok(AdviceRecord {
                    advice: row.get(0)?,
                    source: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

/// Insert or replace the advice curated for `label`.
pub fn upsert_advice(
    conn: &Connection,
    label: &str,
    record: &AdviceRecord,
) -> Result<(), DatabaseError> {
    if label.trim().is_empty() {
        return Err(DatabaseError::ConstraintViolation(
            "Advice label cannot be empty".into(),
        ));
    }
    conn.execute(
        "INSERT INTO health_advice (label, advice, source) VALUES (?1, ?2, ?3)
         ON CONFLICT(label) DO UPDATE SET advice = excluded.advice, source = excluded.source",
        params![label, record.advice, record.source],
    )?;
    Ok(())
}
