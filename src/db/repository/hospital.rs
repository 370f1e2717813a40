use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{GeoPoint, HospitalRecord};

/// Every hospital in the store. No geographic filtering happens here.
pub fn list_hospitals(conn: &Connection) -> Result<Vec<HospitalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT name, address, latitude, longitude, place_id FROM hospitals ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(HospitalRecord {
            name: row.get(0)?,
            address: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            distance_meters: None,
            place_id: row.get(4)?,
        })
    })?;

    let mut hospitals = Vec::new();
    for row in rows {
        hospitals.push(row?);
    }
    Ok(hospitals)
}

/// Insert a hospital, returning its row id.
pub fn insert_hospital(conn: &Connection, hospital: &HospitalRecord) -> Result<i64, DatabaseError> {
    if !GeoPoint::new(hospital.latitude, hospital.longitude).is_valid() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "Invalid coordinates for {}: {},{}",
            hospital.name, hospital.latitude, hospital.longitude
        )));
    }
    conn.execute(
        "INSERT INTO hospitals (name, address, latitude, longitude, place_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            hospital.name,
            hospital.address,
            hospital.latitude,
            hospital.longitude,
            hospital.place_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Whether a hospital with this exact name and address is stored.
pub fn hospital_exists(conn: &Connection, name: &str, address: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM hospitals WHERE name = ?1 AND address = ?2",
        params![name, address],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
