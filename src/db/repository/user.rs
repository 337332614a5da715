use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::{PatientSummary, User};

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, email, phone, password_hash, salt, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            user.phone,
            user.password_hash,
            user.salt,
            user.role.as_str(),
            user.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, email, phone, password_hash, salt, role, created_at
         FROM users WHERE id = ?1",
        params![id.to_string()],
        user_from_row,
    )
    .optional()?
    .map(user_from_parts)
    .transpose()
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, email, phone, password_hash, salt, role, created_at
         FROM users WHERE email = ?1",
        params![email],
        user_from_row,
    )
    .optional()?
    .map(user_from_parts)
    .transpose()
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = 'patient'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Unique patients a doctor has seen, derived from the appointment ledger.
pub fn patients_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<PatientSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT u.id, u.name, u.email, u.phone
         FROM appointments a
         JOIN users u ON u.id = a.patient_id
         WHERE a.doctor_id = ?1
         ORDER BY u.name",
    )?;

    let rows = stmt.query_map(params![doctor_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut patients = Vec::new();
    for row in rows {
        let (id, name, email, phone) = row?;
        patients.push(PatientSummary {
            id: parse_uuid(&id)?,
            name,
            email,
            phone,
        });
    }
    Ok(patients)
}

type UserRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

fn user_from_row(row: &rusqlite::Row<'_>) -> Result<UserRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn user_from_parts(row: UserRow) -> Result<User, DatabaseError> {
    let (id, name, email, phone, password_hash, salt, role, created_at) = row;
    Ok(User {
        id: parse_uuid(&id)?,
        name,
        email,
        phone,
        password_hash,
        salt,
        role: Role::from_str(&role)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub(super) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

// Stored values that fail to parse are surfaced, not papered over with
// a default. A 1970 date in the API would hide corruption.
pub(super) fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad stored date {s:?}: {e}")))
}

pub(super) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::ConstraintViolation(format!("bad stored timestamp {s:?}: {e}"))
        })
}
