use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::user::parse_uuid;
use crate::db::DatabaseError;
use crate::models::Doctor;

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, name, email, phone, specialty, password_hash, salt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.email,
            doctor.phone,
            doctor.specialty,
            doctor.password_hash,
            doctor.salt,
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, email, phone, specialty, password_hash, salt
         FROM doctors WHERE id = ?1",
        params![id.to_string()],
        doctor_from_row,
    )
    .optional()?
    .map(doctor_from_parts)
    .transpose()
}

pub fn find_doctor_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, email, phone, specialty, password_hash, salt
         FROM doctors WHERE email = ?1",
        params![email],
        doctor_from_row,
    )
    .optional()?
    .map(doctor_from_parts)
    .transpose()
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, specialty, password_hash, salt
         FROM doctors ORDER BY name",
    )?;

    let rows = stmt.query_map([], doctor_from_row)?;

    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(doctor_from_parts(row?)?);
    }
    Ok(doctors)
}

pub fn count_doctors(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))?;
    Ok(count)
}

/// Remove a doctor together with their sessions and appointments.
/// One transaction: a half-deleted doctor never becomes visible.
pub fn delete_doctor_cascade(conn: &mut Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    let id = id.to_string();

    let deleted = tx.execute("DELETE FROM doctors WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id,
        });
    }
    tx.execute("DELETE FROM sessions WHERE doctor_id = ?1", params![id])?;
    tx.execute("DELETE FROM appointments WHERE doctor_id = ?1", params![id])?;

    tx.commit()?;
    Ok(())
}

type DoctorRow = (String, String, String, String, String, String, String);

fn doctor_from_row(row: &rusqlite::Row<'_>) -> Result<DoctorRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn doctor_from_parts(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    let (id, name, email, phone, specialty, password_hash, salt) = row;
    Ok(Doctor {
        id: parse_uuid(&id)?,
        name,
        email,
        phone,
        specialty,
        password_hash,
        salt,
    })
}
