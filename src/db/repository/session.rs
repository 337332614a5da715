use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::user::{parse_date, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Session;

pub fn insert_session(conn: &Connection, session: &Session) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (id, doctor_id, specialty, date, time, is_booked)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            session.id.to_string(),
            session.doctor_id.to_string(),
            session.specialty,
            session.date.to_string(),
            session.time,
            session.is_booked as i32,
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, id: &Uuid) -> Result<Option<Session>, DatabaseError> {
    conn.query_row(
        "SELECT id, doctor_id, specialty, date, time, is_booked
         FROM sessions WHERE id = ?1",
        params![id.to_string()],
        session_from_row,
    )
    .optional()?
    .map(session_from_parts)
    .transpose()
}

/// Every session a doctor has published, booked or not (admin view).
pub fn sessions_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Session>, DatabaseError> {
    collect_sessions(
        conn,
        "SELECT id, doctor_id, specialty, date, time, is_booked
         FROM sessions WHERE doctor_id = ?1 ORDER BY date, time",
        doctor_id,
    )
}

/// Only the slots still open for booking (patient view).
pub fn unbooked_sessions_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Session>, DatabaseError> {
    collect_sessions(
        conn,
        "SELECT id, doctor_id, specialty, date, time, is_booked
         FROM sessions WHERE doctor_id = ?1 AND is_booked = 0 ORDER BY date, time",
        doctor_id,
    )
}

/// Flip `is_booked` from false to true, returning whether this call won
/// the flip. The single conditional write is what closes the
/// check-then-act race: of two concurrent bookings, exactly one sees an
/// affected row.
pub fn try_mark_booked(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "UPDATE sessions SET is_booked = 1 WHERE id = ?1 AND is_booked = 0",
        params![id.to_string()],
    )?;
    Ok(affected == 1)
}

/// Reset the booked flag. A no-op on an already-free or missing session,
/// which is what makes cancellation idempotent with respect to the flag.
pub fn mark_unbooked(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE sessions SET is_booked = 0 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

/// Guarded delete: a booked session cannot be removed, cancel it first.
pub fn delete_session(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let booked: Option<i64> = conn
        .query_row(
            "SELECT is_booked FROM sessions WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match booked {
        None => Err(DatabaseError::NotFound {
            entity_type: "Session".into(),
            id: id.to_string(),
        }),
        Some(b) if b != 0 => Err(DatabaseError::ConstraintViolation(
            "session is booked; cancel the booking before deleting".into(),
        )),
        Some(_) => {
            conn.execute("DELETE FROM sessions WHERE id = ?1", params![id.to_string()])?;
            Ok(())
        }
    }
}

/// (total, booked) session counts for the utilization rate.
pub fn session_counts(conn: &Connection) -> Result<(i64, i64), DatabaseError> {
    let counts = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(is_booked), 0) FROM sessions",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(counts)
}

fn collect_sessions(
    conn: &Connection,
    sql: &str,
    doctor_id: &Uuid,
) -> Result<Vec<Session>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![doctor_id.to_string()], session_from_row)?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(session_from_parts(row?)?);
    }
    Ok(sessions)
}

type SessionRow = (String, String, String, String, String, i64);

fn session_from_row(row: &rusqlite::Row<'_>) -> Result<SessionRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn session_from_parts(row: SessionRow) -> Result<Session, DatabaseError> {
    let (id, doctor_id, specialty, date, time, is_booked) = row;
    Ok(Session {
        id: parse_uuid(&id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        specialty,
        date: parse_date(&date)?,
        time,
        is_booked: is_booked != 0,
    })
}
