use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::user::{parse_date, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{
    AdminAppointment, Appointment, BookingRecord, DoctorAppointment, DoctorSummary,
    SessionSummary,
};

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, session_id, date, time, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.to_string(),
            appt.session_id.to_string(),
            appt.date.to_string(),
            appt.time,
            appt.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// The unique appointment for a (session, patient) pair, if any.
pub fn find_appointment_for_booking(
    conn: &Connection,
    session_id: &Uuid,
    patient_id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    conn.query_row(
        "SELECT id, patient_id, doctor_id, session_id, date, time, created_at
         FROM appointments WHERE session_id = ?1 AND patient_id = ?2",
        params![session_id.to_string(), patient_id.to_string()],
        appointment_from_row,
    )
    .optional()?
    .map(appointment_from_parts)
    .transpose()
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

pub fn count_appointments(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_appointments_on(conn: &Connection, date: NaiveDate) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE date = ?1",
        params![date.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Full ledger for the admin view, newest appointment date first.
pub fn list_appointments_admin(conn: &Connection) -> Result<Vec<AdminAppointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.date, a.time, u.name, d.name, d.specialty
         FROM appointments a
         LEFT JOIN users u ON u.id = a.patient_id
         LEFT JOIN doctors d ON d.id = a.doctor_id
         ORDER BY a.date DESC, a.time DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        let (id, date, time, patient_name, doctor_name, specialty) = row?;
        appointments.push(AdminAppointment {
            id: parse_uuid(&id)?,
            date: parse_date(&date)?,
            time,
            patient_name,
            doctor_name,
            specialty,
        });
    }
    Ok(appointments)
}

/// A doctor's schedule, earliest first.
pub fn appointments_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<DoctorAppointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.patient_id, a.session_id, a.date, a.time, u.name
         FROM appointments a
         LEFT JOIN users u ON u.id = a.patient_id
         WHERE a.doctor_id = ?1
         ORDER BY a.date, a.time",
    )?;

    let rows = stmt.query_map(params![doctor_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        let (id, patient_id, session_id, date, time, patient_name) = row?;
        appointments.push(DoctorAppointment {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            session_id: parse_uuid(&session_id)?,
            date: parse_date(&date)?,
            time,
            patient_name,
        });
    }
    Ok(appointments)
}

/// A patient's bookings with doctor and session attached where they still
/// resolve. Rows with a broken reference come back `orphaned: true`; the
/// read never deletes them (see `delete_orphaned_appointments`).
pub fn bookings_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<BookingRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.patient_id, a.doctor_id, a.session_id, a.date, a.time, a.created_at,
                d.id, d.name, d.specialty,
                s.id, s.date, s.time, s.is_booked
         FROM appointments a
         LEFT JOIN doctors d ON d.id = a.doctor_id
         LEFT JOIN sessions s ON s.id = a.session_id
         WHERE a.patient_id = ?1
         ORDER BY a.date, a.time",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            appointment_from_row_at(row, 0)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, Option<String>>(9)?,
            row.get::<_, Option<String>>(10)?,
            row.get::<_, Option<String>>(11)?,
            row.get::<_, Option<String>>(12)?,
            row.get::<_, Option<i64>>(13)?,
        ))
    })?;

    let mut bookings = Vec::new();
    for row in rows {
        let (appt_row, d_id, d_name, d_specialty, s_id, s_date, s_time, s_booked) = row?;
        let appointment = appointment_from_parts(appt_row)?;

        let doctor = match (d_id, d_name, d_specialty) {
            (Some(id), Some(name), Some(specialty)) => Some(DoctorSummary {
                id: parse_uuid(&id)?,
                name,
                specialty,
            }),
            _ => None,
        };
        let session = match (s_id, s_date, s_time, s_booked) {
            (Some(id), Some(date), Some(time), Some(is_booked)) => Some(SessionSummary {
                id: parse_uuid(&id)?,
                date: parse_date(&date)?,
                time,
                is_booked: is_booked != 0,
            }),
            _ => None,
        };

        let orphaned = doctor.is_none() || session.is_none();
        bookings.push(BookingRecord {
            appointment,
            doctor,
            session,
            orphaned,
        });
    }
    Ok(bookings)
}

/// Reconciliation: delete every appointment whose doctor or session no
/// longer exists. Returns the number removed. Invoked explicitly, never
/// as a side effect of a read.
pub fn delete_orphaned_appointments(conn: &Connection) -> Result<usize, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM appointments
         WHERE NOT EXISTS (SELECT 1 FROM doctors d WHERE d.id = appointments.doctor_id)
            OR NOT EXISTS (SELECT 1 FROM sessions s WHERE s.id = appointments.session_id)",
        [],
    )?;
    Ok(removed)
}

/// (date, time, created_at) triples feeding the analytics aggregations.
pub fn appointment_schedule_rows(
    conn: &Connection,
) -> Result<Vec<(NaiveDate, String, String)>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT date, time, created_at FROM appointments")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut schedule = Vec::new();
    for row in rows {
        let (date, time, created_at) = row?;
        schedule.push((
            parse_date(&date)?,
            time,
            created_at,
        ));
    }
    Ok(schedule)
}

/// Appointment counts grouped by doctor (name and specialty joined),
/// busiest doctor first.
pub fn appointment_counts_by_doctor(
    conn: &Connection,
) -> Result<Vec<(String, String, i64)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(d.name, 'Unknown Doctor'),
                COALESCE(d.specialty, 'Unspecified'),
                COUNT(*)
         FROM appointments a
         LEFT JOIN doctors d ON d.id = a.doctor_id
         GROUP BY a.doctor_id
         ORDER BY COUNT(*) DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Appointment counts grouped by the doctor's specialty, largest first.
pub fn appointment_counts_by_specialty(
    conn: &Connection,
) -> Result<Vec<(String, i64)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(d.specialty, 'Unspecified'), COUNT(*)
         FROM appointments a
         LEFT JOIN doctors d ON d.id = a.doctor_id
         GROUP BY COALESCE(d.specialty, 'Unspecified')
         ORDER BY COUNT(*) DESC",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

type AppointmentRow = (String, String, String, String, String, String, String);

fn appointment_from_row(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    appointment_from_row_at(row, 0)
}

fn appointment_from_row_at(
    row: &rusqlite::Row<'_>,
    base: usize,
) -> Result<AppointmentRow, rusqlite::Error> {
    Ok((
        row.get(base)?,
        row.get(base + 1)?,
        row.get(base + 2)?,
        row.get(base + 3)?,
        row.get(base + 4)?,
        row.get(base + 5)?,
        row.get(base + 6)?,
    ))
}

fn appointment_from_parts(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let (id, patient_id, doctor_id, session_id, date, time, created_at) = row;
    Ok(Appointment {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        session_id: parse_uuid(&session_id)?,
        date: parse_date(&date)?,
        time,
        created_at: parse_timestamp(&created_at)?,
    })
}
