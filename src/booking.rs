//! Booking workflow — the consistency-sensitive path of the system.
//!
//! Booking turns a patient's request for a session into a pair of writes:
//! a new appointment plus the session's `is_booked` flip. The flip is a
//! conditional update (`WHERE is_booked = 0`) and both writes share one
//! transaction, so of two concurrent requests for the same session
//! exactly one commits an appointment; the other observes zero affected
//! rows and fails with `AlreadyBooked` having written nothing.

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::{Appointment, BookedAppointment, BookingRecord, DoctorSummary};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Session not found")]
    SessionNotFound,
    #[error("Patient not found")]
    PatientNotFound,
    #[error("This session is already booked")]
    AlreadyBooked,
    #[error("Booking not found")]
    BookingNotFound,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Parse a request-supplied id, rejecting absent or blank values before
/// anything touches storage.
pub fn require_id(raw: Option<&str>, field: &'static str) -> Result<Uuid, BookingError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(BookingError::MissingField(field))?;
    Uuid::parse_str(raw).map_err(|_| BookingError::MissingField(field))
}

/// Book `session_id` for `patient_id`.
///
/// Order of checks fixes the error precedence: unknown session beats
/// booked session beats unknown patient. The early `is_booked` read is
/// only for that precedence; the conditional flip inside the transaction
/// is what actually guards against a concurrent booking.
pub fn book_session(
    conn: &mut Connection,
    session_id: &Uuid,
    patient_id: &Uuid,
) -> Result<BookedAppointment, BookingError> {
    let session =
        repository::get_session(conn, session_id)?.ok_or(BookingError::SessionNotFound)?;
    if session.is_booked {
        return Err(BookingError::AlreadyBooked);
    }

    let patient =
        repository::get_user(conn, patient_id)?.ok_or(BookingError::PatientNotFound)?;
    let doctor = repository::get_doctor(conn, &session.doctor_id)?;

    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        doctor_id: session.doctor_id,
        session_id: session.id,
        date: session.date,
        time: session.time.clone(),
        created_at: Utc::now(),
    };

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    if !repository::try_mark_booked(&tx, session_id)? {
        return Err(BookingError::AlreadyBooked);
    }
    repository::insert_appointment(&tx, &appointment)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        session = %session.id,
        patient = %patient.id,
        appointment = %appointment.id,
        "session booked"
    );

    Ok(BookedAppointment {
        appointment,
        doctor: doctor
            .map(|d| DoctorSummary {
                id: d.id,
                name: d.name,
                specialty: d.specialty,
            })
            .unwrap_or(DoctorSummary {
                id: session.doctor_id,
                name: "Unknown Doctor".into(),
                specialty: session.specialty,
            }),
    })
}

/// Cancel the booking a patient holds on a session.
///
/// Resets the session flag when the session still exists (a no-op when it
/// is already free), then deletes the appointment. A second call finds no
/// appointment and reports `BookingNotFound`.
pub fn cancel_booking(
    conn: &mut Connection,
    session_id: &Uuid,
    patient_id: &Uuid,
) -> Result<(), BookingError> {
    let appointment = repository::find_appointment_for_booking(conn, session_id, patient_id)?
        .ok_or(BookingError::BookingNotFound)?;

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    repository::mark_unbooked(&tx, session_id)?;
    repository::delete_appointment(&tx, &appointment.id)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        session = %session_id,
        patient = %patient_id,
        appointment = %appointment.id,
        "booking cancelled"
    );
    Ok(())
}

/// A patient's bookings with display data attached. Pure: appointments
/// whose doctor or session no longer resolves are annotated `orphaned`,
/// never deleted here — reconciliation is `prune_orphaned_bookings`.
pub fn list_bookings_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<BookingRecord>, BookingError> {
    Ok(repository::bookings_for_patient(conn, patient_id)?)
}

/// Explicit reconciliation of dangling appointments. Returns how many
/// were removed.
pub fn prune_orphaned_bookings(conn: &Connection) -> Result<usize, BookingError> {
    let removed = repository::delete_orphaned_appointments(conn)?;
    if removed > 0 {
        tracing::info!(removed, "pruned orphaned bookings");
    }
    Ok(removed)
}
