use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::DoctorSummary;
use super::session::SessionSummary;

/// A confirmed booking linking one patient, one doctor, and one session.
///
/// `date` and `time` are copies of the session's values at booking time:
/// they record what was booked, and survive later session deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub session_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub created_at: DateTime<Utc>,
}

/// Appointment with doctor details attached, returned by the booking
/// workflow for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: DoctorSummary,
}

/// One row of a patient's booking list. Doctor and session are attached
/// when they still resolve; a booking whose references no longer resolve
/// is surfaced with `orphaned: true` rather than silently dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<DoctorSummary>,
    pub session: Option<SessionSummary>,
    pub orphaned: bool,
}

/// Ledger row for the admin view, display names joined at read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAppointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub specialty: Option<String>,
}

/// Appointment row for a doctor's schedule, patient name joined.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAppointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub session_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub patient_name: Option<String>,
}
