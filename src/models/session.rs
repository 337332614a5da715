use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable (doctor, date, time) slot.
///
/// `specialty` is a snapshot of the doctor's specialty at creation time.
/// `time` is a free-form display label ("10:00", "morning"), never parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub specialty: String,
    pub date: NaiveDate,
    pub time: String,
    pub is_booked: bool,
}

/// Session display fields attached to a patient's bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub is_booked: bool,
}
