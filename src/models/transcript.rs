use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{TranscriptStatus, TranscriptType};

/// A stored medical document reference (image/PDF) tied to a
/// patient-doctor pair. The binary itself lives in the document store,
/// addressed by `document_url` + `remote_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub document_url: String,
    pub remote_id: String,
    #[serde(rename = "type")]
    pub kind: TranscriptType,
    pub title: String,
    pub status: TranscriptStatus,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Patient-facing listing row, doctor name joined for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptView {
    pub id: Uuid,
    pub doctor_name: String,
    pub document_url: String,
    #[serde(rename = "type")]
    pub kind: TranscriptType,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
