use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::user::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::{TranscriptStatus, TranscriptType};
use crate::models::{Transcript, TranscriptView};

pub fn insert_transcript(conn: &Connection, t: &Transcript) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO transcripts (id, patient_id, doctor_id, document_url, remote_id, type,
         title, status, file_name, file_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            t.id.to_string(),
            t.patient_id.to_string(),
            t.doctor_id.to_string(),
            t.document_url,
            t.remote_id,
            t.kind.as_str(),
            t.title,
            t.status.as_str(),
            t.file_name,
            t.file_type,
            t.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Doctor-facing listing: every transcript for the pair, any status,
/// newest first.
pub fn transcripts_for_pair(
    conn: &Connection,
    patient_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<Vec<Transcript>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, doctor_id, document_url, remote_id, type, title, status,
                file_name, file_type, created_at
         FROM transcripts WHERE patient_id = ?1 AND doctor_id = ?2
         ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(
        params![patient_id.to_string(), doctor_id.to_string()],
        transcript_from_row,
    )?;

    let mut transcripts = Vec::new();
    for row in rows {
        transcripts.push(transcript_from_parts(row?)?);
    }
    Ok(transcripts)
}

/// Patient-facing listing: published transcripts only, doctor name joined,
/// newest first.
pub fn published_transcripts_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<TranscriptView>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT t.id, COALESCE(d.name, 'Unknown Doctor'), t.document_url, t.type, t.title,
                t.created_at
         FROM transcripts t
         LEFT JOIN doctors d ON d.id = t.doctor_id
         WHERE t.patient_id = ?1 AND t.status = 'published'
         ORDER BY t.created_at DESC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], view_from_row)?;

    let mut views = Vec::new();
    for row in rows {
        views.push(view_from_parts(row?)?);
    }
    Ok(views)
}

/// A single published transcript, scoped to its owning patient.
pub fn published_transcript_for_patient(
    conn: &Connection,
    transcript_id: &Uuid,
    patient_id: &Uuid,
) -> Result<Option<TranscriptView>, DatabaseError> {
    conn.query_row(
        "SELECT t.id, COALESCE(d.name, 'Unknown Doctor'), t.document_url, t.type, t.title,
                t.created_at
         FROM transcripts t
         LEFT JOIN doctors d ON d.id = t.doctor_id
         WHERE t.id = ?1 AND t.patient_id = ?2 AND t.status = 'published'",
        params![transcript_id.to_string(), patient_id.to_string()],
        view_from_row,
    )
    .optional()?
    .map(view_from_parts)
    .transpose()
}

type TranscriptRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
);

fn transcript_from_row(row: &rusqlite::Row<'_>) -> Result<TranscriptRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn transcript_from_parts(row: TranscriptRow) -> Result<Transcript, DatabaseError> {
    let (id, patient_id, doctor_id, document_url, remote_id, kind, title, status, file_name, file_type, created_at) =
        row;
    Ok(Transcript {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        document_url,
        remote_id,
        kind: TranscriptType::from_str(&kind)?,
        title,
        status: TranscriptStatus::from_str(&status)?,
        file_name,
        file_type,
        created_at: parse_timestamp(&created_at)?,
    })
}

type ViewRow = (String, String, String, String, String, String);

fn view_from_row(row: &rusqlite::Row<'_>) -> Result<ViewRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn view_from_parts(row: ViewRow) -> Result<TranscriptView, DatabaseError> {
    let (id, doctor_name, document_url, kind, title, created_at) = row;
    Ok(TranscriptView {
        id: parse_uuid(&id)?,
        doctor_name,
        document_url,
        kind: TranscriptType::from_str(&kind)?,
        title,
        created_at: parse_timestamp(&created_at)?,
    })
}
