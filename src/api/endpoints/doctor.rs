//! Doctor endpoints: schedule, patient roster, and transcript handling.

use std::str::FromStr;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::documents::{self, IncomingFile, UploadRequest};
use crate::models::enums::TranscriptType;
use crate::models::{DoctorAppointment, PatientSummary, Transcript};

/// `GET /doctor/appointments/:doctorId` — schedule, soonest first.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<DoctorAppointment>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::appointments_for_doctor(&conn, &doctor_id)?))
}

/// `GET /doctor/patients/:doctorId` — unique patients derived from the
/// doctor's appointments.
pub async fn patients(
    State(ctx): State<ApiContext>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::patients_for_doctor(&conn, &doctor_id)?))
}

/// `POST /doctor/upload-transcript` — multipart form with a `file` part
/// plus `patientId`, `doctorId`, and optional `title` / `type` fields.
pub async fn upload_transcript(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Transcript>), ApiError> {
    let mut request = UploadRequest::default();
    let mut file: Option<IncomingFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;
                file = Some(IncomingFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "patientId" => request.patient_id = Some(read_text(field).await?),
            "doctorId" => request.doctor_id = Some(read_text(field).await?),
            "title" => request.title = Some(read_text(field).await?),
            "type" => {
                let raw = read_text(field).await?;
                request.kind = Some(
                    TranscriptType::from_str(&raw)
                        .map_err(|_| ApiError::BadRequest(format!("Invalid type: {raw}")))?,
                );
            }
            _ => {}
        }
    }

    let conn = ctx.conn()?;
    let transcript = documents::upload_transcript(&conn, &ctx.documents, request, file)?;
    Ok((StatusCode::CREATED, Json(transcript)))
}

/// `GET /doctor/transcripts/:patientId/:doctorId` — every transcript for
/// the pair, drafts included.
pub async fn transcripts(
    State(ctx): State<ApiContext>,
    Path((patient_id, doctor_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Transcript>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::transcripts_for_pair(
        &conn,
        &patient_id,
        &doctor_id,
    )?))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart field: {e}")))
}
