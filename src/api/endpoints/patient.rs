//! Patient endpoints: profile lookup, open sessions, booking, and
//! published transcripts.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::booking::{self, require_id};
use crate::db::repository;
use crate::models::{
    BookedAppointment, BookingRecord, DoctorSummary, Session, TranscriptView,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
}

/// `GET /patient/user/:userId` — display name lookup.
pub async fn user(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let conn = ctx.conn()?;
    let user = repository::get_user(&conn, &user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse {
        id: user.id,
        name: user.name,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboardResponse {
    pub total_doctors: i64,
}

/// `GET /patient/dashboard`
pub async fn dashboard(
    State(ctx): State<ApiContext>,
) -> Result<Json<PatientDashboardResponse>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(PatientDashboardResponse {
        total_doctors: repository::count_doctors(&conn)?,
    }))
}

/// `GET /patient/doctors` — id, name, specialty only.
pub async fn doctors(State(ctx): State<ApiContext>) -> Result<Json<Vec<DoctorSummary>>, ApiError> {
    let conn = ctx.conn()?;
    let doctors = repository::list_doctors(&conn)?
        .into_iter()
        .map(|d| DoctorSummary {
            id: d.id,
            name: d.name,
            specialty: d.specialty,
        })
        .collect();
    Ok(Json(doctors))
}

/// `GET /patient/sessions/:doctorId` — open (unbooked) sessions only.
pub async fn sessions(
    State(ctx): State<ApiContext>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::unbooked_sessions_for_doctor(
        &conn,
        &doctor_id,
    )?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub session_id: Option<String>,
    pub patient_id: Option<String>,
}

/// `POST /patient/book-session`
pub async fn book_session(
    State(ctx): State<ApiContext>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookedAppointment>, ApiError> {
    let session_id = require_id(req.session_id.as_deref(), "sessionId")?;
    let patient_id = require_id(req.patient_id.as_deref(), "patientId")?;

    let mut conn = ctx.conn()?;
    let booked = booking::book_session(&mut conn, &session_id, &patient_id)?;
    Ok(Json(booked))
}

/// `GET /patient/my-bookings/:patientId` — annotated, never mutating.
pub async fn my_bookings(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<BookingRecord>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(booking::list_bookings_for_patient(&conn, &patient_id)?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub patient_id: Option<String>,
}

/// `POST /patient/cancel-booking/:sessionId`
pub async fn cancel_booking(
    State(ctx): State<ApiContext>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let patient_id = require_id(req.patient_id.as_deref(), "patientId")?;

    let mut conn = ctx.conn()?;
    booking::cancel_booking(&mut conn, &session_id, &patient_id)?;
    Ok(Json(serde_json::json!({ "cancelled": session_id })))
}

/// `GET /patient/transcripts/:userId` — published transcripts only.
pub async fn transcripts(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<TranscriptView>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::published_transcripts_for_patient(
        &conn, &user_id,
    )?))
}

/// `GET /patient/transcript/:transcriptId/:userId` — single published
/// transcript, scoped to the owning patient.
pub async fn transcript(
    State(ctx): State<ApiContext>,
    Path((transcript_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TranscriptView>, ApiError> {
    let conn = ctx.conn()?;
    let view = repository::published_transcript_for_patient(&conn, &transcript_id, &user_id)?
        .ok_or_else(|| ApiError::NotFound("Transcript not found".into()))?;
    Ok(Json(view))
}
