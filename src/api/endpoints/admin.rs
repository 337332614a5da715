//! Admin endpoints: doctors, sessions, the appointment ledger,
//! inventory, analytics, and the dashboard summary.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{self, AnalyticsReport};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::hash_password;
use crate::booking;
use crate::db::repository;
use crate::inventory;
use crate::models::{AdminAppointment, Doctor, InventoryItem, Session};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_doctors: i64,
    pub total_patients: i64,
    pub today_appointments: i64,
}

/// `GET /admin/dashboard`
pub async fn dashboard(State(ctx): State<ApiContext>) -> Result<Json<DashboardResponse>, ApiError> {
    let conn = ctx.conn()?;
    let today = Utc::now().date_naive();
    Ok(Json(DashboardResponse {
        total_doctors: repository::count_doctors(&conn)?,
        total_patients: repository::count_patients(&conn)?,
        today_appointments: repository::count_appointments_on(&conn, today)?,
    }))
}

/// `GET /admin/doctors` — password material is never serialized.
pub async fn list_doctors(State(ctx): State<ApiContext>) -> Result<Json<Vec<Doctor>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::list_doctors(&conn)?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDoctorRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub password: String,
}

/// `POST /admin/add-doctor`
pub async fn add_doctor(
    State(ctx): State<ApiContext>,
    Json(req): Json<AddDoctorRequest>,
) -> Result<Json<Doctor>, ApiError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "name, email and password are required".into(),
        ));
    }

    let conn = ctx.conn()?;
    if repository::find_doctor_by_email(&conn, &req.email)?.is_some() {
        return Err(ApiError::Conflict("Email is already registered".into()));
    }

    let (password_hash, salt) = hash_password(&req.password);
    let doctor = Doctor {
        id: Uuid::new_v4(),
        name: req.name,
        email: req.email,
        phone: req.phone,
        specialty: req.specialty,
        password_hash,
        salt,
    };
    repository::insert_doctor(&conn, &doctor)?;
    tracing::info!(doctor = %doctor.id, "doctor added");
    Ok(Json(doctor))
}

/// `DELETE /admin/delete-doctor/:id` — cascades over the doctor's
/// sessions and appointments in one transaction.
pub async fn delete_doctor(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut conn = ctx.conn()?;
    repository::delete_doctor_cascade(&mut conn, &id)?;
    tracing::info!(doctor = %id, "doctor deleted");
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// `GET /admin/sessions/:doctorId`
pub async fn list_sessions(
    State(ctx): State<ApiContext>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::sessions_for_doctor(&conn, &doctor_id)?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
}

/// `POST /admin/sessions` — the doctor's specialty is snapshotted onto
/// the session at creation.
pub async fn create_session(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    if req.time.trim().is_empty() {
        return Err(ApiError::BadRequest("time is required".into()));
    }

    let conn = ctx.conn()?;
    let doctor = repository::get_doctor(&conn, &req.doctor_id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;

    let session = Session {
        id: Uuid::new_v4(),
        doctor_id: doctor.id,
        specialty: doctor.specialty,
        date: req.date,
        time: req.time,
        is_booked: false,
    };
    repository::insert_session(&conn, &session)?;
    Ok(Json(session))
}

/// `DELETE /admin/sessions/:id` — refuses booked sessions (409).
pub async fn delete_session(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = ctx.conn()?;
    repository::delete_session(&conn, &id)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// `GET /admin/appointments` — full ledger, newest date first.
pub async fn list_appointments(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<AdminAppointment>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::list_appointments_admin(&conn)?))
}

#[derive(Serialize)]
pub struct ReconcileResponse {
    pub removed: usize,
}

/// `POST /admin/appointments/reconcile` — delete appointments whose
/// doctor or session no longer exists. The only operation that removes
/// orphans; listings never do.
pub async fn reconcile_appointments(
    State(ctx): State<ApiContext>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let conn = ctx.conn()?;
    let removed = booking::prune_orphaned_bookings(&conn)?;
    Ok(Json(ReconcileResponse { removed }))
}

/// `GET /admin/inventory`
pub async fn list_inventory(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(repository::list_items(&conn)?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub medicine_name: String,
    pub quantity: i64,
    pub expiration_date: NaiveDate,
}

/// `POST /admin/inventory/add`
pub async fn add_inventory_item(
    State(ctx): State<ApiContext>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<InventoryItem>, ApiError> {
    if req.medicine_name.trim().is_empty() {
        return Err(ApiError::BadRequest("medicineName is required".into()));
    }
    if req.quantity < 0 {
        return Err(ApiError::BadRequest("Quantity cannot be negative".into()));
    }

    let item = InventoryItem {
        id: Uuid::new_v4(),
        medicine_name: req.medicine_name,
        quantity: req.quantity,
        expiration_date: req.expiration_date,
        last_updated: Utc::now(),
    };
    let conn = ctx.conn()?;
    repository::insert_item(&conn, &item)?;
    Ok(Json(item))
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// `PUT /admin/inventory/:id`
pub async fn update_inventory_item(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<InventoryItem>, ApiError> {
    let conn = ctx.conn()?;
    let item = inventory::adjust_quantity(&conn, &id, req.quantity)?;
    Ok(Json(item))
}

/// `DELETE /admin/inventory/:id`
pub async fn delete_inventory_item(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = ctx.conn()?;
    repository::delete_item(&conn, &id)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// `GET /admin/analytics` — recomputed from live data on every call.
pub async fn analytics_report(
    State(ctx): State<ApiContext>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(analytics::build_report(&conn, Utc::now())?))
}
