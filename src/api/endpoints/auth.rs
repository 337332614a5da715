//! Account registration and login.
//!
//! Login checks the users table first, then falls back to the doctors
//! table by email, so doctors added by an admin can sign in without a
//! separate registration step.

use std::str::FromStr;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{generate_token, hash_password, hash_token, verify_password};
use crate::db::repository::{self, TokenSubject};
use crate::models::enums::Role;
use crate::models::User;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    pub user_id: Uuid,
}

/// `POST /auth/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let name = require_field(req.name, "name")?;
    let email = require_field(req.email, "email")?;
    let phone = require_field(req.phone, "phone")?;
    let password = require_field(req.password, "password")?;
    let role = require_field(req.role, "role")?;
    let role =
        Role::from_str(&role).map_err(|_| ApiError::BadRequest(format!("Invalid role: {role}")))?;

    let conn = ctx.conn()?;
    if repository::find_user_by_email(&conn, &email)?.is_some()
        || repository::find_doctor_by_email(&conn, &email)?.is_some()
    {
        return Err(ApiError::Conflict("Email is already registered".into()));
    }

    let (password_hash, salt) = hash_password(&password);
    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        phone,
        password_hash,
        salt,
        role,
        created_at: Utc::now(),
    };
    repository::insert_user(&conn, &user)?;

    let token = issue_token(&conn, user.id, role)?;
    tracing::info!(user = %user.id, role = %role.as_str(), "account registered");

    Ok(Json(AuthResponse {
        token,
        role,
        user_id: user.id,
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `POST /auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = require_field(req.email, "email")?;
    let password = require_field(req.password, "password")?;

    let conn = ctx.conn()?;

    if let Some(user) = repository::find_user_by_email(&conn, &email)? {
        if !verify_password(&password, &user.password_hash, &user.salt) {
            return Err(bad_credentials());
        }
        let token = issue_token(&conn, user.id, user.role)?;
        return Ok(Json(AuthResponse {
            token,
            role: user.role,
            user_id: user.id,
        }));
    }

    let doctor = repository::find_doctor_by_email(&conn, &email)?.ok_or_else(bad_credentials)?;
    if !verify_password(&password, &doctor.password_hash, &doctor.salt) {
        return Err(bad_credentials());
    }
    let token = issue_token(&conn, doctor.id, Role::Doctor)?;
    Ok(Json(AuthResponse {
        token,
        role: Role::Doctor,
        user_id: doctor.id,
    }))
}

fn issue_token(
    conn: &rusqlite::Connection,
    subject_id: Uuid,
    role: Role,
) -> Result<String, ApiError> {
    let token = generate_token();
    repository::insert_token(
        conn,
        &hash_token(&token),
        &TokenSubject {
            subject_id: subject_id.to_string(),
            role,
        },
        Utc::now(),
    )?;
    Ok(token)
}

fn require_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}

fn bad_credentials() -> ApiError {
    ApiError::BadRequest("Invalid email or password".into())
}
