use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::Role;

/// Who an issued bearer token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub subject_id: String,
    pub role: Role,
}

/// Persist a token hash for later lookup. The plaintext token never
/// touches storage.
pub fn insert_token(
    conn: &Connection,
    token_hash: &str,
    subject: &TokenSubject,
    issued_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO auth_tokens (token_hash, subject_id, role, issued_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            token_hash,
            subject.subject_id,
            subject.role.as_str(),
            issued_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Resolve a token hash to its subject, if the token was ever issued.
pub fn find_token_subject(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<TokenSubject>, DatabaseError> {
    conn.query_row(
        "SELECT subject_id, role FROM auth_tokens WHERE token_hash = ?1",
        params![token_hash],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    )
    .optional()?
    .map(|(subject_id, role)| {
        Ok(TokenSubject {
            subject_id,
            role: Role::from_str(&role)?,
        })
    })
    .transpose()
}
