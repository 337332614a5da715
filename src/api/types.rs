//! Shared types for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::documents::DocumentStore;
use crate::models::enums::Role;

/// Shared context for all API routes and middleware: the SQLite handle
/// and the document store behind transcript uploads.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Mutex<Connection>>,
    pub documents: Arc<dyn DocumentStore>,
}

impl ApiContext {
    pub fn new(db: Connection, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            documents,
        }
    }

    /// Lock the connection for the duration of one handler.
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware after token validation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject_id: String,
    pub role: Role,
}
