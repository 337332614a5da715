//! Document storage behind the transcript upload flow. Binaries live in
//! a [`DocumentStore`]; only the URL and remote handle land in SQLite.
//! The store write happens before the metadata insert, so a failed
//! insert triggers a best-effort delete of the stored binary.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::booking::require_id;
use crate::db::{repository, DatabaseError};
use crate::models::enums::{TranscriptStatus, TranscriptType};
use crate::models::Transcript;

/// Where a stored binary ended up. `remote_id` is the handle the store
/// accepts back for deletion.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub url: String,
    pub remote_id: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("document store rejected the file: {0}")]
    Rejected(String),
}

/// Backend that holds document binaries. The upload flow only needs
/// store and delete; listing stays in SQLite.
pub trait DocumentStore: Send + Sync {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<StoredDocument, StoreError>;
    fn delete(&self, remote_id: &str) -> Result<(), StoreError>;
}

/// Filesystem-backed store. Each document gets a fresh UUID-prefixed
/// name under `root` so colliding upload names never overwrite.
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

impl DocumentStore for LocalDocumentStore {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<StoredDocument, StoreError> {
        // Strip any path components an uploader smuggles into the name.
        let base = std::path::Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document");
        let remote_id = format!("{}_{}", Uuid::new_v4(), base);
        let path = self.root.join(&remote_id);
        std::fs::write(&path, bytes)?;
        Ok(StoredDocument {
            url: format!("file://{}", path.display()),
            remote_id,
        })
    }

    fn delete(&self, remote_id: &str) -> Result<(), StoreError> {
        std::fs::remove_file(self.root.join(remote_id))?;
        Ok(())
    }
}

/// One multipart file part, already drained into memory.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fields accompanying the file in an upload request.
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub title: Option<String>,
    pub kind: Option<TranscriptType>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file attached to the upload")]
    MissingFile,
    #[error("missing or invalid field: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Store the binary, then record the transcript row. If anything after
/// the store write fails, the stored binary is deleted best-effort and
/// the original error is surfaced.
pub fn upload_transcript(
    conn: &Connection,
    store: &Arc<dyn DocumentStore>,
    request: UploadRequest,
    file: Option<IncomingFile>,
) -> Result<Transcript, UploadError> {
    let file = file.ok_or(UploadError::MissingFile)?;
    if file.bytes.is_empty() {
        return Err(UploadError::MissingFile);
    }

    let stored = store.store(&file.file_name, &file.bytes)?;

    match record_transcript(conn, &stored, request, &file) {
        Ok(transcript) => Ok(transcript),
        Err(err) => {
            if let Err(cleanup) = store.delete(&stored.remote_id) {
                tracing::warn!(
                    remote_id = %stored.remote_id,
                    error = %cleanup,
                    "failed to clean up stored document after upload error"
                );
            }
            Err(err)
        }
    }
}

fn record_transcript(
    conn: &Connection,
    stored: &StoredDocument,
    request: UploadRequest,
    file: &IncomingFile,
) -> Result<Transcript, UploadError> {
    let patient_id = require_id(request.patient_id.as_deref(), "patientId")
        .map_err(|_| UploadError::MissingField("patientId"))?;
    let doctor_id = require_id(request.doctor_id.as_deref(), "doctorId")
        .map_err(|_| UploadError::MissingField("doctorId"))?;

    // Scope checks: both ends of the pair must exist.
    repository::get_user(conn, &patient_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "user".into(),
        id: patient_id.to_string(),
    })?;
    repository::get_doctor(conn, &doctor_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "doctor".into(),
        id: doctor_id.to_string(),
    })?;

    let title = match request.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => file.file_name.clone(),
    };

    let transcript = Transcript {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id,
        document_url: stored.url.clone(),
        remote_id: stored.remote_id.clone(),
        kind: request.kind.unwrap_or(TranscriptType::MedicalRecord),
        title,
        status: TranscriptStatus::Published,
        file_name: Some(file.file_name.clone()),
        file_type: file.content_type.clone(),
        created_at: Utc::now(),
    };
    repository::insert_transcript(conn, &transcript)?;

    tracing::info!(
        transcript_id = %transcript.id,
        patient_id = %transcript.patient_id,
        "transcript uploaded"
    );
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::db::open_memory_database;
    use crate::models::enums::Role;
    use crate::models::{Doctor, User};

    fn seed_patient(conn: &Connection) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: "Asha Rao".into(),
            email: format!("{}@example.com", Uuid::new_v4()),
            phone: "555-0100".into(),
            password_hash: "hash".into(),
            salt: "salt".into(),
            role: Role::Patient,
            created_at: Utc::now(),
        };
        repository::insert_user(conn, &user).unwrap();
        user
    }

    fn seed_doctor(conn: &Connection) -> Doctor {
        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: "Dr. Mairead Kelly".into(),
            email: format!("{}@clinic.example", Uuid::new_v4()),
            phone: "555-0200".into(),
            specialty: "Cardiology".into(),
            password_hash: "hash".into(),
            salt: "salt".into(),
        };
        repository::insert_doctor(conn, &doctor).unwrap();
        doctor
    }

    fn temp_store() -> (tempfile::TempDir, Arc<dyn DocumentStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path().to_path_buf()).unwrap();
        (dir, Arc::new(store))
    }

    fn pdf_file() -> IncomingFile {
        IncomingFile {
            file_name: "scan.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: b"%PDF-1.4 fake".to_vec(),
        }
    }

    #[test]
    fn local_store_round_trip() {
        let (dir, store) = temp_store();
        let stored = store.store("report.pdf", b"contents").unwrap();
        assert!(stored.url.starts_with("file://"));
        assert!(dir.path().join(&stored.remote_id).exists());

        store.delete(&stored.remote_id).unwrap();
        assert!(!dir.path().join(&stored.remote_id).exists());
    }

    #[test]
    fn colliding_names_do_not_overwrite() {
        let (dir, store) = temp_store();
        let a = store.store("scan.pdf", b"first").unwrap();
        let b = store.store("scan.pdf", b"second").unwrap();
        assert_ne!(a.remote_id, b.remote_id);
        assert_eq!(std::fs::read(dir.path().join(&a.remote_id)).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.path().join(&b.remote_id)).unwrap(), b"second");
    }

    #[test]
    fn path_components_are_stripped_from_upload_names() {
        let (dir, store) = temp_store();
        let stored = store.store("../../etc/passwd", b"x").unwrap();
        assert!(stored.remote_id.ends_with("passwd"));
        assert!(dir.path().join(&stored.remote_id).exists());
    }

    #[test]
    fn upload_records_transcript_with_defaults() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn);
        let doctor = seed_doctor(&conn);
        let (_dir, store) = temp_store();

        let request = UploadRequest {
            patient_id: Some(patient.id.to_string()),
            doctor_id: Some(doctor.id.to_string()),
            title: None,
            kind: None,
        };
        let transcript = upload_transcript(&conn, &store, request, Some(pdf_file())).unwrap();

        assert_eq!(transcript.title, "scan.pdf");
        assert_eq!(transcript.kind, TranscriptType::MedicalRecord);
        assert_eq!(transcript.status, TranscriptStatus::Published);

        let listed = repository::published_transcripts_for_patient(&conn, &patient.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].doctor_name, doctor.name);
    }

    #[test]
    fn upload_without_file_is_rejected() {
        let conn = open_memory_database().unwrap();
        let (_dir, store) = temp_store();
        let err = upload_transcript(&conn, &store, UploadRequest::default(), None).unwrap_err();
        assert!(matches!(err, UploadError::MissingFile));
    }

    #[test]
    fn empty_file_is_rejected() {
        let conn = open_memory_database().unwrap();
        let (_dir, store) = temp_store();
        let file = IncomingFile {
            file_name: "empty.pdf".into(),
            content_type: None,
            bytes: Vec::new(),
        };
        let err = upload_transcript(&conn, &store, UploadRequest::default(), Some(file)).unwrap_err();
        assert!(matches!(err, UploadError::MissingFile));
    }

    #[test]
    fn failed_insert_cleans_up_stored_binary() {
        let conn = open_memory_database().unwrap();
        let (dir, store) = temp_store();

        // Unknown patient id: store write happens, insert path fails.
        let request = UploadRequest {
            patient_id: Some(Uuid::new_v4().to_string()),
            doctor_id: Some(Uuid::new_v4().to_string()),
            title: None,
            kind: None,
        };
        let err = upload_transcript(&conn, &store, request, Some(pdf_file())).unwrap_err();
        assert!(matches!(err, UploadError::Database(DatabaseError::NotFound { .. })));

        // Best-effort cleanup removed the orphan binary.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    struct FailingDeleteStore {
        inner: LocalDocumentStore,
        delete_attempts: AtomicUsize,
    }

    impl DocumentStore for FailingDeleteStore {
        fn store(&self, file_name: &str, bytes: &[u8]) -> Result<StoredDocument, StoreError> {
            self.inner.store(file_name, bytes)
        }

        fn delete(&self, _remote_id: &str) -> Result<(), StoreError> {
            self.delete_attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Rejected("delete disabled".into()))
        }
    }

    #[test]
    fn cleanup_failure_still_surfaces_original_error() {
        let conn = open_memory_database().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<FailingDeleteStore> = Arc::new(FailingDeleteStore {
            inner: LocalDocumentStore::new(dir.path().to_path_buf()).unwrap(),
            delete_attempts: AtomicUsize::new(0),
        });
        let dyn_store: Arc<dyn DocumentStore> = store.clone();

        let request = UploadRequest {
            patient_id: Some(Uuid::new_v4().to_string()),
            doctor_id: Some(Uuid::new_v4().to_string()),
            title: None,
            kind: None,
        };
        let err = upload_transcript(&conn, &dyn_store, request, Some(pdf_file())).unwrap_err();

        // The metadata failure wins over the cleanup failure.
        assert!(matches!(err, UploadError::Database(_)));
        assert_eq!(store.delete_attempts.load(Ordering::SeqCst), 1);
    }
}
