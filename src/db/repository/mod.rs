//! Repository layer — entity-scoped database operations.
//!
//! Free functions over `&Connection`, one sub-module per entity. All
//! public functions are re-exported here.

mod appointment;
mod doctor;
mod inventory;
mod session;
mod token;
mod transcript;
mod user;

pub use appointment::*;
pub use doctor::*;
pub use inventory::*;
pub use session::*;
pub use token::*;
pub use transcript::*;
pub use user::*;

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::db::open_memory_database;
    use crate::models::enums::{Role, TranscriptStatus, TranscriptType};
    use crate::models::{Appointment, Doctor, InventoryItem, Session, Transcript, User};

    pub(crate) fn sample_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Asha Rao".into(),
            email: format!("{}@example.com", Uuid::new_v4()),
            phone: "555-0100".into(),
            password_hash: "hash".into(),
            salt: "salt".into(),
            role,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn sample_doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            name: "Dr. Mairead Kelly".into(),
            email: format!("{}@clinic.example", Uuid::new_v4()),
            phone: "555-0200".into(),
            specialty: "Cardiology".into(),
            password_hash: "hash".into(),
            salt: "salt".into(),
        }
    }

    pub(crate) fn sample_session(doctor: &Doctor) -> Session {
        Session {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            specialty: doctor.specialty.clone(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            time: "10:00".into(),
            is_booked: false,
        }
    }

    fn booked_pair(conn: &rusqlite::Connection) -> (User, Doctor, Session, Appointment) {
        let patient = sample_user(Role::Patient);
        let doctor = sample_doctor();
        let session = sample_session(&doctor);
        insert_user(conn, &patient).unwrap();
        insert_doctor(conn, &doctor).unwrap();
        insert_session(conn, &session).unwrap();

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            doctor_id: doctor.id,
            session_id: session.id,
            date: session.date,
            time: session.time.clone(),
            created_at: Utc::now(),
        };
        insert_appointment(conn, &appointment).unwrap();
        (patient, doctor, session, appointment)
    }

    #[test]
    fn user_insert_and_find_by_email() {
        let conn = open_memory_database().unwrap();
        let user = sample_user(Role::Patient);
        insert_user(&conn, &user).unwrap();

        let found = find_user_by_email(&conn, &user.email).unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, Role::Patient);
    }

    #[test]
    fn duplicate_email_rejected() {
        let conn = open_memory_database().unwrap();
        let user = sample_user(Role::Patient);
        insert_user(&conn, &user).unwrap();

        let mut dup = sample_user(Role::Patient);
        dup.email = user.email.clone();
        assert!(insert_user(&conn, &dup).is_err());
    }

    #[test]
    fn try_mark_booked_flips_once() {
        let conn = open_memory_database().unwrap();
        let doctor = sample_doctor();
        let session = sample_session(&doctor);
        insert_doctor(&conn, &doctor).unwrap();
        insert_session(&conn, &session).unwrap();

        assert!(try_mark_booked(&conn, &session.id).unwrap());
        // Second flip must lose: the guard is the conditional WHERE clause.
        assert!(!try_mark_booked(&conn, &session.id).unwrap());
    }

    #[test]
    fn mark_unbooked_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let doctor = sample_doctor();
        let session = sample_session(&doctor);
        insert_doctor(&conn, &doctor).unwrap();
        insert_session(&conn, &session).unwrap();

        mark_unbooked(&conn, &session.id).unwrap();
        mark_unbooked(&conn, &session.id).unwrap();
        let found = get_session(&conn, &session.id).unwrap().unwrap();
        assert!(!found.is_booked);
    }

    #[test]
    fn unbooked_listing_excludes_booked_sessions() {
        let conn = open_memory_database().unwrap();
        let doctor = sample_doctor();
        let open = sample_session(&doctor);
        let mut taken = sample_session(&doctor);
        taken.is_booked = true;
        insert_doctor(&conn, &doctor).unwrap();
        insert_session(&conn, &open).unwrap();
        insert_session(&conn, &taken).unwrap();

        let listed = unbooked_sessions_for_doctor(&conn, &doctor.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, open.id);
    }

    #[test]
    fn delete_session_refuses_booked() {
        let conn = open_memory_database().unwrap();
        let doctor = sample_doctor();
        let mut session = sample_session(&doctor);
        session.is_booked = true;
        insert_doctor(&conn, &doctor).unwrap();
        insert_session(&conn, &session).unwrap();

        let result = delete_session(&conn, &session.id);
        assert!(matches!(
            result,
            Err(crate::db::DatabaseError::ConstraintViolation(_))
        ));
        assert!(get_session(&conn, &session.id).unwrap().is_some());
    }

    #[test]
    fn doctor_cascade_removes_sessions_and_appointments() {
        let mut conn = open_memory_database().unwrap();
        let (_, doctor, session, appointment) = booked_pair(&conn);

        delete_doctor_cascade(&mut conn, &doctor.id).unwrap();

        assert!(get_doctor(&conn, &doctor.id).unwrap().is_none());
        assert!(get_session(&conn, &session.id).unwrap().is_none());
        assert!(find_appointment_for_booking(&conn, &session.id, &appointment.patient_id)
            .unwrap()
            .is_none());
    }

    #[test]
    fn doctor_cascade_unknown_id_is_not_found() {
        let mut conn = open_memory_database().unwrap();
        let result = delete_doctor_cascade(&mut conn, &Uuid::new_v4());
        assert!(matches!(
            result,
            Err(crate::db::DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn bookings_annotate_missing_doctor_as_orphaned() {
        let conn = open_memory_database().unwrap();
        let (patient, doctor, _, _) = booked_pair(&conn);
        // Cascade would remove the appointment; orphan it by raw delete to
        // model an out-of-band removal.
        conn.execute(
            "DELETE FROM doctors WHERE id = ?1",
            rusqlite::params![doctor.id.to_string()],
        )
        .unwrap();

        let bookings = bookings_for_patient(&conn, &patient.id).unwrap();
        assert_eq!(bookings.len(), 1);
        assert!(bookings[0].orphaned);
        assert!(bookings[0].doctor.is_none());
        assert!(bookings[0].session.is_some());
    }

    #[test]
    fn reconcile_deletes_only_orphans() {
        let conn = open_memory_database().unwrap();
        let (_, _, _, _) = booked_pair(&conn);
        let (patient2, doctor2, session2, _) = booked_pair(&conn);
        conn.execute(
            "DELETE FROM sessions WHERE id = ?1",
            rusqlite::params![session2.id.to_string()],
        )
        .unwrap();

        let removed = delete_orphaned_appointments(&conn).unwrap();
        assert_eq!(removed, 1);
        assert!(
            find_appointment_for_booking(&conn, &session2.id, &patient2.id)
                .unwrap()
                .is_none()
        );
        let _ = doctor2;
        assert_eq!(count_appointments(&conn).unwrap(), 1);
    }

    #[test]
    fn patients_for_doctor_deduplicates() {
        let conn = open_memory_database().unwrap();
        let patient = sample_user(Role::Patient);
        let doctor = sample_doctor();
        insert_user(&conn, &patient).unwrap();
        insert_doctor(&conn, &doctor).unwrap();

        for _ in 0..2 {
            let session = sample_session(&doctor);
            insert_session(&conn, &session).unwrap();
            insert_appointment(
                &conn,
                &Appointment {
                    id: Uuid::new_v4(),
                    patient_id: patient.id,
                    doctor_id: doctor.id,
                    session_id: session.id,
                    date: session.date,
                    time: session.time.clone(),
                    created_at: Utc::now(),
                },
            )
            .unwrap();
        }

        let patients = patients_for_doctor(&conn, &doctor.id).unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].id, patient.id);
    }

    #[test]
    fn set_quantity_refreshes_last_updated() {
        let conn = open_memory_database().unwrap();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            medicine_name: "Paracetamol".into(),
            quantity: 5,
            expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            last_updated: Utc::now(),
        };
        insert_item(&conn, &item).unwrap();

        let later = Utc::now() + chrono::Duration::hours(1);
        let updated = set_quantity(&conn, &item.id, 35, later).unwrap();
        assert_eq!(updated.quantity, 35);
        assert!(updated.last_updated > item.last_updated);
    }

    #[test]
    fn set_quantity_unknown_item_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = set_quantity(&conn, &Uuid::new_v4(), 3, Utc::now());
        assert!(matches!(
            result,
            Err(crate::db::DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn patient_transcript_listing_filters_to_published() {
        let conn = open_memory_database().unwrap();
        let patient = sample_user(Role::Patient);
        let doctor = sample_doctor();
        insert_user(&conn, &patient).unwrap();
        insert_doctor(&conn, &doctor).unwrap();

        for status in [TranscriptStatus::Published, TranscriptStatus::Draft] {
            insert_transcript(
                &conn,
                &Transcript {
                    id: Uuid::new_v4(),
                    patient_id: patient.id,
                    doctor_id: doctor.id,
                    document_url: "file:///tmp/doc.pdf".into(),
                    remote_id: Uuid::new_v4().to_string(),
                    kind: TranscriptType::MedicalRecord,
                    title: "Blood panel".into(),
                    status,
                    file_name: Some("doc.pdf".into()),
                    file_type: Some("application/pdf".into()),
                    created_at: Utc::now(),
                },
            )
            .unwrap();
        }

        let patient_facing = published_transcripts_for_patient(&conn, &patient.id).unwrap();
        assert_eq!(patient_facing.len(), 1);
        assert_eq!(patient_facing[0].doctor_name, doctor.name);

        // Doctor-facing listing sees both statuses.
        let doctor_facing = transcripts_for_pair(&conn, &patient.id, &doctor.id).unwrap();
        assert_eq!(doctor_facing.len(), 2);
    }

    #[test]
    fn corrupt_stored_date_surfaces_as_error() {
        let conn = open_memory_database().unwrap();
        let doctor = sample_doctor();
        let session = sample_session(&doctor);
        insert_doctor(&conn, &doctor).unwrap();
        insert_session(&conn, &session).unwrap();

        conn.execute(
            "UPDATE sessions SET date = 'garbage' WHERE id = ?1",
            rusqlite::params![session.id.to_string()],
        )
        .unwrap();

        // No silent 1970-01-01 fallback.
        let result = get_session(&conn, &session.id);
        assert!(matches!(
            result,
            Err(crate::db::DatabaseError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn token_round_trip() {
        let conn = open_memory_database().unwrap();
        let subject = TokenSubject {
            subject_id: Uuid::new_v4().to_string(),
            role: Role::Doctor,
        };
        insert_token(&conn, "hash-abc", &subject, Utc::now()).unwrap();

        let found = find_token_subject(&conn, "hash-abc").unwrap().unwrap();
        assert_eq!(found, subject);
        assert!(find_token_subject(&conn, "other").unwrap().is_none());
    }
}
