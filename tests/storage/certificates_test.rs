//! Certificate store tests

use certify_server::error::StorageError;
use certify_server::model::{ArtifactRef, ArtifactState};
use certify_server::serial::encode;
use certify_server::traits::{CertificateStore, RegistryWriter};

use crate::common::*;

trait Backend: CertificateStore + RegistryWriter {}
impl<T: CertificateStore + RegistryWriter> Backend for T {}

fn with_backends(scenario: impl Fn(&dyn Backend)) {
    let (_dir, sqlite) = sqlite_store();
    seed_registry(sqlite.as_ref());
    scenario(sqlite.as_ref());

    let memory = seeded_memory_store();
    scenario(memory.as_ref());
}

fn ready_state() -> ArtifactState {
    ArtifactState::Ready {
        artifact: ArtifactRef {
            location: "mem://doc".into(),
            digest: "ab".repeat(32),
        },
        rendered_at: chrono::Utc::now(),
    }
}

#[test]
fn test_insert_and_lookup() {
    with_backends(|store| {
        let inserted = store.insert_certificate(new_certificate(1, ROLL_NUMBER)).unwrap();

        assert!(inserted.is_publicly_shareable);
        assert_eq!(inserted.artifact, ArtifactState::pending());

        let fetched = store.get_certificate(&inserted.id).unwrap().unwrap();
        assert_eq!(fetched.serial, inserted.serial);
        assert_eq!(fetched.academic, inserted.academic);
        assert_eq!(fetched.roll_number, inserted.roll_number);

        let serial = encode(1).unwrap();
        let found = store
            .find_by_serial_and_roll(&serial, ROLL_NUMBER)
            .unwrap()
            .unwrap();
        assert_eq!(found.id, inserted.id);

        assert!(store
            .find_by_serial_and_roll(&serial, "DHK-000000")
            .unwrap()
            .is_none());
        assert!(store
            .find_by_serial_and_roll(&encode(2).unwrap(), ROLL_NUMBER)
            .unwrap()
            .is_none());

        assert_eq!(store.count_certificates().unwrap(), 1);
        assert!(store.is_healthy());
    });
}

#[test]
fn test_duplicate_serial_conflicts() {
    with_backends(|store| {
        store.insert_certificate(new_certificate(1, ROLL_NUMBER)).unwrap();

        let err = store
            .insert_certificate(new_certificate(1, "DHK-OTHER"))
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)), "got {:?}", err);
        assert_eq!(store.count_certificates().unwrap(), 1);
    });
}

#[test]
fn test_unknown_student_conflicts() {
    with_backends(|store| {
        let mut new = new_certificate(1, ROLL_NUMBER);
        new.student_id = uuid::Uuid::new_v4();

        let err = store.insert_certificate(new).unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)), "got {:?}", err);
    });
}

#[test]
fn test_set_shareable_changes_only_the_flag() {
    with_backends(|store| {
        let inserted = store.insert_certificate(new_certificate(1, ROLL_NUMBER)).unwrap();

        let hidden = store.set_shareable(&inserted.id, false).unwrap().unwrap();
        assert!(!hidden.is_publicly_shareable);
        assert_eq!(hidden.serial, inserted.serial);
        assert_eq!(hidden.sequence_number, inserted.sequence_number);
        assert_eq!(hidden.artifact, inserted.artifact);

        assert!(store
            .set_shareable(&uuid::Uuid::new_v4(), false)
            .unwrap()
            .is_none());
    });
}

#[test]
fn test_ready_artifact_is_terminal() {
    with_backends(|store| {
        let inserted = store.insert_certificate(new_certificate(1, ROLL_NUMBER)).unwrap();

        let failed = inserted.artifact.after_failure("disk full").unwrap();
        assert!(store.update_artifact(&inserted.id, &failed).unwrap());
        assert_eq!(
            store.get_certificate(&inserted.id).unwrap().unwrap().artifact.attempts(),
            1
        );

        assert!(store.update_artifact(&inserted.id, &ready_state()).unwrap());
        let stored = store.get_certificate(&inserted.id).unwrap().unwrap();
        assert!(stored.artifact.is_ready());

        // Neither a second render nor a stale failure overwrites it
        assert!(!store.update_artifact(&inserted.id, &ready_state()).unwrap());
        assert!(!store.update_artifact(&inserted.id, &failed).unwrap());
        assert!(store
            .get_certificate(&inserted.id)
            .unwrap()
            .unwrap()
            .artifact
            .is_ready());
    });
}

#[test]
fn test_record_artifact_failure_increments_in_place() {
    with_backends(|store| {
        let inserted = store.insert_certificate(new_certificate(1, ROLL_NUMBER)).unwrap();

        // Two writers with the same stale snapshot both count
        assert_eq!(
            store.record_artifact_failure(&inserted.id, "timeout").unwrap(),
            Some(1)
        );
        assert_eq!(
            store.record_artifact_failure(&inserted.id, "disk full").unwrap(),
            Some(2)
        );

        let stored = store.get_certificate(&inserted.id).unwrap().unwrap();
        assert_eq!(
            stored.artifact,
            ArtifactState::Pending {
                attempts: 2,
                last_error: Some("disk full".into()),
            }
        );

        assert!(store.update_artifact(&inserted.id, &ready_state()).unwrap());
        assert_eq!(
            store.record_artifact_failure(&inserted.id, "late").unwrap(),
            None
        );
        assert!(store
            .get_certificate(&inserted.id)
            .unwrap()
            .unwrap()
            .artifact
            .is_ready());

        assert_eq!(
            store
                .record_artifact_failure(&uuid::Uuid::new_v4(), "missing")
                .unwrap(),
            None
        );
    });
}

#[test]
fn test_pending_artifacts_oldest_first_and_capped() {
    with_backends(|store| {
        let first = store.insert_certificate(new_certificate(1, "DHK-1")).unwrap();
        let second = store.insert_certificate(new_certificate(2, "DHK-2")).unwrap();
        let third = store.insert_certificate(new_certificate(3, "DHK-3")).unwrap();

        store.update_artifact(&second.id, &ready_state()).unwrap();

        // Third has exhausted its attempts
        let exhausted = ArtifactState::Pending {
            attempts: 5,
            last_error: Some("renderer offline".into()),
        };
        store.update_artifact(&third.id, &exhausted).unwrap();

        let pending = store.pending_artifacts(10, 5).unwrap();
        let ids: Vec<_> = pending.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id]);

        let pending = store.pending_artifacts(10, 6).unwrap();
        let ids: Vec<_> = pending.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);

        assert_eq!(store.pending_artifacts(1, 6).unwrap().len(), 1);
    });
}

#[test]
fn test_listings_newest_first() {
    with_backends(|store| {
        for n in 1..=3 {
            store
                .insert_certificate(new_certificate(n, &format!("DHK-{}", n)))
                .unwrap();
        }

        let by_institution = store.list_by_institution(&institution_id()).unwrap();
        let sequences: Vec<_> = by_institution.iter().map(|c| c.sequence_number).collect();
        assert_eq!(sequences, vec![3, 2, 1]);

        assert_eq!(store.list_by_student(&student_id()).unwrap().len(), 3);
        assert!(store
            .list_by_student(&unenrolled_student_id())
            .unwrap()
            .is_empty());
        assert!(store
            .list_by_institution(&other_institution_id())
            .unwrap()
            .is_empty());
    });
}
