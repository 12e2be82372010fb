//! Registry tests

use certify_server::error::StorageError;
use certify_server::model::Enrollment;
use certify_server::traits::{Registry, RegistryWriter};

use crate::common::*;

trait Backend: Registry + RegistryWriter {}
impl<T: Registry + RegistryWriter> Backend for T {}

fn with_backends(scenario: impl Fn(&dyn Backend)) {
    let (_dir, sqlite) = sqlite_store();
    seed_registry(sqlite.as_ref());
    scenario(sqlite.as_ref());

    let memory = seeded_memory_store();
    scenario(memory.as_ref());
}

#[test]
fn test_seeded_registry() {
    with_backends(|store| {
        assert_eq!(store.count_institutions().unwrap(), 2);
        assert_eq!(store.count_students().unwrap(), 2);

        assert_eq!(
            store.get_institution(&institution_id()).unwrap().unwrap(),
            institution()
        );
        assert_eq!(store.get_student(&student_id()).unwrap().unwrap(), student());

        let enrollment = store
            .get_enrollment(&student_id(), &institution_id())
            .unwrap()
            .unwrap();
        assert_eq!(enrollment.student_institution_id.as_deref(), Some("DRMC-2021-117"));

        assert!(!store
            .enrollment_exists(&unenrolled_student_id(), &institution_id())
            .unwrap());
        assert!(!store
            .enrollment_exists(&student_id(), &other_institution_id())
            .unwrap());
    });
}

#[test]
fn test_upsert_replaces() {
    with_backends(|store| {
        let mut renamed = institution();
        renamed.name = "Dhaka Residential Model School and College".into();
        store.upsert_institution(&renamed).unwrap();
        store.upsert_institution(&renamed).unwrap();

        assert_eq!(store.count_institutions().unwrap(), 2);
        assert_eq!(
            store.get_institution(&institution_id()).unwrap().unwrap().name,
            renamed.name
        );
    });
}

#[test]
fn test_issuing_capability_toggle() {
    with_backends(|store| {
        assert!(store.set_issuing_capability(&institution_id(), false).unwrap());
        assert!(
            !store
                .get_institution(&institution_id())
                .unwrap()
                .unwrap()
                .can_issue_certificates
        );

        assert!(!store
            .set_issuing_capability(&uuid::Uuid::new_v4(), false)
            .unwrap());
    });
}

#[test]
fn test_enrollment_requires_both_parties() {
    with_backends(|store| {
        let err = store
            .upsert_enrollment(&Enrollment {
                student_id: uuid::Uuid::new_v4(),
                institution_id: institution_id(),
                student_institution_id: None,
            })
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)), "got {:?}", err);
    });
}
