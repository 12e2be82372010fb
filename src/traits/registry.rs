//! Institution, student and enrollment lookups

use uuid::Uuid;

use crate::error::StorageError;
use crate::model::{Enrollment, Institution, Student};

/// Read side of the registry consulted during issuance and verification
pub trait Registry: Send + Sync {
    fn get_institution(&self, id: &Uuid) -> Result<Option<Institution>, StorageError>;

    fn get_student(&self, id: &Uuid) -> Result<Option<Student>, StorageError>;

    fn get_enrollment(
        &self,
        student_id: &Uuid,
        institution_id: &Uuid,
    ) -> Result<Option<Enrollment>, StorageError>;

    fn enrollment_exists(
        &self,
        student_id: &Uuid,
        institution_id: &Uuid,
    ) -> Result<bool, StorageError> {
        Ok(self.get_enrollment(student_id, institution_id)?.is_some())
    }

    fn count_institutions(&self) -> Result<u64, StorageError>;

    fn count_students(&self) -> Result<u64, StorageError>;
}

/// Write side of the registry, used by seeding and tests
///
/// All writes are idempotent upserts keyed by id.
pub trait RegistryWriter: Send + Sync {
    fn upsert_institution(&self, institution: &Institution) -> Result<(), StorageError>;

    fn upsert_student(&self, student: &Student) -> Result<(), StorageError>;

    /// # Errors
    /// * `StorageError::Conflict` - student or institution does not exist
    fn upsert_enrollment(&self, enrollment: &Enrollment) -> Result<(), StorageError>;

    /// Switch an institution's issuing capability
    ///
    /// # Returns
    /// * `false` if the institution does not exist
    fn set_issuing_capability(&self, institution_id: &Uuid, enabled: bool)
        -> Result<bool, StorageError>;
}
