//! Certificate persistence interface

use uuid::Uuid;

use crate::error::StorageError;
use crate::model::{ArtifactState, Certificate, NewCertificate};
use crate::serial::Serial;

/// Certificate storage
///
/// Lookups return `Ok(None)` for missing rows; errors are reserved for
/// backend failures.
pub trait CertificateStore: Send + Sync {
    /// Persist a new certificate as shareable with a pending artifact
    ///
    /// The store assigns the id and issue date.
    ///
    /// # Errors
    /// * `StorageError::Conflict` - serial or sequence number already taken
    fn insert_certificate(&self, new: NewCertificate) -> Result<Certificate, StorageError>;

    fn get_certificate(&self, id: &Uuid) -> Result<Option<Certificate>, StorageError>;

    /// Exact match on (serial, normalized roll number)
    fn find_by_serial_and_roll(
        &self,
        serial: &Serial,
        roll_number: &str,
    ) -> Result<Option<Certificate>, StorageError>;

    /// Update the public-sharing flag and nothing else
    ///
    /// # Returns
    /// * the updated certificate, `None` if it does not exist
    fn set_shareable(&self, id: &Uuid, shareable: bool)
        -> Result<Option<Certificate>, StorageError>;

    /// Replace the artifact state while the stored state is still pending
    ///
    /// # Returns
    /// * `true` if the row was updated, `false` if it is missing or already ready
    fn update_artifact(&self, id: &Uuid, state: &ArtifactState) -> Result<bool, StorageError>;

    /// Count one more failed render against a pending artifact
    ///
    /// The increment happens in storage, so concurrent failures are all counted.
    ///
    /// # Returns
    /// * the new attempt count, `None` if the row is missing or already ready
    fn record_artifact_failure(&self, id: &Uuid, error: &str)
        -> Result<Option<u32>, StorageError>;

    /// Certificates still waiting for an artifact, oldest first
    ///
    /// Skips those that already failed `max_attempts` times.
    fn pending_artifacts(
        &self,
        limit: usize,
        max_attempts: u32,
    ) -> Result<Vec<Certificate>, StorageError>;

    /// Newest first
    fn list_by_institution(&self, institution_id: &Uuid) -> Result<Vec<Certificate>, StorageError>;

    /// Newest first
    fn list_by_student(&self, student_id: &Uuid) -> Result<Vec<Certificate>, StorageError>;

    fn count_certificates(&self) -> Result<u64, StorageError>;

    /// Check if storage is reachable
    fn is_healthy(&self) -> bool;
}
