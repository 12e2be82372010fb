//! Sequence counter interface

use crate::error::StorageError;

/// Persisted monotonic counter backing serial allocation
///
/// Implementations serialize concurrent callers: read, increment by one and
/// persist happen as a single atomic step. Numbers handed out are never
/// returned again, even if the caller's follow-up work fails.
pub trait SequenceStore: Send + Sync {
    /// Allocate the next sequence number
    ///
    /// The first call on an empty store initializes the counter and returns 1.
    ///
    /// # Errors
    /// * `StorageError::TransactionFailed` - the atomic update could not commit
    /// * `StorageError::ConnectionFailed` - backend unavailable
    fn allocate_next(&self) -> Result<u64, StorageError>;

    /// Last allocated number without mutating the counter
    ///
    /// # Returns
    /// * `None` if nothing has been allocated yet
    fn current(&self) -> Result<Option<u64>, StorageError>;
}
