//! certify-server library exports

pub mod api;
pub mod artifact;
pub mod background;
pub mod config;
pub mod error;
pub mod issuance;
pub mod model;
pub mod seed;
pub mod serial;
pub mod storage;
pub mod traits;
pub mod verification;

// Re-exports
pub use error::{ServerError, ServerResult};
pub use issuance::{IssuanceCoordinator, IssueRequest};
pub use serial::Serial;
pub use traits::{CertificateStore, Registry, SequenceStore};
pub use verification::VerificationGate;

pub use storage::MemoryStore;
#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
