//! Storage backends
//!
//! Both backends implement every storage trait: `SequenceStore`,
//! `CertificateStore`, `Registry`, `RegistryWriter` and `ActivityLog`.

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConfig, SqliteStore};
