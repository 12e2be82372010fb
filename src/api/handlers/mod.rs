//! HTTP request handlers

mod health;
mod helpers;
mod institution;
mod public;
mod student;

pub use health::health_check;
pub use institution::{issue_certificate, list_issued_certificates, retry_artifact};
pub use public::{get_stats, verify_certificate, verify_certificate_query};
pub use student::{list_own_certificates, update_sharing};
