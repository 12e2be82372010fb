//! Certificate issuance

mod coordinator;
mod request;

pub use coordinator::{IssuanceCoordinator, IssuanceSettings};
pub use request::IssueRequest;
