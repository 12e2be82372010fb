//! Data Transfer Objects (DTOs)

mod request;
mod response;

pub use request::{SharingRequest, VerifyRequest};
pub use response::{CertificateListResponse, HealthResponse, StatsResponse};
