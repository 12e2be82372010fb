//! Response DTOs

use serde::Serialize;

use crate::model::Certificate;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,

    /// Package version
    pub version: String,

    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Public counters from GET /v1/stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_certificates: u64,
    pub total_institutions: u64,
    pub total_students: u64,
}

/// Certificate listing for institutions and students
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateListResponse {
    pub certificates: Vec<Certificate>,
    pub total: usize,
}

impl From<Vec<Certificate>> for CertificateListResponse {
    fn from(certificates: Vec<Certificate>) -> Self {
        Self {
            total: certificates.len(),
            certificates,
        }
    }
}
