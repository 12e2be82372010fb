//! Request DTOs

use serde::Deserialize;

/// Body of POST /v1/verify and query of GET /v1/verify
///
/// Missing fields deserialize as empty and are rejected by the gate as
/// malformed, not by the extractor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub serial: String,

    #[serde(default)]
    pub roll_number: String,
}

/// Body of PUT /v1/student/certificates/:id/sharing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingRequest {
    pub is_publicly_shareable: bool,
}
