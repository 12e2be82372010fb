//! Issuance request payload

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AcademicDetails, CertificateType};

/// What an institution submits to issue a certificate
///
/// Academic fields sit next to the identifying fields on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub student_id: Uuid,
    pub certificate_type: CertificateType,
    /// Validated by the coordinator, so a missing value is reported as a
    /// missing field rather than a malformed body
    #[serde(default)]
    pub roll_number: String,
    #[serde(flatten)]
    pub details: AcademicDetails,
}
