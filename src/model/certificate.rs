//! Certificate record and artifact lifecycle

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::academic::{AcademicRecord, CertificateType};
use crate::error::{ServerError, ServerResult};
use crate::serial::Serial;

/// Examination roll number, trimmed and uppercased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RollNumber(String);

impl RollNumber {
    /// Normalize a submitted roll number
    ///
    /// # Errors
    /// * `MissingRequiredField("rollNumber")` if nothing remains after trimming
    pub fn parse(input: &str) -> ServerResult<Self> {
        let normalized = Self::normalize(input);
        if normalized.is_empty() {
            return Err(ServerError::MissingRequiredField("rollNumber".to_string()));
        }
        Ok(Self(normalized))
    }

    /// Canonical form used for storage and lookup
    pub fn normalize(input: &str) -> String {
        input.trim().to_uppercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RollNumber {
    type Error = ServerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RollNumber> for String {
    fn from(roll: RollNumber) -> Self {
        roll.0
    }
}

/// Location and content digest of a rendered artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRef {
    /// Where the rendered document lives (file path or URL)
    pub location: String,
    /// Hex-encoded SHA-256 of the document bytes
    pub digest: String,
}

/// Artifact lifecycle: `Pending` until a render succeeds, then `Ready` for good
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ArtifactState {
    Pending {
        attempts: u32,
        last_error: Option<String>,
    },
    Ready {
        artifact: ArtifactRef,
        rendered_at: DateTime<Utc>,
    },
}

impl ArtifactState {
    /// State of a freshly issued certificate
    pub fn pending() -> Self {
        ArtifactState::Pending {
            attempts: 0,
            last_error: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ArtifactState::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ArtifactState::Pending { attempts, .. } => *attempts,
            ArtifactState::Ready { .. } => 0,
        }
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        match self {
            ArtifactState::Ready { artifact, .. } => Some(artifact),
            ArtifactState::Pending { .. } => None,
        }
    }

    /// Next state after a failed render, `None` once ready
    pub fn after_failure(&self, error: impl Into<String>) -> Option<Self> {
        match self {
            ArtifactState::Pending { attempts, .. } => Some(ArtifactState::Pending {
                attempts: attempts.saturating_add(1),
                last_error: Some(error.into()),
            }),
            ArtifactState::Ready { .. } => None,
        }
    }

    /// Next state after a successful render, `None` once ready
    pub fn after_success(&self, artifact: ArtifactRef, rendered_at: DateTime<Utc>) -> Option<Self> {
        match self {
            ArtifactState::Pending { .. } => Some(ArtifactState::Ready {
                artifact,
                rendered_at,
            }),
            ArtifactState::Ready { .. } => None,
        }
    }
}

/// An issued certificate
///
/// `serial`, `sequence_number` and the issuance fields never change after
/// creation. Only `is_publicly_shareable` and `artifact` are mutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: Uuid,
    pub serial: Serial,
    pub sequence_number: u64,
    pub certificate_type: CertificateType,
    pub student_id: Uuid,
    pub institution_id: Uuid,
    pub roll_number: RollNumber,
    pub issue_date: DateTime<Utc>,
    pub is_publicly_shareable: bool,
    pub academic: AcademicRecord,
    pub authority_name: Option<String>,
    pub authority_title: Option<String>,
    /// Public verification link encoded in the document's QR code
    pub verification_url: String,
    pub artifact: ArtifactState,
}

/// Certificate fields fixed by the issuance workflow
///
/// The store assigns `id` and `issue_date` when persisting.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCertificate {
    pub serial: Serial,
    pub sequence_number: u64,
    pub certificate_type: CertificateType,
    pub student_id: Uuid,
    pub institution_id: Uuid,
    pub roll_number: RollNumber,
    pub academic: AcademicRecord,
    pub authority_name: Option<String>,
    pub authority_title: Option<String>,
    pub verification_url: String,
}

impl NewCertificate {
    /// Materialize as shareable with a pending artifact
    pub fn into_certificate(self, id: Uuid, issue_date: DateTime<Utc>) -> Certificate {
        Certificate {
            id,
            serial: self.serial,
            sequence_number: self.sequence_number,
            certificate_type: self.certificate_type,
            student_id: self.student_id,
            institution_id: self.institution_id,
            roll_number: self.roll_number,
            issue_date,
            is_publicly_shareable: true,
            academic: self.academic,
            authority_name: self.authority_name,
            authority_title: self.authority_title,
            verification_url: self.verification_url,
            artifact: ArtifactState::pending(),
        }
    }
}

/// Build the public verification link for a serial
pub fn verification_url(base_url: &str, serial: &Serial) -> String {
    format!("{}/verify?serial={}", base_url.trim_end_matches('/'), serial)
}
