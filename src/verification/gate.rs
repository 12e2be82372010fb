//! Public verification lookup

use std::sync::Arc;

use crate::error::{ServerError, ServerResult, StorageError};
use crate::model::{CertificatePublicView, RollNumber};
use crate::serial::Serial;
use crate::traits::{CertificateStore, Registry};

/// Answers "is this certificate genuine?" for anonymous callers
///
/// Read-only. Malformed input is rejected before any storage access.
#[derive(Clone)]
pub struct VerificationGate {
    certificates: Arc<dyn CertificateStore>,
    registry: Arc<dyn Registry>,
}

impl VerificationGate {
    pub fn new(certificates: Arc<dyn CertificateStore>, registry: Arc<dyn Registry>) -> Self {
        Self {
            certificates,
            registry,
        }
    }

    /// Look up a certificate by serial and roll number
    ///
    /// # Errors
    /// * `InvalidFormat` - serial fails the checksum or roll number is blank
    /// * `CertificateNotFound` - no certificate with this pair
    /// * `NotShareable` - the holder has hidden it
    pub fn verify(&self, serial: &str, roll_number: &str) -> ServerResult<CertificatePublicView> {
        let serial = Serial::parse(serial.trim())
            .map_err(|e| ServerError::InvalidFormat(e.to_string()))?;
        let roll_number = RollNumber::normalize(roll_number);
        if roll_number.is_empty() {
            return Err(ServerError::InvalidFormat("roll number is empty".into()));
        }

        let certificate = self
            .certificates
            .find_by_serial_and_roll(&serial, &roll_number)?
            .ok_or_else(|| ServerError::CertificateNotFound(serial.to_string()))?;

        if !certificate.is_publicly_shareable {
            tracing::debug!(serial = %serial, "Verification refused, certificate is private");
            return Err(ServerError::NotShareable(serial.to_string()));
        }

        let student = self
            .registry
            .get_student(&certificate.student_id)?
            .ok_or_else(|| dangling("student", &certificate.serial))?;
        let institution = self
            .registry
            .get_institution(&certificate.institution_id)?
            .ok_or_else(|| dangling("institution", &certificate.serial))?;

        Ok(CertificatePublicView::project(
            &certificate,
            &student,
            &institution,
        ))
    }
}

fn dangling(what: &str, serial: &Serial) -> ServerError {
    tracing::error!(serial = %serial, "Certificate references a missing {}", what);
    ServerError::Storage(StorageError::Corruption(format!(
        "certificate {} references a missing {}",
        serial, what
    )))
}
