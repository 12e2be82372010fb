//! Holder-controlled visibility of a certificate

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::model::{ActivityAction, ActivityEvent, ActorType, Certificate};
use crate::traits::{ActivityLog, CertificateStore};

/// Lets a student show or hide their certificate from public verification
#[derive(Clone)]
pub struct SharingControl {
    certificates: Arc<dyn CertificateStore>,
    activity: Arc<dyn ActivityLog>,
}

impl SharingControl {
    pub fn new(certificates: Arc<dyn CertificateStore>, activity: Arc<dyn ActivityLog>) -> Self {
        Self {
            certificates,
            activity,
        }
    }

    /// Set `is_publicly_shareable` on a certificate owned by `student_id`
    ///
    /// Certificates belonging to someone else are reported as not found.
    pub async fn set_shareable(
        &self,
        student_id: Uuid,
        certificate_id: Uuid,
        shareable: bool,
    ) -> ServerResult<Certificate> {
        let owned = self
            .certificates
            .get_certificate(&certificate_id)?
            .filter(|c| c.student_id == student_id)
            .ok_or_else(|| ServerError::CertificateNotFound(certificate_id.to_string()))?;

        let updated = self
            .certificates
            .set_shareable(&owned.id, shareable)?
            .ok_or_else(|| ServerError::CertificateNotFound(certificate_id.to_string()))?;

        tracing::info!(serial = %updated.serial, shareable, "Certificate sharing updated");

        let event = ActivityEvent::for_certificate(
            ActivityAction::CertificateSharingUpdated,
            ActorType::Student,
            Some(student_id),
            student_id.to_string(),
            updated.id,
            Some(updated.institution_id),
            json!({ "serial": updated.serial, "isPubliclyShareable": shareable }),
        );
        if let Err(e) = self.activity.record(event).await {
            tracing::warn!(serial = %updated.serial, error = %e, "Failed to record activity");
        }

        Ok(updated)
    }
}
