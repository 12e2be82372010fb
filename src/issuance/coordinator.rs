//! Issuance workflow

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::request::IssueRequest;
use crate::artifact::ArtifactService;
use crate::error::{ServerError, ServerResult};
use crate::model::{
    verification_url, AcademicRecord, ActivityAction, ActivityEvent, ActorType, Certificate,
    Institution, NewCertificate, RollNumber, Student,
};
use crate::serial;
use crate::traits::{ActivityLog, CertificateStore, Notifier, Registry, SequenceStore};

/// Knobs for the issuance workflow
#[derive(Debug, Clone)]
pub struct IssuanceSettings {
    /// Public base URL used for the verification link
    pub base_url: String,

    /// Render the artifact before returning (otherwise left to the background job)
    pub render_inline: bool,
}

/// Turns an enrollment into a numbered, verifiable certificate
///
/// Failure boundaries:
/// - precondition and validation failures mutate nothing
/// - a failed allocation prevents any certificate write
/// - a failed certificate write skips the allocated number
/// - artifact, activity and notification failures never undo the issuance
#[derive(Clone)]
pub struct IssuanceCoordinator {
    sequence: Arc<dyn SequenceStore>,
    certificates: Arc<dyn CertificateStore>,
    registry: Arc<dyn Registry>,
    activity: Arc<dyn ActivityLog>,
    notifier: Arc<dyn Notifier>,
    artifacts: ArtifactService,
    settings: IssuanceSettings,
}

impl IssuanceCoordinator {
    pub fn new(
        sequence: Arc<dyn SequenceStore>,
        certificates: Arc<dyn CertificateStore>,
        registry: Arc<dyn Registry>,
        activity: Arc<dyn ActivityLog>,
        notifier: Arc<dyn Notifier>,
        artifacts: ArtifactService,
        settings: IssuanceSettings,
    ) -> Self {
        Self {
            sequence,
            certificates,
            registry,
            activity,
            notifier,
            artifacts,
            settings,
        }
    }

    /// Issue a certificate on behalf of `institution_id`
    ///
    /// # Errors
    /// * `InstitutionNotFound` / `PermissionRevoked` - institution cannot issue
    /// * `NotEnrolled` / `StudentNotFound` - no usable enrollment
    /// * `MissingRequiredField` / `InvalidArgument` - request incomplete
    /// * `Storage` / `SerialSpaceExhausted` - allocation or write failed
    pub async fn issue(
        &self,
        institution_id: Uuid,
        request: IssueRequest,
    ) -> ServerResult<Certificate> {
        let institution = self.check_institution(&institution_id)?;
        let student = self.check_enrollment(&request.student_id, &institution)?;

        let roll_number = RollNumber::parse(&request.roll_number)?;
        let academic = AcademicRecord::build(
            request.certificate_type,
            &request.details,
            institution.board.as_deref(),
        )?;

        // Preconditions hold; from here on numbers get consumed
        let sequence_number = self.sequence.allocate_next()?;
        let serial = serial::encode(sequence_number).map_err(|e| {
            tracing::error!(sequence_number, error = %e, "Serial space exhausted");
            ServerError::from(e)
        })?;

        let new = NewCertificate {
            verification_url: verification_url(&self.settings.base_url, &serial),
            serial,
            sequence_number,
            certificate_type: request.certificate_type,
            student_id: student.id,
            institution_id: institution.id,
            roll_number,
            academic,
            authority_name: institution.authority_name.clone(),
            authority_title: institution.authority_title.clone(),
        };

        let mut certificate = self.certificates.insert_certificate(new).map_err(|e| {
            tracing::error!(
                sequence_number,
                error = %e,
                "Certificate write failed, sequence number skipped"
            );
            ServerError::from(e)
        })?;

        tracing::info!(
            serial = %certificate.serial,
            sequence_number,
            institution_id = %institution.id,
            student_id = %student.id,
            certificate_type = %certificate.certificate_type,
            "Certificate issued"
        );

        if self.settings.render_inline {
            self.render_inline(&mut certificate).await;
        }

        self.record_issued(&certificate, &institution).await;
        if let Err(e) = self
            .notifier
            .certificate_issued(&certificate, &student, &institution)
            .await
        {
            tracing::warn!(serial = %certificate.serial, error = %e, "Issuance notification failed");
        }

        Ok(certificate)
    }

    fn check_institution(&self, institution_id: &Uuid) -> ServerResult<Institution> {
        let institution = self
            .registry
            .get_institution(institution_id)?
            .ok_or_else(|| ServerError::InstitutionNotFound(institution_id.to_string()))?;

        if !institution.can_issue_certificates {
            return Err(ServerError::PermissionRevoked(institution.name));
        }
        Ok(institution)
    }

    fn check_enrollment(&self, student_id: &Uuid, institution: &Institution) -> ServerResult<Student> {
        if !self.registry.enrollment_exists(student_id, &institution.id)? {
            return Err(ServerError::NotEnrolled {
                student_id: student_id.to_string(),
                institution_id: institution.id.to_string(),
            });
        }
        self.registry
            .get_student(student_id)?
            .ok_or_else(|| ServerError::StudentNotFound(student_id.to_string()))
    }

    async fn render_inline(&self, certificate: &mut Certificate) {
        match self.artifacts.render_and_record(certificate).await {
            Ok(state) => certificate.artifact = state,
            Err(_) => {
                // Failure already logged and recorded; reflect the stored attempt count
                if let Ok(Some(stored)) = self.certificates.get_certificate(&certificate.id) {
                    certificate.artifact = stored.artifact;
                }
            }
        }
    }

    async fn record_issued(&self, certificate: &Certificate, institution: &Institution) {
        let event = ActivityEvent::for_certificate(
            ActivityAction::CertificateIssued,
            ActorType::Institution,
            Some(institution.id),
            institution.name.clone(),
            certificate.id,
            Some(institution.id),
            json!({
                "serial": certificate.serial,
                "certificateType": certificate.certificate_type,
                "studentId": certificate.student_id,
            }),
        );
        if let Err(e) = self.activity.record(event).await {
            tracing::warn!(serial = %certificate.serial, error = %e, "Failed to record activity");
        }
    }
}
