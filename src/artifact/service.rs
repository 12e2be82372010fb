//! Render-and-record step of the artifact lifecycle

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use crate::error::{ArtifactError, ServerError, ServerResult};
use crate::model::{ActivityAction, ActivityEvent, ActorType, ArtifactState, Certificate};
use crate::traits::{ActivityLog, ArtifactRenderer, CertificateStore, Registry, RenderContext};

/// Renders artifacts and records the `Pending -> Ready` transition
///
/// Never touches the sequence counter or any issuance field, so it can be
/// re-run for the same certificate until it succeeds.
#[derive(Clone)]
pub struct ArtifactService {
    renderer: Arc<dyn ArtifactRenderer>,
    certificates: Arc<dyn CertificateStore>,
    registry: Arc<dyn Registry>,
    activity: Arc<dyn ActivityLog>,
    timeout: Duration,
}

impl ArtifactService {
    pub fn new(
        renderer: Arc<dyn ArtifactRenderer>,
        certificates: Arc<dyn CertificateStore>,
        registry: Arc<dyn Registry>,
        activity: Arc<dyn ActivityLog>,
        timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            certificates,
            registry,
            activity,
            timeout,
        }
    }

    /// Render the artifact for `certificate` and persist the outcome
    ///
    /// On failure the certificate stays `Pending` with one more attempt
    /// recorded, and the error is returned.
    ///
    /// # Errors
    /// * `ArtifactError::AlreadyReady` - nothing left to render
    /// * `ArtifactError::Timeout` / `Render` / `Io` / `MissingContext` - retryable
    pub async fn render_and_record(&self, certificate: &Certificate) -> ServerResult<ArtifactState> {
        if certificate.artifact.is_ready() {
            return Err(ArtifactError::AlreadyReady(certificate.serial.to_string()).into());
        }

        match self.render(certificate).await {
            Ok(artifact) => {
                let next = certificate
                    .artifact
                    .after_success(artifact, Utc::now())
                    .ok_or_else(|| ArtifactError::AlreadyReady(certificate.serial.to_string()))?;

                if !self.certificates.update_artifact(&certificate.id, &next)? {
                    // Another worker finished first
                    return Err(ArtifactError::AlreadyReady(certificate.serial.to_string()).into());
                }

                tracing::info!(serial = %certificate.serial, "Certificate artifact ready");
                self.log_rendered(certificate, &next).await;
                Ok(next)
            }
            Err(err) => {
                let attempts = self
                    .certificates
                    .record_artifact_failure(&certificate.id, &err.to_string())?;
                tracing::warn!(
                    serial = %certificate.serial,
                    attempts = ?attempts,
                    error = %err,
                    "Certificate artifact render failed"
                );
                Err(ServerError::Artifact(err))
            }
        }
    }

    async fn render(
        &self,
        certificate: &Certificate,
    ) -> Result<crate::model::ArtifactRef, ArtifactError> {
        let missing = |e: crate::error::StorageError| ArtifactError::MissingContext(e.to_string());

        let student = self
            .registry
            .get_student(&certificate.student_id)
            .map_err(missing)?
            .ok_or_else(|| {
                ArtifactError::MissingContext(format!("student {}", certificate.student_id))
            })?;
        let institution = self
            .registry
            .get_institution(&certificate.institution_id)
            .map_err(missing)?
            .ok_or_else(|| {
                ArtifactError::MissingContext(format!(
                    "institution {}",
                    certificate.institution_id
                ))
            })?;
        let enrollment = self
            .registry
            .get_enrollment(&certificate.student_id, &certificate.institution_id)
            .map_err(missing)?;

        let ctx = RenderContext {
            certificate,
            student: &student,
            institution: &institution,
            student_institution_id: enrollment
                .as_ref()
                .and_then(|e| e.student_institution_id.as_deref()),
        };

        match tokio::time::timeout(self.timeout, self.renderer.render(ctx)).await {
            Ok(result) => result,
            Err(_) => Err(ArtifactError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    async fn log_rendered(&self, certificate: &Certificate, state: &ArtifactState) {
        let event = ActivityEvent::for_certificate(
            ActivityAction::CertificateArtifactRendered,
            ActorType::System,
            None,
            "artifact-service",
            certificate.id,
            Some(certificate.institution_id),
            json!({
                "serial": certificate.serial,
                "digest": state.artifact().map(|a| a.digest.clone()),
            }),
        );
        if let Err(e) = self.activity.record(event).await {
            tracing::warn!(serial = %certificate.serial, error = %e, "Failed to record activity");
        }
    }
}
