//! Fire-and-forget side-effect sinks

use async_trait::async_trait;

use crate::error::{ServerResult, StorageError};
use crate::model::{ActivityEvent, Certificate, Institution, Student};

/// Audit trail of state-changing actions
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, event: ActivityEvent) -> Result<(), StorageError>;
}

/// Outbound notification channel (email in production deployments)
///
/// Failures are logged by callers and never undo the action that triggered
/// the notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn certificate_issued(
        &self,
        certificate: &Certificate,
        student: &Student,
        institution: &Institution,
    ) -> ServerResult<()>;
}

/// Notifier that only writes a log line
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn certificate_issued(
        &self,
        certificate: &Certificate,
        student: &Student,
        institution: &Institution,
    ) -> ServerResult<()> {
        tracing::info!(
            serial = %certificate.serial,
            recipient = %student.email,
            institution = %institution.name,
            "Certificate issuance notification"
        );
        Ok(())
    }
}
