//! Activity events emitted after state changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who performed the action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorType {
    Institution,
    Student,
    System,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::Institution => "INSTITUTION",
            ActorType::Student => "STUDENT",
            ActorType::System => "SYSTEM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    CertificateIssued,
    CertificateSharingUpdated,
    CertificateArtifactRendered,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::CertificateIssued => "CERTIFICATE_ISSUED",
            ActivityAction::CertificateSharingUpdated => "CERTIFICATE_SHARING_UPDATED",
            ActivityAction::CertificateArtifactRendered => "CERTIFICATE_ARTIFACT_RENDERED",
        }
    }
}

/// One audit-trail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub actor_id: Option<Uuid>,
    pub actor_type: ActorType,
    pub actor_name: String,
    pub action: ActivityAction,
    /// Kind of entity acted on, e.g. `CERTIFICATE`
    pub target_type: String,
    pub target_id: Uuid,
    pub institution_id: Option<Uuid>,
    /// Free-form JSON payload
    pub details: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// Event targeting a certificate, stamped with the current time
    pub fn for_certificate(
        action: ActivityAction,
        actor_type: ActorType,
        actor_id: Option<Uuid>,
        actor_name: impl Into<String>,
        certificate_id: Uuid,
        institution_id: Option<Uuid>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            actor_id,
            actor_type,
            actor_name: actor_name.into(),
            action,
            target_type: "CERTIFICATE".to_string(),
            target_id: certificate_id,
            institution_id,
            details,
            occurred_at: Utc::now(),
        }
    }
}
