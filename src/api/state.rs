//! Application state shared across HTTP handlers

use std::sync::Arc;

use crate::api::middleware::RateLimiter;
use crate::artifact::ArtifactService;
use crate::config::{AccessGrants, Config};
use crate::issuance::{IssuanceCoordinator, IssuanceSettings};
use crate::traits::{
    ActivityLog, ArtifactRenderer, CertificateStore, Notifier, Registry, SequenceStore,
};
use crate::verification::{SharingControl, VerificationGate};

/// Application state shared across handlers
pub struct AppState {
    pub issuance: IssuanceCoordinator,
    pub verification: VerificationGate,
    pub sharing: SharingControl,
    pub artifacts: ArtifactService,

    /// Direct storage access for listings, stats and health
    pub certificates: Arc<dyn CertificateStore>,
    pub registry: Arc<dyn Registry>,

    /// Bearer token -> principal
    /// Source: CERTIFY_ACCESS_TOKENS env var
    pub access_grants: AccessGrants,

    /// Per-client counters for /v1/verify
    pub verify_limiter: RateLimiter,
}

impl AppState {
    /// Wire every service onto a single backend
    pub fn assemble<S>(
        store: Arc<S>,
        renderer: Arc<dyn ArtifactRenderer>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self
    where
        S: SequenceStore + CertificateStore + Registry + ActivityLog + 'static,
    {
        let sequence: Arc<dyn SequenceStore> = store.clone();
        let certificates: Arc<dyn CertificateStore> = store.clone();
        let registry: Arc<dyn Registry> = store.clone();
        let activity: Arc<dyn ActivityLog> = store;

        let artifacts = ArtifactService::new(
            renderer,
            Arc::clone(&certificates),
            Arc::clone(&registry),
            Arc::clone(&activity),
            config.artifact.timeout(),
        );

        let issuance = IssuanceCoordinator::new(
            sequence,
            Arc::clone(&certificates),
            Arc::clone(&registry),
            Arc::clone(&activity),
            notifier,
            artifacts.clone(),
            IssuanceSettings {
                base_url: config.base_url.clone(),
                render_inline: config.artifact.inline,
            },
        );

        Self {
            issuance,
            verification: VerificationGate::new(Arc::clone(&certificates), Arc::clone(&registry)),
            sharing: SharingControl::new(Arc::clone(&certificates), activity),
            artifacts,
            certificates,
            registry,
            access_grants: config.access_grants.clone(),
            verify_limiter: RateLimiter::new(config.verify_rate_limit.clone()),
        }
    }
}
