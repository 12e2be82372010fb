// File: src/background/artifact_job/job.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use super::config::ArtifactJobConfig;
use crate::artifact::ArtifactService;
use crate::error::{ArtifactError, ServerError, ServerResult};
use crate::traits::CertificateStore;

/// Counts from one pass over pending artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryOutcome {
    pub rendered: usize,
    pub failed: usize,
}

/// Pending-artifact retry job
///
/// Picks up certificates whose inline render failed or was skipped and
/// renders them. Business logic never re-runs: only the artifact state moves.
pub struct ArtifactRetryJob {
    certificates: Arc<dyn CertificateStore>,
    artifacts: ArtifactService,
    config: ArtifactJobConfig,
}

impl ArtifactRetryJob {
    pub fn new(
        certificates: Arc<dyn CertificateStore>,
        artifacts: ArtifactService,
        config: ArtifactJobConfig,
    ) -> Self {
        Self {
            certificates,
            artifacts,
            config,
        }
    }

    /// Run as a background task until the shutdown signal arrives
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        let mut ticker = interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.process_pending().await {
                        tracing::error!(error = %e, "Artifact retry job failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Artifact retry job shutting down");
                    break;
                }
            }
        }
    }

    /// Render one batch of pending artifacts
    pub async fn process_pending(&self) -> ServerResult<RetryOutcome> {
        let pending = self
            .certificates
            .pending_artifacts(self.config.batch_size, self.config.max_attempts)?;

        if pending.is_empty() {
            return Ok(RetryOutcome::default());
        }

        tracing::info!(count = pending.len(), "Rendering pending artifacts");

        let mut outcome = RetryOutcome::default();
        for certificate in pending {
            match self.artifacts.render_and_record(&certificate).await {
                Ok(_) => outcome.rendered += 1,
                // Finished elsewhere since the batch was read
                Err(ServerError::Artifact(ArtifactError::AlreadyReady(_))) => {}
                Err(ServerError::Artifact(_)) => outcome.failed += 1,
                Err(e) => return Err(e),
            }
        }

        if outcome.failed > 0 {
            tracing::warn!(
                rendered = outcome.rendered,
                failed = outcome.failed,
                "Some artifacts are still pending, will retry"
            );
        }

        Ok(outcome)
    }
}
