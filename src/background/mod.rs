// File: src/background/mod.rs

//! Background job management
//!
//! Jobs run continuously and discover pending work by querying storage on
//! each tick. They never block the HTTP request path.

pub mod artifact_job;
pub mod config;

use crate::artifact::ArtifactService;
use crate::error::ServerResult;
use crate::traits::CertificateStore;
use std::sync::Arc;
use tokio::sync::broadcast;

pub use artifact_job::{ArtifactJobConfig, ArtifactRetryJob, RetryOutcome};
pub use config::BackgroundConfig;

/// Background job runner
///
/// Owns the shutdown channel shared by all jobs.
pub struct BackgroundJobRunner {
    certificates: Arc<dyn CertificateStore>,
    artifacts: ArtifactService,
    config: BackgroundConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl BackgroundJobRunner {
    pub fn new(
        certificates: Arc<dyn CertificateStore>,
        artifacts: ArtifactService,
        config: BackgroundConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            certificates,
            artifacts,
            config,
            shutdown_tx,
        }
    }

    /// Start all background jobs
    pub async fn start(&self) -> ServerResult<Vec<tokio::task::JoinHandle<()>>> {
        if self.config.disabled {
            tracing::info!("Background jobs disabled via CERTIFY_BACKGROUND_DISABLED=true");
            return Ok(vec![]);
        }

        let mut handles = Vec::new();

        let job = ArtifactRetryJob::new(
            Arc::clone(&self.certificates),
            self.artifacts.clone(),
            self.config.artifact_job.clone(),
        );
        let shutdown_rx = self.shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            job.run(shutdown_rx).await;
        }));
        tracing::info!(
            interval_secs = self.config.artifact_job.interval_secs,
            batch_size = self.config.artifact_job.batch_size,
            "Artifact retry job started"
        );

        tracing::info!(job_count = handles.len(), "Background jobs started");

        Ok(handles)
    }

    /// Signal all jobs to shutdown gracefully
    pub fn shutdown(&self) {
        tracing::info!("Signaling background jobs to shutdown");
        let _ = self.shutdown_tx.send(());
    }
}
