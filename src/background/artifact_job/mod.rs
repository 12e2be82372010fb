// File: src/background/artifact_job/mod.rs

//! Retries artifact rendering for issued certificates left pending

mod config;
mod job;

pub use config::ArtifactJobConfig;
pub use job::{ArtifactRetryJob, RetryOutcome};
