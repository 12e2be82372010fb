// File: src/background/artifact_job/config.rs

/// Pending-artifact retry job configuration
#[derive(Debug, Clone)]
pub struct ArtifactJobConfig {
    /// How often to look for pending artifacts (seconds)
    pub interval_secs: u64,

    /// Max certificates to render per run
    pub batch_size: usize,

    /// Stop retrying a certificate after this many failed renders
    pub max_attempts: u32,
}

impl Default for ArtifactJobConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            batch_size: 25,
            max_attempts: 10,
        }
    }
}

impl ArtifactJobConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            interval_secs: std::env::var("CERTIFY_ARTIFACT_RETRY_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(30),
            batch_size: std::env::var("CERTIFY_ARTIFACT_RETRY_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(25),
            max_attempts: std::env::var("CERTIFY_ARTIFACT_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }
}
