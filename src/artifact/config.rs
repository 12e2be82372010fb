// File: src/artifact/config.rs

use std::path::PathBuf;
use std::time::Duration;

/// Artifact rendering configuration
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Root directory for rendered documents
    pub dir: PathBuf,

    /// Upper bound for a single render, in milliseconds
    pub timeout_ms: u64,

    /// Render during the issuance request (otherwise only the background job does)
    pub inline: bool,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            timeout_ms: 5000,
            inline: true,
        }
    }
}

impl ArtifactConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dir: std::env::var("CERTIFY_ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.dir),
            timeout_ms: std::env::var("CERTIFY_ARTIFACT_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_ms),
            inline: std::env::var("CERTIFY_ARTIFACT_INLINE")
                .map(|v| !(v == "false" || v == "0"))
                .unwrap_or(defaults.inline),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
