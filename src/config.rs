//! Server configuration

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::api::middleware::RateLimitConfig;
use crate::artifact::ArtifactConfig;
use crate::background::BackgroundConfig;
use crate::error::{ServerError, ServerResult};

/// Party a bearer token acts for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    Institution(Uuid),
    Student(Uuid),
}

impl Principal {
    pub fn role(&self) -> &'static str {
        match self {
            Principal::Institution(_) => "institution",
            Principal::Student(_) => "student",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Principal::Institution(id) | Principal::Student(id) => *id,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role(), self.id())
    }
}

/// Bearer token -> principal
pub type AccessGrants = HashMap<String, Principal>;

/// Parse `token=institution:<uuid>,token2=student:<uuid>`
///
/// Empty input yields no grants; every protected route then answers 401.
pub fn parse_access_grants(raw: &str) -> ServerResult<AccessGrants> {
    let mut grants = AccessGrants::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (token, principal) = entry
            .split_once('=')
            .ok_or_else(|| ServerError::Config(format!("access grant without '=': {}", entry)))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ServerError::Config("access grant with empty token".into()));
        }

        let (role, id) = principal.trim().split_once(':').ok_or_else(|| {
            ServerError::Config(format!("access grant without role: {}", principal))
        })?;
        let id = Uuid::parse_str(id.trim())
            .map_err(|e| ServerError::Config(format!("access grant id '{}': {}", id, e)))?;

        let principal = match role.trim().to_ascii_lowercase().as_str() {
            "institution" => Principal::Institution(id),
            "student" => Principal::Student(id),
            other => {
                return Err(ServerError::Config(format!(
                    "unknown access grant role: {}",
                    other
                )))
            }
        };

        if grants.insert(token.to_string(), principal).is_some() {
            return Err(ServerError::Config(format!(
                "duplicate access token for {}",
                principal
            )));
        }
    }

    Ok(grants)
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Public base URL printed into verification links
    pub base_url: String,
    pub log_level: String,
    pub access_grants: AccessGrants,
    /// Registry seed loaded at startup (optional)
    pub seed_file: Option<String>,
    pub artifact: ArtifactConfig,
    pub background: BackgroundConfig,
    /// Per-client budget on the public verification routes
    pub verify_rate_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_path: "./certify.db".to_string(),
            base_url: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
            access_grants: AccessGrants::new(),
            seed_file: None,
            artifact: ArtifactConfig::default(),
            background: BackgroundConfig::default(),
            verify_rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Config {
    /// Load from environment variables
    ///
    /// # Errors
    /// * `Config` - malformed `CERTIFY_ACCESS_TOKENS`
    pub fn from_env() -> ServerResult<Self> {
        let defaults = Self::default();

        let access_grants = match std::env::var("CERTIFY_ACCESS_TOKENS") {
            Ok(raw) => parse_access_grants(&raw)?,
            Err(_) => AccessGrants::new(),
        };

        Ok(Self {
            host: std::env::var("CERTIFY_HOST").unwrap_or(defaults.host),
            port: std::env::var("CERTIFY_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            database_path: std::env::var("CERTIFY_DATABASE_PATH")
                .unwrap_or(defaults.database_path),
            base_url: std::env::var("CERTIFY_BASE_URL").unwrap_or(defaults.base_url),
            log_level: std::env::var("CERTIFY_LOG_LEVEL").unwrap_or(defaults.log_level),
            access_grants,
            seed_file: std::env::var("CERTIFY_SEED_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            artifact: ArtifactConfig::from_env(),
            background: BackgroundConfig::from_env(),
            verify_rate_limit: RateLimitConfig::from_env(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
