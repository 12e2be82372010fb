//! Server error types

use axum::http::StatusCode;
use thiserror::Error;

use crate::serial::SerialError;

/// Main server error type
#[derive(Debug, Error)]
pub enum ServerError {
    // ========== Validation Errors ==========
    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Required field missing or empty
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// Submitted serial fails the structural check
    #[error("invalid serial format: {0}")]
    InvalidFormat(String),

    /// Invalid UUID format
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    // ========== Policy Errors ==========
    /// No enrollment links the student and the institution
    #[error("student {student_id} is not enrolled in institution {institution_id}")]
    NotEnrolled {
        student_id: String,
        institution_id: String,
    },

    /// Institution's issuing capability is switched off
    #[error("institution cannot issue certificates: {0}")]
    PermissionRevoked(String),

    /// Certificate exists but its holder keeps it private
    #[error("certificate {0} is not available for public verification")]
    NotShareable(String),

    // ========== Lookup Errors ==========
    /// Certificate not found
    #[error("certificate not found: {0}")]
    CertificateNotFound(String),

    /// Institution not found
    #[error("institution not found: {0}")]
    InstitutionNotFound(String),

    /// Student not found
    #[error("student not found: {0}")]
    StudentNotFound(String),

    // ========== Authentication Errors ==========
    /// Missing authorization header
    #[error("authorization required")]
    AuthMissing,

    /// Invalid authorization token
    #[error("invalid authorization token")]
    AuthInvalid,

    /// Authenticated principal lacks the required role
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Client used up its request window
    #[error("too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ========== Storage Errors ==========
    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// Sequence space of the serial payload is used up
    #[error("serial space exhausted at sequence {0}")]
    SerialSpaceExhausted(u64),

    // ========== Artifact Errors ==========
    /// Artifact rendering failed
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    // ========== Server Errors ==========
    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Schema migration failed
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Unique or foreign-key constraint rejected the write
    #[error("constraint violated: {0}")]
    Conflict(String),

    /// Data corruption detected
    #[error("data corruption: {0}")]
    Corruption(String),

    /// Storage not initialized
    #[error("storage not initialized")]
    NotInitialized,

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite database error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Artifact rendering errors
///
/// All of these leave the certificate issued with a pending artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Renderer rejected or failed on the input
    #[error("render failed: {0}")]
    Render(String),

    /// Rendering did not finish in time
    #[error("render timed out after {0}ms")]
    Timeout(u64),

    /// Certificate, student or institution needed for rendering is missing
    #[error("render context incomplete: {0}")]
    MissingContext(String),

    /// Artifact is already rendered
    #[error("artifact already rendered for certificate {0}")]
    AlreadyReady(String),

    /// Writing the artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArtifactError {
    /// Whether a later attempt may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ArtifactError::AlreadyReady(_))
    }
}

/// Server result type alias
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ServerError::InvalidArgument(_)
            | ServerError::MissingRequiredField(_)
            | ServerError::InvalidFormat(_)
            | ServerError::InvalidUuid(_)
            | ServerError::NotEnrolled { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            ServerError::AuthMissing | ServerError::AuthInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            ServerError::PermissionRevoked(_)
            | ServerError::NotShareable(_)
            | ServerError::Forbidden(_) => StatusCode::FORBIDDEN,

            // 429 Too Many Requests
            ServerError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 404 Not Found
            ServerError::CertificateNotFound(_)
            | ServerError::InstitutionNotFound(_)
            | ServerError::StudentNotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            ServerError::Artifact(ArtifactError::AlreadyReady(_)) => StatusCode::CONFLICT,

            // 503 Service Unavailable
            ServerError::Artifact(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            ServerError::Storage(_)
            | ServerError::SerialSpaceExhausted(_)
            | ServerError::Internal(_)
            | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ServerError::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            ServerError::InvalidFormat(_) => "INVALID_FORMAT",
            ServerError::InvalidUuid(_) => "INVALID_UUID",
            ServerError::NotEnrolled { .. } => "NOT_ENROLLED",
            ServerError::PermissionRevoked(_) => "PERMISSION_REVOKED",
            ServerError::NotShareable(_) => "NOT_SHAREABLE",
            ServerError::CertificateNotFound(_) => "NOT_FOUND",
            ServerError::InstitutionNotFound(_) => "INSTITUTION_NOT_FOUND",
            ServerError::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            ServerError::AuthMissing => "AUTH_MISSING",
            ServerError::AuthInvalid => "AUTH_INVALID",
            ServerError::Forbidden(_) => "FORBIDDEN",
            ServerError::RateLimited { .. } => "RATE_LIMITED",
            ServerError::Storage(_) => "STORAGE_ERROR",
            ServerError::SerialSpaceExhausted(_) => "SERIAL_SPACE_EXHAUSTED",
            ServerError::Artifact(_) => "ARTIFACT_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Check if the caller may retry the same request
    pub fn is_recoverable(&self) -> bool {
        match self {
            ServerError::Storage(e) => matches!(
                e,
                StorageError::ConnectionFailed(_) | StorageError::TransactionFailed(_)
            ),
            ServerError::Artifact(e) => e.is_retryable(),
            ServerError::RateLimited { .. } => true,
            _ => false,
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(what) => ServerError::CertificateNotFound(what),
            other => ServerError::Storage(other),
        }
    }
}

impl From<SerialError> for ServerError {
    fn from(e: SerialError) -> Self {
        match e {
            SerialError::Overflow(sequence) => ServerError::SerialSpaceExhausted(sequence),
            other => ServerError::InvalidFormat(other.to_string()),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::Storage(StorageError::Sqlite(e))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::InvalidArgument(e.to_string())
    }
}

impl From<uuid::Error> for ServerError {
    fn from(e: uuid::Error) -> Self {
        ServerError::InvalidUuid(e.to_string())
    }
}
