//! API error response types

use crate::error::ServerError;
use axum::{
    http::{header::RETRY_AFTER, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

/// API error response body
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code
    pub code: String,

    /// Whether the error is recoverable (client can retry)
    pub recoverable: bool,

    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServerError::NotEnrolled {
                student_id,
                institution_id,
            } => Some(serde_json::json!({
                "studentId": student_id,
                "institutionId": institution_id,
            })),
            ServerError::MissingRequiredField(field) => Some(serde_json::json!({ "field": field })),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
            recoverable: self.is_recoverable(),
            details: self.details(),
        };

        let mut response = (status, Json(body)).into_response();
        if let ServerError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
