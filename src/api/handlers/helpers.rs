//! Helpers turning extractor rejections into API errors

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// Unwrap a JSON body, reporting malformed input as `INVALID_ARGUMENT`
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| ServerError::InvalidArgument(e.body_text()))
}

/// Unwrap a query string, reporting malformed input as `INVALID_ARGUMENT`
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ServerResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|e| ServerError::InvalidArgument(e.body_text()))
}

/// Unwrap a `:id` path segment
pub fn path_id(path: Result<Path<Uuid>, PathRejection>) -> ServerResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|e| ServerError::InvalidUuid(e.body_text()))
}
