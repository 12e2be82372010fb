//! Bearer token authentication middleware

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::config::Principal;
use crate::error::{ServerError, ServerResult};

/// Authentication middleware - resolves the Bearer token to a principal
///
/// The principal is inserted as a request extension for the handlers.
/// Returns 401 if the token is missing or unknown.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(ServerError::AuthMissing)?;

    let auth_str = auth_header.to_str().map_err(|_| ServerError::AuthInvalid)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(ServerError::AuthInvalid)?;

    let principal = *state
        .access_grants
        .get(token.trim())
        .ok_or(ServerError::AuthInvalid)?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Institution id of the caller, 403 for any other role
pub fn require_institution(principal: &Principal) -> ServerResult<Uuid> {
    match principal {
        Principal::Institution(id) => Ok(*id),
        other => Err(ServerError::Forbidden(format!(
            "{} tokens cannot use institution endpoints",
            other.role()
        ))),
    }
}

/// Student id of the caller, 403 for any other role
pub fn require_student(principal: &Principal) -> ServerResult<Uuid> {
    match principal {
        Principal::Student(id) => Ok(*id),
        other => Err(ServerError::Forbidden(format!(
            "{} tokens cannot use student endpoints",
            other.role()
        ))),
    }
}
