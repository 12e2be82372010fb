//! Institution endpoints: issuance, listing and artifact retry

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::helpers::{json_body, path_id};
use crate::api::dto::CertificateListResponse;
use crate::api::middleware::require_institution;
use crate::api::state::AppState;
use crate::config::Principal;
use crate::error::{ServerError, ServerResult};
use crate::issuance::IssueRequest;
use crate::model::Certificate;

/// POST /v1/institution/certificates - Issue a certificate
///
/// Returns 201 with the certificate even when its artifact is still pending.
pub async fn issue_certificate(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Certificate>)> {
    let institution_id = require_institution(&principal)?;
    let request = json_body(body)?;

    let certificate = state.issuance.issue(institution_id, request).await?;

    Ok((StatusCode::CREATED, Json(certificate)))
}

/// GET /v1/institution/certificates - Certificates issued by the caller
pub async fn list_issued_certificates(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ServerResult<Json<CertificateListResponse>> {
    let institution_id = require_institution(&principal)?;
    let certificates = state.certificates.list_by_institution(&institution_id)?;
    Ok(Json(certificates.into()))
}

/// POST /v1/institution/certificates/:id/artifact - Retry a pending artifact
///
/// Certificates of other institutions are reported as not found.
pub async fn retry_artifact(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ServerResult<Json<Certificate>> {
    let institution_id = require_institution(&principal)?;
    let id = path_id(path)?;

    let certificate = state
        .certificates
        .get_certificate(&id)?
        .filter(|c| c.institution_id == institution_id)
        .ok_or_else(|| ServerError::CertificateNotFound(id.to_string()))?;

    state.artifacts.render_and_record(&certificate).await?;

    let refreshed = state
        .certificates
        .get_certificate(&id)?
        .ok_or_else(|| ServerError::CertificateNotFound(id.to_string()))?;

    Ok(Json(refreshed))
}
