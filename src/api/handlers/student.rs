//! Student endpoints: own certificates and sharing control

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use uuid::Uuid;

use super::helpers::{json_body, path_id};
use crate::api::dto::{CertificateListResponse, SharingRequest};
use crate::api::middleware::require_student;
use crate::api::state::AppState;
use crate::config::Principal;
use crate::error::ServerResult;
use crate::model::Certificate;

/// GET /v1/student/certificates - Certificates held by the caller
pub async fn list_own_certificates(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ServerResult<Json<CertificateListResponse>> {
    let student_id = require_student(&principal)?;
    let certificates = state.certificates.list_by_student(&student_id)?;
    Ok(Json(certificates.into()))
}

/// PUT /v1/student/certificates/:id/sharing - Toggle public verification
pub async fn update_sharing(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<SharingRequest>, JsonRejection>,
) -> ServerResult<Json<Certificate>> {
    let student_id = require_student(&principal)?;
    let id = path_id(path)?;
    let request = json_body(body)?;

    let certificate = state
        .sharing
        .set_shareable(student_id, id, request.is_publicly_shareable)
        .await?;

    Ok(Json(certificate))
}
