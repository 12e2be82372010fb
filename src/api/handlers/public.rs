//! Unauthenticated endpoints: verification and stats

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};

use super::helpers::{json_body, query_params};
use crate::api::dto::{StatsResponse, VerifyRequest};
use crate::api::state::AppState;
use crate::error::ServerResult;
use crate::model::CertificatePublicView;

/// POST /v1/verify - Verify a serial against a roll number
pub async fn verify_certificate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> ServerResult<Json<CertificatePublicView>> {
    let req = json_body(body)?;
    let view = state.verification.verify(&req.serial, &req.roll_number)?;
    Ok(Json(view))
}

/// GET /v1/verify?serial=&rollNumber= - Same as POST, for links and QR codes
pub async fn verify_certificate_query(
    State(state): State<Arc<AppState>>,
    query: Result<Query<VerifyRequest>, QueryRejection>,
) -> ServerResult<Json<CertificatePublicView>> {
    let req = query_params(query)?;
    let view = state.verification.verify(&req.serial, &req.roll_number)?;
    Ok(Json(view))
}

/// GET /v1/stats - Public counters
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ServerResult<Json<StatsResponse>> {
    Ok(Json(StatsResponse {
        total_certificates: state.certificates.count_certificates()?,
        total_institutions: state.registry.count_institutions()?,
        total_students: state.registry.count_students()?,
    }))
}
