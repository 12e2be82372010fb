//! Router setup and configuration

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::api::handlers;
use crate::api::middleware::{auth_middleware, rate_limit_middleware};
use crate::api::state::AppState;

/// Create the API router
///
/// Verification, stats and health are public; verification is rate
/// limited per client. Institution and student routes require a Bearer
/// token bound to the matching principal.
pub fn create_router(state: Arc<AppState>) -> Router {
    let verify = Router::new()
        .route(
            "/verify",
            get(handlers::verify_certificate_query).post(handlers::verify_certificate),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let institution = Router::new()
        .route(
            "/certificates",
            get(handlers::list_issued_certificates).post(handlers::issue_certificate),
        )
        .route("/certificates/:id/artifact", post(handlers::retry_artifact));

    let student = Router::new()
        .route("/certificates", get(handlers::list_own_certificates))
        .route("/certificates/:id/sharing", put(handlers::update_sharing));

    let protected = Router::new()
        .nest("/institution", institution)
        .nest("/student", student)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // API v1 routes
    let api_v1 = Router::new()
        .route("/stats", get(handlers::get_stats))
        .merge(verify)
        .merge(protected);

    Router::new()
        .nest("/v1", api_v1)
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
