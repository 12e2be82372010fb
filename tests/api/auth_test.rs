//! Authentication middleware tests

use crate::common::*;

#[tokio::test]
async fn test_auth_required_for_institution_routes() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(api_request("GET", "/v1/institution/certificates", None, None))
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "AUTH_MISSING").await;

    let response = app
        .router
        .oneshot(api_request(
            "GET",
            "/v1/institution/certificates",
            Some(INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_invalid_token() {
    let app = test_app();

    let response = app
        .router
        .oneshot(api_request(
            "GET",
            "/v1/student/certificates",
            Some("wrong-token"),
            None,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::UNAUTHORIZED, "AUTH_INVALID").await;
}

#[tokio::test]
async fn test_auth_missing_bearer_prefix() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::get("/v1/student/certificates")
                .header("Authorization", STUDENT_TOKEN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_error(response, StatusCode::UNAUTHORIZED, "AUTH_INVALID").await;
}

#[tokio::test]
async fn test_student_token_on_institution_route_is_forbidden() {
    let app = test_app();

    let body = serde_json::to_value(ssc_request(student_id(), ROLL_NUMBER)).unwrap();
    let response = app
        .router
        .oneshot(api_request(
            "POST",
            "/v1/institution/certificates",
            Some(STUDENT_TOKEN),
            Some(body),
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
    assert_eq!(app.store.allocation_count(), 0);
}

#[tokio::test]
async fn test_institution_token_on_student_route_is_forbidden() {
    let app = test_app();

    let response = app
        .router
        .oneshot(api_request(
            "GET",
            "/v1/student/certificates",
            Some(INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[tokio::test]
async fn test_public_routes_ignore_tokens() {
    let app = test_app();

    // A bogus token on a public route is not checked
    let response = app
        .router
        .oneshot(api_request("GET", "/v1/stats", Some("wrong-token"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
