//! Student listing and sharing toggle tests

use certify_server::model::ActivityAction;
use serde_json::json;

use crate::common::*;

fn sharing_request(id: &str, token: &str, shareable: bool) -> Request<Body> {
    api_request(
        "PUT",
        &format!("/v1/student/certificates/{}/sharing", id),
        Some(token),
        Some(json!({ "isPubliclyShareable": shareable })),
    )
}

fn verify_request(serial: &str) -> Request<Body> {
    api_request(
        "POST",
        "/v1/verify",
        None,
        Some(json!({ "serial": serial, "rollNumber": ROLL_NUMBER })),
    )
}

#[tokio::test]
async fn test_hidden_certificate_is_not_shareable_until_toggled_back() {
    let app = test_app();
    let certificate = issue_via_api(&app, ROLL_NUMBER).await;
    let id = certificate["id"].as_str().unwrap();
    let serial = certificate["serial"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(sharing_request(id, STUDENT_TOKEN, false))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let hidden = body_json(response).await;
    assert_eq!(hidden["isPubliclyShareable"], false);

    let response = app.router.clone().oneshot(verify_request(serial)).await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "NOT_SHAREABLE").await;

    let response = app
        .router
        .clone()
        .oneshot(sharing_request(id, STUDENT_TOKEN, true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let shown = body_json(response).await;

    // Only the flag moved
    assert_eq!(shown["serial"], certificate["serial"]);
    assert_eq!(shown["sequenceNumber"], certificate["sequenceNumber"]);
    assert_eq!(shown["issueDate"], certificate["issueDate"]);
    assert_eq!(shown["artifact"], certificate["artifact"]);

    let response = app.router.clone().oneshot(verify_request(serial)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let toggles = app
        .store
        .activity()
        .into_iter()
        .filter(|e| e.action == ActivityAction::CertificateSharingUpdated)
        .count();
    assert_eq!(toggles, 2);
}

#[tokio::test]
async fn test_sharing_someone_elses_certificate_is_not_found() {
    let app = test_app();
    let certificate = issue_via_api(&app, ROLL_NUMBER).await;
    let id = certificate["id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(sharing_request(id, OTHER_STUDENT_TOKEN, false))
        .await
        .unwrap();

    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    // Still public
    let response = app
        .router
        .clone()
        .oneshot(verify_request(certificate["serial"].as_str().unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sharing_requires_flag() {
    let app = test_app();
    let certificate = issue_via_api(&app, ROLL_NUMBER).await;
    let id = certificate["id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "PUT",
            &format!("/v1/student/certificates/{}/sharing", id),
            Some(STUDENT_TOKEN),
            Some(json!({})),
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT").await;
}

#[tokio::test]
async fn test_sharing_unknown_certificate() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(sharing_request(
            &uuid::Uuid::new_v4().to_string(),
            STUDENT_TOKEN,
            false,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[tokio::test]
async fn test_student_lists_own_certificates() {
    let app = test_app();
    issue_via_api(&app, ROLL_NUMBER).await;

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "GET",
            "/v1/student/certificates",
            Some(STUDENT_TOKEN),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["certificates"][0]["studentId"], student_id().to_string());

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "GET",
            "/v1/student/certificates",
            Some(OTHER_STUDENT_TOKEN),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
}
