//! Issuance, listing and artifact retry endpoint tests

use certify_server::serial::encode;
use certify_server::traits::{CertificateStore, RegistryWriter, SequenceStore};
use serde_json::json;

use crate::common::*;

#[tokio::test]
async fn test_issue_certificate() {
    let app = test_app();

    let certificate = issue_via_api(&app, " dhk-104522 ").await;

    let serial = certificate["serial"].as_str().unwrap();
    assert_serial_format(serial);
    assert_eq!(serial, "0000011");
    assert_eq!(certificate["sequenceNumber"], 1);
    assert_eq!(certificate["certificateType"], "SSC");
    assert_eq!(certificate["rollNumber"], ROLL_NUMBER);
    assert_eq!(certificate["isPubliclyShareable"], true);
    assert_eq!(certificate["authorityName"], "A. Rahman");
    assert_eq!(
        certificate["verificationUrl"],
        format!("{}/verify?serial=0000011", BASE_URL)
    );

    // Board falls back to the institution's
    assert_eq!(certificate["academic"]["kind"], "secondary_exam");
    assert_eq!(certificate["academic"]["board"], "Dhaka");
    assert_eq!(certificate["academic"]["gpa"], 5.0);

    assert_eq!(certificate["artifact"]["status"], "ready");
    assert_eq!(certificate["artifact"]["artifact"]["location"], "mem://0000011");
}

#[tokio::test]
async fn test_consecutive_issuance_uses_consecutive_serials() {
    let app = test_app();

    for n in 1..=3u64 {
        let certificate = issue_via_api(&app, &format!("DHK-{}", n)).await;
        assert_eq!(certificate["sequenceNumber"], n);
        assert_eq!(certificate["serial"], encode(n).unwrap().as_str());
    }
}

#[tokio::test]
async fn test_issue_not_enrolled_mutates_nothing() {
    let app = test_app();

    let body = serde_json::to_value(ssc_request(unenrolled_student_id(), ROLL_NUMBER)).unwrap();
    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            "/v1/institution/certificates",
            Some(INSTITUTION_TOKEN),
            Some(body),
        ))
        .await
        .unwrap();

    let json = assert_error(response, StatusCode::BAD_REQUEST, "NOT_ENROLLED").await;
    assert_eq!(json["details"]["studentId"], unenrolled_student_id().to_string());

    assert_eq!(app.store.current().unwrap(), None);
    assert_eq!(app.store.count_certificates().unwrap(), 0);
}

#[tokio::test]
async fn test_issue_permission_revoked() {
    let app = test_app();
    app.store
        .set_issuing_capability(&institution_id(), false)
        .unwrap();

    let body = serde_json::to_value(ssc_request(student_id(), ROLL_NUMBER)).unwrap();
    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            "/v1/institution/certificates",
            Some(INSTITUTION_TOKEN),
            Some(body),
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::FORBIDDEN, "PERMISSION_REVOKED").await;
    assert_eq!(app.store.allocation_count(), 0);
}

#[tokio::test]
async fn test_issue_missing_roll_number() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            "/v1/institution/certificates",
            Some(INSTITUTION_TOKEN),
            Some(json!({
                "studentId": student_id(),
                "certificateType": "SSC",
                "examinationYear": 2023,
                "gpa": 4.5
            })),
        ))
        .await
        .unwrap();

    let json = assert_error(response, StatusCode::BAD_REQUEST, "MISSING_REQUIRED_FIELD").await;
    assert_eq!(json["details"]["field"], "rollNumber");
    assert_eq!(app.store.allocation_count(), 0);
}

#[tokio::test]
async fn test_issue_missing_type_specific_field() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            "/v1/institution/certificates",
            Some(INSTITUTION_TOKEN),
            Some(json!({
                "studentId": student_id(),
                "certificateType": "BSC",
                "rollNumber": ROLL_NUMBER,
                "cgpa": 3.7
            })),
        ))
        .await
        .unwrap();

    let json = assert_error(response, StatusCode::BAD_REQUEST, "MISSING_REQUIRED_FIELD").await;
    assert_eq!(json["details"]["field"], "program");
    assert_eq!(app.store.allocation_count(), 0);
}

#[tokio::test]
async fn test_issue_malformed_body() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::post("/v1/institution/certificates")
                .header("Authorization", format!("Bearer {}", INSTITUTION_TOKEN))
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT").await;
}

#[tokio::test]
async fn test_issue_unknown_certificate_type() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            "/v1/institution/certificates",
            Some(INSTITUTION_TOKEN),
            Some(json!({
                "studentId": student_id(),
                "certificateType": "PHD",
                "rollNumber": ROLL_NUMBER
            })),
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT").await;
}

#[tokio::test]
async fn test_failed_render_then_retry() {
    let app = test_app_with_renderer(Arc::new(StubRenderer::failing()));

    let certificate = issue_via_api(&app, ROLL_NUMBER).await;
    assert_eq!(certificate["artifact"]["status"], "pending");
    assert_eq!(certificate["artifact"]["attempts"], 1);
    assert!(certificate["artifact"]["lastError"].is_string());

    app.renderer.set_failing(false);

    let id = certificate["id"].as_str().unwrap();
    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/v1/institution/certificates/{}/artifact", id),
            Some(INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let retried = body_json(response).await;
    assert_eq!(retried["artifact"]["status"], "ready");
    assert_eq!(retried["serial"], certificate["serial"]);
    assert_eq!(retried["sequenceNumber"], certificate["sequenceNumber"]);

    // Retry never touches the sequence
    assert_eq!(app.store.allocation_count(), 1);
    assert_eq!(app.renderer.calls(), 2);
}

#[tokio::test]
async fn test_retry_failure_reports_unavailable() {
    let app = test_app_with_renderer(Arc::new(StubRenderer::failing()));
    let certificate = issue_via_api(&app, ROLL_NUMBER).await;

    let id = certificate["id"].as_str().unwrap();
    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/v1/institution/certificates/{}/artifact", id),
            Some(INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();

    let json = assert_error(response, StatusCode::SERVICE_UNAVAILABLE, "ARTIFACT_ERROR").await;
    assert_eq!(json["recoverable"], true);
}

#[tokio::test]
async fn test_retry_ready_artifact_conflicts() {
    let app = test_app();
    let certificate = issue_via_api(&app, ROLL_NUMBER).await;

    let id = certificate["id"].as_str().unwrap();
    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/v1/institution/certificates/{}/artifact", id),
            Some(INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::CONFLICT, "ARTIFACT_ERROR").await;
}

#[tokio::test]
async fn test_retry_other_institutions_certificate_is_not_found() {
    let app = test_app_with_renderer(Arc::new(StubRenderer::failing()));
    let certificate = issue_via_api(&app, ROLL_NUMBER).await;

    let id = certificate["id"].as_str().unwrap();
    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/v1/institution/certificates/{}/artifact", id),
            Some(OTHER_INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
    assert_eq!(app.renderer.calls(), 1);
}

#[tokio::test]
async fn test_retry_invalid_id() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "POST",
            "/v1/institution/certificates/not-a-uuid/artifact",
            Some(INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_UUID").await;
}

#[tokio::test]
async fn test_list_issued_newest_first() {
    let app = test_app();
    issue_via_api(&app, "DHK-1").await;
    issue_via_api(&app, "DHK-2").await;

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "GET",
            "/v1/institution/certificates",
            Some(INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["certificates"][0]["sequenceNumber"], 2);
    assert_eq!(json["certificates"][1]["sequenceNumber"], 1);

    let response = app
        .router
        .clone()
        .oneshot(api_request(
            "GET",
            "/v1/institution/certificates",
            Some(OTHER_INSTITUTION_TOKEN),
            None,
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
}
