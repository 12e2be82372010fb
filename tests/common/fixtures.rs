//! Test fixtures and app setup utilities

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use uuid::Uuid;

use certify_server::api::{create_router, AppState};
use certify_server::artifact::ArtifactService;
use certify_server::config::{AccessGrants, Config, Principal};
use certify_server::error::ArtifactError;
use certify_server::issuance::{IssuanceCoordinator, IssuanceSettings, IssueRequest};
use certify_server::model::{ArtifactRef, Enrollment, Institution, Student};
use certify_server::storage::MemoryStore;
use certify_server::traits::{
    ActivityLog, ArtifactRenderer, CertificateStore, LogNotifier, Registry, RegistryWriter,
    RenderContext, SequenceStore,
};

pub const BASE_URL: &str = "https://certs.example.edu";

pub const INSTITUTION_TOKEN: &str = "institution-token";
pub const OTHER_INSTITUTION_TOKEN: &str = "other-institution-token";
pub const STUDENT_TOKEN: &str = "student-token";
pub const OTHER_STUDENT_TOKEN: &str = "other-student-token";

pub const ROLL_NUMBER: &str = "DHK-104522";

pub fn institution_id() -> Uuid {
    Uuid::from_u128(0x1001)
}

pub fn other_institution_id() -> Uuid {
    Uuid::from_u128(0x1002)
}

pub fn student_id() -> Uuid {
    Uuid::from_u128(0x2001)
}

/// Exists in the registry but is enrolled nowhere
pub fn unenrolled_student_id() -> Uuid {
    Uuid::from_u128(0x2002)
}

pub fn institution() -> Institution {
    Institution {
        id: institution_id(),
        name: "Dhaka Residential Model College".into(),
        institution_type: "COLLEGE".into(),
        board: Some("Dhaka".into()),
        can_issue_certificates: true,
        authority_name: Some("A. Rahman".into()),
        authority_title: Some("Principal".into()),
    }
}

pub fn other_institution() -> Institution {
    Institution {
        id: other_institution_id(),
        name: "Chittagong Polytechnic Institute".into(),
        institution_type: "POLYTECHNIC".into(),
        board: None,
        can_issue_certificates: true,
        authority_name: None,
        authority_title: None,
    }
}

pub fn student() -> Student {
    Student {
        id: student_id(),
        first_name: "Nusrat".into(),
        last_name: "Jahan".into(),
        email: "nusrat@example.com".into(),
        date_of_birth: None,
    }
}

pub fn unenrolled_student() -> Student {
    Student {
        id: unenrolled_student_id(),
        first_name: "Tanvir".into(),
        last_name: "Hossain".into(),
        email: "tanvir@example.com".into(),
        date_of_birth: None,
    }
}

/// Two institutions, two students, one enrollment
pub fn seed_registry(writer: &dyn RegistryWriter) {
    writer.upsert_institution(&institution()).unwrap();
    writer.upsert_institution(&other_institution()).unwrap();
    writer.upsert_student(&student()).unwrap();
    writer.upsert_student(&unenrolled_student()).unwrap();
    writer
        .upsert_enrollment(&Enrollment {
            student_id: student_id(),
            institution_id: institution_id(),
            student_institution_id: Some("DRMC-2021-117".into()),
        })
        .unwrap();
}

pub fn seeded_memory_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    seed_registry(store.as_ref());
    store
}

/// SSC request relying on the institution's board
pub fn ssc_request(student_id: Uuid, roll_number: &str) -> IssueRequest {
    serde_json::from_value(serde_json::json!({
        "studentId": student_id,
        "certificateType": "SSC",
        "rollNumber": roll_number,
        "examinationYear": 2023,
        "gpa": 5.0,
        "group": "Science",
    }))
    .unwrap()
}

/// Renderer that keeps nothing and fails while switched off
#[derive(Default)]
pub struct StubRenderer {
    failing: AtomicBool,
    calls: AtomicU32,
}

impl StubRenderer {
    pub fn failing() -> Self {
        let renderer = Self::default();
        renderer.set_failing(true);
        renderer
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactRenderer for StubRenderer {
    async fn render(&self, ctx: RenderContext<'_>) -> Result<ArtifactRef, ArtifactError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ArtifactError::Render("renderer offline".into()));
        }
        Ok(ArtifactRef {
            location: format!("mem://{}", ctx.certificate.serial),
            digest: "0f".repeat(32),
        })
    }
}

pub fn artifact_service<S>(store: &Arc<S>, renderer: Arc<StubRenderer>) -> ArtifactService
where
    S: CertificateStore + Registry + ActivityLog + 'static,
{
    ArtifactService::new(
        renderer,
        store.clone(),
        store.clone(),
        store.clone(),
        std::time::Duration::from_secs(2),
    )
}

/// Coordinator wired onto a single store
pub fn coordinator<S>(
    store: &Arc<S>,
    renderer: Arc<StubRenderer>,
    render_inline: bool,
) -> IssuanceCoordinator
where
    S: SequenceStore + CertificateStore + Registry + ActivityLog + 'static,
{
    IssuanceCoordinator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(LogNotifier),
        artifact_service(store, renderer),
        IssuanceSettings {
            base_url: BASE_URL.into(),
            render_inline,
        },
    )
}

pub fn access_grants() -> AccessGrants {
    let mut grants = AccessGrants::new();
    grants.insert(
        INSTITUTION_TOKEN.into(),
        Principal::Institution(institution_id()),
    );
    grants.insert(
        OTHER_INSTITUTION_TOKEN.into(),
        Principal::Institution(other_institution_id()),
    );
    grants.insert(STUDENT_TOKEN.into(), Principal::Student(student_id()));
    grants.insert(
        OTHER_STUDENT_TOKEN.into(),
        Principal::Student(unenrolled_student_id()),
    );
    grants
}

/// Everything an API test needs to poke at
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub renderer: Arc<StubRenderer>,
}

/// Create a test app over a seeded memory store with all tokens configured
pub fn test_app() -> TestApp {
    test_app_with_renderer(Arc::new(StubRenderer::default()))
}

pub fn test_app_with_renderer(renderer: Arc<StubRenderer>) -> TestApp {
    let store = seeded_memory_store();
    let config = Config {
        base_url: BASE_URL.into(),
        access_grants: access_grants(),
        ..Config::default()
    };

    let state = Arc::new(AppState::assemble(
        store.clone(),
        renderer.clone(),
        Arc::new(LogNotifier),
        &config,
    ));

    TestApp {
        router: create_router(state),
        store,
        renderer,
    }
}

/// Build a request, optionally with a Bearer token and JSON body
pub fn api_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}

/// Issue an SSC certificate for the enrolled student through the API
pub async fn issue_via_api(app: &TestApp, roll_number: &str) -> serde_json::Value {
    use tower::ServiceExt;

    let body = serde_json::to_value(ssc_request(student_id(), roll_number)).unwrap();
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

    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    super::body_json(response).await
}

/// Certificate row for the enrolled student, bypassing the coordinator
pub fn new_certificate(sequence_number: u64, roll_number: &str) -> certify_server::model::NewCertificate {
    use certify_server::model::{
        verification_url, AcademicDetails, AcademicRecord, CertificateType, NewCertificate,
        RollNumber,
    };

    let serial = certify_server::serial::encode(sequence_number).unwrap();
    let details = AcademicDetails {
        examination_year: Some(2023),
        gpa: Some(4.5),
        ..Default::default()
    };

    NewCertificate {
        verification_url: verification_url(BASE_URL, &serial),
        serial,
        sequence_number,
        certificate_type: CertificateType::Ssc,
        student_id: student_id(),
        institution_id: institution_id(),
        roll_number: RollNumber::parse(roll_number).unwrap(),
        academic: AcademicRecord::build(CertificateType::Ssc, &details, Some("Dhaka")).unwrap(),
        authority_name: None,
        authority_title: None,
    }
}

/// Initialized SQLite store in a temp directory
///
/// Keep the returned directory alive for the lifetime of the store.
pub fn sqlite_store() -> (tempfile::TempDir, Arc<certify_server::storage::SqliteStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = certify_server::storage::SqliteStore::new(dir.path().join("certify.db")).unwrap();
    store.initialize().unwrap();
    (dir, Arc::new(store))
}
