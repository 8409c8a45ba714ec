use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use mailer::{MemoryMailer, Notifier, Template};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use server::auth::Subject;
use server::{AppState, Config, router};
use std::path::PathBuf;
use std::sync::Arc;
use storage::LocalStorage;
use tempfile::TempDir;
use tower::ServiceExt;

const ADMIN: &str = "sub-admin";
const BOUNDARY: &str = "----center-test-boundary";

/// Stands in for the OAuth2 layer: the subject comes from a plain header
async fn test_subject(mut request: Request<Body>, next: Next) -> Response {
    let subject = request
        .headers()
        .get("x-test-subject")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    match subject {
        Some(subject) => {
            request.extensions_mut().insert(Subject(subject));
            next.run(request).await
        }
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

struct TestApp {
    app: Router,
    mailer: Arc<MemoryMailer>,
    _root: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let root = TempDir::new().unwrap();
        let storage = LocalStorage::open(root.path(), "http://localhost:3000")
            .await
            .unwrap();
        let mailer = Arc::new(MemoryMailer::new());
        let notifier = Notifier::new(mailer.clone(), "no-reply@localhost", "centre@univ.test");
        let config = Config {
            database_url: "sqlite::memory:".to_owned(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            oidc_issuer_url: "http://localhost:8080/realms/center".to_owned(),
            storage_root: PathBuf::from(root.path()),
            public_url: "http://localhost:3000".to_owned(),
            mail_from: "no-reply@localhost".to_owned(),
            admin_email: "centre@univ.test".to_owned(),
            admin_subjects: vec![ADMIN.to_owned()],
            run_migrations: false,
        };

        let state = AppState {
            db,
            storage: Arc::new(storage),
            notifier,
            config: Arc::new(config),
        };
        let app = router(state, |routes| {
            routes.route_layer(middleware::from_fn(test_subject))
        });

        Self {
            app,
            mailer,
            _root: root,
        }
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        subject: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(subject) = subject {
            builder = builder.header("x-test-subject", subject);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes) = self.call(request).await;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get(&self, uri: &str, subject: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, subject, None).await
    }

    async fn post(&self, uri: &str, subject: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, subject, Some(body)).await
    }

    async fn put(&self, uri: &str, subject: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, subject, Some(body)).await
    }

    /// Admin multipart write with a `data` part and an optional `file` part
    async fn upload(
        &self,
        method: Method,
        uri: &str,
        data: Value,
        file: Option<(&str, &str, &[u8])>,
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"\r\n\r\n{data}\r\n"
            )
            .as_bytes(),
        );
        if let Some((file_name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-test-subject", ADMIN)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, bytes) = self.call(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn profile(&self, subject: &str, name: &str) -> Value {
        let (status, body) = self
            .put(
                "/me/profile",
                Some(subject),
                json!({ "name": name, "email": format!("{}@univ.test", name.to_lowercase()) }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    fn sent(&self, template: Template) -> usize {
        self.mailer
            .sent()
            .iter()
            .filter(|m| m.template == template)
            .count()
    }
}

fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = TestApp::new().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = app.call(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_protected_routes_require_a_subject_and_a_profile() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/me", Some("sub-nobody")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    // Public routes stay open
    let (status, body) = app.get("/formations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_profile_roles_gate_admin_routes() {
    let app = TestApp::new().await;

    let student = app.profile("sub-alice", "Alice").await;
    assert_eq!(student["role"], "student");
    let admin = app.profile(ADMIN, "Admin").await;
    assert_eq!(admin["role"], "admin");

    let (status, _) = app.get("/admin/accounts", Some("sub-alice")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, accounts) = app.get("/admin/accounts", Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accounts.as_array().unwrap().len(), 2);

    // An admin may not demote themselves
    let (status, _) = app
        .put(
            &format!("/admin/accounts/{}/role", id(&admin)),
            Some(ADMIN),
            json!({ "role": "student" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, promoted) = app
        .put(
            &format!("/admin/accounts/{}/role", id(&student)),
            Some(ADMIN),
            json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], "admin");
}

#[tokio::test]
async fn test_formation_journey_ends_with_a_verifiable_certificate() {
    let app = TestApp::new().await;
    app.profile(ADMIN, "Admin").await;
    app.profile("sub-alice", "Alice").await;

    let (status, formation) = app
        .upload(
            Method::POST,
            "/admin/formations",
            json!({
                "title": "Initiation à Python",
                "description": "Les bases du langage",
                "status": "published"
            }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{formation}");
    let formation_id = id(&formation);

    let (status, module) = app
        .upload(
            Method::POST,
            &format!("/admin/formations/{formation_id}/modules"),
            json!({ "title": "Variables", "description": "Types et affectation" }),
            Some(("variables.pdf", "application/pdf", b"%PDF-1.4 cours")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{module}");
    assert_eq!(module["has_file"], true);
    let module_id = id(&module);

    let (status, detail) = app
        .get(&format!("/formations/{}", formation["slug"].as_str().unwrap()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["modules"].as_array().unwrap().len(), 1);

    // Module content is only for enrolled students
    let (status, _) = app
        .get(&format!("/me/modules/{module_id}/file"), Some("sub-alice"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            &format!("/me/formations/{formation_id}/enrollment"),
            Some("sub-alice"),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let request = Request::builder()
        .uri(format!("/me/modules/{module_id}/file"))
        .header("x-test-subject", "sub-alice")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = app.call(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"%PDF-1.4 cours");

    // Not eligible before completing the module
    let (status, _) = app
        .post(
            &format!("/me/formations/{formation_id}/certificate"),
            Some("sub-alice"),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            &format!("/me/modules/{module_id}/completion"),
            Some("sub-alice"),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, progress) = app
        .get(
            &format!("/me/formations/{formation_id}/progress"),
            Some("sub-alice"),
        )
        .await;
    assert_eq!(progress["percent"], 100);
    assert_eq!(progress["eligible"], true);

    let (status, certificate) = app
        .post(
            &format!("/me/formations/{formation_id}/certificate"),
            Some("sub-alice"),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(certificate["status"], "pending");
    assert_eq!(certificate["downloadable"], false);
    let certificate_id = id(&certificate);

    let (status, issued) = app
        .post(
            &format!("/admin/certificates/{certificate_id}/issue"),
            Some(ADMIN),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{issued}");
    assert_eq!(issued["status"], "generated");
    assert_eq!(issued["changed"], true);
    assert_eq!(app.sent(Template::CertificateIssued), 1);

    let (status, again) = app
        .post(
            &format!("/admin/certificates/{certificate_id}/issue"),
            Some(ADMIN),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["changed"], false);
    assert_eq!(app.sent(Template::CertificateIssued), 1);

    let request = Request::builder()
        .uri(format!("/me/certificates/{certificate_id}/file"))
        .header("x-test-subject", "sub-alice")
        .body(Body::empty())
        .unwrap();
    let (status, pdf) = app.call(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(pdf.starts_with(b"%PDF"));

    let code = issued["data"]["verification_code"]
        .as_str()
        .unwrap()
        .replace('-', "")
        .to_lowercase();
    let (status, verified) = app
        .get(&format!("/certificates/verify/{code}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["student_name"], "Alice");
    assert_eq!(verified["formation_title"], "Initiation à Python");
}

#[tokio::test]
async fn test_reservation_review_is_idempotent() {
    let app = TestApp::new().await;
    app.profile(ADMIN, "Admin").await;

    let mut request = json!({
        "name": "Bob",
        "email": "not-an-email",
        "resource": "room",
        "reserved_on": "2030-05-12",
        "starts_at": "10:00:00",
        "ends_at": "12:00:00",
        "purpose": "Réunion du club"
    });
    let (status, body) = app.post("/reservations", None, request.clone()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["email"].is_array());

    request["email"] = json!("bob@univ.test");
    let (status, reservation) = app.post("/reservations", None, request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["status"], "pending");

    let (status, _) = app.post("/reservations", None, request).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/admin/reservations/{}/approve", id(&reservation));
    let (status, first) = app.post(&uri, Some(ADMIN), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["changed"], true);
    assert_eq!(first["status"], "approved");
    assert_eq!(app.sent(Template::ReservationStatusChanged), 1);

    let (status, second) = app.post(&uri, Some(ADMIN), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["changed"], false);
    assert!(second["message"].is_string());
    assert_eq!(app.sent(Template::ReservationStatusChanged), 1);

    let (status, _) = app
        .post(
            &format!("/admin/reservations/{}/reject", id(&reservation)),
            Some(ADMIN),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejected_event_registration_cannot_be_renewed() {
    let app = TestApp::new().await;
    app.profile(ADMIN, "Admin").await;
    app.profile("sub-alice", "Alice").await;

    let (status, event) = app
        .upload(
            Method::POST,
            "/admin/events",
            json!({
                "title": "Hackathon IA",
                "description": "48 heures de code",
                "location": "Centre numérique",
                "starts_at": "2030-06-01T09:00:00",
                "ends_at": "2030-06-02T18:00:00",
                "requires_approval": true
            }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{event}");

    let registration_uri = format!("/me/events/{}/registrations", id(&event));
    let form = json!({ "name": "Alice", "email": "alice@univ.test" });
    let (status, registration) = app
        .post(&registration_uri, Some("sub-alice"), form.clone())
        .await;
    assert_eq!(status, StatusCode::CREATED, "{registration}");
    assert_eq!(registration["status"], "pending");

    let (status, reviewed) = app
        .put(
            &format!("/admin/event-registrations/{}/status", id(&registration)),
            Some(ADMIN),
            json!({ "status": "rejected" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["status"], "rejected");
    assert_eq!(app.sent(Template::EventRegistrationStatusChanged), 1);

    let (status, _) = app.post(&registration_uri, Some("sub-alice"), form).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_confirming_the_last_seat_marks_competition_full() {
    let app = TestApp::new().await;
    app.profile(ADMIN, "Admin").await;
    app.profile("sub-alice", "Alice").await;

    let (status, competition) = app
        .upload(
            Method::POST,
            "/admin/competitions",
            json!({
                "title": "Concours de robotique",
                "description": "Robots suiveurs de ligne",
                "held_on": "2030-09-20",
                "deadline": "2030-09-01T23:59:00",
                "max_participants": 1,
                "kind": "individual"
            }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{competition}");
    assert_eq!(competition["status"], "Ouvert");

    let (status, registration) = app
        .post(
            &format!("/me/competitions/{}/registrations", id(&competition)),
            Some("sub-alice"),
            json!({ "name": "Alice", "email": "alice@univ.test" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{registration}");
    assert_eq!(registration["status"], "En attente");

    let (status, confirmed) = app
        .put(
            &format!("/admin/competition-registrations/{}/status", id(&registration)),
            Some(ADMIN),
            json!({ "status": "Confirmé" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{confirmed}");
    assert_eq!(confirmed["status"], "Confirmé");

    let (_, public) = app
        .get(
            &format!("/competitions/{}", competition["slug"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(public["status"], "Complet");
}

#[tokio::test]
async fn test_club_application_notifies_club_and_applicant() {
    let app = TestApp::new().await;
    app.profile(ADMIN, "Admin").await;

    let (status, club) = app
        .upload(
            Method::POST,
            "/admin/clubs",
            json!({
                "name": "Club Robotique",
                "description": "Construire des robots",
                "category": "tech",
                "contact_email": "robotique@univ.test"
            }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{club}");

    let uri = format!("/clubs/{}/applications", club["slug"].as_str().unwrap());
    let application = json!({
        "name": "Carla",
        "email": "carla@univ.test",
        "motivation": "J'aime l'électronique"
    });
    let (status, body) = app.post(&uri, None, application.clone()).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message"].is_string());
    assert!(app.sent(Template::ClubApplication) >= 1);

    let (status, _) = app
        .post(
            &format!("/admin/clubs/{}/toggle-status", id(&club)),
            Some(ADMIN),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post(&uri, None, application).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_form_reaches_the_center() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/contact",
            None,
            json!({
                "name": "Dana",
                "email": "dana@example.org",
                "subject": "Horaires",
                "message": "Êtes-vous ouverts le samedi ?"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(app.sent(Template::ContactMessage), 1);
}
