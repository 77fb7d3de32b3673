use std::path::PathBuf;

use axum::http::{StatusCode, header};
use axum_test::TestServer;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use serde_json::{Value, json};
use uuid::Uuid;

use albaran_api::infra::signature::FetchLimits;
use albaran_api::router::build_router;
use albaran_api::state::AppState;
use albaran_auth_types::cookie::CookieSettings;
use albaran_auth_types::identity::JwtSecret;
use albaran_testing::auth::MockAuth;

use crate::helpers::TEST_JWT_SECRET;

fn server_with(db: DatabaseConnection) -> TestServer {
    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(TEST_JWT_SECRET),
        cookies: CookieSettings {
            domain: None,
            secure: false,
        },
        bcrypt_cost: 4,
        pdf_dir: PathBuf::from("unused"),
        http: reqwest::Client::new(),
        signature_limits: FetchLimits::default(),
    };
    TestServer::new(build_router(state)).unwrap()
}

/// A server with no database. Only routes that stop before a query may be hit.
fn server() -> TestServer {
    server_with(DatabaseConnection::Disconnected)
}

/// A server whose first query fails.
fn failing_server() -> TestServer {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_owned())])
        .into_connection();
    server_with(db)
}

fn auth() -> MockAuth {
    MockAuth::new(Uuid::new_v4(), "creador@example.com", TEST_JWT_SECRET)
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_live_with_request_id() {
    let response = server().get("/healthz").await;
    response.assert_status(StatusCode::OK);
    let id = response.header("x-request-id");
    assert!(id.to_str().unwrap().parse::<Uuid>().is_ok());
}

#[tokio::test]
async fn should_report_unready_without_database() {
    server()
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

// ── Session ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_protected_routes_without_session() {
    let server = server();
    for path in ["/api/clients", "/api/projects/me", "/api/albaranes", "/api/user/info"] {
        server
            .get(path)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn should_reject_session_signed_with_other_secret() {
    let forged = MockAuth::new(Uuid::new_v4(), "creador@example.com", "some-other-secret");
    let (name, value) = forged.cookie_header();
    server()
        .get("/api/albaranes/me")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_clear_cookie_on_logout() {
    let response = server().post("/logout").await;
    response.assert_status(StatusCode::OK);
    let cookie = response.header(header::SET_COOKIE);
    let cookie = cookie.to_str().unwrap();
    assert!(cookie.starts_with("albaran_session="), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_invalid_registration_before_touching_database() {
    let response = server()
        .post("/register")
        .json(&json!({
            "email": "alice@x.com",
            "password": "short",
            "nombre": "Alice",
            "apellidos": "Martín",
            "nif": "00000000T",
            "direccion": "Calle Luna 3"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "password must be at least 8 characters");
}

#[tokio::test]
async fn should_reject_unknown_patch_keys() {
    let (name, value) = auth().cookie_header();
    let response = server()
        .put(&format!("/api/clients/{}", Uuid::new_v4()))
        .add_header(name, value)
        .json(&json!({ "nombre": "Marta", "activo": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn should_reject_unknown_keys_inside_albaran_entries() {
    let (name, value) = auth().cookie_header();
    let response = server()
        .post("/api/albaranes")
        .add_header(name, value)
        .json(&json!({
            "projectId": Uuid::new_v4(),
            "materialEntries": [
                { "name": "Cable", "quantity": 2, "unitPrice": 10, "discount": 5 }
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let (name, value) = auth().cookie_header();
    let response = server()
        .post("/api/albaranes")
        .add_header(name, value)
        .json(&json!({
            "projectId": Uuid::new_v4(),
            "hoursEntries": [
                { "user": "a@x.com", "hours": 1, "description": "x", "rate": 30 }
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn should_reject_unknown_keys_on_create() {
    let server = server();
    let bodies = [
        (
            "/api/clients",
            json!({ "nombre": "Marta", "email": "m@x.com", "activo": false }),
        ),
        (
            "/api/projects",
            json!({ "titulo": "Obra", "creador": "otro@x.com" }),
        ),
        (
            "/api/albaranes",
            json!({ "projectId": Uuid::new_v4(), "number": "ALB-2024-99999" }),
        ),
        (
            "/companies/create",
            json!({ "nif": "B1", "nombre": "X", "jefe": "otro@x.com" }),
        ),
    ];
    for (path, body) in bodies {
        let (name, value) = auth().cookie_header();
        let response = server.post(path).add_header(name, value).json(&body).await;
        assert_eq!(
            response.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "{path}"
        );
    }
}

#[tokio::test]
async fn should_hide_internal_errors() {
    let (name, value) = auth().cookie_header();
    let response = failing_server()
        .get("/api/user/info")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body, json!({ "kind": "INTERNAL", "message": "internal error" }));
}
