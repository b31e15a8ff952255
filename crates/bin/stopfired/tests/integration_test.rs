//! End-to-end tests for the full stopfired stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot` — no TCP port is bound.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use stopfire_adapter_http_axum::auth::{Claims, TokenVerifier};
use stopfire_adapter_http_axum::router;
use stopfire_adapter_http_axum::state::AppState;
use stopfire_adapter_storage_sqlite_sqlx::{
    Config, SqliteAlertSource, SqliteDeviceRepository, SqliteUserRepository,
};
use stopfire_app::services::alert_service::AlertService;
use stopfire_app::services::device_service::DeviceService;
use stopfire_app::services::ownership_service::OwnershipService;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

/// Build a fully-wired router backed by an in-memory `SQLite` database
/// holding users 7 (`alice`) and 8 (`bob`).
async fn app() -> (Router, SqlitePool) {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    let pool = db.pool().clone();
    sqlx::query(
        "INSERT INTO users (id, username, email) VALUES (7, 'alice', 'alice@example.com'), (8, 'bob', 'bob@example.com')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let state = AppState::new(
        OwnershipService::new(
            SqliteDeviceRepository::new(pool.clone()),
            SqliteUserRepository::new(pool.clone()),
        ),
        AlertService::new(SqliteAlertSource::new(pool.clone())),
        DeviceService::new(SqliteDeviceRepository::new(pool.clone())),
        TokenVerifier::new(SECRET.as_bytes()),
    );

    (router::build(state, Duration::from_secs(5)), pool)
}

fn bearer(user_id: i64) -> String {
    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
    let claims = Claims {
        id: user_id,
        username: format!("user-{user_id}"),
        email: format!("user-{user_id}@example.com"),
        exp: u64::try_from(exp).unwrap(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: i64,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user_id));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn provision(app: &Router, serial: &str, base: i64) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/api/devices",
        7,
        Some(json!({
            "serial_number": serial,
            "channels": { "ky026": base, "mq2": base + 1, "mq135": base + 2, "dht22": base + 3 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
}

async fn set_reading(pool: &SqlitePool, table: &str, id: i64, state: i64, at: &str) {
    sqlx::query(&format!(
        "UPDATE {table} SET state = ?, activated_at = ? WHERE id = ?"
    ))
    .bind(state)
    .bind(at)
    .bind(id)
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Health check and authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let (app, _) = app().await;
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_require_token_for_api() {
    let (app, _) = app().await;
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/alerts/mine")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_run_assign_alert_unassign_scenario() {
    let (app, pool) = app().await;
    let device_id = provision(&app, "ESP-001", 1).await;

    let (status, device) = send(
        &app,
        "POST",
        "/api/devices/assign",
        7,
        Some(json!({ "serial_number": "ESP-001" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(device["owner_id"], 7);

    let (_, mine) = send(&app, "GET", "/api/devices/mine", 7, None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["id"], device_id);

    set_reading(&pool, "mq_2", 2, 1, "100").await;
    set_reading(&pool, "dht_22", 4, 0, "100").await;

    let (status, alerts) = send(&app, "GET", "/api/alerts/mine", 7, None).await;
    assert_eq!(status, StatusCode::OK);
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["sensor_type"], "MQ_2");
    assert_eq!(alerts[0]["activated_at"], "100");
    assert_eq!(alerts[0]["sensor_id"], 2);
    assert_eq!(alerts[0]["device_serial"], "ESP-001");

    let (status, device) = send(
        &app,
        "DELETE",
        &format!("/api/devices/{device_id}/unassign"),
        7,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(device["owner_id"].is_null());

    let (_, mine) = send(&app, "GET", "/api/devices/mine", 7, None).await;
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn should_keep_single_owner() {
    let (app, _) = app().await;
    provision(&app, "ESP-001", 1).await;
    let assign = json!({ "serial_number": "ESP-001" });

    let (status, _) = send(&app, "POST", "/api/devices/assign", 7, Some(assign.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/api/devices/assign", 7, Some(assign.clone())).await;
    assert_eq!(status, StatusCode::OK, "re-assigning to the owner is idempotent");

    let (status, body) = send(&app, "POST", "/api/devices/assign", 8, Some(assign)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (_, theirs) = send(&app, "GET", "/api/devices/mine", 8, None).await;
    assert!(theirs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn should_reassign_after_unassign() {
    let (app, _) = app().await;
    let device_id = provision(&app, "ESP-001", 1).await;
    let assign = json!({ "serial_number": "ESP-001" });

    send(&app, "POST", "/api/devices/assign", 7, Some(assign.clone())).await;
    send(&app, "DELETE", &format!("/api/devices/{device_id}/unassign"), 7, None).await;

    let (status, device) = send(&app, "POST", "/api/devices/assign", 8, Some(assign)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(device["owner_id"], 8);
}

#[tokio::test]
async fn should_reject_unassign_of_unowned_device() {
    let (app, _) = app().await;
    let device_id = provision(&app, "ESP-001", 1).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/devices/{device_id}/unassign"),
        7,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_principal() {
    let (app, _) = app().await;
    provision(&app, "ESP-001", 1).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/devices/assign",
        99,
        Some(json!({ "serial_number": "ESP-001" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_reject_duplicate_serial() {
    let (app, _) = app().await;
    provision(&app, "ESP-001", 1).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/devices",
        7,
        Some(json!({
            "serial_number": "ESP-001",
            "channels": { "ky026": 9, "mq2": 10, "mq135": 11, "dht22": 12 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn should_list_unowned_and_rebind_channels() {
    let (app, _) = app().await;
    let device_id = provision(&app, "ESP-001", 1).await;

    let (_, unowned) = send(&app, "GET", "/api/devices/unowned", 7, None).await;
    assert_eq!(unowned[0]["serial_number"], "ESP-001");

    let (status, device) = send(
        &app,
        "PUT",
        &format!("/api/devices/{device_id}/channels"),
        7,
        Some(json!({ "ky026": 21, "mq2": 22, "mq135": 23, "dht22": 24 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(device["channels"]["mq135"], 23);

    let (_, fetched) = send(&app, "GET", &format!("/api/devices/{device_id}"), 7, None).await;
    assert_eq!(fetched["channels"]["ky026"], 21);
}

#[tokio::test]
async fn should_delete_device() {
    let (app, _) = app().await;
    let device_id = provision(&app, "ESP-001", 1).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/devices/{device_id}"), 7, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/devices/{device_id}"), 7, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_scope_alerts_by_owner_device_and_serial() {
    let (app, pool) = app().await;
    let first = provision(&app, "ESP-001", 1).await;
    let second = provision(&app, "ESP-002", 5).await;
    send(
        &app,
        "POST",
        "/api/devices/assign",
        7,
        Some(json!({ "serial_number": "ESP-001" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/devices/assign",
        8,
        Some(json!({ "serial_number": "ESP-002" })),
    )
    .await;

    set_reading(&pool, "ky_026", 1, 1, "2024-05-01 08:00:00").await;
    set_reading(&pool, "mq_135", 3, 1, "2024-05-03 08:00:00").await;
    set_reading(&pool, "dht_22", 8, 1, "2024-05-02 08:00:00").await;

    let (_, mine) = send(&app, "GET", "/api/alerts/mine", 7, None).await;
    let kinds: Vec<&str> = mine
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["sensor_type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["MQ_135", "KY_026"]);

    let (_, by_device) = send(&app, "GET", &format!("/api/alerts/device/{second}"), 7, None).await;
    assert_eq!(by_device.as_array().unwrap().len(), 1);
    assert_eq!(by_device[0]["sensor_type"], "DHT_22");

    let (_, by_serial) = send(&app, "GET", "/api/alerts/serial/ESP-001", 8, None).await;
    assert_eq!(by_serial.as_array().unwrap().len(), 2);
    assert_eq!(by_serial[0]["device_id"], first);
}

#[tokio::test]
async fn should_return_empty_feed_for_quiet_device() {
    let (app, _) = app().await;
    let device_id = provision(&app, "ESP-001", 1).await;

    let (status, alerts) = send(
        &app,
        "GET",
        &format!("/api/alerts/device/{device_id}"),
        7,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts, json!([]));
}
