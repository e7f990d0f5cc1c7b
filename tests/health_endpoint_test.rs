mod common;

use chrono::DateTime;
use http::StatusCode;

use common::{body_json, test_app};

#[tokio::test]
async fn health_returns_ok_with_parsable_timestamp_and_uptime() {
    let app = test_app();
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["environment"], "development");

    let timestamp = body["timestamp"].as_str().expect("timestamp string");
    DateTime::parse_from_rfc3339(timestamp).expect("ISO timestamp");

    let uptime = body["uptime"].as_u64().expect("uptime number");
    assert!(uptime < 60, "fresh server should report a small uptime");
}

#[tokio::test]
async fn api_status_reports_the_service_banner() {
    let app = test_app();
    let response = app.get("/api/status").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "FleetRent API funcionando correctamente");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn api_ping_pongs_with_epoch_millis() {
    let app = test_app();
    let body = body_json(app.get("/api/ping").await).await;
    assert_eq!(body["pong"], true);
    assert!(body["timestamp"].as_i64().unwrap() > 1_600_000_000_000);
}

#[tokio::test]
async fn unknown_routes_fall_back_to_the_spa_shell() {
    let app = test_app();
    let response = app.get("/rentals/some-client-route").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_bytes(response).await;
    assert!(String::from_utf8_lossy(&body).contains("FleetRent"));
}
