//! Shared test harness: a real application router over temporary data and
//! static directories.
#![allow(dead_code)]

use std::fs;
use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{header, Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

use fleetrent_api::config::AppConfig;
use fleetrent_api::store::EntityStore;
use fleetrent_api::{api, AppState};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    // Keep the directories alive for the duration of the test.
    _data_dir: TempDir,
    _static_dir: TempDir,
}

/// Builds the full application over fresh temp dirs, with a minimal SPA
/// build (index, manifest, icons) in place.
pub fn test_app() -> TestApp {
    let data_dir = TempDir::new().expect("temp data dir");
    let static_dir = TempDir::new().expect("temp static dir");

    fs::write(
        static_dir.path().join("index.html"),
        "<!doctype html><title>FleetRent</title>",
    )
    .unwrap();
    fs::write(static_dir.path().join("manifest.json"), "{\"name\":\"FleetRent\"}").unwrap();
    fs::create_dir_all(static_dir.path().join("icons")).unwrap();
    fs::write(static_dir.path().join("icons/icon-192x192.png"), [0u8; 16]).unwrap();
    fs::write(static_dir.path().join("icons/icon-512x512.png"), [0u8; 16]).unwrap();

    let config = AppConfig {
        data_dir: data_dir.path().to_string_lossy().into_owned(),
        static_dir: static_dir.path().to_string_lossy().into_owned(),
        ..AppConfig::default()
    };

    let store = Arc::new(EntityStore::open(data_dir.path()).expect("open store"));
    let state = AppState::new(config, store);
    let router = api::app_router(state.clone());

    TestApp {
        router,
        state,
        _data_dir: data_dir,
        _static_dir: static_dir,
    }
}

impl TestApp {
    pub async fn get(&self, path: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::post(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn put_json(&self, path: &str, body: Value) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::put(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn delete(&self, path: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(Request::delete(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}
