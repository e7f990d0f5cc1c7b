//! End-to-end properties of the offline request router, driven against the
//! real application router as origin.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use http::StatusCode;

use common::test_app;
use fleetrent_api::offline::{
    dynamic_cache_name, static_cache_name, CachedResponse, Destination, OfflineRequest,
    OfflineRouter, Origin, OriginError, ResponseSource, RouterOrigin,
};

/// Origin that can be taken offline mid-test.
struct ToggleOrigin {
    inner: RouterOrigin,
    online: AtomicBool,
}

impl ToggleOrigin {
    fn new(inner: RouterOrigin) -> Self {
        Self {
            inner,
            online: AtomicBool::new(true),
        }
    }

    fn go_offline(&self) {
        self.online.store(false, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Origin for ToggleOrigin {
    async fn fetch(&self, request: &OfflineRequest) -> Result<CachedResponse, OriginError> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(OriginError::Unreachable("offline".to_string()));
        }
        self.inner.fetch(request).await
    }
}

fn offline_router(app: &common::TestApp) -> (OfflineRouter, Arc<ToggleOrigin>) {
    let origin = Arc::new(ToggleOrigin::new(RouterOrigin::new(app.router.clone())));
    (OfflineRouter::new(origin.clone()), origin)
}

#[tokio::test]
async fn install_precaches_the_manifest() {
    let app = test_app();
    let (router, _origin) = offline_router(&app);

    router.install().await.expect("install");

    let buckets = router.buckets();
    for path in ["/", "/index.html", "/manifest.json", "/icons/icon-192x192.png"] {
        assert!(
            buckets.get(&static_cache_name(), path).is_some(),
            "{path} should be pre-cached"
        );
    }
}

#[tokio::test]
async fn activate_drops_only_stale_buckets() {
    let app = test_app();
    let (router, _origin) = offline_router(&app);
    router.install().await.unwrap();

    router.buckets().ensure("fleetrent-static-v0.9.0");
    router
        .buckets()
        .put(&dynamic_cache_name(), "/api/machinery", CachedResponse::html("x"));

    router.activate().await;

    assert!(!router.buckets().contains_bucket("fleetrent-static-v0.9.0"));
    assert!(router.buckets().contains_bucket(&static_cache_name()));
    assert!(router.buckets().contains_bucket(&dynamic_cache_name()));
    assert_eq!(router.version(), format!("fleetrent-v{}", fleetrent_api::offline::CACHE_VERSION));
}

#[tokio::test]
async fn cached_static_assets_are_served_offline() {
    let app = test_app();
    let (router, origin) = offline_router(&app);
    router.install().await.unwrap();
    router.activate().await;

    origin.go_offline();

    let response = router.handle(&OfflineRequest::get("/index.html")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.source, ResponseSource::Cache);
    assert!(String::from_utf8_lossy(&response.body).contains("FleetRent"));
}

#[tokio::test]
async fn successful_api_responses_are_replayed_verbatim_on_failure() {
    let app = test_app();
    let (router, origin) = offline_router(&app);

    // Online: the list endpoint responds and gets cached.
    let online = router.handle(&OfflineRequest::get("/api/warehouses")).await;
    assert_eq!(online.status, StatusCode::OK);
    assert_eq!(online.source, ResponseSource::Network);

    origin.go_offline();

    let offline = router.handle(&OfflineRequest::get("/api/warehouses")).await;
    assert_eq!(offline.status, StatusCode::OK);
    assert_eq!(offline.source, ResponseSource::Cache);
    assert_eq!(offline.body, online.body, "replay must be byte-identical");
    assert_eq!(offline.content_type, online.content_type);
}

#[tokio::test]
async fn uncached_api_requests_get_the_offline_payload() {
    let app = test_app();
    let (router, origin) = offline_router(&app);
    origin.go_offline();

    let response = router.handle(&OfflineRequest::get("/api/machinery")).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.content_type, "application/json");

    let body = response.body_json().expect("offline JSON");
    assert_eq!(body["error"], "Sin conexión");
    assert_eq!(body["offline"], true);
}

#[tokio::test]
async fn non_200_api_responses_are_not_cached() {
    let app = test_app();
    let (router, origin) = offline_router(&app);

    // 404 passes through online...
    let missing = router
        .handle(&OfflineRequest::get("/api/machinery/nope"))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.source, ResponseSource::Network);

    // ...and is not replayed offline: the synthesized payload appears instead.
    origin.go_offline();
    let offline = router
        .handle(&OfflineRequest::get("/api/machinery/nope"))
        .await;
    assert_eq!(offline.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(offline.body_json().unwrap()["offline"], true);
}

#[tokio::test]
async fn offline_navigation_falls_back_to_the_app_shell() {
    let app = test_app();
    let (router, origin) = offline_router(&app);
    router.install().await.unwrap();
    origin.go_offline();

    let response = router
        .handle(&OfflineRequest::navigate("/rentals/abc123"))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.source, ResponseSource::Fallback);
    assert!(String::from_utf8_lossy(&response.body).contains("FleetRent"));
}

#[tokio::test]
async fn offline_image_requests_get_the_placeholder_svg() {
    let app = test_app();
    let (router, origin) = offline_router(&app);
    origin.go_offline();

    let response = router
        .handle(&OfflineRequest::asset("/photos/unit.png", Destination::Image))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "image/svg+xml");
    assert!(String::from_utf8_lossy(&response.body).contains("Sin imagen"));
}

#[tokio::test]
async fn install_fails_when_the_origin_is_down() {
    let app = test_app();
    let (router, origin) = offline_router(&app);
    origin.go_offline();

    assert!(router.install().await.is_err());
    assert_eq!(router.lifecycle(), fleetrent_api::offline::Lifecycle::Idle);
}

#[tokio::test]
async fn scripts_fetched_online_are_cached_for_later() {
    let app = test_app();
    let (router, origin) = offline_router(&app);

    // manifest.json is a manifest path; fetch it online once.
    let first = router.handle(&OfflineRequest::get("/manifest.json")).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.source, ResponseSource::Network);

    origin.go_offline();

    let second = router.handle(&OfflineRequest::get("/manifest.json")).await;
    assert_eq!(second.source, ResponseSource::Cache);
    assert_eq!(second.body, first.body);
}
