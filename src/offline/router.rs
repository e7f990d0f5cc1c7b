//! The cache-or-network decision logic.

use std::sync::Arc;
use std::sync::RwLock;

use http::{Method, StatusCode};
use serde_json::json;
use tracing::{debug, info, warn};

use super::{
    cache_name, dynamic_cache_name, is_api_cache_path, static_cache_name, BucketStore,
    CachedResponse, Destination, OfflineError, OfflineRequest, Origin, ResponseSource,
    RoutedResponse, PRECACHE_MANIFEST,
};

/// Placeholder served for images that are neither cached nor reachable.
const PLACEHOLDER_IMAGE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200"><rect width="200" height="200" fill="#f3f4f6"/><text x="100" y="100" text-anchor="middle" dy=".3em" fill="#9ca3af">Sin imagen</text></svg>"##;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Installed,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteClass {
    StaticAsset,
    Api,
    Other,
}

/// Routes requests between the cache buckets and the origin.
pub struct OfflineRouter {
    buckets: Arc<BucketStore>,
    origin: Arc<dyn Origin>,
    lifecycle: RwLock<Lifecycle>,
}

impl OfflineRouter {
    pub fn new(origin: Arc<dyn Origin>) -> Self {
        Self {
            buckets: Arc::new(BucketStore::new()),
            origin,
            lifecycle: RwLock::new(Lifecycle::Idle),
        }
    }

    pub fn buckets(&self) -> &BucketStore {
        &self.buckets
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.read().unwrap()
    }

    /// The versioned general cache name, reported to clients asking for the
    /// running version.
    pub fn version(&self) -> String {
        cache_name()
    }

    /// Pre-caches the static manifest. Any manifest fetch failure aborts the
    /// install, leaving the router idle.
    pub async fn install(&self) -> Result<(), OfflineError> {
        info!("offline router: installing");
        for path in PRECACHE_MANIFEST {
            let request = OfflineRequest::get(path);
            let response = self.origin.fetch(&request).await.map_err(|err| {
                OfflineError::InstallFailed {
                    path: path.to_string(),
                    reason: err.to_string(),
                }
            })?;
            if !response.status.is_success() {
                return Err(OfflineError::InstallFailed {
                    path: path.to_string(),
                    reason: format!("status {}", response.status),
                });
            }
            self.buckets.put(&static_cache_name(), path, response);
        }
        *self.lifecycle.write().unwrap() = Lifecycle::Installed;
        info!("offline router: installed, {} paths pre-cached", PRECACHE_MANIFEST.len());
        Ok(())
    }

    /// Deletes buckets from previous versions and takes over.
    pub async fn activate(&self) {
        let keep = [static_cache_name(), dynamic_cache_name()];
        for name in self.buckets.bucket_names() {
            if !keep.contains(&name) {
                info!(bucket = %name, "offline router: deleting stale bucket");
                self.buckets.delete_bucket(&name);
            }
        }
        *self.lifecycle.write().unwrap() = Lifecycle::Active;
        info!("offline router: activated");
    }

    /// Routes one request.
    pub async fn handle(&self, request: &OfflineRequest) -> RoutedResponse {
        match classify(request) {
            RouteClass::StaticAsset => self.cache_first(request).await,
            RouteClass::Api => self.network_first_api(request).await,
            RouteClass::Other => self.network_first_other(request).await,
        }
    }

    /// Static assets: serve the cached copy when present, otherwise fetch
    /// and remember successful responses.
    async fn cache_first(&self, request: &OfflineRequest) -> RoutedResponse {
        if let Some(cached) = self.buckets.match_any(&request.path) {
            debug!(path = %request.path, "static asset served from cache");
            return RoutedResponse::from(cached, ResponseSource::Cache);
        }

        match self.origin.fetch(request).await {
            Ok(response) => {
                if response.status == StatusCode::OK && request.method == Method::GET {
                    self.buckets
                        .put(&static_cache_name(), &request.path, response.clone());
                }
                RoutedResponse::from(response, ResponseSource::Network)
            }
            Err(err) => {
                warn!(path = %request.path, error = %err, "static asset unreachable");
                if request.destination == Destination::Image {
                    placeholder_image()
                } else {
                    unavailable()
                }
            }
        }
    }

    /// API patterns: prefer the network, remember successful responses,
    /// replay the cached copy offline, synthesize the offline payload when
    /// there is nothing to replay.
    async fn network_first_api(&self, request: &OfflineRequest) -> RoutedResponse {
        match self.origin.fetch(request).await {
            Ok(response) => {
                if response.status == StatusCode::OK && request.method == Method::GET {
                    self.buckets
                        .put(&dynamic_cache_name(), &request.path, response.clone());
                }
                RoutedResponse::from(response, ResponseSource::Network)
            }
            Err(err) => {
                debug!(path = %request.path, error = %err, "api fetch failed, trying cache");
                match self.buckets.match_any(&request.path) {
                    Some(cached) => RoutedResponse::from(cached, ResponseSource::Cache),
                    None => offline_api_response(),
                }
            }
        }
    }

    /// Everything else: network-first without caching successes; offline
    /// navigations fall back to the cached app shell.
    async fn network_first_other(&self, request: &OfflineRequest) -> RoutedResponse {
        match self.origin.fetch(request).await {
            Ok(response) => RoutedResponse::from(response, ResponseSource::Network),
            Err(err) => {
                debug!(path = %request.path, error = %err, "fetch failed, trying cache");
                if let Some(cached) = self.buckets.match_any(&request.path) {
                    return RoutedResponse::from(cached, ResponseSource::Cache);
                }
                if request.navigation {
                    if let Some(shell) = self.buckets.match_any("/index.html") {
                        return RoutedResponse::from(shell, ResponseSource::Fallback);
                    }
                }
                unavailable()
            }
        }
    }
}

fn classify(request: &OfflineRequest) -> RouteClass {
    let path = request.path.split('?').next().unwrap_or(&request.path);
    if PRECACHE_MANIFEST.contains(&path)
        || matches!(
            request.destination,
            Destination::Image | Destination::Style | Destination::Script
        )
    {
        return RouteClass::StaticAsset;
    }
    if is_api_cache_path(&request.path) {
        return RouteClass::Api;
    }
    RouteClass::Other
}

fn placeholder_image() -> RoutedResponse {
    RoutedResponse {
        status: StatusCode::OK,
        content_type: "image/svg+xml".to_string(),
        body: bytes::Bytes::from_static(PLACEHOLDER_IMAGE_SVG.as_bytes()),
        source: ResponseSource::Fallback,
    }
}

fn offline_api_response() -> RoutedResponse {
    let response = CachedResponse::json(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({
            "error": "Sin conexión",
            "message": "Esta información no está disponible sin conexión a internet",
            "offline": true,
        }),
    );
    RoutedResponse::from(response, ResponseSource::Fallback)
}

fn unavailable() -> RoutedResponse {
    RoutedResponse {
        status: StatusCode::SERVICE_UNAVAILABLE,
        content_type: "text/plain".to_string(),
        body: bytes::Bytes::new(),
        source: ResponseSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Origin that always fails, optionally counting attempts.
    struct DownOrigin {
        attempts: AtomicUsize,
    }

    impl DownOrigin {
        fn new() -> Self {
            Self {
                attempts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Origin for DownOrigin {
        async fn fetch(
            &self,
            _request: &OfflineRequest,
        ) -> Result<CachedResponse, super::super::OriginError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(super::super::OriginError::Unreachable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn offline_image_gets_the_placeholder() {
        let router = OfflineRouter::new(Arc::new(DownOrigin::new()));
        let response = router
            .handle(&OfflineRequest::asset("/photos/m1.png", Destination::Image))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type, "image/svg+xml");
        assert_eq!(response.source, ResponseSource::Fallback);
        assert!(String::from_utf8_lossy(&response.body).contains("Sin imagen"));
    }

    #[tokio::test]
    async fn offline_static_non_image_is_unavailable() {
        let router = OfflineRouter::new(Arc::new(DownOrigin::new()));
        let response = router
            .handle(&OfflineRequest::asset("/app.js", Destination::Script))
            .await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn query_strings_do_not_break_manifest_classification() {
        let origin = Arc::new(DownOrigin::new());
        let router = OfflineRouter::new(origin.clone());
        router
            .buckets()
            .put(&static_cache_name(), "/index.html", CachedResponse::html("<html>"));

        // "/index.html?v=2" classifies as static but misses the cache by
        // exact path, then falls through to the failing origin.
        let response = router.handle(&OfflineRequest::get("/index.html?v=2")).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(origin.attempts.load(Ordering::SeqCst), 1);
    }
}
