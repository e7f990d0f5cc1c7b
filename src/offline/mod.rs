//! Offline request routing.
//!
//! A service-worker-shaped component that decides, per request, whether to
//! answer from a cache bucket or from the origin: cache-first for static
//! assets, network-first for the API path patterns and for navigations,
//! with synthesized fallbacks when both sides fail. Buckets are versioned
//! by name; `install` pre-populates the static bucket from a fixed manifest
//! and `activate` drops buckets left over from previous versions.

use bytes::Bytes;
use dashmap::DashMap;
use http::{Method, StatusCode};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub mod origin;
pub mod router;
pub mod sync;

pub use origin::RouterOrigin;
pub use router::{Lifecycle, OfflineRouter};
pub use sync::{sync_offline_data, NoopSyncQueue, QueuedWrite, SyncQueue, SyncReport, SYNC_TAG};

/// Version baked into the bucket names; bumping it strands the previous
/// buckets until `activate` deletes them.
pub const CACHE_VERSION: &str = "1.0.0";

pub fn cache_name() -> String {
    format!("fleetrent-v{CACHE_VERSION}")
}

pub fn static_cache_name() -> String {
    format!("fleetrent-static-v{CACHE_VERSION}")
}

pub fn dynamic_cache_name() -> String {
    format!("fleetrent-dynamic-v{CACHE_VERSION}")
}

/// Paths pre-cached into the static bucket at install time. `/index.html`
/// doubles as the app shell served to offline navigations.
pub const PRECACHE_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

/// API paths cached network-first into the dynamic bucket.
static API_CACHE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^/api/machinery",
        r"^/api/vehicles",
        r"^/api/warehouses",
        r"^/api/tools",
        r"^/api/spareparts",
        r"^/api/alerts",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

pub fn is_api_cache_path(path: &str) -> bool {
    API_CACHE_PATTERNS.iter().any(|re| re.is_match(path))
}

/// What the request is fetching, mirroring the browser's
/// `request.destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Image,
    Style,
    Script,
    Other,
}

/// A request as seen by the offline router.
#[derive(Debug, Clone)]
pub struct OfflineRequest {
    pub method: Method,
    pub path: String,
    pub destination: Destination,
    /// Browser navigation (`request.mode === "navigate"`).
    pub navigation: bool,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl OfflineRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::GET,
            path: path.to_string(),
            destination: Destination::Other,
            navigation: false,
            content_type: None,
            body: Bytes::new(),
        }
    }

    pub fn navigate(path: &str) -> Self {
        Self {
            destination: Destination::Document,
            navigation: true,
            ..Self::get(path)
        }
    }

    pub fn asset(path: &str, destination: Destination) -> Self {
        Self {
            destination,
            ..Self::get(path)
        }
    }
}

/// A response as stored in (and replayed from) a bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body: Bytes::from(body.to_string()),
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/html".to_string(),
            body: Bytes::copy_from_slice(body.as_bytes()),
        }
    }
}

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    Fallback,
}

/// What the router hands back to the caller.
#[derive(Debug, Clone)]
pub struct RoutedResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl RoutedResponse {
    fn from(response: CachedResponse, source: ResponseSource) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            body: response.body,
            source,
        }
    }

    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Debug, Error)]
pub enum OriginError {
    #[error("origin unreachable: {0}")]
    Unreachable(String),
}

/// The "network" side of the router.
#[async_trait::async_trait]
pub trait Origin: Send + Sync {
    async fn fetch(&self, request: &OfflineRequest) -> Result<CachedResponse, OriginError>;
}

#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("install failed pre-caching {path}: {reason}")]
    InstallFailed { path: String, reason: String },
}

/// Named cache buckets, each mapping a request path to its stored response.
#[derive(Debug, Default)]
pub struct BucketStore {
    buckets: DashMap<String, DashMap<String, CachedResponse>>,
}

impl BucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the bucket if absent.
    pub fn ensure(&self, name: &str) {
        self.buckets.entry(name.to_string()).or_default();
    }

    pub fn put(&self, bucket: &str, path: &str, response: CachedResponse) {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(path.to_string(), response);
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<CachedResponse> {
        self.buckets
            .get(bucket)?
            .get(path)
            .map(|entry| entry.value().clone())
    }

    /// Looks the path up across every bucket, static bucket first, then
    /// dynamic, then the rest.
    pub fn match_any(&self, path: &str) -> Option<CachedResponse> {
        for name in [static_cache_name(), dynamic_cache_name()] {
            if let Some(hit) = self.get(&name, path) {
                return Some(hit);
            }
        }
        self.buckets
            .iter()
            .find_map(|bucket| bucket.get(path).map(|entry| entry.value().clone()))
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.key().clone()).collect()
    }

    pub fn delete_bucket(&self, name: &str) -> bool {
        self.buckets.remove(name).is_some()
    }

    pub fn contains_bucket(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_patterns_match_their_prefixes() {
        assert!(is_api_cache_path("/api/machinery"));
        assert!(is_api_cache_path("/api/machinery/abc123"));
        assert!(is_api_cache_path("/api/spareparts?page=2"));
        assert!(!is_api_cache_path("/api/rentals"));
        assert!(!is_api_cache_path("/machinery"));
    }

    #[test]
    fn bucket_names_carry_the_version() {
        assert_eq!(static_cache_name(), format!("fleetrent-static-v{CACHE_VERSION}"));
        assert_ne!(static_cache_name(), dynamic_cache_name());
    }

    #[test]
    fn match_any_prefers_the_static_bucket() {
        let store = BucketStore::new();
        store.put(&dynamic_cache_name(), "/x", CachedResponse::html("dynamic"));
        store.put(&static_cache_name(), "/x", CachedResponse::html("static"));

        let hit = store.match_any("/x").unwrap();
        assert_eq!(hit.body.as_ref(), b"static");
    }
}
