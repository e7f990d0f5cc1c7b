//! Origin backed by the in-process axum router.

use axum::body::Body;
use http::header::CONTENT_TYPE;
use http::Request;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use super::{CachedResponse, OfflineRequest, Origin, OriginError};

/// Drives requests through an axum [`Router`](axum::Router), so the offline
/// router can front the application without a socket in between.
#[derive(Clone)]
pub struct RouterOrigin {
    router: axum::Router,
}

impl RouterOrigin {
    pub fn new(router: axum::Router) -> Self {
        Self { router }
    }
}

#[async_trait::async_trait]
impl Origin for RouterOrigin {
    async fn fetch(&self, request: &OfflineRequest) -> Result<CachedResponse, OriginError> {
        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(request.path.as_str());
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let req = builder
            .body(Body::from(request.body.clone()))
            .map_err(|err| OriginError::Unreachable(err.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .map_err(|err| OriginError::Unreachable(err.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|err| OriginError::Unreachable(err.to_string()))?
            .to_bytes();

        Ok(CachedResponse {
            status,
            content_type,
            body,
        })
    }
}
