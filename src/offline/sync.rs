//! Background sync of writes queued while offline.
//!
//! The queue backing store is intentionally unimplemented: [`SyncQueue`] is
//! the seam and [`NoopSyncQueue`] the only shipped implementation, so the
//! replay loop is exercised but no write is ever actually queued.

use bytes::Bytes;
use http::Method;
use thiserror::Error;
use tracing::{error, info};

use super::{Destination, OfflineRequest, Origin};

/// Tag identifying the replay sync event.
pub const SYNC_TAG: &str = "background-sync";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("queue error: {0}")]
    Queue(String),
}

/// A write captured while offline, waiting to be replayed.
#[derive(Debug, Clone)]
pub struct QueuedWrite {
    pub id: String,
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Storage for queued offline writes.
#[async_trait::async_trait]
pub trait SyncQueue: Send + Sync {
    async fn pending(&self) -> Result<Vec<QueuedWrite>, SyncError>;
    async fn remove(&self, id: &str) -> Result<(), SyncError>;
}

/// Queue with no backing store: nothing pending, removals succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSyncQueue;

#[async_trait::async_trait]
impl SyncQueue for NoopSyncQueue {
    async fn pending(&self) -> Result<Vec<QueuedWrite>, SyncError> {
        Ok(Vec::new())
    }

    async fn remove(&self, _id: &str) -> Result<(), SyncError> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub replayed: usize,
    pub failed: usize,
}

/// Replays every pending write through the origin, removing the ones that
/// went through and keeping the ones that failed for the next sync.
pub async fn sync_offline_data(
    origin: &dyn Origin,
    queue: &dyn SyncQueue,
) -> Result<SyncReport, SyncError> {
    let pending = queue.pending().await?;
    let mut report = SyncReport::default();

    for write in pending {
        let request = OfflineRequest {
            method: write.method.clone(),
            path: write.path.clone(),
            destination: Destination::Other,
            navigation: false,
            content_type: write.content_type.clone(),
            body: write.body.clone(),
        };
        match origin.fetch(&request).await {
            Ok(_) => {
                queue.remove(&write.id).await?;
                report.replayed += 1;
            }
            Err(err) => {
                error!(id = %write.id, path = %write.path, error = %err, "replay failed");
                report.failed += 1;
            }
        }
    }

    if report.replayed > 0 || report.failed > 0 {
        info!(replayed = report.replayed, failed = report.failed, "offline sync finished");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::{CachedResponse, OriginError};
    use http::StatusCode;
    use std::sync::Mutex;

    struct RecordingOrigin {
        fail_paths: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Origin for RecordingOrigin {
        async fn fetch(&self, request: &OfflineRequest) -> Result<CachedResponse, OriginError> {
            self.seen.lock().unwrap().push(request.path.clone());
            if self.fail_paths.contains(&request.path) {
                return Err(OriginError::Unreachable("down".to_string()));
            }
            Ok(CachedResponse::json(StatusCode::OK, serde_json::json!({})))
        }
    }

    struct FixedQueue {
        writes: Mutex<Vec<QueuedWrite>>,
    }

    #[async_trait::async_trait]
    impl SyncQueue for FixedQueue {
        async fn pending(&self) -> Result<Vec<QueuedWrite>, SyncError> {
            Ok(self.writes.lock().unwrap().clone())
        }

        async fn remove(&self, id: &str) -> Result<(), SyncError> {
            self.writes.lock().unwrap().retain(|w| w.id != id);
            Ok(())
        }
    }

    fn write(id: &str, path: &str) -> QueuedWrite {
        QueuedWrite {
            id: id.to_string(),
            method: Method::POST,
            path: path.to_string(),
            content_type: Some("application/json".to_string()),
            body: Bytes::from_static(b"{}"),
        }
    }

    #[tokio::test]
    async fn noop_queue_replays_nothing() {
        let origin = RecordingOrigin {
            fail_paths: vec![],
            seen: Mutex::new(vec![]),
        };
        let report = sync_offline_data(&origin, &NoopSyncQueue).await.unwrap();
        assert_eq!(report, SyncReport::default());
        assert!(origin.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_replays_are_removed_failed_ones_kept() {
        let origin = RecordingOrigin {
            fail_paths: vec!["/api/rentals".to_string()],
            seen: Mutex::new(vec![]),
        };
        let queue = FixedQueue {
            writes: Mutex::new(vec![
                write("1", "/api/machinery"),
                write("2", "/api/rentals"),
            ]),
        };

        let report = sync_offline_data(&origin, &queue).await.unwrap();
        assert_eq!(report.replayed, 1);
        assert_eq!(report.failed, 1);

        let remaining = queue.writes.lock().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "2");
    }
}
