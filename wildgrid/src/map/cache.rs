//! Time-windowed snapshot cache.
//!
//! One cache slot is shared by every query a client issues. Within the TTL
//! window the cached snapshot is returned as-is, even when the caller asked
//! for a different cell set; the slot is a throttle on the shared snapshot,
//! not a per-location cache.
//!
//! The mutex is held across the fetch itself, so concurrent callers never
//! race the read-check-write sequence: whoever wins the lock fetches, and
//! everyone queued behind them observes the freshly stored snapshot.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ClientError;
use crate::map::snapshot::MapSnapshot;

/// How long a fetched snapshot satisfies subsequent queries, in
/// milliseconds.
pub const DEFAULT_TTL_MS: u64 = 5_000;

struct CacheState {
    snapshot: Arc<MapSnapshot>,
    last_fetch_ms: u64,
}

/// Single-slot snapshot cache with single-flight fetching.
pub(crate) struct SnapshotCache {
    state: Mutex<CacheState>,
    ttl_ms: u64,
}

impl SnapshotCache {
    /// Creates an empty cache. The initial timestamp of zero makes the
    /// first query always fetch.
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            state: Mutex::new(CacheState {
                snapshot: Arc::new(MapSnapshot::empty()),
                last_fetch_ms: 0,
            }),
            ttl_ms,
        }
    }

    /// Returns the cached snapshot if the TTL window is still open,
    /// otherwise runs `fetch` and stores its result.
    ///
    /// A failed fetch leaves both the snapshot and the timestamp untouched;
    /// the previous snapshot stays valid for the next call's TTL check.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        now_ms: u64,
        fetch: F,
    ) -> Result<Arc<MapSnapshot>, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MapSnapshot, ClientError>>,
    {
        let mut state = self.state.lock().await;

        let age_ms = now_ms.saturating_sub(state.last_fetch_ms);
        if age_ms < self.ttl_ms {
            debug!(age_ms, "serving cached map snapshot");
            return Ok(state.snapshot.clone());
        }

        let snapshot = Arc::new(fetch().await?);
        state.snapshot = snapshot.clone();
        state.last_fetch_ms = now_ms;
        debug!(now_ms, "stored fresh map snapshot");
        Ok(snapshot)
    }
}
