//! Progress sync client
//!
//! Samples playback position reported by the engine and persists it
//! against the history store. Reports are gated on playback-relative
//! distance (position delta), not wall-clock frequency, so a chatty
//! status callback cannot produce bursty network calls. Reports are
//! fire-and-forget: a failed or slow write never stalls the player; the
//! next qualifying tick retries with fresher data. The one exception is
//! teardown, where a forced flush is awaited so the last position
//! survives navigation away.

use std::sync::Arc;

use parking_lot::Mutex;

use super::history::HistoryStore;
use crate::config::SyncConfig;
use crate::models::{SessionContext, WatchHistoryEntry};
use crate::Error;

/// User key for device-local history when no session exists.
const LOCAL_USER: &str = "local";

pub struct ProgressSyncClient {
    store: Arc<dyn HistoryStore>,
    ctx: SessionContext,
    min_report_delta_ms: u64,
    /// Position of the last dispatched report, reset per episode.
    last_reported: Mutex<Option<(String, u64)>>,
}

impl ProgressSyncClient {
    #[must_use]
    pub fn new(store: Arc<dyn HistoryStore>, ctx: SessionContext, config: &SyncConfig) -> Self {
        Self {
            store,
            ctx,
            min_report_delta_ms: config.min_report_interval_ms,
            last_reported: Mutex::new(None),
        }
    }

    fn user_key(&self) -> String {
        self.ctx
            .user_id
            .clone()
            .unwrap_or_else(|| LOCAL_USER.to_string())
    }

    /// Observe one progress sample from the engine.
    ///
    /// Dispatches a background report when the position has moved at least
    /// the configured delta since the last report for this episode (or the
    /// episode changed). Returns whether a report was dispatched.
    pub fn observe(
        &self,
        movie_slug: &str,
        episode_slug: &str,
        position_ms: u64,
        duration_ms: u64,
    ) -> bool {
        {
            let mut last = self.last_reported.lock();
            let due = match last.as_ref() {
                Some((episode, reported_ms)) if episode == episode_slug => {
                    position_ms.abs_diff(*reported_ms) >= self.min_report_delta_ms
                }
                _ => true,
            };
            if !due {
                return false;
            }
            *last = Some((episode_slug.to_string(), position_ms));
        }

        let store = self.store.clone();
        let user = self.user_key();
        let entry = WatchHistoryEntry::new(
            movie_slug,
            episode_slug,
            position_ms / 1_000,
            duration_ms / 1_000,
        );
        tokio::spawn(async move {
            if let Err(e) = store.upsert(&user, entry).await {
                log_write_failure(&e);
            }
        });
        true
    }

    /// Forced flush at session teardown. Bypasses the delta gate and is
    /// awaited; last-position durability outranks throttle discipline
    /// here.
    pub async fn flush(
        &self,
        movie_slug: &str,
        episode_slug: &str,
        position_ms: u64,
        duration_ms: u64,
    ) {
        *self.last_reported.lock() = Some((episode_slug.to_string(), position_ms));
        let entry = WatchHistoryEntry::new(
            movie_slug,
            episode_slug,
            position_ms / 1_000,
            duration_ms / 1_000,
        );
        if let Err(e) = self.store.upsert(&self.user_key(), entry).await {
            log_write_failure(&e);
        }
    }

    /// Resolve the resume position for a session start: the stored
    /// progress for this exact `(movie, episode)`, in milliseconds, or 0.
    /// Store failures resolve to 0; resume is best-effort.
    pub async fn resolve_resume_position(&self, movie_slug: &str, episode_slug: &str) -> u64 {
        match self
            .store
            .find(&self.user_key(), movie_slug, episode_slug)
            .await
        {
            Ok(Some(entry)) if entry.progress_seconds > 0 => entry.position_millis(),
            Ok(_) => 0,
            Err(e) => {
                tracing::debug!(error = %e, movie = movie_slug, "resume lookup failed, starting at 0");
                0
            }
        }
    }
}

fn log_write_failure(e: &Error) {
    match e {
        // anonymous session: device-local behavior, nothing to report
        Error::Unauthorized => {
            tracing::debug!("history write skipped: no authenticated session");
        }
        _ => tracing::warn!(error = %e, "history write failed, will retry on next tick"),
    }
}

impl std::fmt::Debug for ProgressSyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSyncClient")
            .field("min_report_delta_ms", &self.min_report_delta_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::history::InMemoryHistoryStore;

    fn client(store: Arc<InMemoryHistoryStore>) -> ProgressSyncClient {
        ProgressSyncClient::new(
            store,
            SessionContext::authenticated("u1", "token"),
            &SyncConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_throttle_gates_on_position_delta() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        let sync = client(store);

        // 30 seconds of playback, status ticks every 250 ms
        let mut dispatched = 0;
        for tick in 0..120u64 {
            let position_ms = tick * 250;
            if sync.observe("phim-a", "tap-01", position_ms, 60_000) {
                dispatched += 1;
            }
        }
        // once per 5 playback seconds at most
        assert!(dispatched <= 6, "dispatched {dispatched} reports");
        assert!(dispatched >= 5);
    }

    #[tokio::test]
    async fn test_flush_bypasses_throttle() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        let sync = client(store.clone());

        assert!(sync.observe("phim-a", "tap-01", 10_000, 60_000));
        // well inside the gate window
        assert!(!sync.observe("phim-a", "tap-01", 11_000, 60_000));
        sync.flush("phim-a", "tap-01", 11_750, 60_000).await;

        let entry = store.find("u1", "phim-a", "tap-01").await.unwrap().unwrap();
        assert_eq!(entry.progress_seconds, 11);
    }

    #[tokio::test]
    async fn test_episode_change_rearms_gate() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        let sync = client(store);

        assert!(sync.observe("phim-a", "tap-01", 300_000, 600_000));
        // new episode starts near zero; reports immediately despite the
        // small absolute position
        assert!(sync.observe("phim-a", "tap-02", 500, 600_000));
    }

    #[tokio::test]
    async fn test_backward_seek_rearms_gate() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        let sync = client(store);

        assert!(sync.observe("phim-a", "tap-01", 60_000, 600_000));
        assert!(sync.observe("phim-a", "tap-01", 10_000, 600_000));
    }

    #[tokio::test]
    async fn test_resume_resolution() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        store
            .upsert("u1", WatchHistoryEntry::new("phim-a", "tap-01", 120, 2_400))
            .await
            .unwrap();
        let sync = client(store);

        assert_eq!(sync.resolve_resume_position("phim-a", "tap-01").await, 120_000);
        assert_eq!(sync.resolve_resume_position("phim-a", "tap-02").await, 0);
        assert_eq!(sync.resolve_resume_position("phim-b", "tap-01").await, 0);
    }

    #[tokio::test]
    async fn test_zero_progress_starts_at_zero() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        store
            .upsert("u1", WatchHistoryEntry::new("phim-a", "tap-01", 0, 2_400))
            .await
            .unwrap();
        let sync = client(store);
        assert_eq!(sync.resolve_resume_position("phim-a", "tap-01").await, 0);
    }

    #[tokio::test]
    async fn test_anonymous_session_uses_local_store() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        let sync = ProgressSyncClient::new(
            store.clone(),
            SessionContext::anonymous(),
            &SyncConfig::default(),
        );
        sync.flush("phim-a", "tap-01", 30_000, 60_000).await;
        assert!(store.find("local", "phim-a", "tap-01").await.unwrap().is_some());
    }
}
