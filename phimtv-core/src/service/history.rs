//! Watch-history store
//!
//! The "currently watching" collection is per-movie, not per-episode: an
//! upsert for any episode of a movie replaces that movie's prior entry
//! and moves it to the front, and the collection keeps only the most
//! recent distinct movies (oldest evicted). Writes are last-write-wins
//! across devices; no distributed locking.
//!
//! Two implementations: the HTTP store against the user-data backend for
//! authenticated sessions, and an in-memory store that doubles as the
//! device-local fallback when no valid session exists.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::models::{SessionContext, WatchHistoryEntry};
use crate::{Error, Result};

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert or replace the entry for `(user, entry.movie_slug)`,
    /// moving it to the front of the recency list.
    async fn upsert(&self, user_id: &str, entry: WatchHistoryEntry) -> Result<()>;

    /// Entries most recent first.
    async fn recent(&self, user_id: &str) -> Result<Vec<WatchHistoryEntry>>;

    /// The stored entry for a `(movie, episode)` pair, if the movie's
    /// current entry is for that episode.
    async fn find(
        &self,
        user_id: &str,
        movie_slug: &str,
        episode_slug: &str,
    ) -> Result<Option<WatchHistoryEntry>> {
        Ok(self
            .recent(user_id)
            .await?
            .into_iter()
            .find(|e| e.movie_slug == movie_slug && e.episode_slug == episode_slug))
    }
}

/// In-memory history store, bounded per user.
///
/// Used directly in tests and as the device-only fallback for anonymous
/// sessions.
pub struct InMemoryHistoryStore {
    limit: usize,
    entries: RwLock<HashMap<String, Vec<WatchHistoryEntry>>>,
}

impl InMemoryHistoryStore {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn upsert(&self, user_id: &str, entry: WatchHistoryEntry) -> Result<()> {
        let mut entries = self.entries.write();
        let list = entries.entry(user_id.to_string()).or_default();
        list.retain(|e| e.movie_slug != entry.movie_slug);
        list.insert(0, entry);
        list.truncate(self.limit);
        Ok(())
    }

    async fn recent(&self, user_id: &str) -> Result<Vec<WatchHistoryEntry>> {
        Ok(self
            .entries
            .read()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Wire shape for history reports. The backend accepts both the legacy
/// and the current field names, so both are sent.
#[derive(Debug, Serialize)]
struct HistoryReportBody<'a> {
    slug: &'a str,
    episode: &'a str,
    #[serde(rename = "movieSlug")]
    movie_slug: &'a str,
    #[serde(rename = "episodeSlug")]
    episode_slug: &'a str,
    progress: u64,
    duration: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HistoryListBody {
    history: Vec<HistoryListItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HistoryListItem {
    slug: String,
    #[serde(rename = "movieSlug")]
    movie_slug: String,
    episode: String,
    #[serde(rename = "episodeSlug")]
    episode_slug: String,
    episode_name: Option<String>,
    #[serde(rename = "currentTime")]
    current_time: u64,
    duration: u64,
    timestamp: i64,
}

impl HistoryListItem {
    fn into_entry(self) -> WatchHistoryEntry {
        WatchHistoryEntry {
            movie_slug: if self.movie_slug.is_empty() {
                self.slug
            } else {
                self.movie_slug
            },
            episode_slug: if self.episode_slug.is_empty() {
                self.episode
            } else {
                self.episode_slug
            },
            episode_name: self.episode_name,
            progress_seconds: self.current_time,
            duration_seconds: self.duration,
            updated_at: chrono::DateTime::from_timestamp_millis(self.timestamp)
                .unwrap_or_else(chrono::Utc::now),
        }
    }
}

/// History store backed by the user-data backend's REST endpoints.
/// Requires a bearer token; anonymous contexts get `Unauthorized` and
/// callers degrade to device-local behavior.
pub struct HttpHistoryStore {
    client: reqwest::Client,
    base_url: String,
    ctx: SessionContext,
}

impl HttpHistoryStore {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: std::time::Duration,
        ctx: SessionContext,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build history HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ctx,
        })
    }

    fn token(&self) -> Result<&str> {
        self.ctx.auth_token.as_deref().ok_or(Error::Unauthorized)
    }
}

#[async_trait]
impl HistoryStore for HttpHistoryStore {
    async fn upsert(&self, _user_id: &str, entry: WatchHistoryEntry) -> Result<()> {
        let token = self.token()?;
        let body = HistoryReportBody {
            slug: &entry.movie_slug,
            episode: &entry.episode_slug,
            movie_slug: &entry.movie_slug,
            episode_slug: &entry.episode_slug,
            progress: entry.progress_seconds,
            duration: entry.duration_seconds,
        };
        let resp = self
            .client
            .post(format!("{}/api/user/history", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::SyncWrite(e.to_string()))?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            reqwest::StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            s => Err(Error::SyncWrite(format!("history report rejected: {s}"))),
        }
    }

    async fn recent(&self, _user_id: &str) -> Result<Vec<WatchHistoryEntry>> {
        let token = self.token()?;
        let resp = self
            .client
            .get(format!("{}/api/user/history", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::SyncWrite(e.to_string()))?;

        match resp.status() {
            s if s.is_success() => {
                let body: HistoryListBody = resp
                    .json()
                    .await
                    .map_err(|e| Error::SyncWrite(e.to_string()))?;
                Ok(body.history.into_iter().map(HistoryListItem::into_entry).collect())
            }
            reqwest::StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            s => Err(Error::SyncWrite(format!("history fetch rejected: {s}"))),
        }
    }
}
