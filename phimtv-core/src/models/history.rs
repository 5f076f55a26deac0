use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's most recent position in one movie.
///
/// The remote store keeps at most one logical entry per `(user, movie)`;
/// a newer report for any episode of the same movie replaces the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchHistoryEntry {
    pub movie_slug: String,
    pub episode_slug: String,
    pub episode_name: Option<String>,
    pub progress_seconds: u64,
    pub duration_seconds: u64,
    pub updated_at: DateTime<Utc>,
}

impl WatchHistoryEntry {
    #[must_use]
    pub fn new(
        movie_slug: impl Into<String>,
        episode_slug: impl Into<String>,
        progress_seconds: u64,
        duration_seconds: u64,
    ) -> Self {
        Self {
            movie_slug: movie_slug.into(),
            episode_slug: episode_slug.into(),
            episode_name: None,
            progress_seconds,
            duration_seconds,
            updated_at: Utc::now(),
        }
    }

    /// Completion percentage in 0..=100, 0 when duration is unknown.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        if self.duration_seconds == 0 {
            return 0;
        }
        let pct = self.progress_seconds * 100 / self.duration_seconds;
        pct.min(100) as u8
    }

    /// Stored position converted for the player's millisecond clock.
    #[must_use]
    pub fn position_millis(&self) -> u64 {
        self.progress_seconds * 1_000
    }

    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.updated_at.timestamp_millis()
    }
}
