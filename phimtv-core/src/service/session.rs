//! Player session wiring
//!
//! Glue between one playback engine and the progress-sync client for the
//! lifetime of a player screen: resolves the resume position before the
//! first load, forwards progress samples, applies auto-advance, and
//! forces a final flush on close.

use std::sync::Arc;

use super::playback::{MediaSurface, PlaybackEngine, PlaybackStatus, StatusOutcome};
use super::progress::ProgressSyncClient;
use crate::config::PlayerConfig;
use crate::models::MovieDetail;

pub struct PlayerSession {
    engine: PlaybackEngine,
    sync: Arc<ProgressSyncClient>,
    movie_slug: String,
}

impl PlayerSession {
    /// Open a session: resolve the resume position for the requested
    /// episode, then start the engine on it. The resume position is in
    /// place before the engine's first load, so the seek bar reflects it
    /// from first paint.
    pub async fn start(
        config: PlayerConfig,
        surface: Box<dyn MediaSurface>,
        detail: &MovieDetail,
        server_index: usize,
        requested_episode: Option<&str>,
        sync: Arc<ProgressSyncClient>,
    ) -> Self {
        let mut engine = PlaybackEngine::new(config, surface, detail.servers.clone());

        let sel = super::selection::select(&detail.servers, server_index, requested_episode);
        let initial_position_ms = match sel.episode_slug() {
            Some(episode) => {
                sync.resolve_resume_position(&detail.movie.slug, episode)
                    .await
            }
            None => 0,
        };

        engine.start(server_index, requested_episode, initial_position_ms);

        Self {
            engine,
            sync,
            movie_slug: detail.movie.slug.clone(),
        }
    }

    /// Forward one pipeline status sample: progress flows to the sync
    /// client (fire-and-forget), and the auto-advance policy's episode
    /// switch is applied.
    pub fn on_status(&mut self, status: PlaybackStatus) -> StatusOutcome {
        let outcome = self.engine.on_status(status);

        if let (Some((position_ms, duration_ms)), Some(episode)) =
            (outcome.progress, self.engine.episode_slug())
        {
            self.sync
                .observe(&self.movie_slug, episode, position_ms, duration_ms);
        }

        if let Some(next) = &outcome.advance_to {
            let next = next.clone();
            self.engine.switch_episode(&next);
        }

        outcome
    }

    /// Close the session: release the media resource synchronously, then
    /// flush the final position even if the throttle window has not
    /// elapsed.
    pub async fn close(mut self) {
        let episode = self.engine.episode_slug().map(String::from);
        let (position_ms, duration_ms) = self.engine.teardown();
        if let Some(episode) = episode {
            self.sync
                .flush(&self.movie_slug, &episode, position_ms, duration_ms)
                .await;
        }
    }

    #[must_use]
    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.engine
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("movie_slug", &self.movie_slug)
            .field("engine", &self.engine)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::models::{Episode, Movie, SessionContext, ServerGroup, WatchHistoryEntry};
    use crate::service::history::{HistoryStore, InMemoryHistoryStore};
    use crate::service::playback::PlaybackStatus;

    struct NullSurface;

    impl MediaSurface for NullSurface {
        fn load_native(&mut self, _url: &str, _generation: u64) {}
        fn load_embedded(&mut self, _url: &str, _generation: u64) {}
        fn seek_to(&mut self, _position_ms: u64) {}
        fn set_playing(&mut self, _playing: bool) {}
        fn set_rate(&mut self, _rate: f64) {}
        fn teardown(&mut self) {}
    }

    fn detail() -> MovieDetail {
        MovieDetail {
            movie: Movie {
                slug: "tay-du-ky".to_string(),
                name: "Tây Du Ký".to_string(),
                ..Movie::default()
            },
            servers: vec![ServerGroup {
                provider_tag: "KKPhim #1".to_string(),
                server_name: "Vietsub #1".to_string(),
                episodes: vec![Episode {
                    slug: "tap-01".to_string(),
                    display_name: "Tập 01".to_string(),
                    stream_url_hls: Some("https://m/1.m3u8".to_string()),
                    stream_url_embed: None,
                }],
            }],
            rating: None,
            backdrop_url: None,
        }
    }

    fn sync_client(store: Arc<InMemoryHistoryStore>) -> Arc<ProgressSyncClient> {
        Arc::new(ProgressSyncClient::new(
            store,
            SessionContext::authenticated("u1", "token"),
            &SyncConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_start_resumes_from_stored_history() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        store
            .upsert("u1", WatchHistoryEntry::new("tay-du-ky", "tap-01", 120, 2_400))
            .await
            .expect("in-memory upsert");

        let session = PlayerSession::start(
            PlayerConfig::default(),
            Box::new(NullSurface),
            &detail(),
            0,
            Some("tap-01"),
            sync_client(store),
        )
        .await;

        // resume position in place before the first status tick arrives
        assert_eq!(session.engine().position_ms(), 120_000);
    }

    #[tokio::test]
    async fn test_close_flushes_final_position() {
        let store = Arc::new(InMemoryHistoryStore::new(100));
        let mut session = PlayerSession::start(
            PlayerConfig::default(),
            Box::new(NullSurface),
            &detail(),
            0,
            Some("tap-01"),
            sync_client(store.clone()),
        )
        .await;

        let generation = session.engine().generation();
        session.on_status(PlaybackStatus {
            generation,
            is_loaded: true,
            position_ms: 42_000,
            duration_ms: 60_000,
            is_playing: true,
            did_just_finish: false,
        });
        session.close().await;

        let entry = store
            .find("u1", "tay-du-ky", "tap-01")
            .await
            .expect("store read")
            .expect("entry written at teardown");
        assert_eq!(entry.progress_seconds, 42);
        assert_eq!(entry.duration_seconds, 60);
    }
}
