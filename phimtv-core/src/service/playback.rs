//! Playback engine
//!
//! One state machine per open player screen. Owns every piece of
//! playback state — play/pause, seeking, lock, speed, framing,
//! brightness gesture, picture-in-picture, episode/server switching —
//! and drives a platform rendering adapter through the [`MediaSurface`]
//! trait. Every operation is total over the current state: an input that
//! is invalid right now (skip while locked, stale status tick) is a
//! no-op, never an error that could tear the session down.

use std::time::{Duration, Instant};

use uuid::Uuid;

use super::selection;
use crate::config::PlayerConfig;
use crate::models::{ServerGroup, StreamMode};

/// Fraction of the dimming overlay shown at zero brightness.
const BRIGHTNESS_OVERLAY_MAX_OPACITY: f64 = 0.75;

/// Platform rendering adapter.
///
/// One implementation drives a native video pipeline, another an embedded
/// web view; the engine only cares which capability it is invoking.
/// Implementations must be non-blocking; completion and progress arrive
/// back through [`PlaybackEngine::on_status`] carrying the generation the
/// load was issued with.
pub trait MediaSurface: Send {
    /// Whether the platform can host a native picture-in-picture window.
    fn supports_native_pip(&self) -> bool {
        false
    }

    fn load_native(&mut self, url: &str, generation: u64);

    fn load_embedded(&mut self, url: &str, generation: u64);

    fn seek_to(&mut self, position_ms: u64);

    fn set_playing(&mut self, playing: bool);

    fn set_rate(&mut self, rate: f64);

    /// Synchronously release the underlying media resource.
    fn teardown(&mut self);
}

/// Core playback states. `locked` and picture-in-picture are orthogonal
/// flags, not states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    /// Recoverable stream failure. The session stays alive; `retry`
    /// reloads with a cache-busting query parameter.
    StreamError { message: String },
}

/// Video framing hint. Rendering-only, no state-machine impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    Fit,
    Fill,
}

/// Picture-in-picture mode. Platforms without native PiP degrade to an
/// in-app mini-player overlay; that degradation is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipMode {
    Off,
    Native { width: u32, height: u32 },
    MiniOverlay,
}

/// One sample from the underlying media pipeline's status callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackStatus {
    /// Load generation this status belongs to. Stale generations are
    /// discarded wholesale.
    pub generation: u64,
    pub is_loaded: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub is_playing: bool,
    pub did_just_finish: bool,
}

/// What a status tick produced for the session driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusOutcome {
    /// `(position_ms, duration_ms)` to feed the progress-sync client.
    /// Present only while actually playing and not mid-seek-drag.
    pub progress: Option<(u64, u64)>,
    /// The stream reached its end on this tick.
    pub ended: bool,
    /// Auto-advance policy resolved the next episode to switch to.
    pub advance_to: Option<String>,
}

/// Playback state machine for a single video session.
pub struct PlaybackEngine {
    config: PlayerConfig,
    surface: Box<dyn MediaSurface>,
    servers: Vec<ServerGroup>,
    session_id: Uuid,

    state: PlaybackState,
    locked: bool,
    pip: PipMode,
    resize_mode: ResizeMode,
    playback_rate: f64,

    current_url: Option<String>,
    is_native: bool,
    position_ms: u64,
    duration_ms: u64,

    /// Monotonic load counter. Incremented on every (re)load and teardown
    /// so late completions for superseded sources are discarded.
    generation: u64,
    /// Seek applied exactly once, on the first loaded status after `load`.
    pending_initial_seek: Option<u64>,
    retry_count: u32,

    /// Scrubber value while a seek drag is in progress. While set, clock
    /// position updates are suppressed so the thumb follows the finger.
    seek_drag: Option<u64>,

    brightness: f64,
    /// Level snapshot taken when a brightness gesture starts. Deltas are
    /// always relative to this snapshot, never accumulated frame-over-frame.
    brightness_gesture_start: Option<f64>,

    controls_visible: bool,
    controls_hide_at: Option<Instant>,
    modal_open: bool,

    server_index: usize,
    episode_slug: Option<String>,
    next_episode_slug: Option<String>,
}

impl PlaybackEngine {
    #[must_use]
    pub fn new(config: PlayerConfig, surface: Box<dyn MediaSurface>, servers: Vec<ServerGroup>) -> Self {
        Self {
            config,
            surface,
            servers,
            session_id: Uuid::new_v4(),
            state: PlaybackState::Idle,
            locked: false,
            pip: PipMode::Off,
            resize_mode: ResizeMode::Fit,
            playback_rate: 1.0,
            current_url: None,
            is_native: true,
            position_ms: 0,
            duration_ms: 0,
            generation: 0,
            pending_initial_seek: None,
            retry_count: 0,
            seek_drag: None,
            brightness: 0.5,
            brightness_gesture_start: None,
            controls_visible: true,
            controls_hide_at: None,
            modal_open: false,
            server_index: 0,
            episode_slug: None,
            next_episode_slug: None,
        }
    }

    // ========== Session setup ==========

    /// Resolve the initial server/episode and load its stream.
    ///
    /// A requested episode missing from the server falls back to the
    /// server's first episode. With no playable source the engine settles
    /// in `StreamError` rather than failing.
    pub fn start(
        &mut self,
        server_index: usize,
        requested_episode: Option<&str>,
        initial_position_ms: u64,
    ) {
        let sel = selection::select(&self.servers, server_index, requested_episode);
        self.server_index = sel.server_index;
        self.episode_slug = sel.episode_slug().map(String::from);
        self.next_episode_slug = sel.next_episode_slug().map(String::from);

        match sel.episode.as_ref().map(crate::models::Episode::stream_mode) {
            Some(StreamMode::Native(url)) => self.load(&url, true, initial_position_ms),
            Some(StreamMode::Embedded(url)) => self.load(&url, false, initial_position_ms),
            Some(StreamMode::Unplayable) | None => {
                self.state = PlaybackState::StreamError {
                    message: "no playable source".to_string(),
                };
            }
        }
    }

    /// Install a new source, superseding any in-flight load.
    ///
    /// The resume position is applied exactly once, on the first loaded
    /// status this load produces; it also pre-positions the seek bar so
    /// the resume point is visible before the stream reports in.
    pub fn load(&mut self, url: &str, is_native: bool, initial_position_ms: u64) {
        self.surface.teardown();
        self.generation += 1;
        self.current_url = Some(url.to_string());
        self.is_native = is_native;
        self.state = PlaybackState::Loading;
        self.position_ms = initial_position_ms;
        self.duration_ms = 0;
        self.seek_drag = None;
        self.pending_initial_seek = (initial_position_ms > 0).then_some(initial_position_ms);

        tracing::debug!(
            session_id = %self.session_id,
            generation = self.generation,
            native = is_native,
            "loading stream"
        );

        if is_native {
            self.surface.load_native(url, self.generation);
        } else {
            self.surface.load_embedded(url, self.generation);
        }
        self.register_interaction();
    }

    /// Tear the session down: release the media resource synchronously and
    /// invalidate the generation so orphaned callbacks cannot write into a
    /// disposed session. Returns the final `(position_ms, duration_ms)`
    /// for the caller's forced progress flush.
    pub fn teardown(&mut self) -> (u64, u64) {
        self.surface.teardown();
        self.generation += 1;
        self.state = PlaybackState::Idle;
        self.controls_hide_at = None;
        (self.position_ms, self.duration_ms)
    }

    // ========== Pipeline callbacks ==========

    /// Fold one status sample from the media pipeline into the machine.
    ///
    /// Samples from superseded loads are discarded. While a seek drag is
    /// active, clock positions are ignored so user input drives the
    /// scrubber.
    pub fn on_status(&mut self, status: PlaybackStatus) -> StatusOutcome {
        let mut outcome = StatusOutcome::default();

        if status.generation != self.generation {
            tracing::trace!(
                session_id = %self.session_id,
                stale = status.generation,
                current = self.generation,
                "discarding status for superseded load"
            );
            return outcome;
        }
        if !status.is_loaded {
            return outcome;
        }

        if let Some(pos) = self.pending_initial_seek.take() {
            self.surface.seek_to(pos);
        }

        self.duration_ms = status.duration_ms;
        if self.seek_drag.is_none() {
            self.position_ms = status.position_ms;
        }

        if status.did_just_finish {
            self.state = PlaybackState::Ended;
            outcome.ended = true;
            if self.config.auto_advance {
                outcome.advance_to = self.next_episode_slug.clone();
            }
            if outcome.advance_to.is_none() {
                self.state = PlaybackState::Paused;
            }
            return outcome;
        }

        self.state = if status.is_playing {
            PlaybackState::Playing
        } else if matches!(self.state, PlaybackState::Loading) {
            PlaybackState::Ready
        } else {
            PlaybackState::Paused
        };

        if status.is_playing && self.seek_drag.is_none() {
            outcome.progress = Some((self.position_ms, self.duration_ms));
        }
        outcome
    }

    /// A stream failed to start or continue. Recoverable; the session
    /// stays alive and offers retry.
    pub fn on_stream_error(&mut self, generation: u64, message: impl Into<String>) {
        if generation != self.generation {
            return;
        }
        let message = message.into();
        tracing::warn!(session_id = %self.session_id, error = %message, "stream error");
        self.state = PlaybackState::StreamError { message };
    }

    /// Reload the current source with a cache-busting query parameter,
    /// resuming from the last known position.
    pub fn retry(&mut self) {
        let Some(url) = self.current_url.clone() else {
            return;
        };
        if !matches!(self.state, PlaybackState::StreamError { .. }) {
            return;
        }
        self.retry_count += 1;
        let sep = if url.contains('?') { '&' } else { '?' };
        let busted = format!("{url}{sep}retry={}", self.retry_count);
        let resume = self.position_ms;
        let native = self.is_native;
        self.load(&busted, native, resume);
        // keep pointing retries at the original URL, not the busted one
        self.current_url = Some(url);
    }

    // ========== Transport controls ==========

    pub fn play(&mut self) {
        if self.locked {
            return;
        }
        self.surface.set_playing(true);
        self.state = PlaybackState::Playing;
        self.register_interaction();
    }

    pub fn pause(&mut self) {
        if self.locked {
            return;
        }
        self.surface.set_playing(false);
        self.state = PlaybackState::Paused;
        self.register_interaction();
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek to an absolute position, clamped to `[0, duration]`.
    pub fn seek_to(&mut self, position_ms: u64) {
        if self.locked {
            return;
        }
        let clamped = position_ms.min(self.duration_ms);
        self.surface.seek_to(clamped);
        self.position_ms = clamped;
        self.register_interaction();
    }

    /// Seek relative to the current position.
    pub fn skip(&mut self, delta_ms: i64) {
        if self.locked {
            return;
        }
        let target = self.position_ms.saturating_add_signed(delta_ms);
        self.seek_to(target.min(self.duration_ms));
    }

    // ========== Seek drag ==========

    /// A scrubber drag started: freeze the displayed position under the
    /// user's finger.
    pub fn begin_seek_drag(&mut self) {
        if self.locked {
            return;
        }
        self.seek_drag = Some(self.position_ms);
    }

    /// Drag moved; only the drag value updates, never the clock.
    pub fn update_seek_drag(&mut self, value_ms: u64) {
        if self.seek_drag.is_some() {
            self.seek_drag = Some(value_ms.min(self.duration_ms));
        }
    }

    /// Drag released: commit the final value and resume clock updates.
    pub fn complete_seek_drag(&mut self, value_ms: u64) {
        if self.seek_drag.take().is_none() {
            return;
        }
        let clamped = value_ms.min(self.duration_ms);
        self.surface.seek_to(clamped);
        self.position_ms = clamped;
        self.register_interaction();
    }

    /// Position shown on the scrubber: drag value while dragging,
    /// playback clock otherwise.
    #[must_use]
    pub fn scrubber_position_ms(&self) -> u64 {
        self.seek_drag.unwrap_or(self.position_ms)
    }

    // ========== Rate / framing ==========

    /// Cycle to the next configured playback rate.
    pub fn cycle_playback_rate(&mut self) {
        let rates = &self.config.playback_rates;
        if rates.is_empty() {
            return;
        }
        let idx = rates
            .iter()
            .position(|r| (*r - self.playback_rate).abs() < f64::EPSILON)
            .map_or(0, |i| (i + 1) % rates.len());
        self.set_playback_rate(rates[idx]);
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
        self.surface.set_rate(rate);
        self.register_interaction();
    }

    pub fn toggle_resize_mode(&mut self) {
        self.resize_mode = match self.resize_mode {
            ResizeMode::Fit => ResizeMode::Fill,
            ResizeMode::Fill => ResizeMode::Fit,
        };
        self.register_interaction();
    }

    // ========== Brightness gesture ==========

    /// Snapshot the current level; subsequent deltas are relative to it.
    pub fn begin_brightness_gesture(&mut self) {
        if self.locked {
            return;
        }
        self.brightness_gesture_start = Some(self.brightness);
    }

    /// Apply the gesture's total vertical drag (positive = downward).
    /// Computed from the snapshot each time so per-frame rounding cannot
    /// drift the level.
    pub fn update_brightness_gesture(&mut self, total_drag_px: f64) {
        let Some(start) = self.brightness_gesture_start else {
            return;
        };
        let level = start - total_drag_px / self.config.brightness_gesture_divisor;
        self.brightness = level.clamp(0.0, 1.0);
    }

    pub fn end_brightness_gesture(&mut self) {
        self.brightness_gesture_start = None;
    }

    /// Opacity of the dimming overlay that renders sub-system brightness.
    #[must_use]
    pub fn brightness_overlay_opacity(&self) -> f64 {
        (1.0 - self.brightness) * BRIGHTNESS_OVERLAY_MAX_OPACITY
    }

    // ========== Lock / PiP ==========

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked {
            // timer suspended entirely while locked
            self.controls_hide_at = None;
        } else {
            self.register_interaction();
        }
    }

    pub fn toggle_lock(&mut self) {
        self.set_locked(!self.locked);
    }

    /// Enter picture-in-picture, degrading to the in-app mini overlay on
    /// platforms without native support.
    pub fn enter_picture_in_picture(&mut self, width: u32, height: u32) {
        self.pip = if self.surface.supports_native_pip() {
            PipMode::Native { width, height }
        } else {
            PipMode::MiniOverlay
        };
    }

    pub fn exit_picture_in_picture(&mut self) {
        self.pip = PipMode::Off;
    }

    // ========== Episode / server switching ==========

    /// Switch server, keeping the same episode when the new server carries
    /// its slug, else falling back to the new server's first episode.
    pub fn switch_server(&mut self, new_server_index: usize) {
        if self.locked {
            return;
        }
        let requested = self.episode_slug.clone();
        let sel = selection::select(&self.servers, new_server_index, requested.as_deref());
        self.apply_selection(sel);
    }

    /// Switch episode within the current server.
    pub fn switch_episode(&mut self, episode_slug: &str) {
        if self.locked {
            return;
        }
        let sel = selection::select(&self.servers, self.server_index, Some(episode_slug));
        self.apply_selection(sel);
    }

    fn apply_selection(&mut self, sel: selection::Selection) {
        self.server_index = sel.server_index;
        self.episode_slug = sel.episode_slug().map(String::from);
        self.next_episode_slug = sel.next_episode_slug().map(String::from);
        self.retry_count = 0;

        match sel.episode.as_ref().map(crate::models::Episode::stream_mode) {
            Some(StreamMode::Native(url)) => self.load(&url, true, 0),
            Some(StreamMode::Embedded(url)) => self.load(&url, false, 0),
            Some(StreamMode::Unplayable) | None => {
                self.state = PlaybackState::StreamError {
                    message: "no playable source".to_string(),
                };
            }
        }
    }

    // ========== Controls visibility ==========

    /// Any qualifying user input shows the controls and re-arms the
    /// auto-hide timer. The timer stays disarmed while locked or while a
    /// picker modal is open.
    pub fn register_interaction(&mut self) {
        self.controls_visible = true;
        self.controls_hide_at = if self.locked || self.modal_open {
            None
        } else {
            Some(Instant::now() + Duration::from_secs(self.config.controls_hide_seconds))
        };
    }

    pub fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
        if open {
            self.controls_hide_at = None;
        } else {
            self.register_interaction();
        }
    }

    /// Advance the auto-hide timer. Drivers call this from their own
    /// clock; nothing else in the engine depends on wall time.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.controls_hide_at {
            if now >= deadline {
                self.controls_visible = false;
                self.controls_hide_at = None;
            }
        }
    }

    // ========== Accessors ==========

    #[must_use]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    #[must_use]
    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    #[must_use]
    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    #[must_use]
    pub fn resize_mode(&self) -> ResizeMode {
        self.resize_mode
    }

    #[must_use]
    pub fn pip_mode(&self) -> PipMode {
        self.pip
    }

    #[must_use]
    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        self.is_native
    }

    #[must_use]
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    #[must_use]
    pub fn server_index(&self) -> usize {
        self.server_index
    }

    #[must_use]
    pub fn episode_slug(&self) -> Option<&str> {
        self.episode_slug.as_deref()
    }

    #[must_use]
    pub fn next_episode_slug(&self) -> Option<&str> {
        self.next_episode_slug.as_deref()
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}
