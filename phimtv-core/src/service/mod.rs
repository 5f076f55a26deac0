pub mod aggregate;
pub mod enrichment;
pub mod history;
pub mod playback;
pub mod progress;
pub mod selection;
pub mod session;

pub use aggregate::{CatalogAggregator, HomeData};
pub use enrichment::{Decoration, EnrichmentService};
pub use history::{HistoryStore, HttpHistoryStore, InMemoryHistoryStore};
pub use playback::{
    MediaSurface, PipMode, PlaybackEngine, PlaybackState, PlaybackStatus, ResizeMode,
    StatusOutcome,
};
pub use progress::ProgressSyncClient;
pub use selection::{LanguageGroup, Selection};
pub use session::PlayerSession;
