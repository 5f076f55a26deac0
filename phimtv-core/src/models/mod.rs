pub mod history;
pub mod movie;
pub mod session;

pub use history::WatchHistoryEntry;
pub use movie::{Episode, Movie, MovieDetail, ServerGroup, StreamMode, TaxonomyTerm};
pub use session::SessionContext;
