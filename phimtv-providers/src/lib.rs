// PhimTV Provider Clients
//
// This crate contains pure HTTP client implementations for the upstream
// content catalogs (KKPhim, OPhim, NguonC) and the TMDB metadata API.
// These clients know nothing about the unified movie model; they expose
// each provider's raw response shapes and leave normalization to
// phimtv-core/provider.
//
// Architecture:
// - phimtv-providers: Pure HTTP clients + raw wire types
// - phimtv-core/provider: ContentProvider trait implementations (adapters
//   calling these clients through the source normalizer)
// - phimtv-core/service: CatalogAggregator merging adapter output

// Shared error types
pub mod error;

// HTTP clients (no unified-model dependency)
pub mod kkphim;
pub mod nguonc;
pub mod ophim;
pub mod tmdb;

// Re-export client types for convenience
pub use error::ProviderClientError;
pub use kkphim::KkPhimClient;
pub use nguonc::NguonCClient;
pub use ophim::OPhimClient;
pub use tmdb::TmdbClient;
