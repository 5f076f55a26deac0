// Content Provider System
//
// Two-tier architecture:
//
// Tier 1: phimtv-providers (Pure provider HTTP clients)
//   - kkphim::KkPhimClient, ophim::OPhimClient, nguonc::NguonCClient
//   - Independent libraries exposing raw wire types only
//
// Tier 2: phimtv-core/provider (ContentProvider adapters)
//   - KkPhimProvider, OPhimProvider, NguonCProvider
//   - Call the tier-1 clients and normalize into the unified model
//
// The CatalogAggregator in phimtv-core/service fans out over a priority
// ordered list of ContentProvider trait objects and merges their output.

pub mod error;
pub mod normalize;
pub mod traits;

// ContentProvider implementations (adapters)
pub mod kkphim;
pub mod nguonc;
pub mod ophim;

pub use error::*;
pub use traits::*;

// Re-export providers
pub use kkphim::KkPhimProvider;
pub use nguonc::NguonCProvider;
pub use ophim::OPhimProvider;
