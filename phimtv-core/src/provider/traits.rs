// Content Provider Traits
//
// Core interface the aggregation layer fans out over.

use async_trait::async_trait;

use super::ProviderError;
use crate::models::{Movie, ServerGroup, TaxonomyTerm};

/// Which catalog listing to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Catalog {
    /// Curated list kind, e.g. `phim-le`, `phim-bo`, `hoat-hinh`, `tv-shows`.
    List(String),
    /// Movies in a category (genre) by slug.
    Category(String),
    /// Movies from a country by slug.
    Country(String),
}

/// A provider's contribution to a movie detail: its own metadata record
/// plus zero or more server groups. Groups arrive untagged; the merge
/// step stamps provenance tags.
#[derive(Debug, Clone, Default)]
pub struct ProviderDetail {
    pub movie: Movie,
    pub servers: Vec<ServerGroup>,
}

/// Category and country menu taxonomies.
#[derive(Debug, Clone, Default)]
pub struct Taxonomies {
    pub categories: Vec<TaxonomyTerm>,
    pub countries: Vec<TaxonomyTerm>,
}

/// Upstream content provider.
///
/// Implementations wrap a tier-1 HTTP client and normalize its raw
/// response shapes into the unified model: image URLs are made absolute
/// against the provider's image base, missing optional fields are
/// default-filled, and absent collections come back empty rather than
/// erroring.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Provider display name, also used in provenance tags (e.g. "KKPhim").
    fn name(&self) -> &'static str;

    /// Fetch one page of a catalog listing.
    async fn movie_list(
        &self,
        catalog: &Catalog,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Movie>, ProviderError>;

    /// Search by keyword.
    async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<Movie>, ProviderError>;

    /// Fetch a movie's metadata and server groups. `Ok(None)` when the
    /// provider has no record for the slug.
    async fn movie_detail(&self, slug: &str) -> Result<Option<ProviderDetail>, ProviderError>;

    /// Category/country menu taxonomies. Providers without a menu endpoint
    /// contribute nothing.
    async fn taxonomies(&self) -> Result<Taxonomies, ProviderError> {
        Ok(Taxonomies::default())
    }
}
