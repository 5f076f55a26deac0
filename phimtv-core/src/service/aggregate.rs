//! Catalog aggregation
//!
//! One generic concurrent-fetch-then-merge path over every configured
//! provider, parameterized by the per-operation fetch and a merge policy:
//! first-wins for scalar metadata (provider priority order), concatenate
//! for episode/server lists. Providers fetch concurrently and settle
//! independently; one failing or slow upstream only shrinks the merged
//! result, bounded by a per-provider timeout.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};

use super::enrichment::EnrichmentService;
use crate::config::ProvidersConfig;
use crate::models::{Movie, MovieDetail, TaxonomyTerm};
use crate::provider::normalize::dedupe_by_slug;
use crate::provider::{Catalog, ContentProvider, ProviderDetail, ProviderError, Taxonomies};

/// Home screen rails, fetched concurrently.
#[derive(Debug, Clone, Default)]
pub struct HomeData {
    pub phim_le: Vec<Movie>,
    pub phim_bo: Vec<Movie>,
    pub hoat_hinh: Vec<Movie>,
    pub tv_shows: Vec<Movie>,
}

/// Aggregates catalog data across providers in priority order.
pub struct CatalogAggregator {
    providers: Vec<Arc<dyn ContentProvider>>,
    request_timeout: Duration,
    /// L1 cache for merged detail documents; detail pages are reopened
    /// often and upstream data changes slowly.
    detail_cache: moka::future::Cache<String, Arc<MovieDetail>>,
    /// Optional TMDB decoration applied to merged details.
    enrichment: Option<Arc<EnrichmentService>>,
}

impl CatalogAggregator {
    /// Create an aggregator over providers in priority order: the first
    /// provider wins metadata ties and list dedup collisions.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn ContentProvider>>, config: &ProvidersConfig) -> Self {
        Self {
            providers,
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
            detail_cache: moka::future::CacheBuilder::new(config.detail_cache_capacity)
                .time_to_live(Duration::from_secs(config.detail_cache_ttl_seconds))
                .build(),
            enrichment: None,
        }
    }

    /// Attach TMDB decoration to merged details. Failures stay invisible.
    pub fn set_enrichment(&mut self, enrichment: Arc<EnrichmentService>) {
        self.enrichment = Some(enrichment);
    }

    /// Run one operation against every provider concurrently, bounding
    /// each with the configured timeout, and settle them independently.
    /// Output order matches provider priority order; a failed provider
    /// yields `None`.
    async fn settle_all<T: Send + 'static>(
        &self,
        op: &'static str,
        fetch: impl Fn(Arc<dyn ContentProvider>) -> BoxFuture<'static, Result<T, ProviderError>>,
    ) -> Vec<Option<T>> {
        let timeout = self.request_timeout;
        let futures = self.providers.iter().map(|provider| {
            let name = provider.name();
            let fut = fetch(provider.clone());
            async move {
                match tokio::time::timeout(timeout, fut).await {
                    Ok(Ok(value)) => Some(value),
                    Ok(Err(e)) => {
                        tracing::warn!(provider = name, op, error = %e, "provider fetch failed");
                        None
                    }
                    Err(_) => {
                        tracing::warn!(
                            provider = name,
                            op,
                            timeout_ms = timeout.as_millis() as u64,
                            "provider fetch timed out"
                        );
                        None
                    }
                }
            }
        });
        join_all(futures).await
    }

    /// Merged movie detail for a slug.
    ///
    /// Metadata comes from the first provider (in priority order) that
    /// returned a record; server groups are collected from every
    /// responsive provider, each group stamped with a provenance tag.
    /// `None` only when no provider produced a record.
    pub async fn movie_detail(&self, slug: &str) -> Option<Arc<MovieDetail>> {
        if let Some(cached) = self.detail_cache.get(slug).await {
            return Some(cached);
        }

        let results = self
            .settle_all("detail", |p| {
                let slug = slug.to_string();
                Box::pin(async move { p.movie_detail(&slug).await })
            })
            .await;

        let mut base: Option<Movie> = None;
        let mut servers = Vec::new();
        for (provider, result) in self.providers.iter().zip(results) {
            let Some(Some(ProviderDetail {
                movie,
                servers: mut groups,
            })) = result
            else {
                continue;
            };
            if base.is_none() {
                base = Some(movie);
            }
            for (i, group) in groups.iter_mut().enumerate() {
                group.provider_tag = format!("{} #{}", provider.name(), i + 1);
            }
            servers.extend(groups);
        }

        let movie = base?;
        let mut detail = MovieDetail {
            movie,
            servers,
            rating: None,
            backdrop_url: None,
        };

        if let Some(enrichment) = &self.enrichment {
            let title = if detail.movie.original_name.is_empty() {
                detail.movie.name.clone()
            } else {
                detail.movie.original_name.clone()
            };
            let is_series = detail
                .movie
                .episode_total
                .trim()
                .parse::<u32>()
                .map(|n| n > 1)
                .unwrap_or(false);
            let deco = enrichment
                .decorate(&title, Some(detail.movie.year), is_series)
                .await;
            detail.rating = deco.rating;
            detail.backdrop_url = deco.backdrop_url;
        }

        let detail = Arc::new(detail);
        self.detail_cache
            .insert(slug.to_string(), detail.clone())
            .await;
        Some(detail)
    }

    /// Merged catalog listing, deduplicated by slug with earlier-priority
    /// providers winning collisions. Empty when every provider failed.
    pub async fn movie_list(&self, catalog: &Catalog, page: u32, limit: u32) -> Vec<Movie> {
        let results = self
            .settle_all("list", |p| {
                let catalog = catalog.clone();
                Box::pin(async move { p.movie_list(&catalog, page, limit).await })
            })
            .await;
        merge_movie_lists(results)
    }

    /// Merged search results, deduplicated like listings.
    pub async fn search(&self, keyword: &str, limit: u32) -> Vec<Movie> {
        let results = self
            .settle_all("search", |p| {
                let keyword = keyword.to_string();
                Box::pin(async move { p.search(&keyword, limit).await })
            })
            .await;
        merge_movie_lists(results)
    }

    /// Home rails fetched concurrently. Each rail degrades independently.
    pub async fn home(&self, limit: u32) -> HomeData {
        let phim_le_cat = Catalog::List("phim-le".to_string());
        let phim_bo_cat = Catalog::List("phim-bo".to_string());
        let hoat_hinh_cat = Catalog::List("hoat-hinh".to_string());
        let tv_shows_cat = Catalog::List("tv-shows".to_string());
        let (phim_le, phim_bo, hoat_hinh, tv_shows) = tokio::join!(
            self.movie_list(&phim_le_cat, 1, limit),
            self.movie_list(&phim_bo_cat, 1, limit),
            self.movie_list(&hoat_hinh_cat, 1, limit),
            self.movie_list(&tv_shows_cat, 1, limit),
        );
        HomeData {
            phim_le,
            phim_bo,
            hoat_hinh,
            tv_shows,
        }
    }

    /// Category and country menus merged across providers, deduplicated
    /// by slug.
    pub async fn taxonomies(&self) -> Taxonomies {
        let results = self
            .settle_all("taxonomies", |p| {
                Box::pin(async move { p.taxonomies().await })
            })
            .await;

        let mut categories = Vec::new();
        let mut countries = Vec::new();
        for taxonomies in results.into_iter().flatten() {
            categories.extend(taxonomies.categories);
            countries.extend(taxonomies.countries);
        }
        Taxonomies {
            categories: dedupe_terms(categories),
            countries: dedupe_terms(countries),
        }
    }
}

fn merge_movie_lists(results: Vec<Option<Vec<Movie>>>) -> Vec<Movie> {
    let merged: Vec<Movie> = results.into_iter().flatten().flatten().collect();
    dedupe_by_slug(merged)
}

fn dedupe_terms(terms: Vec<TaxonomyTerm>) -> Vec<TaxonomyTerm> {
    let mut seen = indexmap::IndexSet::with_capacity(terms.len());
    terms
        .into_iter()
        .filter(|t| !t.slug.is_empty() && seen.insert(t.slug.clone()))
        .collect()
}

impl std::fmt::Debug for CatalogAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogAggregator")
            .field("providers", &self.providers.len())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
