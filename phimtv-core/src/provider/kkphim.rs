//! KKPhim adapter
//!
//! Maps the KKPhim-family wire format onto the unified model. The mapping
//! helpers here are shared with the OPhim adapter, which speaks the same
//! wire format against a different host and image CDN.

use async_trait::async_trait;
use phimtv_providers::kkphim::types as wire;
use phimtv_providers::KkPhimClient;

use super::normalize::{absolute_image_url, quality_or_default, year_or_current};
use super::{Catalog, ContentProvider, ProviderDetail, ProviderError, Taxonomies};
use crate::config::ProviderEndpoint;
use crate::models::{Episode, Movie, ServerGroup, TaxonomyTerm};

const PROVIDER_NAME: &str = "KKPhim";

/// Listing records often omit quality; detail records are the full-quality
/// source of truth.
const LIST_QUALITY_DEFAULT: &str = "HD";
const DETAIL_QUALITY_DEFAULT: &str = "FHD";

pub struct KkPhimProvider {
    client: KkPhimClient,
    image_base: String,
}

impl KkPhimProvider {
    #[must_use]
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            client: KkPhimClient::new(&endpoint.base_url),
            image_base: endpoint.image_base.clone(),
        }
    }

    fn err(&self, source: phimtv_providers::ProviderClientError) -> ProviderError {
        ProviderError::client(PROVIDER_NAME, source)
    }
}

#[async_trait]
impl ContentProvider for KkPhimProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn movie_list(
        &self,
        catalog: &Catalog,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Movie>, ProviderError> {
        let resp = match catalog {
            Catalog::List(kind) => self.client.list(kind, page, limit).await,
            Catalog::Category(slug) => self.client.list_by_category(slug, page, limit).await,
            Catalog::Country(slug) => self.client.list_by_country(slug, page, limit).await,
        }
        .map_err(|e| self.err(e))?;

        Ok(movies_from_list(&resp, &self.image_base))
    }

    async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<Movie>, ProviderError> {
        let resp = self
            .client
            .search(keyword, limit)
            .await
            .map_err(|e| self.err(e))?;
        Ok(movies_from_list(&resp, &self.image_base))
    }

    async fn movie_detail(&self, slug: &str) -> Result<Option<ProviderDetail>, ProviderError> {
        let resp = self.client.detail(slug).await.map_err(|e| self.err(e))?;
        let Some(raw) = resp.movie else {
            return Ok(None);
        };
        Ok(Some(ProviderDetail {
            movie: movie_from_wire(&raw, &self.image_base, DETAIL_QUALITY_DEFAULT),
            servers: resp.episodes.iter().map(server_from_wire).collect(),
        }))
    }

    async fn taxonomies(&self) -> Result<Taxonomies, ProviderError> {
        let categories = self.client.categories().await.map_err(|e| self.err(e))?;
        let countries = self.client.countries().await.map_err(|e| self.err(e))?;
        Ok(Taxonomies {
            categories: categories.iter().map(term_from_menu).collect(),
            countries: countries.iter().map(term_from_menu).collect(),
        })
    }
}

/// Map a full list response, preferring the image base the response itself
/// advertises over the configured one.
pub(crate) fn movies_from_list(resp: &wire::ListResponse, configured_base: &str) -> Vec<Movie> {
    let image_base = resp.image_base().unwrap_or(configured_base);
    resp.items()
        .iter()
        .map(|m| movie_from_wire(m, image_base, LIST_QUALITY_DEFAULT))
        .collect()
}

pub(crate) fn movie_from_wire(
    raw: &wire::RawMovie,
    image_base: &str,
    quality_default: &str,
) -> Movie {
    Movie {
        id: raw.id.clone(),
        slug: raw.slug.clone(),
        name: raw.name.clone(),
        original_name: raw.origin_name.clone(),
        content: raw.content.clone(),
        year: year_or_current(raw.year),
        quality: quality_or_default(&raw.quality, quality_default),
        language: raw.lang.clone(),
        duration_text: raw.time.clone(),
        thumb_url: absolute_image_url(&raw.thumb_url, image_base),
        poster_url: absolute_image_url(&raw.poster_url, image_base),
        episode_current: raw.episode_current.clone(),
        episode_total: raw.episode_total.clone(),
        categories: raw.category.iter().map(term_from_wire).collect(),
        countries: raw.country.iter().map(term_from_wire).collect(),
    }
}

pub(crate) fn server_from_wire(raw: &wire::RawServer) -> ServerGroup {
    ServerGroup {
        provider_tag: String::new(),
        server_name: raw.server_name.clone(),
        episodes: raw
            .server_data
            .iter()
            .map(|e| Episode {
                slug: e.slug.clone(),
                display_name: e.name.clone(),
                stream_url_hls: none_if_empty(&e.link_m3u8),
                stream_url_embed: none_if_empty(&e.link_embed),
            })
            .collect(),
    }
}

fn term_from_wire(raw: &wire::RawTaxonomy) -> TaxonomyTerm {
    TaxonomyTerm {
        slug: raw.slug.clone(),
        name: raw.name.clone(),
    }
}

fn term_from_menu(raw: &wire::MenuEntry) -> TaxonomyTerm {
    TaxonomyTerm {
        slug: raw.slug.clone(),
        name: raw.name.clone(),
    }
}

fn none_if_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
