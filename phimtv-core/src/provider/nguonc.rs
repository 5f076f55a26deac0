//! NguonC adapter
//!
//! NguonC's shapes diverge the most from the other providers: episodes
//! nest under `episodes[].items` with `embed`/`m3u8` keys, taxonomy comes
//! as a numbered map of named groups without slugs, and image URLs are
//! already absolute.

use async_trait::async_trait;
use phimtv_providers::nguonc::types as wire;
use phimtv_providers::NguonCClient;

use super::normalize::{absolute_image_url, quality_or_default, slugify, year_or_current};
use super::{Catalog, ContentProvider, ProviderDetail, ProviderError};
use crate::config::ProviderEndpoint;
use crate::models::{Episode, Movie, ServerGroup, TaxonomyTerm};

const PROVIDER_NAME: &str = "NguonC";

const LIST_QUALITY_DEFAULT: &str = "HD";
const DETAIL_QUALITY_DEFAULT: &str = "FHD";

/// Taxonomy group names inside NguonC's numbered category map.
const GENRE_GROUP: &str = "Thể loại";
const COUNTRY_GROUP: &str = "Quốc gia";
const YEAR_GROUP: &str = "Năm";

pub struct NguonCProvider {
    client: NguonCClient,
    image_base: String,
}

impl NguonCProvider {
    #[must_use]
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            client: NguonCClient::new(&endpoint.base_url),
            image_base: endpoint.image_base.clone(),
        }
    }

    fn err(&self, source: phimtv_providers::ProviderClientError) -> ProviderError {
        ProviderError::client(PROVIDER_NAME, source)
    }

    fn movie_from_wire(&self, raw: &wire::RawMovie, quality_default: &str) -> Movie {
        Movie {
            id: raw.id.clone(),
            slug: raw.slug.clone(),
            name: raw.name.clone(),
            original_name: raw.original_name.clone(),
            content: raw.description.clone(),
            year: year_or_current(taxonomy_year(raw)),
            quality: quality_or_default(&raw.quality, quality_default),
            language: raw.language.clone(),
            duration_text: raw.time.clone(),
            thumb_url: absolute_image_url(&raw.thumb_url, &self.image_base),
            poster_url: absolute_image_url(&raw.poster_url, &self.image_base),
            episode_current: raw.current_episode.clone(),
            episode_total: raw
                .total_episodes
                .map(|n| n.to_string())
                .unwrap_or_default(),
            categories: terms_from_group(raw, GENRE_GROUP),
            countries: terms_from_group(raw, COUNTRY_GROUP),
        }
    }
}

#[async_trait]
impl ContentProvider for NguonCProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn movie_list(
        &self,
        catalog: &Catalog,
        page: u32,
        _limit: u32,
    ) -> Result<Vec<Movie>, ProviderError> {
        // NguonC paginates server-side with a fixed page size; `limit` is
        // applied by the aggregator after merge.
        let resp = match catalog {
            Catalog::List(kind) => self.client.list(kind, page).await,
            Catalog::Category(slug) => self.client.list_by_category(slug, page).await,
            Catalog::Country(slug) => self.client.list_by_country(slug, page).await,
        }
        .map_err(|e| self.err(e))?;

        Ok(resp
            .items
            .iter()
            .map(|m| self.movie_from_wire(m, LIST_QUALITY_DEFAULT))
            .collect())
    }

    async fn search(&self, keyword: &str, _limit: u32) -> Result<Vec<Movie>, ProviderError> {
        let resp = self.client.search(keyword).await.map_err(|e| self.err(e))?;
        Ok(resp
            .items
            .iter()
            .map(|m| self.movie_from_wire(m, LIST_QUALITY_DEFAULT))
            .collect())
    }

    async fn movie_detail(&self, slug: &str) -> Result<Option<ProviderDetail>, ProviderError> {
        let resp = self.client.detail(slug).await.map_err(|e| self.err(e))?;
        let Some(raw) = resp.movie else {
            return Ok(None);
        };
        Ok(Some(ProviderDetail {
            movie: self.movie_from_wire(&raw, DETAIL_QUALITY_DEFAULT),
            servers: raw.episodes.iter().map(server_from_wire).collect(),
        }))
    }
}

fn server_from_wire(raw: &wire::RawServer) -> ServerGroup {
    ServerGroup {
        provider_tag: String::new(),
        server_name: raw.server_name.clone(),
        episodes: raw
            .items
            .iter()
            .map(|e| Episode {
                slug: e.slug.clone(),
                display_name: e.name.clone(),
                stream_url_hls: none_if_empty(&e.m3u8),
                stream_url_embed: none_if_empty(&e.embed),
            })
            .collect(),
    }
}

fn terms_from_group(raw: &wire::RawMovie, group: &str) -> Vec<TaxonomyTerm> {
    raw.taxonomy_group(group)
        .into_iter()
        .map(|t| TaxonomyTerm {
            slug: slugify(&t.name),
            name: t.name.clone(),
        })
        .collect()
}

fn taxonomy_year(raw: &wire::RawMovie) -> Option<i32> {
    raw.taxonomy_group(YEAR_GROUP)
        .first()
        .and_then(|t| t.name.trim().parse().ok())
}

fn none_if_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_from_wire_maps_nested_items() {
        let raw = wire::RawServer {
            server_name: "Thuyết Minh #1".to_string(),
            items: vec![wire::RawEpisode {
                name: "Tập 02".to_string(),
                slug: "tap-02".to_string(),
                embed: "https://e/2".to_string(),
                m3u8: "https://m/2.m3u8".to_string(),
            }],
        };
        let group = server_from_wire(&raw);
        assert_eq!(group.server_name, "Thuyết Minh #1");
        assert_eq!(
            group.episodes[0].stream_url_hls.as_deref(),
            Some("https://m/2.m3u8")
        );
    }
}
