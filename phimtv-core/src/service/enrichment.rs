//! TMDB enrichment
//!
//! Decorates display with a rating and a high-resolution backdrop looked
//! up by title and year. Strictly best-effort: every failure falls back
//! to the primary provider's own imagery and no rating.

use phimtv_providers::tmdb::client::MediaType;
use phimtv_providers::TmdbClient;

use crate::config::TmdbConfig;

/// Display decoration resolved from TMDB.
#[derive(Debug, Clone, Default)]
pub struct Decoration {
    pub rating: Option<f64>,
    pub backdrop_url: Option<String>,
}

pub struct EnrichmentService {
    client: TmdbClient,
    image_base: String,
    enabled: bool,
}

impl EnrichmentService {
    #[must_use]
    pub fn new(config: &TmdbConfig) -> Self {
        Self {
            client: TmdbClient::new(&config.base_url, &config.api_key),
            image_base: config.image_base.trim_end_matches('/').to_string(),
            enabled: !config.api_key.is_empty(),
        }
    }

    /// Look up decoration for a title. Never fails; an unavailable or
    /// unconfigured TMDB yields an empty decoration.
    pub async fn decorate(&self, title: &str, year: Option<i32>, is_series: bool) -> Decoration {
        if !self.enabled || title.is_empty() {
            return Decoration::default();
        }
        let media_type = if is_series {
            MediaType::Tv
        } else {
            MediaType::Movie
        };
        match self.client.search(media_type, title, year).await {
            Ok(resp) => {
                let Some(first) = resp.results.first() else {
                    return Decoration::default();
                };
                Decoration {
                    rating: first.vote_average.filter(|r| *r > 0.0),
                    backdrop_url: first
                        .backdrop_path
                        .as_ref()
                        .map(|p| format!("{}/original{p}", self.image_base)),
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, title, "tmdb lookup failed, using provider imagery");
                Decoration::default()
            }
        }
    }
}

impl std::fmt::Debug for EnrichmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentService")
            .field("enabled", &self.enabled)
            .finish()
    }
}
