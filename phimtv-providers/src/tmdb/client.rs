//! TMDB HTTP Client
//!
//! Thin search client used only to decorate catalog entries with a rating
//! and a high-resolution backdrop. Callers must treat every failure here
//! as non-fatal.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;

use super::types::SearchResponse;
use crate::error::{check_response, json_with_limit, ProviderClientError};

/// Shared HTTP client for all TMDB requests (connection pooling).
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(15))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build TMDB shared HTTP client")
});

/// Media type for TMDB search endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    #[must_use]
    pub fn as_path(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

/// TMDB search client.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new client. `base_url` defaults to `https://api.themoviedb.org/3`
    /// in production configuration.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// `GET /search/{movie|tv}?query&year` — first page of title matches.
    pub async fn search(
        &self,
        media_type: MediaType,
        query: &str,
        year: Option<i32>,
    ) -> Result<SearchResponse, ProviderClientError> {
        let url = format!("{}/search/{}", self.base_url, media_type.as_path());
        let mut req = self.client.get(&url).query(&[
            ("api_key", self.api_key.as_str()),
            ("query", query),
        ]);
        if let Some(y) = year {
            req = req.query(&[("year", y)]);
        }
        let resp = check_response(req.send().await?)?;
        json_with_limit(resp).await
    }
}
