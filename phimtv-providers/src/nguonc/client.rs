//! NguonC HTTP Client

use std::sync::LazyLock;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use super::types::{DetailResponse, ListResponse};
use crate::error::{check_response, json_with_limit, ProviderClientError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Shared HTTP client for all NguonC requests (connection pooling).
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build NguonC shared HTTP client")
});

/// NguonC HTTP client against `phim.nguonc.com/api`-compatible endpoints.
#[derive(Debug, Clone)]
pub struct NguonCClient {
    client: Client,
    base_url: String,
}

impl NguonCClient {
    /// Create a new client (reuses shared connection pool).
    /// `base_url` includes the `/api` prefix, e.g. `https://phim.nguonc.com/api`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /films/danh-sach/{kind}?page`
    pub async fn list(&self, kind: &str, page: u32) -> Result<ListResponse, ProviderClientError> {
        let url = format!("{}/films/danh-sach/{kind}", self.base_url);
        let req = self.client.get(&url).query(&[("page", page)]);
        let resp = check_response(req.send().await?)?;
        json_with_limit(resp).await
    }

    /// `GET /films/the-loai/{slug}?page`
    pub async fn list_by_category(
        &self,
        slug: &str,
        page: u32,
    ) -> Result<ListResponse, ProviderClientError> {
        let url = format!("{}/films/the-loai/{slug}", self.base_url);
        let req = self.client.get(&url).query(&[("page", page)]);
        let resp = check_response(req.send().await?)?;
        json_with_limit(resp).await
    }

    /// `GET /films/quoc-gia/{slug}?page`
    pub async fn list_by_country(
        &self,
        slug: &str,
        page: u32,
    ) -> Result<ListResponse, ProviderClientError> {
        let url = format!("{}/films/quoc-gia/{slug}", self.base_url);
        let req = self.client.get(&url).query(&[("page", page)]);
        let resp = check_response(req.send().await?)?;
        json_with_limit(resp).await
    }

    /// `GET /films/search?keyword`
    pub async fn search(&self, keyword: &str) -> Result<ListResponse, ProviderClientError> {
        let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC).to_string();
        let url = format!("{}/films/search?keyword={encoded}", self.base_url);
        let resp = check_response(self.client.get(&url).send().await?)?;
        json_with_limit(resp).await
    }

    /// `GET /film/{slug}` — movie metadata with nested episode groups.
    pub async fn detail(&self, slug: &str) -> Result<DetailResponse, ProviderClientError> {
        let url = format!("{}/film/{slug}", self.base_url);
        let resp = check_response(self.client.get(&url).send().await?)?;
        json_with_limit(resp).await
    }
}
