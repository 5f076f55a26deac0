//! OPhim HTTP Client

use std::sync::LazyLock;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::{check_response, json_with_limit, ProviderClientError};
use crate::kkphim::types::{DetailResponse, ListResponse};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Shared HTTP client for all OPhim requests (connection pooling).
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build OPhim shared HTTP client")
});

/// OPhim HTTP client against `ophim1.com`-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OPhimClient {
    client: Client,
    base_url: String,
}

impl OPhimClient {
    /// Create a new client (reuses shared connection pool).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /v1/api/danh-sach/{kind}?page&limit`
    pub async fn list(
        &self,
        kind: &str,
        page: u32,
        limit: u32,
    ) -> Result<ListResponse, ProviderClientError> {
        let url = format!("{}/v1/api/danh-sach/{kind}", self.base_url);
        self.get_list(&url, page, limit).await
    }

    /// `GET /v1/api/the-loai/{slug}?page&limit`
    pub async fn list_by_category(
        &self,
        slug: &str,
        page: u32,
        limit: u32,
    ) -> Result<ListResponse, ProviderClientError> {
        let url = format!("{}/v1/api/the-loai/{slug}", self.base_url);
        self.get_list(&url, page, limit).await
    }

    /// `GET /v1/api/quoc-gia/{slug}?page&limit`
    pub async fn list_by_country(
        &self,
        slug: &str,
        page: u32,
        limit: u32,
    ) -> Result<ListResponse, ProviderClientError> {
        let url = format!("{}/v1/api/quoc-gia/{slug}", self.base_url);
        self.get_list(&url, page, limit).await
    }

    /// `GET /v1/api/tim-kiem?keyword&limit`
    pub async fn search(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<ListResponse, ProviderClientError> {
        let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC).to_string();
        let url = format!(
            "{}/v1/api/tim-kiem?keyword={encoded}&limit={limit}",
            self.base_url
        );
        let resp = check_response(self.client.get(&url).send().await?)?;
        json_with_limit(resp).await
    }

    /// `GET /phim/{slug}` — movie metadata plus episode/server groups.
    pub async fn detail(&self, slug: &str) -> Result<DetailResponse, ProviderClientError> {
        let url = format!("{}/phim/{slug}", self.base_url);
        let resp = check_response(self.client.get(&url).send().await?)?;
        json_with_limit(resp).await
    }

    async fn get_list(
        &self,
        url: &str,
        page: u32,
        limit: u32,
    ) -> Result<ListResponse, ProviderClientError> {
        let req = self
            .client
            .get(url)
            .query(&[("page", page), ("limit", limit)]);
        let resp = check_response(req.send().await?)?;
        json_with_limit(resp).await
    }
}
