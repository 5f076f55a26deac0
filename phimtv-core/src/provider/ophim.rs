//! OPhim adapter
//!
//! Same wire format as KKPhim (see the shared mapping helpers there), but
//! a different host and image CDN: OPhim paths resolve against
//! `img.ophim.live` when the response does not advertise its own base.

use async_trait::async_trait;
use phimtv_providers::OPhimClient;

use super::kkphim::{movie_from_wire, movies_from_list, server_from_wire};
use super::{Catalog, ContentProvider, ProviderDetail, ProviderError};
use crate::config::ProviderEndpoint;
use crate::models::Movie;

const PROVIDER_NAME: &str = "OPhim";

const DETAIL_QUALITY_DEFAULT: &str = "FHD";

pub struct OPhimProvider {
    client: OPhimClient,
    image_base: String,
}

impl OPhimProvider {
    #[must_use]
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            client: OPhimClient::new(&endpoint.base_url),
            image_base: endpoint.image_base.clone(),
        }
    }

    fn err(&self, source: phimtv_providers::ProviderClientError) -> ProviderError {
        ProviderError::client(PROVIDER_NAME, source)
    }
}

#[async_trait]
impl ContentProvider for OPhimProvider {
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
}
