//! KKPhim wire types
//!
//! The KKPhim API ships two envelope generations: legacy endpoints return
//! `{ status, items, pathImage }` at the top level while the v1 endpoints
//! wrap the payload as `{ data: { items, APP_DOMAIN_CDN_IMAGE, params } }`.
//! Every field defaults so partial or evolving payloads never fail to
//! deserialize.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTaxonomy {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMovie {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub origin_name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub thumb_url: String,
    pub poster_url: String,
    pub time: String,
    pub quality: String,
    pub lang: String,
    pub year: Option<i32>,
    pub view: Option<u64>,
    pub episode_current: String,
    pub episode_total: String,
    pub category: Vec<RawTaxonomy>,
    pub country: Vec<RawTaxonomy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEpisode {
    pub name: String,
    pub slug: String,
    pub filename: String,
    pub link_embed: String,
    pub link_m3u8: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawServer {
    pub server_name: String,
    pub server_data: Vec<RawEpisode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pagination {
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    #[serde(rename = "totalItems")]
    pub total_items: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListData {
    pub items: Vec<RawMovie>,
    #[serde(rename = "APP_DOMAIN_CDN_IMAGE")]
    pub cdn_image_domain: String,
    pub params: ListParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListResponse {
    pub items: Vec<RawMovie>,
    #[serde(rename = "pathImage")]
    pub path_image: String,
    pub data: Option<ListData>,
    pub pagination: Option<Pagination>,
}

impl ListResponse {
    /// Items regardless of envelope generation (legacy top-level or v1 `data.items`).
    #[must_use]
    pub fn items(&self) -> &[RawMovie] {
        if !self.items.is_empty() {
            return &self.items;
        }
        self.data.as_ref().map_or(&[], |d| d.items.as_slice())
    }

    /// Image base advertised by the response, if any.
    #[must_use]
    pub fn image_base(&self) -> Option<&str> {
        if !self.path_image.is_empty() {
            return Some(&self.path_image);
        }
        self.data
            .as_ref()
            .filter(|d| !d.cdn_image_domain.is_empty())
            .map(|d| d.cdn_image_domain.as_str())
    }

    /// Pagination regardless of envelope generation.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        if let Some(p) = &self.pagination {
            return p.clone();
        }
        self.data
            .as_ref()
            .map(|d| d.params.pagination.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetailResponse {
    pub msg: String,
    pub movie: Option<RawMovie>,
    pub episodes: Vec<RawServer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
}
