//! TMDB wire types

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub id: i64,
    /// TV name or movie title depending on media type.
    pub name: Option<String>,
    pub title: Option<String>,
    pub original_name: Option<String>,
    pub original_title: Option<String>,
    pub vote_average: Option<f64>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub page: u32,
    pub results: Vec<SearchResult>,
    pub total_results: u64,
}
