//! NguonC wire types
//!
//! NguonC nests episodes under `episodes[].items` with `embed`/`m3u8`
//! fields (not `server_data`/`link_*`), keeps taxonomy in a numbered map
//! of named groups instead of flat arrays, and serves absolute image
//! URLs. All fields default so partial payloads never fail to
//! deserialize.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMovie {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub original_name: String,
    pub description: String,
    pub thumb_url: String,
    pub poster_url: String,
    pub time: String,
    pub quality: String,
    pub language: String,
    pub current_episode: String,
    pub total_episodes: Option<u32>,
    pub casts: Option<String>,
    pub director: Option<String>,
    /// Numbered taxonomy groups, e.g. `{"2": {"group": {"name": "Thể loại"}, "list": [...]}}`
    pub category: HashMap<String, RawCategoryGroup>,
    pub episodes: Vec<RawServer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCategoryGroup {
    pub group: RawNamed,
    pub list: Vec<RawNamed>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawNamed {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawServer {
    pub server_name: String,
    pub items: Vec<RawEpisode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEpisode {
    pub name: String,
    pub slug: String,
    pub embed: String,
    pub m3u8: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Paginate {
    pub current_page: u32,
    pub total_page: u32,
    pub items_per_page: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListResponse {
    pub status: String,
    pub items: Vec<RawMovie>,
    pub paginate: Paginate,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetailResponse {
    pub status: String,
    pub movie: Option<RawMovie>,
}

impl RawMovie {
    /// Taxonomy entries under the group whose name matches `group_name`
    /// (case-insensitive), flattened out of the numbered map.
    #[must_use]
    pub fn taxonomy_group(&self, group_name: &str) -> Vec<&RawNamed> {
        let wanted = group_name.to_lowercase();
        self.category
            .values()
            .filter(|g| g.group.name.to_lowercase() == wanted)
            .flat_map(|g| g.list.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_episode_shape() {
        let json = r#"{
            "status": "success",
            "movie": {
                "name": "Test",
                "slug": "test",
                "episodes": [
                    {"server_name": "Vietsub #1", "items": [
                        {"name": "Tập 01", "slug": "tap-01", "embed": "https://e/1", "m3u8": "https://m/1.m3u8"}
                    ]}
                ]
            }
        }"#;
        let resp: DetailResponse = serde_json::from_str(json).unwrap();
        let movie = resp.movie.unwrap();
        assert_eq!(movie.episodes.len(), 1);
        assert_eq!(movie.episodes[0].items[0].m3u8, "https://m/1.m3u8");
    }

    #[test]
    fn test_taxonomy_group_lookup() {
        let json = r#"{
            "slug": "test",
            "category": {
                "1": {"group": {"name": "Định dạng"}, "list": [{"name": "Phim bộ"}]},
                "2": {"group": {"name": "Thể loại"}, "list": [{"name": "Hành Động"}, {"name": "Võ Thuật"}]},
                "3": {"group": {"name": "Quốc gia"}, "list": [{"name": "Trung Quốc"}]}
            }
        }"#;
        let movie: RawMovie = serde_json::from_str(json).unwrap();
        let genres = movie.taxonomy_group("thể loại");
        assert_eq!(genres.len(), 2);
        assert_eq!(movie.taxonomy_group("Quốc gia")[0].name, "Trung Quốc");
        assert!(movie.taxonomy_group("missing").is_empty());
    }
}
