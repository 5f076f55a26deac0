use serde::{Deserialize, Serialize};

/// A category or country reference. `slug` is the join key; `name` is the
/// display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub slug: String,
    pub name: String,
}

/// Unified movie record.
///
/// `slug` is the stable cross-provider join key. `id` is provider-local
/// and must never be used to correlate records across providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub original_name: String,
    pub content: String,
    pub year: i32,
    pub quality: String,
    pub language: String,
    pub duration_text: String,
    pub thumb_url: String,
    pub poster_url: String,
    pub episode_current: String,
    pub episode_total: String,
    pub categories: Vec<TaxonomyTerm>,
    pub countries: Vec<TaxonomyTerm>,
}

/// One playable episode within a server group.
///
/// Within one group, `slug` is unique. Whether the episode plays natively
/// or in an embedded web view is derived from the HLS URL, see
/// [`Episode::stream_mode`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Episode {
    pub slug: String,
    pub display_name: String,
    pub stream_url_hls: Option<String>,
    pub stream_url_embed: Option<String>,
}

/// How an episode should be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMode {
    /// HLS URL suitable for the native video pipeline.
    Native(String),
    /// Third-party embed page for a web view.
    Embedded(String),
    /// No playable source at all.
    Unplayable,
}

impl Episode {
    /// Native playback needs a real HLS manifest; an "HLS" URL that is
    /// actually a third-party embed (e.g. youtube) falls back to embedding.
    #[must_use]
    pub fn stream_mode(&self) -> StreamMode {
        if let Some(hls) = self
            .stream_url_hls
            .as_deref()
            .filter(|u| !u.is_empty() && !u.contains("youtube"))
        {
            return StreamMode::Native(hls.to_string());
        }
        match self.stream_url_embed.as_deref().filter(|u| !u.is_empty()) {
            Some(embed) => StreamMode::Embedded(embed.to_string()),
            None => StreamMode::Unplayable,
        }
    }
}

/// One server's episode list for a movie, tagged with the provider it
/// came from.
///
/// A merged detail document may hold several groups from one provider and
/// groups from different providers. Order follows provider fetch
/// completion; nothing else is guaranteed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerGroup {
    /// Synthesized provenance tag, e.g. `"KKPhim #1"`. Disambiguates
    /// identically-named servers from different providers after merge.
    pub provider_tag: String,
    pub server_name: String,
    pub episodes: Vec<Episode>,
}

impl ServerGroup {
    /// Display name carrying the provenance tag, unique across a merged
    /// group list even when raw server names collide.
    #[must_use]
    pub fn tagged_name(&self) -> String {
        if self.provider_tag.is_empty() {
            return self.server_name.clone();
        }
        format!("{} [{}]", self.server_name, self.provider_tag)
    }
}

/// Aggregated movie document: base metadata from the highest-priority
/// responsive provider, server groups merged additively from every
/// responsive provider, optional TMDB decoration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieDetail {
    pub movie: Movie,
    pub servers: Vec<ServerGroup>,
    pub rating: Option<f64>,
    pub backdrop_url: Option<String>,
}
