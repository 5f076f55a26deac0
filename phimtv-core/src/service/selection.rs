//! Episode/server selection model
//!
//! Pure derivations over a merged server-group list: which server is
//! active, which episode plays, what comes next, and how servers group by
//! audio language for the picker tabs. Shared by the playback engine and
//! any UI. Total over every input; an empty group list yields an empty
//! selection, never an error.

use crate::models::{Episode, ServerGroup};

/// Episodes per picker page.
pub const EPISODES_PER_CHUNK: usize = 50;

/// Audio-language bucket derived from a server's display name.
/// Every server classifies into exactly one bucket; subtitle is the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageGroup {
    /// "Lồng Tiếng" — dubbed.
    LongTieng,
    /// "Thuyết Minh" — voice-over.
    ThuyetMinh,
    /// "Phụ Đề" — subtitled (default bucket).
    PhuDe,
}

impl LanguageGroup {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LongTieng => "Lồng Tiếng",
            Self::ThuyetMinh => "Thuyết Minh",
            Self::PhuDe => "Phụ Đề",
        }
    }

    /// Case-insensitive substring classification, checked in priority
    /// order: dubbed, voice-over, else subtitled.
    #[must_use]
    pub fn classify(server_name: &str) -> Self {
        let lower = server_name.to_lowercase();
        if lower.contains("lồng tiếng") || lower.contains("longtieng") {
            return Self::LongTieng;
        }
        if lower.contains("thuyết minh") || lower.contains("thuyetminh") {
            return Self::ThuyetMinh;
        }
        Self::PhuDe
    }
}

/// Resolved playback position within a server-group list.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Clamped index of the active server.
    pub server_index: usize,
    pub episode: Option<Episode>,
    pub next_episode: Option<Episode>,
    pub prev_episode: Option<Episode>,
    /// Picker page containing the active episode.
    pub chunk_index: usize,
}

impl Selection {
    #[must_use]
    pub fn episode_slug(&self) -> Option<&str> {
        self.episode.as_ref().map(|e| e.slug.as_str())
    }

    #[must_use]
    pub fn next_episode_slug(&self) -> Option<&str> {
        self.next_episode.as_ref().map(|e| e.slug.as_str())
    }
}

/// Derive the active server/episode/next/prev for a requested episode.
///
/// The server index clamps into range; a requested slug that is absent
/// from the active server falls back to that server's first episode.
/// Episode slugs are scoped per group, so resolution is always relative
/// to the active group, never global.
#[must_use]
pub fn select(
    servers: &[ServerGroup],
    server_index: usize,
    requested_episode: Option<&str>,
) -> Selection {
    if servers.is_empty() {
        return Selection::default();
    }
    let server_index = server_index.min(servers.len() - 1);
    let episodes = &servers[server_index].episodes;

    let episode_index = requested_episode
        .and_then(|slug| episodes.iter().position(|e| e.slug == slug))
        .unwrap_or(0);

    let episode = episodes.get(episode_index).cloned();
    let next_episode = episodes.get(episode_index + 1).cloned();
    let prev_episode = episode_index
        .checked_sub(1)
        .and_then(|i| episodes.get(i))
        .cloned();

    Selection {
        server_index,
        episode,
        next_episode,
        prev_episode,
        chunk_index: episode_index / EPISODES_PER_CHUNK,
    }
}

/// Indexes of servers (with episode data) belonging to a language group,
/// in list order.
#[must_use]
pub fn servers_in_group(servers: &[ServerGroup], group: LanguageGroup) -> Vec<usize> {
    servers
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.episodes.is_empty())
        .filter(|(_, s)| LanguageGroup::classify(&s.server_name) == group)
        .map(|(i, _)| i)
        .collect()
}

/// Language groups that actually have servers, in tab display order.
#[must_use]
pub fn available_groups(servers: &[ServerGroup]) -> Vec<LanguageGroup> {
    [
        LanguageGroup::PhuDe,
        LanguageGroup::LongTieng,
        LanguageGroup::ThuyetMinh,
    ]
    .into_iter()
    .filter(|g| !servers_in_group(servers, *g).is_empty())
    .collect()
}

/// Resolve the active server after a language-tab switch.
///
/// Keeps the current server when it already belongs to the group,
/// otherwise selects the group's first server. `None` when the group has
/// no servers. Callers reset chunk state to zero on any change.
#[must_use]
pub fn switch_language_group(
    servers: &[ServerGroup],
    current_index: usize,
    group: LanguageGroup,
) -> Option<usize> {
    let members = servers_in_group(servers, group);
    if members.contains(&current_index) {
        return Some(current_index);
    }
    members.first().copied()
}
