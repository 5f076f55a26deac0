//! Source normalization helpers
//!
//! Pure functions shared by every provider adapter: absolute image URLs,
//! default fill for missing optional fields, and first-wins slug
//! deduplication for merged lists. No network I/O here.

use chrono::{Datelike, Utc};
use indexmap::IndexSet;

use crate::models::Movie;

/// Resolve a possibly-relative image path against a provider's image base.
/// Absolute URLs pass through untouched.
#[must_use]
pub fn absolute_image_url(path: &str, image_base: &str) -> String {
    if path.is_empty() || path.starts_with("http") {
        return path.to_string();
    }
    let base = image_base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        return path.to_string();
    }
    format!("{base}/{path}")
}

/// Default quality label when the upstream record omits one.
#[must_use]
pub fn quality_or_default(quality: &str, default: &str) -> String {
    if quality.trim().is_empty() {
        default.to_string()
    } else {
        quality.to_string()
    }
}

/// Release year, defaulting to the current year when absent or zero.
#[must_use]
pub fn year_or_current(year: Option<i32>) -> i32 {
    match year {
        Some(y) if y > 0 => y,
        _ => Utc::now().year(),
    }
}

/// Derive a URL-safe slug from a display name (for providers that ship
/// taxonomy entries without slugs).
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Deduplicate a merged movie list by slug, keeping the first occurrence.
/// Provider fetch order determines priority: an earlier provider's record
/// wins slug ties. Items without a slug are dropped.
#[must_use]
pub fn dedupe_by_slug(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen: IndexSet<String> = IndexSet::with_capacity(movies.len());
    movies
        .into_iter()
        .filter(|m| !m.slug.is_empty() && seen.insert(m.slug.clone()))
        .collect()
}
