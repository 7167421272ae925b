use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::movie::MovieDetails;

/// A movie saved for later. The collection invariant (no two entries share an
/// `imdb_id`) is enforced by the store, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub imdb_id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub genre: Option<String>,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    /// Build an entry from a loaded detail record. An absent or unparsable
    /// runtime degrades to `None` rather than failing the save.
    pub fn from_details(details: &MovieDetails) -> Self {
        Self {
            imdb_id: details.imdb_id.clone(),
            title: details.title.clone(),
            poster_url: details.poster_url.clone(),
            runtime_minutes: details.runtime.as_deref().and_then(parse_runtime_minutes),
            genre: details.genre.clone(),
            added_at: Utc::now(),
        }
    }
}

/// Parse the leading integer out of an upstream runtime string ("148 min").
pub fn parse_runtime_minutes(text: &str) -> Option<u32> {
    text.split_whitespace().next()?.parse().ok()
}
