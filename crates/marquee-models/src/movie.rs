use serde::{Deserialize, Serialize};

/// One search hit. `imdb_id` is the upstream-assigned unique id and is the
/// key used everywhere else (selection, watchlist membership).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieSummary {
    pub imdb_id: String,
    pub title: String,
    pub poster_url: Option<String>,
}

/// Full detail record for a selected movie. Replaced wholesale on each new
/// selection. All secondary fields are optional: the upstream reports absent
/// data as "N/A" and the boundary normalizes that to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieDetails {
    pub imdb_id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub language: Option<String>,
    pub genre: Option<String>,
    pub actors: Option<String>,
    pub released: Option<String>,
    pub imdb_rating: Option<String>,
    pub director: Option<String>,
    /// Raw runtime text as reported upstream ("148 min").
    pub runtime: Option<String>,
    pub plot: Option<String>,
}
