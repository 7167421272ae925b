use async_trait::async_trait;
use marquee_models::{MovieDetails, MovieSummary};

use crate::error::SourceError;

/// One page of search results. `truncated` is the upstream's non-fatal
/// "Too many results." condition: a usable list was returned, but it is only
/// the first page of a much larger match set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub movies: Vec<MovieSummary>,
    pub truncated: bool,
}

/// A movie metadata service: free-text search plus per-id detail lookup.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchPage, SourceError>;
    async fn details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError>;
}

/// A video search service used to resolve a trailer embed URL for a title.
/// `Ok(None)` is the normal "no trailer available" outcome.
#[async_trait]
pub trait TrailerSource: Send + Sync {
    async fn find_trailer(&self, title: &str) -> Result<Option<String>, SourceError>;
}
