use async_trait::async_trait;
use marquee_models::MovieDetails;
use reqwest::Client;

use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::{MetadataSource, SearchPage};

/// OMDb metadata client. Constructed with an optional API key: without one
/// the client stays inert and every call reports the feature as disabled,
/// leaving the rest of the application untouched.
#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_client(crate::default_http_client(), api_key)
    }

    pub fn with_client(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, SourceError> {
        self.api_key.as_deref().ok_or(SourceError::Disabled("OMDb"))
    }
}

#[async_trait]
impl MetadataSource for OmdbClient {
    async fn search(&self, query: &str) -> Result<SearchPage, SourceError> {
        api::search(&self.client, self.api_key()?, query).await
    }

    async fn details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError> {
        api::details(&self.client, self.api_key()?, imdb_id).await
    }
}
