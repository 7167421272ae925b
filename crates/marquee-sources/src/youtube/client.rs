use async_trait::async_trait;
use reqwest::Client;

use crate::error::SourceError;
use crate::traits::TrailerSource;
use crate::youtube::api;

/// YouTube video-search client used only to resolve trailer embed URLs.
/// Without an API key every lookup reports the feature as disabled; callers
/// treat that the same as "no trailer available".
#[derive(Clone)]
pub struct YoutubeClient {
    client: Client,
    api_key: Option<String>,
}

impl YoutubeClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_client(crate::default_http_client(), api_key)
    }

    pub fn with_client(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl TrailerSource for YoutubeClient {
    async fn find_trailer(&self, title: &str) -> Result<Option<String>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::Disabled("YouTube"));
        };
        api::find_trailer(&self.client, api_key, title).await
    }
}
