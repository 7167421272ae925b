pub mod error;
pub mod omdb;
pub mod traits;
pub mod youtube;

pub use error::SourceError;
pub use omdb::OmdbClient;
pub use traits::{MetadataSource, SearchPage, TrailerSource};
pub use youtube::YoutubeClient;

/// Shared reqwest client construction for both services.
pub(crate) fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
