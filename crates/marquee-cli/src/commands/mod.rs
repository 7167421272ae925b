pub mod browse;
pub mod config;
pub mod search;
pub mod show;
pub mod watchlist;

use std::sync::Arc;

use color_eyre::Result;
use marquee_config::{Config, PathManager};
use marquee_core::{WatchlistStorage, WatchlistStore};
use marquee_sources::{OmdbClient, YoutubeClient};

/// Everything a command needs, wired up from configuration and platform
/// paths. Missing API keys are not an error here: the affected client
/// degrades and reports itself as disabled when used.
pub struct AppContext {
    pub config: Config,
    pub paths: PathManager,
    pub metadata: Arc<OmdbClient>,
    pub trailers: Arc<YoutubeClient>,
    pub watchlist: Arc<WatchlistStore>,
}

impl AppContext {
    pub fn build() -> Result<Self> {
        let paths = PathManager::default();
        let config = Config::load(&paths)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

        let metadata = Arc::new(OmdbClient::new(config.omdb_api_key().map(str::to_string)));
        let trailers = Arc::new(YoutubeClient::new(config.youtube_api_key().map(str::to_string)));
        let watchlist = Arc::new(WatchlistStore::open(WatchlistStorage::new(
            config.watchlist_file(&paths),
        )));

        Ok(Self {
            config,
            paths,
            metadata,
            trailers,
            watchlist,
        })
    }
}
