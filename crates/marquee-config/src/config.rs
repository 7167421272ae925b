use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths::PathManager;

const PLACEHOLDER_KEY: &str = "YOUR_API_KEY";

/// Environment variables that override the config file. Either API key may be
/// supplied this way instead of (or on top of) `config.toml`.
pub const ENV_OMDB_API_KEY: &str = "MARQUEE_OMDB_API_KEY";
pub const ENV_YOUTUBE_API_KEY: &str = "MARQUEE_YOUTUBE_API_KEY";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// OMDb key; absent disables search and details, nothing else.
    #[serde(default)]
    pub omdb_api_key: Option<String>,
    /// YouTube key; absent disables trailer lookup, nothing else.
    #[serde(default)]
    pub youtube_api_key: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the watchlist file location. Defaults to
    /// `<data_dir>/watchlist.json` via `PathManager`.
    #[serde(default)]
    pub watchlist_file: Option<PathBuf>,
}

impl Config {
    /// Load the config file and apply environment overrides. A missing file
    /// is not an error: everything has a workable default.
    pub fn load(path_manager: &PathManager) -> anyhow::Result<Self> {
        let mut config = Self::load_from_file(&path_manager.config_file())?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from an environment-shaped lookup. Split out from
    /// `load` so tests don't have to mutate the process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_OMDB_API_KEY).filter(|k| !k.is_empty()) {
            self.keys.omdb_api_key = Some(key);
        }
        if let Some(key) = lookup(ENV_YOUTUBE_API_KEY).filter(|k| !k.is_empty()) {
            self.keys.youtube_api_key = Some(key);
        }
    }

    pub fn omdb_api_key(&self) -> Option<&str> {
        self.keys
            .omdb_api_key
            .as_deref()
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_KEY)
    }

    pub fn youtube_api_key(&self) -> Option<&str> {
        self.keys
            .youtube_api_key
            .as_deref()
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_KEY)
    }

    pub fn is_search_configured(&self) -> bool {
        self.omdb_api_key().is_some()
    }

    pub fn is_trailer_configured(&self) -> bool {
        self.youtube_api_key().is_some()
    }

    pub fn watchlist_file(&self, path_manager: &PathManager) -> PathBuf {
        self.storage
            .watchlist_file
            .clone()
            .unwrap_or_else(|| path_manager.watchlist_file())
    }
}
