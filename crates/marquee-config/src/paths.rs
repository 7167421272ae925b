use anyhow::Result;
use std::path::{Path, PathBuf};

/// Base path override from the environment, for containers and tests.
pub fn base_path_override() -> Option<PathBuf> {
    std::env::var("MARQUEE_BASE_PATH").ok().map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("marquee");

        Ok(Self::from_base(base_dir))
    }

    /// Root every path under a single directory (MARQUEE_BASE_PATH layout).
    pub fn from_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Fixed key for the persisted watch-later collection.
    pub fn watchlist_file(&self) -> PathBuf {
        self.data_dir.join("watchlist.json")
    }

    pub fn browse_log_file(&self) -> PathBuf {
        self.log_dir.join("marquee.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = base_path_override() {
            return Self::from_base(base);
        }
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".marquee")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_base() {
        let pm = PathManager::from_base(PathBuf::from("/tmp/marquee-test"));
        assert_eq!(pm.config_file(), PathBuf::from("/tmp/marquee-test/config.toml"));
        assert_eq!(
            pm.watchlist_file(),
            PathBuf::from("/tmp/marquee-test/data/watchlist.json")
        );
        assert_eq!(
            pm.browse_log_file(),
            PathBuf::from("/tmp/marquee-test/logs/marquee.log")
        );
    }
}
