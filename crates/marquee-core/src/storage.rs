use anyhow::Result;
use marquee_models::WatchlistEntry;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Disk persistence for the watch-later collection: one JSON file holding
/// the whole collection, rewritten on every mutation.
pub struct WatchlistStorage {
    path: PathBuf,
}

impl WatchlistStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the persisted collection. Absence, unreadable content, or a
    /// parse failure all fall back to an empty collection; startup never
    /// fails on this.
    pub fn load(&self) -> Vec<WatchlistEntry> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no persisted watchlist, starting empty");
            return Vec::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read watchlist, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "persisted watchlist is corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize the whole collection to disk. Atomic replace: write a temp
    /// file, then rename over the real one.
    pub fn save(&self, entries: &[WatchlistEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let serialized = serde_json::to_string_pretty(entries)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, serialized)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
