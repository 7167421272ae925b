use marquee_models::WatchlistEntry;
use std::sync::Mutex;
use tracing::{info, warn};

use crate::storage::WatchlistStorage;

/// User-facing notice when an add is rejected as a duplicate.
pub const DUPLICATE_NOTICE: &str = "Movie already in your watchlist!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// The watch-later collection: insertion-ordered, de-duplicated by
/// `imdb_id`, persisted on every successful mutation. The store is the sole
/// owner of the collection; everything else gets clones.
pub struct WatchlistStore {
    entries: Mutex<Vec<WatchlistEntry>>,
    storage: WatchlistStorage,
}

impl WatchlistStore {
    /// Rehydrate from storage. A missing or corrupt file yields an empty
    /// collection (handled inside `WatchlistStorage::load`).
    pub fn open(storage: WatchlistStorage) -> Self {
        let entries = storage.load();
        Self {
            entries: Mutex::new(entries),
            storage,
        }
    }

    /// Append `entry` unless its id is already present. A duplicate is a
    /// rejected no-op signaled to the caller, not an error.
    pub fn add(&self, entry: WatchlistEntry) -> AddOutcome {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|e| e.imdb_id == entry.imdb_id) {
            warn!(imdb_id = %entry.imdb_id, "rejected duplicate watchlist entry");
            return AddOutcome::Duplicate;
        }

        info!(imdb_id = %entry.imdb_id, title = %entry.title, "added to watchlist");
        entries.push(entry);
        self.persist(&entries);
        AddOutcome::Added
    }

    /// Remove the entry with `imdb_id`. Idempotent: an absent id is a
    /// silent no-op and reports `false`.
    pub fn remove(&self, imdb_id: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.imdb_id != imdb_id);
        if entries.len() == before {
            return false;
        }

        info!(%imdb_id, "removed from watchlist");
        self.persist(&entries);
        true
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap();
        if entries.is_empty() {
            return;
        }
        entries.clear();
        self.persist(&entries);
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.imdb_id == imdb_id)
    }

    pub fn entries(&self) -> Vec<WatchlistEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    fn persist(&self, entries: &[WatchlistEntry]) {
        // The in-memory collection stays authoritative; the next mutation
        // rewrites the whole file anyway.
        if let Err(err) = self.storage.save(entries) {
            warn!(path = %self.storage.path().display(), error = %err, "failed to persist watchlist");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_models::MovieDetails;

    fn entry(id: &str, title: &str) -> WatchlistEntry {
        WatchlistEntry::from_details(&MovieDetails {
            imdb_id: id.to_string(),
            title: title.to_string(),
            runtime: Some("148 min".to_string()),
            ..MovieDetails::default()
        })
    }

    fn store() -> (WatchlistStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = WatchlistStorage::new(dir.path().join("watchlist.json"));
        (WatchlistStore::open(storage), dir)
    }

    #[test]
    fn add_is_idempotent_on_id() {
        let (store, _dir) = store();

        assert_eq!(store.add(entry("tt1375666", "Inception")), AddOutcome::Added);
        assert_eq!(
            store.add(entry("tt1375666", "Inception")),
            AddOutcome::Duplicate
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let (store, _dir) = store();

        store.add(entry("tt0000003", "Third"));
        store.add(entry("tt0000001", "First"));
        store.add(entry("tt0000002", "Second"));

        let titles: Vec<_> = store.entries().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Third", "First", "Second"]);
    }

    #[test]
    fn remove_twice_is_a_noop_the_second_time() {
        let (store, _dir) = store();
        store.add(entry("tt1375666", "Inception"));

        assert!(store.remove("tt1375666"));
        assert!(!store.remove("tt1375666"));
        assert!(store.is_empty());
    }

    #[test]
    fn mutations_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");

        {
            let store = WatchlistStore::open(WatchlistStorage::new(path.clone()));
            store.add(entry("tt1375666", "Inception"));
            store.add(entry("tt0133093", "The Matrix"));
            store.remove("tt0133093");
        }

        let reopened = WatchlistStore::open(WatchlistStorage::new(path));
        assert_eq!(reopened.len(), 1);
        assert!(reopened.contains("tt1375666"));
    }

    #[test]
    fn clear_empties_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");

        let store = WatchlistStore::open(WatchlistStorage::new(path.clone()));
        store.add(entry("tt1375666", "Inception"));
        store.clear();
        assert!(store.is_empty());

        let reopened = WatchlistStore::open(WatchlistStorage::new(path));
        assert!(reopened.is_empty());
    }
}
