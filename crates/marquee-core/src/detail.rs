use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use marquee_models::{MovieDetails, WatchlistEntry};
use marquee_sources::{MetadataSource, TrailerSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::watchlist::{AddOutcome, WatchlistStore, DUPLICATE_NOTICE};

/// How long the "added to watchlist" confirmation stays visible.
pub const ADDED_CONFIRMATION: Duration = Duration::from_secs(2);

/// Snapshot of the detail popup. `open` is view visibility; `details` is
/// data presence — the two are separate flags on purpose. `notice` carries
/// user-facing messages (detail fetch failure, duplicate watchlist add).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub selected: Option<String>,
    pub open: bool,
    pub loading: bool,
    pub details: Option<MovieDetails>,
    pub trailer_url: Option<String>,
    /// True once the trailer lookup for this selection finished, whatever
    /// the outcome; distinguishes "still looking" from "no trailer".
    pub trailer_resolved: bool,
    pub trailer_open: bool,
    pub just_added: bool,
    pub notice: Option<String>,
}

impl DetailState {
    /// Title for the shell's window/title line while a movie is open.
    pub fn display_title(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.title.as_str())
    }
}

/// Owns the selected movie id and the detail/trailer lifecycle.
///
/// Every fetch is tagged with the selection generation at issue time;
/// `select` and `close` bump the generation and abort pending tasks, so a
/// response for a selection that is no longer current is discarded — it can
/// never reopen a closed view or repopulate a newer one. The trailer lookup
/// starts once the title is known and attaches under the same guard.
///
/// Must be created inside a tokio runtime; fetches run as spawned tasks.
pub struct DetailController {
    metadata: Arc<dyn MetadataSource>,
    trailers: Arc<dyn TrailerSource>,
    watchlist: Arc<WatchlistStore>,
    state: watch::Sender<DetailState>,
    generation: Arc<AtomicU64>,
    added_marker: Arc<AtomicU64>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl DetailController {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        trailers: Arc<dyn TrailerSource>,
        watchlist: Arc<WatchlistStore>,
    ) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            metadata,
            trailers,
            watchlist,
            state,
            generation: Arc::new(AtomicU64::new(0)),
            added_marker: Arc::new(AtomicU64::new(0)),
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn watchlist(&self) -> &Arc<WatchlistStore> {
        &self.watchlist
    }

    /// Open the view on `imdb_id` and load its details. The trailer panel
    /// toggle resets to closed for every new selection.
    pub fn select(&self, imdb_id: impl Into<String>) {
        let imdb_id = imdb_id.into();
        let generation = self.bump_generation();

        self.state.send_replace(DetailState {
            selected: Some(imdb_id.clone()),
            open: true,
            loading: true,
            ..DetailState::default()
        });

        let metadata = Arc::clone(&self.metadata);
        let trailers = Arc::clone(&self.trailers);
        let state = self.state.clone();
        let current = Arc::clone(&self.generation);
        let tasks = Arc::clone(&self.tasks);

        let handle = tokio::spawn(async move {
            let result = metadata.details(&imdb_id).await;

            let mut title = None;
            let applied = state.send_if_modified(|s| {
                if current.load(Ordering::SeqCst) != generation {
                    debug!(%imdb_id, "discarding stale detail response");
                    return false;
                }
                s.loading = false;
                match &result {
                    Ok(details) => {
                        title = Some(details.title.clone());
                        s.details = Some(details.clone());
                        s.notice = None;
                    }
                    Err(err) => {
                        warn!(%imdb_id, error = %err, "detail fetch failed");
                        s.notice = Some(err.to_string());
                    }
                }
                true
            });

            // Trailer lookup does not block detail availability: it starts
            // once the title is known and attaches only while this
            // selection is still the current one.
            let Some(title) = title else { return };
            if !applied {
                return;
            }

            let trailer_handle = tokio::spawn(async move {
                let trailer = match trailers.find_trailer(&title).await {
                    Ok(url) => url,
                    Err(err) => {
                        // Any trailer failure reads as "no trailer
                        // available", never as a user-visible error.
                        debug!(%title, error = %err, "trailer lookup failed");
                        None
                    }
                };
                state.send_if_modified(|s| {
                    if current.load(Ordering::SeqCst) != generation {
                        debug!(%title, "discarding stale trailer response");
                        return false;
                    }
                    s.trailer_url = trailer;
                    s.trailer_resolved = true;
                    true
                });
            });
            let mut tasks = tasks.lock().unwrap();
            tasks.retain(|t| !t.is_finished());
            tasks.push(trailer_handle);
        });

        self.tasks.lock().unwrap().push(handle);
    }

    /// Hide the view and clear the selection. Pending fetches become
    /// irrelevant: they are aborted, and the generation bump discards
    /// anything already past its await.
    pub fn close(&self) {
        self.bump_generation();
        self.state.send_replace(DetailState::default());
    }

    /// Flip trailer panel visibility. No-op while the view is closed.
    pub fn toggle_trailer(&self) {
        self.state.send_if_modified(|s| {
            if !s.open {
                return false;
            }
            s.trailer_open = !s.trailer_open;
            true
        });
    }

    /// Save the currently loaded movie to the watchlist. Returns `None`
    /// when no details are loaded yet. The transient confirmation shows for
    /// `ADDED_CONFIRMATION` whether or not the store rejected a duplicate;
    /// a newer add or selection change supersedes the pending clear.
    pub fn add_to_watchlist(&self) -> Option<AddOutcome> {
        let details = self.state.borrow().details.clone()?;
        let entry = WatchlistEntry::from_details(&details);
        let outcome = self.watchlist.add(entry);

        let marker = self.added_marker.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.just_added = true;
            s.notice = match outcome {
                AddOutcome::Duplicate => Some(DUPLICATE_NOTICE.to_string()),
                AddOutcome::Added => None,
            };
        });

        let state = self.state.clone();
        let current_marker = Arc::clone(&self.added_marker);
        let current = Arc::clone(&self.generation);
        let generation = self.generation.load(Ordering::SeqCst);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ADDED_CONFIRMATION).await;
            state.send_if_modified(|s| {
                if current_marker.load(Ordering::SeqCst) != marker {
                    return false;
                }
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                s.just_added = false;
                true
            });
        });

        let mut tasks = self.tasks.lock().unwrap();
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);

        Some(outcome)
    }

    fn bump_generation(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Key, KeyRouter};
    use crate::storage::WatchlistStorage;
    use crate::testutil::{details, ScriptedSource};
    use marquee_sources::SourceError;
    use tokio::task::yield_now;

    async fn drain() {
        for _ in 0..20 {
            yield_now().await;
        }
    }

    fn controller(source: &Arc<ScriptedSource>) -> (DetailController, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(WatchlistStore::open(WatchlistStorage::new(
            dir.path().join("watchlist.json"),
        )));
        let controller = DetailController::new(
            Arc::clone(source) as Arc<dyn MetadataSource>,
            Arc::clone(source) as Arc<dyn TrailerSource>,
            store,
        );
        (controller, dir)
    }

    #[tokio::test]
    async fn select_loads_details_then_trailer() {
        let source = ScriptedSource::arc();
        source.on_details("tt1375666", Ok(details("tt1375666", "Inception", Some("148 min"))));
        source.on_trailer(
            "Inception",
            Ok(Some("https://www.youtube.com/embed/YoHD9XEInc0".to_string())),
        );

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();

        controller.select("tt1375666");
        assert!(controller.state().loading);
        assert!(controller.state().open);

        let state = rx.wait_for(|s| s.details.is_some()).await.unwrap().clone();
        assert!(!state.loading);
        assert_eq!(state.display_title(), Some("Inception"));

        let state = rx.wait_for(|s| s.trailer_url.is_some()).await.unwrap().clone();
        assert_eq!(
            state.trailer_url.as_deref(),
            Some("https://www.youtube.com/embed/YoHD9XEInc0")
        );
        // Panel visibility is separate from trailer availability.
        assert!(!state.trailer_open);
    }

    #[tokio::test]
    async fn late_detail_after_close_is_discarded() {
        let source = ScriptedSource::arc();
        let gate = source.on_details_gated(
            "tt1375666",
            Ok(details("tt1375666", "Inception", Some("148 min"))),
        );

        let (controller, _dir) = controller(&source);
        controller.select("tt1375666");
        controller.close();

        gate.notify_one();
        drain().await;

        let state = controller.state();
        assert!(!state.open);
        assert_eq!(state.selected, None);
        assert_eq!(state.details, None);
    }

    #[tokio::test]
    async fn stale_detail_never_overwrites_a_newer_selection() {
        let source = ScriptedSource::arc();
        let slow = source.on_details_gated(
            "tt0000001",
            Ok(details("tt0000001", "Stale Movie", None)),
        );
        source.on_details("tt1375666", Ok(details("tt1375666", "Inception", Some("148 min"))));
        source.on_trailer("Inception", Ok(None));

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();

        controller.select("tt0000001");
        controller.select("tt1375666");

        let state = rx.wait_for(|s| s.details.is_some()).await.unwrap().clone();
        assert_eq!(state.display_title(), Some("Inception"));

        slow.notify_one();
        drain().await;

        let state = controller.state();
        assert_eq!(state.display_title(), Some("Inception"));
        assert_eq!(state.selected.as_deref(), Some("tt1375666"));
    }

    #[tokio::test]
    async fn stale_trailer_never_attaches_to_a_newer_selection() {
        let source = ScriptedSource::arc();
        source.on_details("tt0000001", Ok(details("tt0000001", "First Movie", None)));
        let slow_trailer = source.on_trailer_gated(
            "First Movie",
            Ok(Some("https://www.youtube.com/embed/stale".to_string())),
        );
        source.on_details("tt1375666", Ok(details("tt1375666", "Inception", None)));
        source.on_trailer("Inception", Ok(None));

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();

        controller.select("tt0000001");
        rx.wait_for(|s| s.details.is_some()).await.unwrap();

        controller.select("tt1375666");
        rx.wait_for(|s| s.display_title() == Some("Inception"))
            .await
            .unwrap();

        slow_trailer.notify_one();
        drain().await;

        assert_eq!(controller.state().trailer_url, None);
    }

    #[tokio::test]
    async fn detail_failure_surfaces_a_notice() {
        let source = ScriptedSource::arc();
        source.on_details(
            "tt1375666",
            Err(SourceError::Transport {
                detail: "timed out".to_string(),
            }),
        );

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();
        controller.select("tt1375666");

        let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert_eq!(state.details, None);
        assert_eq!(
            state.notice.as_deref(),
            Some("Something went wrong, please check your connection and try again")
        );
    }

    #[tokio::test]
    async fn trailer_toggle_resets_on_a_new_selection() {
        let source = ScriptedSource::arc();
        source.on_details("tt0000001", Ok(details("tt0000001", "First Movie", None)));
        source.on_trailer("First Movie", Ok(None));
        source.on_details("tt0000002", Ok(details("tt0000002", "Second Movie", None)));
        source.on_trailer("Second Movie", Ok(None));

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();

        controller.select("tt0000001");
        rx.wait_for(|s| s.details.is_some()).await.unwrap();
        controller.toggle_trailer();
        assert!(controller.state().trailer_open);

        controller.select("tt0000002");
        assert!(!controller.state().trailer_open);
    }

    #[tokio::test]
    async fn toggle_is_a_noop_while_closed() {
        let source = ScriptedSource::arc();
        let (controller, _dir) = controller(&source);

        controller.toggle_trailer();
        assert!(!controller.state().trailer_open);
    }

    #[tokio::test]
    async fn saving_parses_runtime_into_minutes() {
        let source = ScriptedSource::arc();
        source.on_details("tt1375666", Ok(details("tt1375666", "Inception", Some("148 min"))));
        source.on_trailer("Inception", Ok(None));

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();
        controller.select("tt1375666");
        rx.wait_for(|s| s.details.is_some()).await.unwrap();

        assert_eq!(controller.add_to_watchlist(), Some(AddOutcome::Added));

        let entries = controller.watchlist().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].imdb_id, "tt1375666");
        assert_eq!(entries[0].runtime_minutes, Some(148));
    }

    #[tokio::test]
    async fn saving_without_runtime_still_succeeds() {
        let source = ScriptedSource::arc();
        source.on_details("tt0000001", Ok(details("tt0000001", "First Movie", None)));
        source.on_trailer("First Movie", Ok(None));

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();
        controller.select("tt0000001");
        rx.wait_for(|s| s.details.is_some()).await.unwrap();

        assert_eq!(controller.add_to_watchlist(), Some(AddOutcome::Added));
        assert_eq!(controller.watchlist().entries()[0].runtime_minutes, None);
    }

    #[tokio::test]
    async fn duplicate_save_is_rejected_and_signaled() {
        let source = ScriptedSource::arc();
        source.on_details("tt1375666", Ok(details("tt1375666", "Inception", Some("148 min"))));
        source.on_trailer("Inception", Ok(None));

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();
        controller.select("tt1375666");
        rx.wait_for(|s| s.details.is_some()).await.unwrap();

        assert_eq!(controller.add_to_watchlist(), Some(AddOutcome::Added));
        assert_eq!(controller.add_to_watchlist(), Some(AddOutcome::Duplicate));

        let state = controller.state();
        assert_eq!(controller.watchlist().len(), 1);
        assert_eq!(state.notice.as_deref(), Some(DUPLICATE_NOTICE));
        // The confirmation still shows on a duplicate, as a plain
        // acknowledgement that the movie is on the list.
        assert!(state.just_added);
    }

    #[tokio::test]
    async fn add_without_loaded_details_is_a_noop() {
        let source = ScriptedSource::arc();
        let (controller, _dir) = controller(&source);

        assert_eq!(controller.add_to_watchlist(), None);
        assert!(controller.watchlist().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn added_confirmation_clears_after_two_seconds() {
        let source = ScriptedSource::arc();
        source.on_details("tt1375666", Ok(details("tt1375666", "Inception", Some("148 min"))));
        source.on_trailer("Inception", Ok(None));

        let (controller, _dir) = controller(&source);
        let mut rx = controller.subscribe();
        controller.select("tt1375666");
        rx.wait_for(|s| s.details.is_some()).await.unwrap();

        controller.add_to_watchlist();
        assert!(controller.state().just_added);

        let state = rx.wait_for(|s| !s.just_added).await.unwrap().clone();
        assert!(!state.just_added);
    }

    #[tokio::test]
    async fn escape_binding_closes_the_open_popup() {
        let source = ScriptedSource::arc();
        source.on_details("tt1375666", Ok(details("tt1375666", "Inception", Some("148 min"))));
        source.on_trailer("Inception", Ok(None));

        let (controller, _dir) = controller(&source);
        let controller = Arc::new(controller);
        let mut rx = controller.subscribe();
        controller.select("tt1375666");
        rx.wait_for(|s| s.details.is_some()).await.unwrap();

        let router = KeyRouter::new();
        let closer = Arc::clone(&controller);
        let _binding = router.bind(&[Key::Escape, Key::Backspace], move || closer.close());

        router.dispatch(Key::Escape);

        let state = controller.state();
        assert!(!state.open);
        assert_eq!(state.selected, None);
    }
}
