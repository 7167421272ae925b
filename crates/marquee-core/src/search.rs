use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use marquee_models::MovieSummary;
use marquee_sources::{MetadataSource, SourceError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Non-fatal warning shown when the upstream truncated the match set.
pub const TRUNCATED_WARNING: &str = "Too many results. Showing only first 10.";

/// Snapshot of the search pane: the current query, the movie list, an
/// optional user-facing message, and the loading flag. `message` and
/// `loading` are never meaningful at the same time; the renderer treats a
/// set message as superseding the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub movies: Vec<MovieSummary>,
    pub message: Option<String>,
    pub loading: bool,
}

/// Owns the query string and the search lifecycle. `set_query` is the only
/// trigger: each change cancels the in-flight request and starts one new
/// attempt, and only the newest attempt may ever touch published state
/// ("last query wins", regardless of network completion order).
///
/// Must be created inside a tokio runtime; attempts run as spawned tasks.
pub struct SearchController {
    source: Arc<dyn MetadataSource>,
    state: watch::Sender<SearchState>,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl SearchController {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            source,
            state,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Update the query and start a new search. The previous attempt is
    /// aborted and additionally fenced off by a generation check, so a
    /// stale response that squeaks through can never clobber newer state.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = self.in_flight.lock().unwrap().take() {
            previous.abort();
        }

        if query.trim().is_empty() {
            // The upstream rejects an empty term with "Incorrect IMDb ID.";
            // skip the round-trip and surface the same prompt directly.
            self.state.send_replace(SearchState {
                query,
                movies: Vec::new(),
                message: Some(SourceError::NoMatch.to_string()),
                loading: false,
            });
            return;
        }

        self.state.send_modify(|state| {
            state.query = query.clone();
            state.loading = true;
            state.message = None;
        });

        let source = Arc::clone(&self.source);
        let state = self.state.clone();
        let current = Arc::clone(&self.generation);
        let handle = tokio::spawn(async move {
            let result = source.search(&query).await;

            // The guard runs inside the state lock: either this attempt is
            // still the newest and applies atomically, or it applies nothing.
            state.send_if_modified(|state| {
                if current.load(Ordering::SeqCst) != generation {
                    debug!(%query, "discarding stale search response");
                    return false;
                }
                match &result {
                    Ok(page) => {
                        state.movies = page.movies.clone();
                        state.message = page.truncated.then(|| TRUNCATED_WARNING.to_string());
                    }
                    Err(err) => {
                        warn!(%query, error = %err, "search failed");
                        state.movies = Vec::new();
                        state.message = Some(err.to_string());
                    }
                }
                state.loading = false;
                true
            });
        });

        *self.in_flight.lock().unwrap() = Some(handle);
    }
}
