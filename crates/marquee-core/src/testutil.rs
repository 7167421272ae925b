//! Scripted in-memory sources for controller tests. Responses are keyed by
//! query/id/title and consumed once; a gated response parks until the test
//! releases it, which makes completion-order races reproducible.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use marquee_models::{MovieDetails, MovieSummary};
use marquee_sources::{MetadataSource, SearchPage, SourceError, TrailerSource};
use tokio::sync::Notify;

struct Scripted<T> {
    result: Result<T, SourceError>,
    gate: Option<Arc<Notify>>,
}

#[derive(Default)]
pub struct ScriptedSource {
    searches: Mutex<HashMap<String, Scripted<SearchPage>>>,
    details: Mutex<HashMap<String, Scripted<MovieDetails>>>,
    trailers: Mutex<HashMap<String, Scripted<Option<String>>>>,
}

impl ScriptedSource {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_search(&self, query: &str, result: Result<SearchPage, SourceError>) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), Scripted { result, gate: None });
    }

    pub fn on_search_gated(
        &self,
        query: &str,
        result: Result<SearchPage, SourceError>,
    ) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.searches.lock().unwrap().insert(
            query.to_string(),
            Scripted {
                result,
                gate: Some(Arc::clone(&gate)),
            },
        );
        gate
    }

    pub fn on_details(&self, imdb_id: &str, result: Result<MovieDetails, SourceError>) {
        self.details
            .lock()
            .unwrap()
            .insert(imdb_id.to_string(), Scripted { result, gate: None });
    }

    pub fn on_details_gated(
        &self,
        imdb_id: &str,
        result: Result<MovieDetails, SourceError>,
    ) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.details.lock().unwrap().insert(
            imdb_id.to_string(),
            Scripted {
                result,
                gate: Some(Arc::clone(&gate)),
            },
        );
        gate
    }

    pub fn on_trailer(&self, title: &str, result: Result<Option<String>, SourceError>) {
        self.trailers
            .lock()
            .unwrap()
            .insert(title.to_string(), Scripted { result, gate: None });
    }

    pub fn on_trailer_gated(
        &self,
        title: &str,
        result: Result<Option<String>, SourceError>,
    ) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.trailers.lock().unwrap().insert(
            title.to_string(),
            Scripted {
                result,
                gate: Some(Arc::clone(&gate)),
            },
        );
        gate
    }
}

async fn resolve<T>(scripted: Option<Scripted<T>>, what: &str, key: &str) -> Result<T, SourceError> {
    match scripted {
        Some(scripted) => {
            if let Some(gate) = scripted.gate {
                gate.notified().await;
            }
            scripted.result
        }
        None => Err(SourceError::Upstream(format!(
            "no scripted {what} for '{key}'"
        ))),
    }
}

#[async_trait]
impl MetadataSource for ScriptedSource {
    async fn search(&self, query: &str) -> Result<SearchPage, SourceError> {
        let scripted = self.searches.lock().unwrap().remove(query);
        resolve(scripted, "search", query).await
    }

    async fn details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError> {
        let scripted = self.details.lock().unwrap().remove(imdb_id);
        resolve(scripted, "details", imdb_id).await
    }
}

#[async_trait]
impl TrailerSource for ScriptedSource {
    async fn find_trailer(&self, title: &str) -> Result<Option<String>, SourceError> {
        let scripted = self.trailers.lock().unwrap().remove(title);
        resolve(scripted, "trailer", title).await
    }
}

pub fn summary(imdb_id: &str, title: &str) -> MovieSummary {
    MovieSummary {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        poster_url: None,
    }
}

pub fn page(movies: Vec<MovieSummary>, truncated: bool) -> SearchPage {
    SearchPage { movies, truncated }
}

pub fn details(imdb_id: &str, title: &str, runtime: Option<&str>) -> MovieDetails {
    MovieDetails {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        genre: Some("Drama".to_string()),
        runtime: runtime.map(|r| r.to_string()),
        ..MovieDetails::default()
    }
}
