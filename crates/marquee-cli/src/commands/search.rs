use std::sync::Arc;

use color_eyre::Result;
use marquee_core::SearchController;
use marquee_sources::MetadataSource;
use serde_json::json;

use super::AppContext;
use crate::output::Output;

pub async fn run_search(query: &str, output: &Output) -> Result<()> {
    tracing::debug!(%query, "search command started");

    let ctx = AppContext::build()?;
    let controller = SearchController::new(ctx.metadata.clone() as Arc<dyn MetadataSource>);
    let mut rx = controller.subscribe();

    let spinner = output.spinner(&format!("Searching for \"{query}\"..."));
    controller.set_query(query);
    let state = rx.wait_for(|s| !s.loading).await?.clone();
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if output.is_human() {
        if let Some(message) = &state.message {
            output.warn(message);
        }
        if state.movies.is_empty() && state.message.is_none() {
            output.info("No results.");
        }
        for movie in &state.movies {
            output.println(format!("{}  {}", movie.imdb_id, movie.title));
        }
    } else {
        output.print_json(&json!({
            "query": state.query,
            "message": state.message,
            "movies": state.movies,
        }));
    }

    Ok(())
}
