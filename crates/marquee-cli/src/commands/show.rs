use std::sync::Arc;

use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use marquee_core::DetailController;
use marquee_sources::{MetadataSource, TrailerSource};
use serde_json::json;

use super::AppContext;
use crate::output::Output;

pub async fn run_show(imdb_id: &str, with_trailer: bool, output: &Output) -> Result<()> {
    tracing::debug!(%imdb_id, "show command started");

    let ctx = AppContext::build()?;
    let controller = DetailController::new(
        ctx.metadata.clone() as Arc<dyn MetadataSource>,
        ctx.trailers.clone() as Arc<dyn TrailerSource>,
        Arc::clone(&ctx.watchlist),
    );
    let mut rx = controller.subscribe();

    let spinner = output.spinner(&format!("Fetching details for {imdb_id}..."));
    controller.select(imdb_id);
    let state = rx.wait_for(|s| !s.loading).await?.clone();

    let Some(details) = state.details else {
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        output.error(state.notice.as_deref().unwrap_or("No details available"));
        return Ok(());
    };

    // The trailer lookup runs independently of detail availability; only
    // wait for it when the caller asked for the link.
    let trailer_url = if with_trailer {
        let state = rx.wait_for(|s| s.trailer_resolved).await?.clone();
        state.trailer_url
    } else {
        None
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if output.is_human() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.add_row(vec!["Title", details.title.as_str()]);
        let rows = [
            ("Language", &details.language),
            ("Genre", &details.genre),
            ("Released", &details.released),
            ("IMDb rating", &details.imdb_rating),
            ("Runtime", &details.runtime),
            ("Director", &details.director),
            ("Starring", &details.actors),
            ("Plot", &details.plot),
        ];
        for (label, value) in rows {
            if let Some(value) = value {
                table.add_row(vec![label, value.as_str()]);
            }
        }
        println!("{table}");

        if with_trailer {
            match &trailer_url {
                Some(url) => output.info(format!("Trailer: {url}")),
                None => output.info("No trailer available"),
            }
        }
        if ctx.watchlist.contains(&details.imdb_id) {
            output.info("Already on your watch-later list");
        }
    } else {
        output.print_json(&json!({
            "details": details,
            "trailer_url": trailer_url,
            "on_watchlist": ctx.watchlist.contains(&details.imdb_id),
        }));
    }

    Ok(())
}
