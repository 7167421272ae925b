use std::sync::Arc;

use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use dialoguer::Confirm;
use marquee_core::{AddOutcome, DetailController, DUPLICATE_NOTICE};
use marquee_sources::{MetadataSource, TrailerSource};
use serde_json::json;

use super::AppContext;
use crate::output::Output;
use crate::WatchlistCommands;

pub async fn run_watchlist(cmd: WatchlistCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::build()?;

    match cmd {
        WatchlistCommands::List => list(&ctx, output),
        WatchlistCommands::Add { imdb_id } => add(&ctx, &imdb_id, output).await,
        WatchlistCommands::Remove { imdb_id } => {
            if ctx.watchlist.remove(&imdb_id) {
                output.success(format!("Removed {imdb_id} from the watchlist"));
            } else {
                output.info(format!("{imdb_id} is not on the watchlist"));
            }
            Ok(())
        }
        WatchlistCommands::Clear { yes } => clear(&ctx, yes, output),
    }
}

fn list(ctx: &AppContext, output: &Output) -> Result<()> {
    let entries = ctx.watchlist.entries();

    if !output.is_human() {
        output.print_json(&json!({ "watchlist": entries }));
        return Ok(());
    }

    if entries.is_empty() {
        output.info("Nothing to see here.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["IMDb id", "Title", "Genre", "Duration", "Added"]);
    for entry in &entries {
        table.add_row(vec![
            entry.imdb_id.clone(),
            entry.title.clone(),
            entry.genre.clone().unwrap_or_default(),
            entry
                .runtime_minutes
                .map(|m| format!("{m} mins"))
                .unwrap_or_default(),
            entry.added_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{table}");
    output.info(format!("Watch later ({})", entries.len()));
    Ok(())
}

/// `add` goes through the detail flow so runtime and genre come from the
/// full detail record, exactly as the interactive save does.
async fn add(ctx: &AppContext, imdb_id: &str, output: &Output) -> Result<()> {
    let controller = DetailController::new(
        ctx.metadata.clone() as Arc<dyn MetadataSource>,
        ctx.trailers.clone() as Arc<dyn TrailerSource>,
        Arc::clone(&ctx.watchlist),
    );
    let mut rx = controller.subscribe();

    let spinner = output.spinner(&format!("Fetching details for {imdb_id}..."));
    controller.select(imdb_id);
    let state = rx.wait_for(|s| !s.loading).await?.clone();
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let Some(details) = state.details else {
        output.error(state.notice.as_deref().unwrap_or("No details available"));
        return Ok(());
    };

    match controller.add_to_watchlist() {
        Some(AddOutcome::Added) => {
            output.success(format!("Added \"{}\" to the watchlist", details.title))
        }
        Some(AddOutcome::Duplicate) => output.warn(DUPLICATE_NOTICE),
        None => output.error("No details available"),
    }
    Ok(())
}

fn clear(ctx: &AppContext, yes: bool, output: &Output) -> Result<()> {
    let count = ctx.watchlist.len();
    if count == 0 {
        output.info("The watchlist is already empty");
        return Ok(());
    }

    if !yes && output.is_human() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove all {count} saved movies?"))
            .default(false)
            .interact()?;
        if !confirmed {
            output.info("Aborted");
            return Ok(());
        }
    }

    ctx.watchlist.clear();
    output.success(format!("Removed {count} saved movies"));
    Ok(())
}
