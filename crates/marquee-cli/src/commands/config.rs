use color_eyre::Result;
use dialoguer::{Confirm, Password};
use marquee_config::{Config, PathManager};
use serde_json::json;

use crate::output::Output;
use crate::ConfigCommands;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    let paths = PathManager::default();

    match cmd {
        ConfigCommands::Show => show(&paths, output),
        ConfigCommands::Interactive => interactive(&paths, output),
    }
}

fn show(paths: &PathManager, output: &Output) -> Result<()> {
    let config = Config::load(paths)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

    if !output.is_human() {
        output.print_json(&json!({
            "config_file": paths.config_file(),
            "watchlist_file": config.watchlist_file(paths),
            "omdb_api_key": config.omdb_api_key().map(mask),
            "youtube_api_key": config.youtube_api_key().map(mask),
        }));
        return Ok(());
    }

    output.info(format!("Config file:    {}", paths.config_file().display()));
    output.info(format!(
        "Watchlist file: {}",
        config.watchlist_file(paths).display()
    ));
    output.info(format!(
        "OMDb API key:    {}",
        config
            .omdb_api_key()
            .map(mask)
            .unwrap_or_else(|| "(not set - search is disabled)".to_string())
    ));
    output.info(format!(
        "YouTube API key: {}",
        config
            .youtube_api_key()
            .map(mask)
            .unwrap_or_else(|| "(not set - trailers are disabled)".to_string())
    ));
    Ok(())
}

/// Prompt for both API keys and write the config file. An empty answer
/// keeps the currently stored value.
fn interactive(paths: &PathManager, output: &Output) -> Result<()> {
    let config_file = paths.config_file();
    let mut config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

    output.info("Marquee configuration");
    output.info("Search needs an OMDb API key (https://www.omdbapi.com/apikey.aspx).");
    output.info("Trailer lookup needs a YouTube Data API key; leave empty to skip.");

    let omdb = Password::new()
        .with_prompt(prompt_label("OMDb API key", config.omdb_api_key()))
        .allow_empty_password(true)
        .interact()?;
    if !omdb.is_empty() {
        config.keys.omdb_api_key = Some(omdb);
    }

    let youtube = Password::new()
        .with_prompt(prompt_label("YouTube API key", config.youtube_api_key()))
        .allow_empty_password(true)
        .interact()?;
    if !youtube.is_empty() {
        config.keys.youtube_api_key = Some(youtube);
    }

    if config_file.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!("Overwrite {}?", config_file.display()))
            .default(true)
            .interact()?;
        if !overwrite {
            output.info("Aborted");
            return Ok(());
        }
    }

    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save configuration: {}", e))?;

    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}

fn prompt_label(name: &str, current: Option<&str>) -> String {
    match current {
        Some(key) => format!("{name} [{}]", mask(key)),
        None => format!("{name} [not set]"),
    }
}

fn mask(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    if prefix.len() == key.len() {
        return "****".to_string();
    }
    format!("{prefix}****")
}
