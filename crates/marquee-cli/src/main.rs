use clap::{ArgAction, Parser, Subcommand};

mod commands;
mod logging;
mod output;

use commands::{browse, config, search, show, watchlist};

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Marquee - search movies and keep a watch-later list")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the movie catalog
    #[command(long_about = "Search the movie catalog by free text. Prints one line per match in human mode; use --output json for machine-readable results.")]
    Search {
        /// Free-text search term
        query: String,
    },

    /// Show full details for one movie
    Show {
        /// IMDb id, e.g. tt1375666
        imdb_id: String,

        /// Also resolve a trailer link
        #[arg(long, action = ArgAction::SetTrue)]
        trailer: bool,
    },

    /// Manage the watch-later list
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },

    /// Interactive search-and-save shell
    #[command(long_about = "Interactive shell: type to search as you type, arrows to move, Right to open a movie, 'w' to save it, 't' to toggle the trailer line, Escape or Backspace to close the popup, Enter to refocus and clear the search, Ctrl+C to quit.")]
    Browse,

    /// Configure API keys and paths
    #[command(long_about = "Manage configuration for Marquee. Running without a subcommand starts the interactive wizard. API keys can also be supplied via MARQUEE_OMDB_API_KEY and MARQUEE_YOUTUBE_API_KEY.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// List saved movies
    List,

    /// Fetch a movie's details and save it for later
    Add {
        /// IMDb id, e.g. tt1375666
        imdb_id: String,
    },

    /// Remove a saved movie
    Remove {
        /// IMDb id, e.g. tt1375666
        imdb_id: String,
    },

    /// Remove every saved movie
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (API keys are masked)
    Show,

    /// Interactive configuration wizard
    Interactive,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Browse owns the terminal, so its logs go to a file instead of stderr.
    let log_file = match cli.command {
        Commands::Browse => Some(marquee_config::PathManager::default().browse_log_file()),
        _ => None,
    };
    logging::init_logging(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(&query, &output).await,
        Commands::Show { imdb_id, trailer } => show::run_show(&imdb_id, trailer, &output).await,
        Commands::Watchlist { cmd } => watchlist::run_watchlist(cmd, &output).await,
        Commands::Browse => browse::run_browse(&output).await,
        Commands::Config { cmd } => {
            config::run_config(cmd.unwrap_or(ConfigCommands::Interactive), &output).await
        }
    }
}
