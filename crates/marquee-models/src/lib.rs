pub mod movie;
pub mod watchlist;

pub use movie::{MovieDetails, MovieSummary};
pub use watchlist::{parse_runtime_minutes, WatchlistEntry};
