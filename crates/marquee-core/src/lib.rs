pub mod detail;
pub mod keys;
pub mod search;
pub mod storage;
pub mod watchlist;

#[cfg(test)]
pub(crate) mod testutil;

pub use detail::{DetailController, DetailState, ADDED_CONFIRMATION};
pub use keys::{BindingHandle, Key, KeyRouter};
pub use search::{SearchController, SearchState, TRUNCATED_WARNING};
pub use storage::WatchlistStorage;
pub use watchlist::{AddOutcome, WatchlistStore, DUPLICATE_NOTICE};
