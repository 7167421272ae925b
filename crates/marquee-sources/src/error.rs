use thiserror::Error;

/// Errors crossing the upstream service boundary. Display strings double as
/// the user-facing messages, so the taxonomy maps one-to-one onto what the
/// shell shows:
/// - `Transport` covers network failures and non-success HTTP statuses.
/// - `NoMatch` / `TooManyResults` / `Upstream` are upstream-reported logical
///   failures, recoverable by changing the query.
/// - `Shape` is a response that transported fine but failed validation.
/// - `Disabled` means the feature's API key is not configured; the rest of
///   the application keeps working.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Something went wrong, please check your connection and try again")]
    Transport { detail: String },

    #[error("Search your favorite movie")]
    NoMatch,

    #[error("Please complete your search query.")]
    TooManyResults,

    #[error("{0}")]
    Upstream(String),

    #[error("Unexpected {service} response: {detail}")]
    Shape {
        service: &'static str,
        detail: String,
    },

    #[error("{0} API key is not configured; run `marquee config` to set it")]
    Disabled(&'static str),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Transport {
            detail: err.to_string(),
        }
    }
}
