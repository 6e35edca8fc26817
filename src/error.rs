//! The error types this crate uses.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The input line is not a bare numeric user id.
    #[error("'{0}' is not a numeric user id")]
    MalformedInput(String),
    #[error("failed to fetch user {user_id}: {source}")]
    Fetch {
        user_id: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: DownloadFailure,
    },
    #[error("DISCORD_BOT_TOKEN was not found in the environment or .env")]
    MissingToken,
    #[error("delay must be a finite, non-negative number of seconds (got {0})")]
    InvalidDelay(f64),
    #[error("failed to build HTTP client")]
    Http(#[from] reqwest::Error),
}

/// Why an avatar download did not produce a file.
#[derive(Error, Debug)]
pub enum DownloadFailure {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
