use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Reddit API error: {0}")]
    RedditApi(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date window: {0}")]
    InvalidDateWindow(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Stored dataset unavailable: {0}")]
    MissingData(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Topic model error: {0}")]
    TopicModel(#[from] aprender::AprenderError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors raised by the remote source; the collector tolerates these per strategy.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Error::RedditApi(_) | Error::Auth(_) | Error::RateLimited(_) | Error::Network(_)
        )
    }
}
