//! Topic-Harvest: a topic-then-article news crawler
//!
//! This crate discovers the topic sections of a single news site, collects the
//! article links listed on each section page, downloads every article and turns
//! it into a flat, self-describing record using class-keyed HTML selectors.
//! Records are handed to a sink (SQLite document table or JSON files).

pub mod config;
pub mod crawler;
pub mod extract;
pub mod html;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Topic-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Unknown topic: {name}")]
    UnknownTopic { name: String },

    #[error("Duplicate topic '{name}': {first} collides with {second}")]
    DuplicateTopic {
        name: String,
        first: String,
        second: String,
    },

    #[error("Invalid crawl transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// The URL the failed request was aimed at
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. } | Self::Status { url, .. } | Self::RetriesExhausted { url, .. } => {
                url
            }
        }
    }

    /// Returns true if repeating the request may succeed
    ///
    /// Timeouts, connection failures, HTTP 429 and 5xx responses are
    /// transient. Other 4xx responses are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::RetriesExhausted { .. } => false,
        }
    }
}

/// Result type alias for Topic-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, CrawlReport, CrawlResults, Fetcher, HttpFetcher, TopicMap};
pub use extract::{ArticleExtractor, FieldSpec, FieldValue, Record, ResultSequence};
pub use html::Document;
pub use state::CrawlPhase;
pub use storage::{JsonFileSink, RecordSink, SqliteStore};
