//! Keyword-Scout: relevance-scored link discovery
//!
//! This crate crawls outward from a seed URL, scores every reachable page
//! against a keyword set with an external relevance oracle, and records the
//! matching pages under an explicit job lifecycle.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod jobs;
pub mod keywords;
pub mod oracle;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Keyword-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Oracle error: {0}")]
    Oracle(#[from] oracle::OracleError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] crawler::CrawlError),

    #[error("Job error: {0}")]
    Job(#[from] jobs::JobError),

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

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Keyword-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, FrontierCrawler};
pub use filter::LinkFilter;
pub use jobs::{JobManager, JobQueue, JobRequest, WorkerPool};
pub use keywords::match_keywords;
pub use oracle::{OpenAiOracle, RelevanceOracle};
pub use state::{JobStatus, LinkOutcome};
pub use storage::{SqliteStorage, Storage};
pub use url::{guess_file_type, normalize_url};
