//! Job lifecycle and execution
//!
//! - `JobManager`: runs one job end to end (PENDING -> COMPLETE | FAILED)
//! - `JobQueue` / `WorkerPool`: in-process submission queue consumed by a
//!   bounded number of concurrent workers

mod manager;
mod pool;

pub use manager::JobManager;
pub use pool::{JobOutcome, JobQueue, WorkerPool};

use crate::crawler::CrawlError;
use crate::storage::StorageError;
use thiserror::Error;

/// A request to crawl one seed
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub seed_url: String,
    /// Keyword set for this job; the configured default set when None or empty
    pub keywords: Option<Vec<String>>,
}

impl JobRequest {
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            keywords: None,
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = Some(keywords);
        self
    }
}

/// Errors that end a job as FAILED, or prevent it from being recorded
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Job exceeded the hard timeout of {0}s")]
    HardTimeout(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Job queue is closed")]
    QueueClosed,
}

/// Reads a batch seed list: one URL per line
///
/// Blank lines and lines starting with `#` are ignored.
pub fn parse_seed_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
