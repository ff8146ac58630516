//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::{CandidateResult, JobStatus};
use crate::storage::{JobRecord, JobStatusReport, ResultFilter, ResultRecord};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Invalid job transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Job rows are written only through the lifecycle methods below, which
/// enforce `PENDING -> COMPLETE | FAILED` exactly once.
pub trait Storage {
    // ===== Job Lifecycle =====

    /// Creates a new PENDING job
    ///
    /// # Arguments
    ///
    /// * `job_id` - Identifier assigned at submission
    /// * `seed_url` - The seed URL as submitted
    /// * `keywords` - Keyword set the job runs with
    /// * `config_hash` - Hash of the configuration file (empty for defaults)
    fn create_job(
        &mut self,
        job_id: Uuid,
        seed_url: &str,
        keywords: &[String],
        config_hash: &str,
    ) -> StorageResult<()>;

    /// Writes all results and marks the job COMPLETE in one transaction
    ///
    /// Nothing is written if any insert fails.
    ///
    /// # Returns
    ///
    /// The number of results written
    fn complete_job(&mut self, job_id: Uuid, results: &[CandidateResult]) -> StorageResult<usize>;

    /// Marks the job FAILED with an error message
    fn fail_job(&mut self, job_id: Uuid, error_message: &str) -> StorageResult<()>;

    // ===== Queries =====

    /// Gets a job by ID
    fn get_job(&self, job_id: Uuid) -> StorageResult<JobRecord>;

    /// Gets the status of a job, with its result count once COMPLETE
    fn job_status(&self, job_id: Uuid) -> StorageResult<JobStatusReport>;

    /// Lists jobs, newest first
    fn list_jobs(&self, limit: u32, offset: u32) -> StorageResult<Vec<JobRecord>>;

    /// Lists results matching a filter, highest score first
    fn list_results(&self, filter: &ResultFilter) -> StorageResult<Vec<ResultRecord>>;

    /// Counts the results stored for a job
    fn count_results(&self, job_id: Uuid) -> StorageResult<u64>;

    // ===== Maintenance =====

    /// Deletes every job and, by cascade, every result
    ///
    /// # Returns
    ///
    /// The number of jobs deleted
    fn reset(&mut self) -> StorageResult<usize>;
}
