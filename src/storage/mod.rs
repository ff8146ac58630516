//! Storage module for persisting jobs and results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Job lifecycle transitions
//! - Atomic result commits
//! - Result and job queries

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::JobStatus;
use uuid::Uuid;

/// Represents a job in the database
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub seed_url: String,
    pub status: JobStatus,
    pub keywords: Vec<String>,
    pub config_hash: String,
    pub error_message: Option<String>,
    pub created_at: String,
    pub finished_at: Option<String>,
}

/// Represents a persisted result
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub id: Uuid,
    pub job_id: Uuid,
    pub target_url: String,
    pub file_type: String,
    pub relevance_score: f64,
    pub matched_keywords: Vec<String>,
    pub extracted_text: Option<String>,
    pub depth: u32,
    pub created_at: String,
}

/// Answer to a job status query
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusReport {
    pub job_id: Uuid,
    pub status: JobStatus,
    /// Present only once the job is COMPLETE
    pub result_count: Option<u64>,
    pub error_message: Option<String>,
}

/// Filters for result listing
#[derive(Debug, Clone)]
pub struct ResultFilter {
    pub job_id: Option<Uuid>,
    pub file_type: Option<String>,
    pub min_relevance_score: Option<f64>,
    /// Case-insensitive substring over the matched keywords
    pub keyword: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self {
            job_id: None,
            file_type: None,
            min_relevance_score: None,
            keyword: None,
            limit: 50,
            offset: 0,
        }
    }
}
