//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{CandidateResult, JobStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{JobRecord, JobStatusReport, ResultFilter, ResultRecord};
use chrono::Utc;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use uuid::Uuid;

const JOB_COLUMNS: &str =
    "id, seed_url, status, keywords, config_hash, error_message, created_at, finished_at";

const RESULT_COLUMNS: &str = "id, job_id, target_url, file_type, relevance_score, \
     matched_keywords, extracted_text, depth, created_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database or create the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn current_status(&self, job_id: Uuid) -> StorageResult<JobStatus> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM jobs WHERE id = ?1",
                params![job_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        raw.as_deref()
            .and_then(JobStatus::from_db_string)
            .ok_or(StorageError::JobNotFound(job_id))
    }
}

impl Storage for SqliteStorage {
    // ===== Job Lifecycle =====

    fn create_job(
        &mut self,
        job_id: Uuid,
        seed_url: &str,
        keywords: &[String],
        config_hash: &str,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let keywords_json = serde_json::to_string(keywords)?;
        self.conn.execute(
            "INSERT INTO jobs (id, seed_url, status, keywords, config_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                job_id.to_string(),
                seed_url,
                JobStatus::Pending.to_db_string(),
                keywords_json,
                config_hash,
                now
            ],
        )?;
        Ok(())
    }

    fn complete_job(&mut self, job_id: Uuid, results: &[CandidateResult]) -> StorageResult<usize> {
        let current = self.current_status(job_id)?;
        if !current.can_transition_to(JobStatus::Complete) {
            return Err(StorageError::InvalidTransition {
                from: current,
                to: JobStatus::Complete,
            });
        }

        // Dropping the transaction without commit rolls every insert back
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO results (id, job_id, target_url, file_type, relevance_score,
                                      matched_keywords, extracted_text, depth, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;

            for result in results {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    job_id.to_string(),
                    result.target_url,
                    result.file_type,
                    result.relevance_score,
                    serde_json::to_string(&result.matched_keywords)?,
                    result.extracted_text,
                    result.depth,
                    result.created_at.to_rfc3339(),
                ])?;
            }
        }

        let updated = tx.execute(
            "UPDATE jobs SET status = ?1, finished_at = ?2, error_message = NULL
             WHERE id = ?3 AND status = ?4",
            params![
                JobStatus::Complete.to_db_string(),
                Utc::now().to_rfc3339(),
                job_id.to_string(),
                JobStatus::Pending.to_db_string()
            ],
        )?;

        if updated != 1 {
            return Err(StorageError::InvalidTransition {
                from: current,
                to: JobStatus::Complete,
            });
        }

        tx.commit()?;
        Ok(results.len())
    }

    fn fail_job(&mut self, job_id: Uuid, error_message: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE jobs SET status = ?1, finished_at = ?2, error_message = ?3
             WHERE id = ?4 AND status = ?5",
            params![
                JobStatus::Failed.to_db_string(),
                Utc::now().to_rfc3339(),
                error_message,
                job_id.to_string(),
                JobStatus::Pending.to_db_string()
            ],
        )?;

        if updated == 0 {
            let current = self.current_status(job_id)?;
            return Err(StorageError::InvalidTransition {
                from: current,
                to: JobStatus::Failed,
            });
        }

        Ok(())
    }

    // ===== Queries =====

    fn get_job(&self, job_id: Uuid) -> StorageResult<JobRecord> {
        let query = format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS);
        self.conn
            .query_row(&query, params![job_id.to_string()], job_from_row)
            .optional()?
            .ok_or(StorageError::JobNotFound(job_id))
    }

    fn job_status(&self, job_id: Uuid) -> StorageResult<JobStatusReport> {
        let job = self.get_job(job_id)?;
        let result_count = match job.status {
            JobStatus::Complete => Some(self.count_results(job_id)?),
            _ => None,
        };

        Ok(JobStatusReport {
            job_id,
            status: job.status,
            result_count,
            error_message: job.error_message,
        })
    }

    fn list_jobs(&self, limit: u32, offset: u32) -> StorageResult<Vec<JobRecord>> {
        let query = format!(
            "SELECT {} FROM jobs ORDER BY created_at DESC, id LIMIT ?1 OFFSET ?2",
            JOB_COLUMNS
        );
        let mut stmt = self.conn.prepare(&query)?;
        let jobs = stmt
            .query_map(params![limit, offset], job_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    fn list_results(&self, filter: &ResultFilter) -> StorageResult<Vec<ResultRecord>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(job_id) = filter.job_id {
            conditions.push("job_id = ?");
            values.push(Value::Text(job_id.to_string()));
        }
        if let Some(file_type) = &filter.file_type {
            conditions.push("file_type = ?");
            values.push(Value::Text(file_type.clone()));
        }
        if let Some(min_score) = filter.min_relevance_score {
            conditions.push("relevance_score >= ?");
            values.push(Value::Real(min_score));
        }
        if let Some(keyword) = &filter.keyword {
            // Matches inside one keyword, never across the JSON encoding
            conditions.push(
                r"EXISTS (SELECT 1 FROM json_each(results.matched_keywords)
                          WHERE json_each.value LIKE '%' || ? || '%' ESCAPE '\')",
            );
            values.push(Value::Text(escape_like(keyword)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {} FROM results {} ORDER BY relevance_score DESC, created_at, id
             LIMIT ? OFFSET ?",
            RESULT_COLUMNS, where_clause
        );
        values.push(Value::Integer(i64::from(filter.limit)));
        values.push(Value::Integer(i64::from(filter.offset)));

        let mut stmt = self.conn.prepare(&query)?;
        let results = stmt
            .query_map(params_from_iter(values), result_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results)
    }

    fn count_results(&self, job_id: Uuid) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM results WHERE job_id = ?1",
            params![job_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    // ===== Maintenance =====

    fn reset(&mut self) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM results", [])?;
        let deleted = tx.execute("DELETE FROM jobs", [])?;
        tx.commit()?;
        Ok(deleted)
    }
}

fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<JobRecord> {
    let status_raw: String = row.get(2)?;
    let status = JobStatus::from_db_string(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown job status {:?}", status_raw).into(),
        )
    })?;

    Ok(JobRecord {
        id: parse_uuid(row, 0)?,
        seed_url: row.get(1)?,
        status,
        keywords: parse_json_list(row, 3)?,
        config_hash: row.get(4)?,
        error_message: row.get(5)?,
        created_at: row.get(6)?,
        finished_at: row.get(7)?,
    })
}

/// Escapes LIKE wildcards so the pattern matches literally
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn result_from_row(row: &Row<'_>) -> rusqlite::Result<ResultRecord> {
    Ok(ResultRecord {
        id: parse_uuid(row, 0)?,
        job_id: parse_uuid(row, 1)?,
        target_url: row.get(2)?,
        file_type: row.get(3)?,
        relevance_score: row.get(4)?,
        matched_keywords: parse_json_list(row, 5)?,
        extracted_text: row.get(6)?,
        depth: row.get(7)?,
        created_at: row.get(8)?,
    })
}
