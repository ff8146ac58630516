//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Keyword-Scout database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per submitted job
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    seed_url TEXT NOT NULL,
    status TEXT NOT NULL,
    keywords TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    error_message TEXT,
    created_at TEXT NOT NULL,
    finished_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
CREATE INDEX IF NOT EXISTS idx_jobs_created ON jobs(created_at);

-- Scored pages that passed the inclusion threshold
CREATE TABLE IF NOT EXISTS results (
    id TEXT PRIMARY KEY,
    job_id TEXT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    target_url TEXT NOT NULL,
    file_type TEXT NOT NULL,
    relevance_score REAL NOT NULL,
    matched_keywords TEXT NOT NULL,
    extracted_text TEXT,
    depth INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_job ON results(job_id);
CREATE INDEX IF NOT EXISTS idx_results_score ON results(relevance_score);
CREATE INDEX IF NOT EXISTS idx_results_file_type ON results(file_type);
"#;

/// Initializes the database schema
///
/// Safe to run against an existing database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
