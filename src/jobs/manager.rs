use crate::config::Config;
use crate::crawler::FrontierCrawler;
use crate::jobs::{JobError, JobRequest};
use crate::oracle::{is_valid_score, RelevanceOracle};
use crate::state::{CandidateResult, JobStatus};
use crate::storage::{SqliteStorage, Storage, StorageError, StorageResult};
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Runs jobs through their lifecycle
///
/// The manager owns no per-job state; a fresh [`FrontierCrawler`] is built
/// for every job, so one manager is shared by all workers.
pub struct JobManager {
    config: Arc<Config>,
    config_hash: String,
    storage: Arc<Mutex<SqliteStorage>>,
    oracle: Arc<dyn RelevanceOracle>,
    client: Client,
}

impl JobManager {
    /// Creates a manager
    ///
    /// # Arguments
    ///
    /// * `config` - Shared configuration
    /// * `config_hash` - Hash recorded on every job row
    /// * `storage` - Database shared with other workers
    /// * `oracle` - Relevance scorer
    /// * `client` - HTTP client for page and robots.txt fetches
    pub fn new(
        config: Arc<Config>,
        config_hash: impl Into<String>,
        storage: Arc<Mutex<SqliteStorage>>,
        oracle: Arc<dyn RelevanceOracle>,
        client: Client,
    ) -> Self {
        Self {
            config,
            config_hash: config_hash.into(),
            storage,
            oracle,
            client,
        }
    }

    pub fn storage(&self) -> &Arc<Mutex<SqliteStorage>> {
        &self.storage
    }

    /// Runs a job end to end
    ///
    /// Creates the PENDING row, crawls under the soft and hard timeouts,
    /// then either commits the qualifying results together with COMPLETE or
    /// records FAILED with the error message.
    ///
    /// # Returns
    ///
    /// * `Ok(JobStatus)` - The terminal status that was recorded
    /// * `Err(JobError::Storage)` - The job row could not be created or finalized
    pub async fn run_job(&self, job_id: Uuid, request: JobRequest) -> Result<JobStatus, JobError> {
        let keywords = match request.keywords {
            Some(keywords) if !keywords.is_empty() => keywords,
            _ => self.config.keywords.clone(),
        };

        self.with_storage(|s| {
            s.create_job(job_id, &request.seed_url, &keywords, &self.config_hash)
        })?;
        info!(job_id = %job_id, seed = %request.seed_url, "Job created (PENDING)");

        match self.execute(job_id, &request.seed_url, &keywords).await {
            Ok(written) => {
                info!(job_id = %job_id, results = written, "Job COMPLETE");
                Ok(JobStatus::Complete)
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Job FAILED");
                self.with_storage(|s| s.fail_job(job_id, &e.to_string()))?;
                Ok(JobStatus::Failed)
            }
        }
    }

    async fn execute(&self, job_id: Uuid, seed: &str, keywords: &[String]) -> Result<usize, JobError> {
        let jobs = &self.config.jobs;
        let soft = Duration::from_secs(jobs.soft_timeout_secs);
        let hard = Duration::from_secs(jobs.hard_timeout_secs);

        let crawler = FrontierCrawler::new(
            Arc::clone(&self.config),
            self.client.clone(),
            Arc::clone(&self.oracle),
        );
        let cancel = CancellationToken::new();
        let crawl = crawler.crawl(seed, keywords, &cancel);
        tokio::pin!(crawl);

        let report = tokio::select! {
            result = &mut crawl => result?,
            _ = tokio::time::sleep(soft) => {
                warn!(job_id = %job_id, "Soft timeout reached, stopping crawl");
                cancel.cancel();
                match tokio::time::timeout(hard.saturating_sub(soft), &mut crawl).await {
                    Ok(result) => result?,
                    Err(_) => return Err(JobError::HardTimeout(jobs.hard_timeout_secs)),
                }
            }
        };

        let threshold = jobs.inclusion_threshold;
        let scored = report.candidates.len();
        let kept: Vec<CandidateResult> = report
            .candidates
            .into_iter()
            .filter(|c| is_valid_score(c.relevance_score) && c.relevance_score > threshold)
            .collect();

        info!(
            job_id = %job_id,
            scored,
            kept = kept.len(),
            skipped = report.skipped.values().sum::<usize>(),
            cancelled = report.cancelled,
            "Crawl finished, committing results"
        );

        let written = self.with_storage(|s| s.complete_job(job_id, &kept))?;
        Ok(written)
    }

    fn with_storage<T>(
        &self,
        f: impl FnOnce(&mut SqliteStorage) -> StorageResult<T>,
    ) -> Result<T, StorageError> {
        let mut guard = self.storage.lock().map_err(|_| StorageError::LockPoisoned)?;
        f(&mut guard)
    }
}
