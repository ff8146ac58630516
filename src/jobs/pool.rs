use crate::jobs::{JobError, JobManager, JobRequest};
use crate::state::JobStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Final outcome of a job processed by the pool
#[derive(Debug)]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub result: Result<JobStatus, JobError>,
}

/// Submission handle for the worker pool
///
/// Cloning the queue yields another handle to the same pool. The pool stops
/// accepting work once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<(Uuid, JobRequest)>,
    active: Arc<AtomicUsize>,
}

impl JobQueue {
    /// Enqueues one job and returns its identifier
    pub fn submit(&self, request: JobRequest) -> Result<Uuid, JobError> {
        let job_id = Uuid::new_v4();
        self.active.fetch_add(1, Ordering::SeqCst);
        if self.sender.send((job_id, request)).is_err() {
            self.active.fetch_sub(1, Ordering::SeqCst);
            return Err(JobError::QueueClosed);
        }
        debug!(job_id = %job_id, "Job queued");
        Ok(job_id)
    }

    /// Enqueues several jobs, returning their identifiers in input order
    pub fn submit_batch(
        &self,
        requests: impl IntoIterator<Item = JobRequest>,
    ) -> Result<Vec<Uuid>, JobError> {
        requests
            .into_iter()
            .map(|request| self.submit(request))
            .collect()
    }
}

/// Consumes the job queue with bounded concurrency
///
/// Each accepted job is handed to [`JobManager::run_job`] exactly once.
pub struct WorkerPool {
    dispatcher: JoinHandle<Vec<JobOutcome>>,
    active: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Starts the dispatcher task
    ///
    /// # Arguments
    ///
    /// * `manager` - Manager shared by every worker
    /// * `concurrency` - Maximum number of jobs running at once
    ///
    /// # Returns
    ///
    /// The submission queue and the pool handle
    pub fn start(manager: Arc<JobManager>, concurrency: usize) -> (JobQueue, WorkerPool) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let active = Arc::new(AtomicUsize::new(0));

        info!("Starting worker pool with {} workers", concurrency.max(1));
        let dispatcher = tokio::spawn(dispatch(
            manager,
            receiver,
            semaphore,
            Arc::clone(&active),
        ));

        let queue = JobQueue {
            sender,
            active: Arc::clone(&active),
        };
        (queue, WorkerPool { dispatcher, active })
    }

    /// Number of submitted jobs that are queued or still running
    pub fn active_jobs(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Closes the queue and waits for every accepted job to finish
    ///
    /// Other clones of the queue must be dropped too, or this waits for them.
    pub async fn shutdown(self, queue: JobQueue) -> Vec<JobOutcome> {
        drop(queue);
        match self.dispatcher.await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                error!("Worker pool dispatcher failed: {}", e);
                Vec::new()
            }
        }
    }
}

async fn dispatch(
    manager: Arc<JobManager>,
    mut receiver: mpsc::UnboundedReceiver<(Uuid, JobRequest)>,
    semaphore: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
) -> Vec<JobOutcome> {
    let mut running = JoinSet::new();
    let mut outcomes = Vec::new();

    // Finished workers are reaped as they complete, not only at shutdown
    loop {
        tokio::select! {
            received = receiver.recv() => {
                let Some((job_id, request)) = received else {
                    break;
                };
                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let manager = Arc::clone(&manager);
                running.spawn(async move {
                    let _permit = permit;
                    let result = manager.run_job(job_id, request).await;
                    JobOutcome { job_id, result }
                });
            }
            Some(joined) = running.join_next(), if !running.is_empty() => {
                reap(joined, &active, &mut outcomes);
            }
        }
    }

    while let Some(joined) = running.join_next().await {
        reap(joined, &active, &mut outcomes);
    }

    info!("Worker pool drained, {} jobs processed", outcomes.len());
    outcomes
}

fn reap(
    joined: Result<JobOutcome, tokio::task::JoinError>,
    active: &AtomicUsize,
    outcomes: &mut Vec<JobOutcome>,
) {
    active.fetch_sub(1, Ordering::SeqCst);
    match joined {
        Ok(outcome) => {
            debug!(job_id = %outcome.job_id, "Job worker finished");
            outcomes.push(outcome);
        }
        Err(e) => error!("Job worker panicked: {}", e),
    }
}
