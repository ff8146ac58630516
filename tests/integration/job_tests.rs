//! Job lifecycle tests: threshold filtering, failure handling and the
//! worker pool, against a real database file

use crate::common::{fast_config, html_page, FakeOracle};
use keyword_scout::config::Config;
use keyword_scout::crawler::build_http_client;
use keyword_scout::jobs::{JobManager, JobRequest, WorkerPool};
use async_trait::async_trait;
use keyword_scout::oracle::{OpenAiOracle, OracleError, RelevanceOracle};
use keyword_scout::state::JobStatus;
use keyword_scout::storage::{ResultFilter, SqliteStorage, Storage};
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    _dir: TempDir,
    db_path: std::path::PathBuf,
    manager: Arc<JobManager>,
}

impl Harness {
    fn new(config: Config, oracle: Arc<dyn RelevanceOracle>) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("scout.db");
        let storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
        let client = build_http_client(&config).expect("Failed to build client");
        let manager = Arc::new(JobManager::new(
            Arc::new(config),
            "test-hash",
            Arc::new(Mutex::new(storage)),
            oracle,
            client,
        ));

        Self {
            _dir: dir,
            db_path,
            manager,
        }
    }

    async fn run(&self, request: JobRequest) -> (Uuid, JobStatus) {
        let job_id = Uuid::new_v4();
        let status = self
            .manager
            .run_job(job_id, request)
            .await
            .expect("Job could not be recorded");
        (job_id, status)
    }

    /// Opens an independent connection, as a separate query process would
    fn reopen(&self) -> SqliteStorage {
        SqliteStorage::new(Path::new(&self.db_path)).expect("Failed to reopen DB")
    }
}

fn results_for(storage: &SqliteStorage, job_id: Uuid) -> Vec<(String, f64)> {
    let filter = ResultFilter {
        job_id: Some(job_id),
        ..ResultFilter::default()
    };
    storage
        .list_results(&filter)
        .unwrap()
        .into_iter()
        .map(|r| {
            let p = url::Url::parse(&r.target_url).unwrap().path().to_string();
            (p, r.relevance_score)
        })
        .collect()
}

async fn mount_three_links(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/alpha">Alpha</a><a href="/beta">Beta</a><a href="/gamma">Gamma</a>"#,
        ))
        .mount(server)
        .await;
    for p in ["/alpha", "/beta", "/gamma"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(html_page("<p>Annual Budget and Audit results</p>"))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_only_scores_above_threshold_are_persisted() {
    let server = MockServer::start().await;
    mount_three_links(&server).await;

    let oracle = FakeOracle::new(1.0)
        .with_score("/alpha", 9.0)
        .with_score("/beta", 3.0)
        .with_score("/gamma", 0.5);
    let mut config = fast_config(2);
    config.jobs.inclusion_threshold = 5.0;
    let harness = Harness::new(config, Arc::new(oracle));

    let request = JobRequest::new(server.uri())
        .with_keywords(vec!["Budget".to_string(), "Treasurer".to_string()]);
    let (job_id, status) = harness.run(request).await;
    assert_eq!(status, JobStatus::Complete);

    let storage = harness.reopen();
    let report = storage.job_status(job_id).unwrap();
    assert_eq!(report.status, JobStatus::Complete);
    assert_eq!(report.result_count, Some(1));

    assert_eq!(results_for(&storage, job_id), vec![("/alpha".to_string(), 9.0)]);

    let stored = storage.list_results(&ResultFilter::default()).unwrap();
    assert_eq!(stored[0].matched_keywords, vec!["Budget"]);
    assert_eq!(stored[0].file_type, "html");
    assert_eq!(stored[0].depth, 1);

    let job = storage.get_job(job_id).unwrap();
    assert_eq!(job.config_hash, "test-hash");
    assert!(job.finished_at.is_some());
}

#[tokio::test]
async fn test_persisted_scores_always_in_range() {
    let server = MockServer::start().await;
    mount_three_links(&server).await;

    let oracle = FakeOracle::new(1.0)
        .with_score("/alpha", 11.0)
        .with_score("/beta", 10.0)
        .with_score("/gamma", f64::NAN);
    let mut config = fast_config(1);
    config.jobs.inclusion_threshold = -5.0;
    let harness = Harness::new(config, Arc::new(oracle));

    let (job_id, status) = harness.run(JobRequest::new(server.uri())).await;
    assert_eq!(status, JobStatus::Complete);

    let storage = harness.reopen();
    let results = results_for(&storage, job_id);
    assert_eq!(results, vec![("/beta".to_string(), 10.0)]);
    assert!(results
        .iter()
        .all(|(_, score)| (1.0..=10.0).contains(score)));
}

#[tokio::test]
async fn test_unavailable_oracle_skips_only_that_link() {
    let server = MockServer::start().await;
    mount_three_links(&server).await;

    let oracle = FakeOracle::new(8.0).with_unavailable("/beta");
    let mut config = fast_config(1);
    config.jobs.inclusion_threshold = 5.0;
    let harness = Harness::new(config, Arc::new(oracle));

    let (job_id, status) = harness.run(JobRequest::new(server.uri())).await;
    assert_eq!(status, JobStatus::Complete);

    let storage = harness.reopen();
    let mut paths: Vec<String> = results_for(&storage, job_id)
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    paths.sort();
    assert_eq!(paths, vec!["/alpha", "/gamma"]);
}

#[tokio::test]
async fn test_slow_oracle_endpoint_skips_only_that_link() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/alpha">Alpha</a><a href="/slow">Slow</a>"#,
        ))
        .mount(&site)
        .await;
    for p in ["/alpha", "/slow"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(html_page("<p>Capital Improvement Plan</p>"))
            .mount(&site)
            .await;
    }

    let llm = MockServer::start().await;
    let reply = |content: &str| {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
    };
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("/alpha"))
        .respond_with(reply("7"))
        .mount(&llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("/slow"))
        .respond_with(reply("9").set_delay(Duration::from_secs(3)))
        .mount(&llm)
        .await;

    let mut config = fast_config(1);
    config.oracle.base_url = llm.uri();
    config.oracle.timeout_secs = 1;
    config.jobs.inclusion_threshold = 5.0;
    let oracle = OpenAiOracle::new(&config.oracle, "test-key").unwrap();
    let harness = Harness::new(config, Arc::new(oracle));

    let (job_id, status) = harness.run(JobRequest::new(site.uri())).await;
    assert_eq!(status, JobStatus::Complete);

    let storage = harness.reopen();
    assert_eq!(results_for(&storage, job_id), vec![("/alpha".to_string(), 7.0)]);
}

#[tokio::test]
async fn test_commit_failure_marks_job_failed_without_partial_results() {
    let server = MockServer::start().await;
    mount_three_links(&server).await;

    let harness = Harness::new(fast_config(1), Arc::new(FakeOracle::new(9.0)));

    let conn = rusqlite::Connection::open(&harness.db_path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_third_result BEFORE INSERT ON results
         WHEN (SELECT COUNT(*) FROM results) >= 2
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
    )
    .unwrap();
    drop(conn);

    let (job_id, status) = harness.run(JobRequest::new(server.uri())).await;
    assert_eq!(status, JobStatus::Failed);

    let storage = harness.reopen();
    let job = storage.get_job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("disk full"));
    assert_eq!(storage.count_results(job_id).unwrap(), 0);

    let report = storage.job_status(job_id).unwrap();
    assert_eq!(report.result_count, None);
}

#[tokio::test]
async fn test_unreachable_seed_marks_job_failed() {
    let harness = Harness::new(fast_config(1), Arc::new(FakeOracle::new(9.0)));

    let (job_id, status) = harness
        .run(JobRequest::new("http://127.0.0.1:1/budget"))
        .await;
    assert_eq!(status, JobStatus::Failed);

    let storage = harness.reopen();
    let report = storage.job_status(job_id).unwrap();
    assert_eq!(report.status, JobStatus::Failed);
    assert!(report.error_message.is_some());
    assert_eq!(storage.count_results(job_id).unwrap(), 0);
}

#[tokio::test]
async fn test_soft_timeout_commits_partial_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/alpha">Alpha</a><a href="/beta">Beta</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alpha"))
        .respond_with(html_page("<p>Budget</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/beta"))
        .respond_with(html_page("<p>Budget</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = fast_config(1);
    config.crawler.politeness_delay_ms = 1500;
    config.jobs.soft_timeout_secs = 2;
    config.jobs.hard_timeout_secs = 10;
    let harness = Harness::new(config, Arc::new(FakeOracle::new(6.0)));

    let (job_id, status) = harness.run(JobRequest::new(server.uri())).await;
    assert_eq!(status, JobStatus::Complete);

    let storage = harness.reopen();
    assert_eq!(results_for(&storage, job_id), vec![("/alpha".to_string(), 6.0)]);
}

/// Blocks inside scoring far past any job timeout
struct StallingOracle;

#[async_trait]
impl RelevanceOracle for StallingOracle {
    async fn score(&self, _: &str, _: &str, _: &[String]) -> Result<f64, OracleError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(9.0)
    }
}

#[tokio::test]
async fn test_hard_timeout_fails_job_without_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/slow">Slow</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("<p>Budget</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = fast_config(1);
    config.jobs.soft_timeout_secs = 1;
    config.jobs.hard_timeout_secs = 2;
    let harness = Harness::new(config, Arc::new(StallingOracle));

    let started = std::time::Instant::now();
    let (job_id, status) = harness.run(JobRequest::new(server.uri())).await;
    assert_eq!(status, JobStatus::Failed);
    assert!(started.elapsed() < Duration::from_secs(10));

    let storage = harness.reopen();
    let job = storage.get_job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("hard timeout"));
    assert_eq!(storage.count_results(job_id).unwrap(), 0);
    assert_eq!(storage.job_status(job_id).unwrap().result_count, None);
}

#[tokio::test]
async fn test_worker_pool_runs_every_submitted_job() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    for server in [&first, &second] {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_page(r#"<a href="/finance">Finance</a>"#))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/finance"))
            .respond_with(html_page("<p>Finance Director</p>"))
            .expect(1)
            .mount(server)
            .await;
    }

    let harness = Harness::new(fast_config(1), Arc::new(FakeOracle::new(7.5)));
    let (queue, pool) = WorkerPool::start(Arc::clone(&harness.manager), 2);

    let ids = queue
        .submit_batch(vec![
            JobRequest::new(first.uri()),
            JobRequest::new(second.uri()),
            JobRequest::new("http://127.0.0.1:1/"),
        ])
        .unwrap();

    let outcomes = pool.shutdown(queue).await;
    assert_eq!(outcomes.len(), 3);

    let storage = harness.reopen();
    let statuses: Vec<JobStatus> = ids
        .iter()
        .map(|id| storage.job_status(*id).unwrap().status)
        .collect();
    assert_eq!(
        statuses,
        vec![JobStatus::Complete, JobStatus::Complete, JobStatus::Failed]
    );
    assert_eq!(storage.count_results(ids[0]).unwrap(), 1);
    assert_eq!(storage.count_results(ids[1]).unwrap(), 1);

    let jobs = storage.list_jobs(10, 0).unwrap();
    assert_eq!(jobs.len(), 3);
}
