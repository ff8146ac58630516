//! Keyword-Scout main entry point
//!
//! This is the command-line interface for submitting crawl jobs and
//! querying their status and results.

use anyhow::Context;
use clap::{Parser, Subcommand};
use keyword_scout::config::{load_config_with_hash, Config};
use keyword_scout::crawler::build_http_client;
use keyword_scout::jobs::{parse_seed_list, JobManager, JobRequest, WorkerPool};
use keyword_scout::oracle::OpenAiOracle;
use keyword_scout::output::{print_job_status, print_jobs, print_results};
use keyword_scout::storage::{ResultFilter, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Keyword-Scout: relevance-scored link discovery
///
/// Crawls outward from a seed URL, asks a language model how relevant each
/// reachable page is to a keyword set, and records the pages that score
/// above the inclusion threshold.
#[derive(Parser, Debug)]
#[command(name = "keyword-scout")]
#[command(version)]
#[command(about = "Relevance-scored link discovery", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one seed URL and wait for the job to finish
    Crawl {
        /// Seed URL
        seed: String,

        /// Keyword to score against (repeatable; default set when omitted)
        #[arg(short, long = "keyword", value_name = "KEYWORD")]
        keywords: Vec<String>,
    },

    /// Crawl every seed listed in a file, one URL per line
    Batch {
        /// File with one seed URL per line ('#' starts a comment)
        file: PathBuf,

        /// Keyword to score against (repeatable; default set when omitted)
        #[arg(short, long = "keyword", value_name = "KEYWORD")]
        keywords: Vec<String>,
    },

    /// Show the status of a job
    Status {
        /// Job identifier
        job_id: Uuid,
    },

    /// List stored results
    Results {
        /// Only results of this job
        #[arg(long = "job")]
        job_id: Option<Uuid>,

        /// Only results of this file type (e.g. "html", "application/pdf")
        #[arg(long)]
        file_type: Option<String>,

        /// Only results scoring at least this much
        #[arg(long)]
        min_score: Option<f64>,

        /// Only results whose matched keywords contain this text
        #[arg(long)]
        keyword: Option<String>,

        #[arg(long, default_value_t = 50)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// List submitted jobs, newest first
    Pages {
        #[arg(long, default_value_t = 50)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Delete every job and result
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(cli.config.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.command);
        return Ok(());
    }

    match cli.command {
        Command::Crawl { seed, keywords } => {
            let request = JobRequest::new(seed).with_keywords(keywords);
            handle_jobs(config, config_hash, vec![request]).await
        }
        Command::Batch { file, keywords } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read seed list {}", file.display()))?;
            let requests: Vec<JobRequest> = parse_seed_list(&content)
                .into_iter()
                .map(|seed| JobRequest::new(seed).with_keywords(keywords.clone()))
                .collect();
            if requests.is_empty() {
                anyhow::bail!("No seed URLs found in {}", file.display());
            }
            handle_jobs(config, config_hash, requests).await
        }
        Command::Status { job_id } => {
            let storage = open_storage(&config)?;
            print_job_status(&storage.job_status(job_id)?);
            Ok(())
        }
        Command::Results {
            job_id,
            file_type,
            min_score,
            keyword,
            limit,
            offset,
        } => {
            let storage = open_storage(&config)?;
            let filter = ResultFilter {
                job_id,
                file_type,
                min_relevance_score: min_score,
                keyword,
                limit,
                offset,
            };
            print_results(&storage.list_results(&filter)?);
            Ok(())
        }
        Command::Pages { limit, offset } => {
            let storage = open_storage(&config)?;
            print_jobs(&storage.list_jobs(limit, offset)?);
            Ok(())
        }
        Command::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete all jobs without --yes");
            }
            let mut storage = open_storage(&config)?;
            let deleted = storage.reset()?;
            println!("Deleted {} job(s) and their results", deleted);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("keyword_scout=info,warn"),
            1 => EnvFilter::new("keyword_scout=debug,info"),
            2 => EnvFilter::new("keyword_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, or the built-in defaults when none is given
fn load_configuration(path: Option<&Path>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Ok((Config::default(), String::new()))
        }
    }
}

fn open_storage(config: &Config) -> anyhow::Result<SqliteStorage> {
    SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open database {}", config.output.database_path))
}

/// Handles the --dry-run mode: shows the effective settings and the work
fn handle_dry_run(config: &Config, command: &Command) {
    println!("=== Keyword-Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    println!("  Max text chars: {}", config.crawler.max_text_chars);
    println!("  User agent: {}", config.user_agent.value);

    println!("\nOracle:");
    println!("  Endpoint: {}", config.oracle.base_url);
    println!("  Model: {}", config.oracle.model);
    println!("  API key variable: {}", config.oracle.api_key_env);

    println!("\nJobs:");
    println!("  Inclusion threshold: > {}", config.jobs.inclusion_threshold);
    println!("  Workers: {}", config.jobs.worker_concurrency);
    println!(
        "  Timeouts: soft {}s, hard {}s",
        config.jobs.soft_timeout_secs, config.jobs.hard_timeout_secs
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nDefault keywords ({}):", config.keywords.len());
    for keyword in &config.keywords {
        println!("  - {}", keyword);
    }

    println!("\n✓ Configuration is valid");
    match command {
        Command::Crawl { seed, .. } => println!("✓ Would crawl 1 seed: {}", seed),
        Command::Batch { file, .. } => println!("✓ Would crawl the seeds listed in {}", file.display()),
        _ => println!("✓ Nothing to crawl for this command"),
    }
}

/// Runs the given jobs through the worker pool and reports their status
async fn handle_jobs(
    config: Config,
    config_hash: String,
    requests: Vec<JobRequest>,
) -> anyhow::Result<()> {
    let storage = Arc::new(Mutex::new(open_storage(&config)?));
    let oracle = OpenAiOracle::from_config(&config.oracle)
        .context("Failed to configure the relevance oracle")?;
    let client = build_http_client(&config).context("Failed to build HTTP client")?;
    let concurrency = config.jobs.worker_concurrency;

    let manager = Arc::new(JobManager::new(
        Arc::new(config),
        config_hash,
        Arc::clone(&storage),
        Arc::new(oracle),
        client,
    ));

    let (queue, pool) = WorkerPool::start(manager, concurrency);
    let job_ids = queue.submit_batch(requests)?;
    tracing::info!("Submitted {} job(s)", job_ids.len());

    let outcomes = pool.shutdown(queue).await;
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            tracing::error!("Job {} could not be recorded: {}", outcome.job_id, e);
        }
    }

    let storage = storage
        .lock()
        .map_err(|_| anyhow::anyhow!("Storage lock poisoned"))?;
    for job_id in &job_ids {
        match storage.job_status(*job_id) {
            Ok(report) => print_job_status(&report),
            Err(e) => println!("Job {}: {}", job_id, e),
        }
    }

    if job_ids.len() == 1 {
        let filter = ResultFilter {
            job_id: Some(job_ids[0]),
            ..ResultFilter::default()
        };
        let results = storage.list_results(&filter)?;
        if !results.is_empty() {
            println!();
            print_results(&results);
        }
    }

    Ok(())
}
