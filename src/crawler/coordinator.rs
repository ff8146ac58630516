//! Frontier crawler - per-job crawl orchestration
//!
//! Runs a breadth-first traversal from the seed page, bounded by the
//! configured depth. Each dequeued link goes through robots, politeness,
//! fetch, extraction, scoring and keyword matching, and yields exactly one
//! [`LinkOutcome`]. Per-link failures never abort the traversal.
//!
//! Redirects are followed one hop at a time. Each hop is normalized and
//! checked against the visited set and robots.txt before it is requested.

use crate::config::Config;
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::fetcher::{
    fetch_page, FetchError, FetchResponse, FetchedPage, MAX_REDIRECTS,
};
use crate::crawler::parser::{extract_anchors, resolve_link};
use crate::crawler::scheduler::HostScheduler;
use crate::filter::LinkFilter;
use crate::keywords::match_keywords;
use crate::oracle::{is_valid_score, OracleError, RelevanceOracle, SENTINEL_SCORE};
use crate::robots::RobotsCache;
use crate::state::{CandidateResult, LinkOutcome, SkipReason};
use crate::url::{guess_file_type, host_key, normalize_url};
use crate::UrlError;
use chrono::Utc;
use reqwest::Client;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Errors that abort a whole crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Seed {url} unreachable: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Summary of one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Scored pages, in the order they were processed
    pub candidates: Vec<CandidateResult>,
    /// Number of skipped links per reason
    pub skipped: HashMap<SkipReason, usize>,
    /// Successful fetches, the seed included
    pub pages_fetched: usize,
    /// Whether the crawl stopped early on cancellation
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    fn record(&mut self, outcome: LinkOutcome) {
        match outcome {
            LinkOutcome::Scored(candidate) => self.candidates.push(candidate),
            LinkOutcome::Skipped { reason, .. } => {
                *self.skipped.entry(reason).or_insert(0) += 1;
            }
        }
    }
}

/// Crawls outward from one seed URL
///
/// A crawler holds the per-job dedup set, frontier, politeness and robots
/// state, so a fresh one is built for every job and consumed by
/// [`FrontierCrawler::crawl`].
pub struct FrontierCrawler {
    config: Arc<Config>,
    client: Client,
    oracle: Arc<dyn RelevanceOracle>,
    filter: LinkFilter,
    extractor: ContentExtractor,
    scheduler: HostScheduler,
    robots: RobotsCache,
    visited: HashSet<String>,
    enqueued: HashSet<String>,
    queue: VecDeque<(Url, u32)>,
}

impl FrontierCrawler {
    /// Creates a crawler for a single job
    ///
    /// # Arguments
    ///
    /// * `config` - Shared configuration
    /// * `client` - HTTP client built with [`crate::crawler::build_http_client`]
    /// * `oracle` - Relevance scorer
    pub fn new(config: Arc<Config>, client: Client, oracle: Arc<dyn RelevanceOracle>) -> Self {
        let filter = LinkFilter::new(&config.filter);
        let extractor = ContentExtractor::new(config.crawler.max_text_chars);
        let scheduler =
            HostScheduler::new(Duration::from_millis(config.crawler.politeness_delay_ms));

        Self {
            config,
            client,
            oracle,
            filter,
            extractor,
            scheduler,
            robots: RobotsCache::new(),
            visited: HashSet::new(),
            enqueued: HashSet::new(),
            queue: VecDeque::new(),
        }
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// The seed is fetched for its links only and never scored. Links found
    /// on a page at depth `d` are enqueued at `d + 1` while `d < max_depth`.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished or was cancelled
    /// * `Err(CrawlError)` - The seed was invalid or could not be fetched
    pub async fn crawl(
        mut self,
        seed: &str,
        keywords: &[String],
        cancel: &CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let seed_url = normalize_url(seed)?;
        let mut report = CrawlReport::default();

        tracing::info!("Crawling from seed {}", seed_url);

        self.visited.insert(seed_url.to_string());
        let seed_page = self
            .fetch_following(&seed_url, cancel)
            .await
            .map_err(|e| CrawlError::SeedUnreachable {
                url: seed_url.to_string(),
                reason: e.to_string(),
            })?;
        report.pages_fetched += 1;

        if self.config.crawler.max_depth > 0 {
            self.expand_links(&seed_page, 1);
        }

        while let Some((url, depth)) = self.queue.pop_front() {
            if cancel.is_cancelled() {
                tracing::info!(
                    "Crawl cancelled with {} links left in the frontier",
                    self.queue.len() + 1
                );
                report.cancelled = true;
                break;
            }

            // Reached earlier as a redirect target
            if !self.visited.insert(url.to_string()) {
                report.record(LinkOutcome::Skipped {
                    url: url.to_string(),
                    reason: SkipReason::AlreadyVisited,
                });
                continue;
            }

            let outcome = match self.fetch_following(&url, cancel).await {
                Ok(page) => {
                    report.pages_fetched += 1;
                    self.process_page(&page, depth, keywords).await
                }
                Err(FetchError::Cancelled) => {
                    report.cancelled = true;
                    break;
                }
                Err(FetchError::AlreadyVisited(target)) => {
                    tracing::debug!("Skipping {} (redirects to visited {})", url, target);
                    LinkOutcome::Skipped {
                        url: url.to_string(),
                        reason: SkipReason::AlreadyVisited,
                    }
                }
                Err(FetchError::RobotsDenied) => {
                    tracing::debug!("Skipping {} (disallowed by robots.txt)", url);
                    LinkOutcome::Skipped {
                        url: url.to_string(),
                        reason: SkipReason::RobotsDenied,
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    LinkOutcome::Skipped {
                        url: url.to_string(),
                        reason: SkipReason::FetchFailed,
                    }
                }
            };

            report.record(outcome);
        }

        tracing::info!(
            "Crawl of {} finished: {} candidates, {} skipped, {} pages fetched",
            seed_url,
            report.candidates.len(),
            report.skipped_total(),
            report.pages_fetched
        );

        Ok(report)
    }

    /// Fetches `url`, following redirects one hop at a time
    ///
    /// Each redirect target is normalized and inserted into the visited set
    /// before it is requested, so a target already seen ends the chain with
    /// [`FetchError::AlreadyVisited`]. Every hop gets its own robots check
    /// and politeness wait.
    async fn fetch_following(
        &mut self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        let mut current = url.clone();

        for _ in 0..=MAX_REDIRECTS {
            let target = match self.fetch_politely(&current, cancel).await? {
                FetchResponse::Page(page) => return Ok(page),
                FetchResponse::Redirect(target) => target,
            };

            let next = normalize_url(target.as_str())
                .map_err(|e| FetchError::Redirect(format!("{}: {}", target, e)))?;
            if !self.visited.insert(next.to_string()) {
                return Err(FetchError::AlreadyVisited(next.to_string()));
            }

            tracing::debug!("Following redirect {} -> {}", current, next);
            current = next;
        }

        Err(FetchError::Redirect(format!(
            "more than {} redirects from {}",
            MAX_REDIRECTS, url
        )))
    }

    /// Applies robots policy and politeness, then sends one request
    async fn fetch_politely(
        &mut self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<FetchResponse, FetchError> {
        let host = host_key(url).ok_or_else(|| FetchError::Network("URL has no host".into()))?;
        let user_agent = self.config.user_agent.value.as_str();

        let mut crawl_delay = None;
        if self.config.crawler.respect_robots {
            let robots = self.robots.get_or_fetch(&self.client, &host, url).await;
            if !robots.is_allowed(url.as_str(), user_agent) {
                return Err(FetchError::RobotsDenied);
            }
            crawl_delay = robots.crawl_delay(user_agent);
        }

        if !self.scheduler.wait_turn(&host, crawl_delay, cancel).await {
            return Err(FetchError::Cancelled);
        }

        tracing::debug!("Fetching {}", url);
        fetch_page(&self.client, url.as_str()).await
    }

    /// Turns a fetched page into a link outcome, expanding its links first
    async fn process_page(
        &mut self,
        page: &FetchedPage,
        depth: u32,
        keywords: &[String],
    ) -> LinkOutcome {
        if depth < self.config.crawler.max_depth {
            self.expand_links(page, depth + 1);
        }

        let text = if page.is_html() {
            self.extractor.extract(&page.body)
        } else if page.is_plain_text() {
            self.extractor.extract_plain(&page.body)
        } else {
            None
        };

        let Some(text) = text else {
            tracing::debug!("No extractable text at {}", page.final_url);
            return LinkOutcome::Skipped {
                url: page.final_url.clone(),
                reason: SkipReason::NoText,
            };
        };

        let relevance_score = match self.oracle.score(&text, &page.final_url, keywords).await {
            Ok(score) if is_valid_score(score) => score,
            Ok(score) => {
                tracing::warn!(
                    "Oracle score {} for {} is out of range, recording sentinel",
                    score,
                    page.final_url
                );
                SENTINEL_SCORE
            }
            Err(OracleError::ScoreParse(raw)) => {
                tracing::warn!(
                    "Unparseable oracle reply {:?} for {}, recording sentinel",
                    raw,
                    page.final_url
                );
                SENTINEL_SCORE
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", page.final_url, e);
                return LinkOutcome::Skipped {
                    url: page.final_url.clone(),
                    reason: SkipReason::OracleUnavailable,
                };
            }
        };

        let file_type = Url::parse(&page.final_url)
            .map(|u| guess_file_type(&u))
            .unwrap_or_else(|_| crate::url::DEFAULT_FILE_TYPE.to_string());

        tracing::debug!(
            "Scored {} at depth {}: {}",
            page.final_url,
            depth,
            relevance_score
        );

        LinkOutcome::Scored(CandidateResult {
            target_url: page.final_url.clone(),
            file_type,
            relevance_score,
            matched_keywords: match_keywords(&text, keywords),
            extracted_text: Some(text),
            depth,
            created_at: Utc::now(),
        })
    }

    /// Filters, resolves and enqueues the links of an HTML page
    fn expand_links(&mut self, page: &FetchedPage, depth: u32) {
        if !page.is_html() {
            return;
        }

        let Ok(base) = Url::parse(&page.final_url) else {
            return;
        };

        let mut added = 0usize;
        for anchor in extract_anchors(&page.body) {
            if !self.filter.should_follow(&anchor.href, &anchor.text) {
                continue;
            }

            let Some(absolute) = resolve_link(&anchor.href, &base) else {
                continue;
            };
            let Ok(normalized) = normalize_url(absolute.as_str()) else {
                continue;
            };

            let key = normalized.to_string();
            if self.visited.contains(&key) || !self.enqueued.insert(key) {
                continue;
            }

            self.queue.push_back((normalized, depth));
            added += 1;
        }

        tracing::debug!(
            "Enqueued {} links at depth {} from {}",
            added,
            depth,
            page.final_url
        );
    }
}
