//! Per-host politeness scheduling
//!
//! Requests to the same host are spaced by at least the configured delay,
//! raised to the host's robots.txt `Crawl-delay` when that is larger.

use crate::state::HostState;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Spaces out requests per host within one job
#[derive(Debug)]
pub struct HostScheduler {
    base_delay: Duration,
    hosts: HashMap<String, HostState>,
}

impl HostScheduler {
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            hosts: HashMap::new(),
        }
    }

    /// Waits until `host` may receive another request, then records it
    ///
    /// # Arguments
    ///
    /// * `host` - Host key of the URL about to be fetched
    /// * `crawl_delay` - robots.txt `Crawl-delay` for the host, in seconds
    /// * `cancel` - Aborts the wait when cancelled
    ///
    /// # Returns
    ///
    /// * `true` - The request may proceed
    /// * `false` - The token was cancelled while waiting
    pub async fn wait_turn(
        &mut self,
        host: &str,
        crawl_delay: Option<f64>,
        cancel: &CancellationToken,
    ) -> bool {
        let base_delay = self.base_delay;
        let state = self
            .hosts
            .entry(host.to_string())
            .or_insert_with(|| HostState::new(base_delay));
        state.apply_crawl_delay(crawl_delay);

        if let Some(wait) = state.time_until_next_request(Instant::now()) {
            tracing::debug!("Waiting {:?} before next request to {}", wait, host);
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        if cancel.is_cancelled() {
            return false;
        }

        state.record_request(Instant::now());
        true
    }

    /// Number of requests issued to `host` so far
    pub fn request_count(&self, host: &str) -> u32 {
        self.hosts.get(host).map(|s| s.request_count).unwrap_or(0)
    }
}
