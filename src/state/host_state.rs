use std::time::{Duration, Instant};

/// Tracks per-host request timing for politeness
///
/// The effective delay between two requests to the same host is the larger
/// of the configured delay and the host's robots.txt `Crawl-delay`.
#[derive(Debug, Clone)]
pub struct HostState {
    /// Timestamp of the last request to this host
    pub last_request_time: Option<Instant>,

    /// Number of requests made to this host in the current job
    pub request_count: u32,

    /// Minimum spacing between requests
    pub delay: Duration,
}

impl HostState {
    /// Creates a new HostState with the given minimum delay
    pub fn new(delay: Duration) -> Self {
        Self {
            last_request_time: None,
            request_count: 0,
            delay,
        }
    }

    /// Raises the delay to honor a robots.txt `Crawl-delay` (in seconds)
    pub fn apply_crawl_delay(&mut self, crawl_delay_secs: Option<f64>) {
        if let Some(secs) = crawl_delay_secs {
            if let Ok(delay) = Duration::try_from_secs_f64(secs) {
                self.delay = self.delay.max(delay);
            }
        }
    }

    /// Records that a request was made to this host
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.delay {
            Some(self.delay - elapsed)
        } else {
            None
        }
    }
}
