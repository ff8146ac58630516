use crate::robots::{fetch_robots, ParsedRobots};
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Per-job robots.txt cache keyed by host
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rules for `host`, fetching them on first use
    pub async fn get_or_fetch(&mut self, client: &Client, host: &str, url: &Url) -> &ParsedRobots {
        if !self.entries.contains_key(host) {
            let robots = fetch_robots(client, url).await;
            self.entries.insert(host.to_string(), robots);
        }
        self.entries
            .entry(host.to_string())
            .or_insert_with(ParsedRobots::allow_all)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
