//! Robots.txt handling
//!
//! robots.txt is fetched at most once per host per job and kept in a
//! [`RobotsCache`] owned by that job's crawler. Any failure to obtain the
//! file is treated as "allow everything".

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use reqwest::Client;
use tracing::debug;
use url::Url;

/// Fetches and parses robots.txt for the origin of `page_url`
///
/// The request goes out with the client's configured User-Agent.
///
/// # Returns
///
/// The parsed rules, or [`ParsedRobots::allow_all`] when the file is
/// missing, unreachable or not a success response.
pub async fn fetch_robots(client: &Client, page_url: &Url) -> ParsedRobots {
    let robots_url = match page_url.join("/robots.txt") {
        Ok(url) => url,
        Err(_) => return ParsedRobots::allow_all(),
    };

    let response = match client.get(robots_url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!(url = %robots_url, error = %e, "robots.txt unreachable, allowing all");
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        debug!(url = %robots_url, status = %response.status(), "No robots.txt, allowing all");
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            debug!(url = %robots_url, error = %e, "Unreadable robots.txt, allowing all");
            ParsedRobots::allow_all()
        }
    }
}
