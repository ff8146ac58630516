//! Crawler module
//!
//! This module contains the per-job crawling pipeline:
//! - HTTP fetching with timeouts
//! - Anchor extraction and link resolution
//! - Main-content text extraction
//! - Per-host politeness scheduling
//! - Frontier traversal and scoring

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{CrawlError, CrawlReport, FrontierCrawler};
pub use extractor::ContentExtractor;
pub use fetcher::{
    build_http_client, fetch_page, FetchError, FetchResponse, FetchedPage, MAX_REDIRECTS,
};
pub use parser::{extract_anchors, resolve_link, Anchor};
pub use scheduler::HostScheduler;
