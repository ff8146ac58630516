use chrono::{DateTime, Utc};
use std::fmt;

/// A scored page produced by the crawler, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResult {
    pub target_url: String,
    pub file_type: String,
    /// Oracle score in `[1, 10]`, or the sentinel `-1.0`
    pub relevance_score: f64,
    pub matched_keywords: Vec<String>,
    pub extracted_text: Option<String>,
    /// Link depth from the seed (the seed itself is depth 0)
    pub depth: u32,
    pub created_at: DateTime<Utc>,
}

/// Why a link produced no candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// robots.txt disallows the URL
    RobotsDenied,
    /// Network error, timeout or HTTP error status
    FetchFailed,
    /// The page body held no extractable text
    NoText,
    /// The oracle could not be reached
    OracleUnavailable,
    /// A redirect led to a URL this crawl already visited
    AlreadyVisited,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RobotsDenied => "robots_denied",
            Self::FetchFailed => "fetch_failed",
            Self::NoText => "no_text",
            Self::OracleUnavailable => "oracle_unavailable",
            Self::AlreadyVisited => "already_visited",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of processing one dequeued link
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    Scored(CandidateResult),
    Skipped { url: String, reason: SkipReason },
}

impl LinkOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Scored(candidate) => &candidate.target_url,
            Self::Skipped { url, .. } => url,
        }
    }
}
