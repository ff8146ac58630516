//! Relevance oracle
//!
//! The oracle assigns a single numeric relevance score in `[1, 10]` to a
//! piece of page text given a keyword set. The crawler only depends on the
//! [`RelevanceOracle`] trait; [`OpenAiOracle`] is the production
//! implementation backed by an OpenAI-compatible chat completions API.

mod openai;
mod prompt;

pub use openai::OpenAiOracle;
pub use prompt::build_prompt;

use async_trait::async_trait;
use thiserror::Error;

/// Lowest score the oracle may return
pub const MIN_SCORE: f64 = 1.0;

/// Highest score the oracle may return
pub const MAX_SCORE: f64 = 10.0;

/// Score recorded for a candidate whose oracle reply could not be parsed
pub const SENTINEL_SCORE: f64 = -1.0;

/// Errors produced while scoring a single page
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle answered, but not with a float in range
    #[error("Unparseable oracle score: {0:?}")]
    ScoreParse(String),

    /// The oracle could not be reached or returned no answer
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle configuration error: {0}")]
    Config(String),
}

/// External capability that rates how relevant a text is to a keyword set
#[async_trait]
pub trait RelevanceOracle: Send + Sync {
    /// Scores `text`, fetched from `url`, against `keywords`
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` - A score in `[1, 10]`
    /// * `Err(OracleError::ScoreParse)` - The reply was not a usable number
    /// * `Err(OracleError::Unavailable)` - Transport failure, timeout or empty reply
    async fn score(&self, text: &str, url: &str, keywords: &[String]) -> Result<f64, OracleError>;
}

/// Returns whether `score` lies in the oracle's declared range
pub fn is_valid_score(score: f64) -> bool {
    score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Parses a raw oracle reply into a score
///
/// Surrounding whitespace is ignored. Anything that is not a single finite
/// float in `[1, 10]` is a [`OracleError::ScoreParse`].
///
/// # Examples
///
/// ```
/// use keyword_scout::oracle::parse_score;
///
/// assert_eq!(parse_score(" 7.5\n").unwrap(), 7.5);
/// assert!(parse_score("very relevant").is_err());
/// assert!(parse_score("11").is_err());
/// ```
pub fn parse_score(raw: &str) -> Result<f64, OracleError> {
    let trimmed = raw.trim();
    let score: f64 = trimmed
        .parse()
        .map_err(|_| OracleError::ScoreParse(trimmed.to_string()))?;

    if !is_valid_score(score) {
        return Err(OracleError::ScoreParse(trimmed.to_string()));
    }

    Ok(score)
}
