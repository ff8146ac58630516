use async_trait::async_trait;
use keyword_scout::config::Config;
use keyword_scout::oracle::{OracleError, RelevanceOracle};
use std::collections::HashMap;
use wiremock::ResponseTemplate;

/// Oracle answering by URL path, with a fixed fallback score
pub struct FakeOracle {
    scores: HashMap<String, Result<f64, String>>,
    fallback: f64,
}

impl FakeOracle {
    pub fn new(fallback: f64) -> Self {
        Self {
            scores: HashMap::new(),
            fallback,
        }
    }

    pub fn with_score(mut self, path: &str, score: f64) -> Self {
        self.scores.insert(path.to_string(), Ok(score));
        self
    }

    pub fn with_unavailable(mut self, path: &str) -> Self {
        self.scores
            .insert(path.to_string(), Err("connection reset".to_string()));
        self
    }
}

#[async_trait]
impl RelevanceOracle for FakeOracle {
    async fn score(&self, _text: &str, url: &str, _keywords: &[String]) -> Result<f64, OracleError> {
        let path = url::Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        match self.scores.get(&path) {
            Some(Ok(score)) => Ok(*score),
            Some(Err(reason)) => Err(OracleError::Unavailable(reason.clone())),
            None => Ok(self.fallback),
        }
    }
}

/// Configuration with politeness delays off and short timeouts
pub fn fast_config(max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.politeness_delay_ms = 0;
    config.crawler.request_timeout_secs = 3;
    config.crawler.connect_timeout_secs = 1;
    config
}

/// An HTML page with the given body markup
pub fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>Test</title></head><body>{}</body></html>",
            body
        ),
        "text/html",
    )
}
