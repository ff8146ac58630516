use crate::config::OracleConfig;
use crate::oracle::{build_prompt, parse_score, OracleError, RelevanceOracle};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Relevance oracle backed by an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct OpenAiOracle {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiOracle {
    /// Builds an oracle from configuration and an explicit API key
    pub fn new(config: &OracleConfig, api_key: impl Into<String>) -> Result<Self, OracleError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Builds an oracle, reading the API key from the configured environment variable
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| OracleError::Config(format!("{} not set", config.api_key_env)))?;
        Self::new(config, api_key)
    }
}

#[async_trait]
impl RelevanceOracle for OpenAiOracle {
    async fn score(&self, text: &str, url: &str, keywords: &[String]) -> Result<f64, OracleError> {
        let start = Instant::now();

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(text, url, keywords),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "Oracle request failed");
                OracleError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Oracle API error");
            return Err(OracleError::Unavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Unavailable(format!("Malformed response body: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::Unavailable("No choices in oracle response".into()))?;

        debug!(
            model = %self.model,
            url = %url,
            raw = %content.trim(),
            duration_ms = start.elapsed().as_millis(),
            "Oracle reply"
        );

        parse_score(&content)
    }
}
