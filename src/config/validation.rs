use crate::config::types::{Config, CrawlerConfig, JobsConfig, OracleConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_oracle_config(&config.oracle)?;
    validate_jobs_config(&config.jobs)?;
    validate_output_config(&config.output)?;
    validate_keywords(&config.keywords)?;

    if config.user_agent.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth > 10 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be at most 10, got {}",
            config.max_depth
        )));
    }

    if config.request_timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request and connect timeouts must be at least 1 second".to_string(),
        ));
    }

    if config.max_text_chars == 0 {
        return Err(ConfigError::Validation(
            "max_text_chars must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_oracle_config(config: &OracleConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid oracle base-url: {}", e)))?;

    if config.model.is_empty() {
        return Err(ConfigError::Validation(
            "oracle model cannot be empty".to_string(),
        ));
    }

    if config.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "oracle max_tokens must be >= 1".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "oracle temperature must be between 0 and 2, got {}",
            config.temperature
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "oracle timeout must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

fn validate_jobs_config(config: &JobsConfig) -> Result<(), ConfigError> {
    if config.worker_concurrency < 1 || config.worker_concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "worker_concurrency must be between 1 and 64, got {}",
            config.worker_concurrency
        )));
    }

    if !config.inclusion_threshold.is_finite() {
        return Err(ConfigError::Validation(
            "inclusion_threshold must be a finite number".to_string(),
        ));
    }

    if config.soft_timeout_secs == 0 || config.soft_timeout_secs >= config.hard_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "soft timeout ({}s) must be positive and below the hard timeout ({}s)",
            config.soft_timeout_secs, config.hard_timeout_secs
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_keywords(keywords: &[String]) -> Result<(), ConfigError> {
    if keywords.is_empty() {
        return Err(ConfigError::Validation(
            "the default keyword list cannot be empty".to_string(),
        ));
    }

    if keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "keywords cannot be blank".to_string(),
        ));
    }

    Ok(())
}
