//! Configuration from environment variables (optionally via a `.env` file).

use std::env;

use thiserror::Error;

/// Default endpoint when `COMPETENCY_API_BASE_URL` is not set.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the competency-assessment service (no trailing slash).
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_token: String,
    /// Optional user id override; takes precedence over the stored session.
    pub user_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("COMPETENCY_API_TOKEN is not set")]
    MissingApiToken,
}

/// Load configuration from environment. Returns an error if the API token is missing.
pub fn load() -> Result<Config, ConfigError> {
    let base_url = env::var("COMPETENCY_API_BASE_URL")
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    let api_token = env::var("COMPETENCY_API_TOKEN").map_err(|_| ConfigError::MissingApiToken)?;

    let user_id = env::var("COMPETENCY_USER_ID")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(Config {
        base_url,
        api_token,
        user_id,
    })
}
