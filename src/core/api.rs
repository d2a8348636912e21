//! HTTP client for the competency-assessment chat endpoint.
//!
//! One POST `/chat` with a bearer token. The body is returned as a raw
//! `serde_json::Value` — the service guarantees no response schema, so
//! classification happens in the message core, not here.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::Config;

/// Request body for POST /chat. The service replies to this exact shape, so
/// the field names are part of the wire contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    user_id: &'a str,
    message: &'a str,
    answers: &'a [String],
}

/// Errors from the chat endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ChatClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// Send one chat message with the ordered answer list. Returns the raw
    /// JSON body undecoded.
    pub async fn send(
        &self,
        user_id: &str,
        message: &str,
        answers: &[String],
    ) -> Result<Value, ApiError> {
        let url = format!("{}/chat", self.base_url);
        log::debug!("POST {} ({} answers)", url, answers.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&ChatRequest {
                user_id,
                message,
                answers,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        response.json().await.map_err(ApiError::Decode)
    }
}
