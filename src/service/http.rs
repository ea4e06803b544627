//! HTTP implementation of the command service
//!
//! Talks to the crawler command backend: a single JSON endpoint that takes
//! the command name plus an optional objective and answers with a suggested
//! crawler command to run next.

use super::error::ServiceError;
use super::types::{ServiceCall, Suggestion};
use super::CommandService;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5001";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the command service client
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("COMMAND_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = std::env::var("COMMAND_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);
        Self { base_url, timeout }
    }
}

/// Command service backed by the crawler HTTP API
pub struct HttpCommandService {
    client: Client,
    endpoint: String,
}

impl HttpCommandService {
    pub fn new(config: &ServiceConfig) -> Self {
        let endpoint = format!("{}/command", config.base_url.trim_end_matches('/'));

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, endpoint }
    }

    async fn post_command(&self, call: &ServiceCall) -> Result<Option<Suggestion>, ServiceError> {
        let request = CommandRequest {
            command: call.name(),
            objective: call.objective(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ServiceError::network(format!("Connection failed: {e}"))
                } else {
                    ServiceError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        // An empty body means the service had no suggestion to offer.
        if body.trim().is_empty() {
            return Ok(None);
        }

        let parsed: CommandResponse = serde_json::from_str(&body).map_err(|e| {
            ServiceError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(parsed.into_suggestion())
    }
}

fn classify_error(status: reqwest::StatusCode, body: &str) -> ServiceError {
    match status.as_u16() {
        400 => ServiceError::invalid_request(format!("Invalid request: {body}")),
        500..=599 => ServiceError::server_error(format!("Server error: {body}")),
        _ => ServiceError::unknown(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl CommandService for HttpCommandService {
    async fn confirm(&self) -> Result<Option<Suggestion>, ServiceError> {
        self.post_command(&ServiceCall::Confirm).await
    }

    async fn objective(&self, objective: &str) -> Result<Option<Suggestion>, ServiceError> {
        self.post_command(&ServiceCall::Objective(objective.to_string()))
            .await
    }

    async fn suggest(&self, objective: &str) -> Result<Option<Suggestion>, ServiceError> {
        self.post_command(&ServiceCall::Suggest(objective.to_string()))
            .await
    }
}

// Wire types for the crawler command API

#[derive(Debug, Serialize)]
struct CommandRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    objective: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    text: String,
    image: Option<String>,
    url: Option<String>,
}

impl CommandResponse {
    /// A blank suggestion text is treated as no result
    fn into_suggestion(self) -> Option<Suggestion> {
        if self.text.trim().is_empty() {
            return None;
        }
        Some(Suggestion {
            text: self.text,
            image: self.image,
            url: self.url,
        })
    }
}
