//! jira::client
//!
//! Jira REST client over reqwest.
//!
//! # Design
//!
//! Requests carry a bearer token and JSON content type. Responses are
//! normalized before they reach a plugin:
//! - 204 or an empty body becomes `{}`
//! - 401, 404 and 429 map to dedicated [`ApiError`] variants
//! - other failures carry Jira's `errorMessages`/`errors` text
//!
//! # Retries
//!
//! Network errors, 5xx responses and 429 are retried with a fixed delay
//! (3 attempts, 2 seconds apart by default). On the final failure an
//! equivalent `curl` command is logged at debug level with the token
//! redacted, so a failing call can be replayed by hand.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{ApiError, ApiRequest, JiraApi, Method};
use crate::core::config::{Config, ConfigError};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub attempts: u32,
    /// Delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no delay.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Jira client backed by reqwest.
pub struct HttpJiraClient {
    client: Client,
    base_url: String,
    token: String,
    retry: RetryPolicy,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for HttpJiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpJiraClient")
            .field("base_url", &self.base_url)
            .field("has_token", &!self.token.is_empty())
            .field("retry", &self.retry)
            .finish()
    }
}

impl HttpJiraClient {
    /// Create a client for `base_url` authenticating with `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            token: token.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVariable` if `JIRA_URL` or `JPAT` is unset.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.jira_url()?, config.token()?))
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The Jira base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ApiError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, self.url(&request.path))
            .headers(self.headers()?);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::handle_response(response).await
    }

    /// Map a response to JSON or an error.
    async fn handle_response(response: Response) -> Result<Value, ApiError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status.is_success() {
            if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
                return Ok(json!({}));
            }
            return serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()));
        }

        let message = error_message(&text);
        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::AuthFailed(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Shell command equivalent to `request`, with the token redacted.
    pub fn curl_command(&self, request: &ApiRequest) -> String {
        let mut url = self.url(&request.path);
        if !request.params.is_empty() {
            let query = request
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url = format!("{}?{}", url, query);
        }

        let mut parts = vec![
            format!("curl -X {}", request.method),
            "-H 'Authorization: Bearer <redacted>'".to_string(),
            "-H 'Content-Type: application/json'".to_string(),
        ];
        if let Some(body) = &request.body {
            parts.push(format!("--data '{}'", body));
        }
        parts.push(format!("'{}'", url));
        parts.join(" ")
    }
}

/// Extract a human-readable message from a Jira error body.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if let Some(value) = parsed {
        let mut messages: Vec<String> = value
            .get("errorMessages")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if let Some(errors) = value.get("errors").and_then(Value::as_object) {
            for (field, msg) in errors {
                let text = msg.as_str().map(str::to_string).unwrap_or_else(|| msg.to_string());
                messages.push(format!("{}: {}", field, text));
            }
        }

        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl JiraApi for HttpJiraClient {
    async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(method = %request.method, path = %request.path, attempt, "jira request");

            match self.send_once(&request).await {
                Ok(value) => return Ok(value),
                Err(err)
                    if err.is_transient()
                        && request.method.is_idempotent()
                        && attempt < attempts =>
                {
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        attempt,
                        error = %err,
                        "jira request failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(curl = %self.curl_command(&request), "failed request");
                    return Err(err);
                }
            }
        }
    }
}
