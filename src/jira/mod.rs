//! jira
//!
//! Abstraction over the Jira REST API.
//!
//! # Architecture
//!
//! Every plugin talks to Jira through the [`JiraApi`] trait, which exposes a
//! single `request` capability: a method, a path, an optional JSON body and
//! optional query parameters, answered with parsed JSON or a typed
//! [`ApiError`]. Plugins never build URLs or handle status codes themselves.
//!
//! # Modules
//!
//! - [`client`]: reqwest-based implementation with retries
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use jira_creator::jira::{ApiRequest, JiraApi};
//! use serde_json::json;
//!
//! async fn set_summary(jira: &dyn JiraApi) -> Result<(), ApiError> {
//!     jira.request(ApiRequest::put(
//!         "/rest/api/2/issue/AAP-1",
//!         json!({"fields": {"summary": "New summary"}}),
//!     ))
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod mock;

pub use client::{HttpJiraClient, RetryPolicy};
pub use mock::{FailOn, MockJira};

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from Jira API requests.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Authentication failed (invalid or expired token).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// Jira returned an error status.
    #[error("JIRA API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// Response body was not valid JSON.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::RateLimited => true,
            ApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Uppercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether sending the request twice has the same effect as once.
    /// Only these are retried after a failure.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single Jira REST request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the Jira base URL, starting with `/`
    pub path: String,
    pub body: Option<Value>,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            params: Vec::new(),
        }
    }

    /// A GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    /// A POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    /// A PUT request with a JSON body.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path, Some(body))
    }

    /// A DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, None)
    }

    /// Add a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// Look up a query parameter by name.
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Path of an issue resource.
pub fn issue_path(issue_key: &str) -> String {
    format!("/rest/api/2/issue/{}", issue_key)
}

/// The Jira capability used by every plugin.
///
/// Implementations return `{}` for empty responses (HTTP 204 or an empty
/// body) and an [`ApiError`] for any failure; they never return a silent
/// "nothing happened" value.
#[async_trait]
pub trait JiraApi: Send + Sync {
    /// Perform one request.
    async fn request(&self, request: ApiRequest) -> Result<Value, ApiError>;

    /// GET `path`.
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(ApiRequest::get(path)).await
    }

    /// PUT `body` to `path`.
    async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request(ApiRequest::put(path, body)).await
    }

    /// POST `body` to `path`.
    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request(ApiRequest::post(path, body)).await
    }
}
