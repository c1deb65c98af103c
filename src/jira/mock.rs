//! jira::mock
//!
//! Mock Jira implementation for deterministic testing.
//!
//! # Design
//!
//! Responses are registered per (method, path). Requests without a
//! registered response answer `{}`, which is what Jira returns for most
//! updates. Every request is recorded so tests can assert on payloads.
//!
//! # Example
//!
//! ```
//! use jira_creator::jira::{ApiRequest, JiraApi, Method, MockJira};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let jira = MockJira::new().respond(
//!     Method::Get,
//!     "/rest/api/2/issue/AAP-1",
//!     json!({"key": "AAP-1"}),
//! );
//!
//! let issue = jira.get("/rest/api/2/issue/AAP-1").await.unwrap();
//! assert_eq!(issue["key"], "AAP-1");
//! assert_eq!(jira.requests().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ApiError, ApiRequest, JiraApi, Method};

/// Mock Jira for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockJira {
    inner: Arc<Mutex<MockJiraInner>>,
}

#[derive(Debug, Default)]
struct MockJiraInner {
    /// Canned responses by (method, path).
    responses: HashMap<(Method, String), Value>,
    /// Injected failures.
    failures: Vec<FailOn>,
    /// Recorded requests for verification.
    requests: Vec<ApiRequest>,
}

/// Configuration for which requests should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every request.
    Any(ApiError),
    /// Fail requests with this method and path.
    Request {
        method: Method,
        path: String,
        error: ApiError,
    },
}

impl FailOn {
    fn matches(&self, request: &ApiRequest) -> Option<ApiError> {
        match self {
            FailOn::Any(error) => Some(error.clone()),
            FailOn::Request {
                method,
                path,
                error,
            } if *method == request.method && *path == request.path => Some(error.clone()),
            FailOn::Request { .. } => None,
        }
    }
}

impl MockJira {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockJiraInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a response for (method, path).
    pub fn respond(self, method: Method, path: impl Into<String>, value: Value) -> Self {
        self.set_response(method, path, value);
        self
    }

    /// Register or replace a response on a shared mock.
    pub fn set_response(&self, method: Method, path: impl Into<String>, value: Value) {
        self.lock().responses.insert((method, path.into()), value);
    }

    /// Inject a failure.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().failures.push(fail_on);
        self
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// All recorded requests.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Recorded requests matching method and path.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<ApiRequest> {
        self.lock().requests.last().cloned()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

#[async_trait]
impl JiraApi for MockJira {
    async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut inner = self.lock();
        inner.requests.push(request.clone());

        if let Some(error) = inner.failures.iter().find_map(|f| f.matches(&request)) {
            return Err(error);
        }

        Ok(inner
            .responses
            .get(&(request.method, request.path.clone()))
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}
