//! ai::mock
//!
//! Scripted reviewer for deterministic testing.
//!
//! # Example
//!
//! ```
//! use jira_creator::ai::{QualityReviewer, ScriptedReviewer};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let reviewer = ScriptedReviewer::new("OK").with_verdict("Bad", "too short");
//!
//! assert_eq!(reviewer.improve_text("p", "Bad").await.unwrap(), "too short");
//! assert_eq!(reviewer.improve_text("p", "Fine").await.unwrap(), "OK");
//! assert_eq!(reviewer.call_count(), 2);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{AiError, QualityReviewer};

/// Reviewer answering from a script.
///
/// Clones share the script and the call log.
#[derive(Debug, Clone)]
pub struct ScriptedReviewer {
    inner: Arc<Mutex<ScriptedInner>>,
}

#[derive(Debug)]
struct ScriptedInner {
    verdicts: HashMap<String, String>,
    default_verdict: String,
    failure: Option<AiError>,
    calls: Vec<ReviewCall>,
}

/// One recorded `improve_text` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCall {
    pub prompt: String,
    pub text: String,
}

impl ScriptedReviewer {
    /// Reviewer answering `default_verdict` for any text.
    pub fn new(default_verdict: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScriptedInner {
                verdicts: HashMap::new(),
                default_verdict: default_verdict.into(),
                failure: None,
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Answer `verdict` when the reviewed text is exactly `text`.
    pub fn with_verdict(self, text: impl Into<String>, verdict: impl Into<String>) -> Self {
        self.lock().verdicts.insert(text.into(), verdict.into());
        self
    }

    /// Fail every call with `error`.
    pub fn failing(self, error: AiError) -> Self {
        self.lock().failure = Some(error);
        self
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls that reviewed exactly `text`.
    pub fn calls_for(&self, text: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.text == text).count()
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<ReviewCall> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl QualityReviewer for ScriptedReviewer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn improve_text(&self, prompt: &str, text: &str) -> Result<String, AiError> {
        let mut inner = self.lock();
        inner.calls.push(ReviewCall {
            prompt: prompt.to_string(),
            text: text.to_string(),
        });

        if let Some(err) = &inner.failure {
            return Err(err.clone());
        }

        Ok(inner
            .verdicts
            .get(text)
            .cloned()
            .unwrap_or_else(|| inner.default_verdict.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failing_reviewer_records_call() {
        let reviewer = ScriptedReviewer::new("OK").failing(AiError::Network("down".into()));
        assert!(reviewer.improve_text("p", "t").await.is_err());
        assert_eq!(reviewer.call_count(), 1);
        assert_eq!(reviewer.calls()[0].prompt, "p");
    }

    #[tokio::test]
    async fn calls_for_counts_per_text() {
        let reviewer = ScriptedReviewer::new("OK");
        let clone = reviewer.clone();
        clone.improve_text("p", "a").await.unwrap();
        clone.improve_text("p", "a").await.unwrap();
        clone.improve_text("p", "b").await.unwrap();
        assert_eq!(reviewer.calls_for("a"), 2);
        assert_eq!(reviewer.calls_for("b"), 1);
    }
}
