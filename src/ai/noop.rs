//! ai::noop
//!
//! Reviewer used when no AI provider is available.

use async_trait::async_trait;
use tracing::warn;

use super::{AiError, QualityReviewer};

/// Returns the input text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReviewer;

#[async_trait]
impl QualityReviewer for NoopReviewer {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn improve_text(&self, _prompt: &str, text: &str) -> Result<String, AiError> {
        warn!("no AI provider configured or available, returning original text");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_text_unchanged() {
        let out = NoopReviewer.improve_text("Fix it", "as is").await.unwrap();
        assert_eq!(out, "as is");
    }
}
