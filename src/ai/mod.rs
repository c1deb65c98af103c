//! ai
//!
//! Text quality reviewers.
//!
//! # Architecture
//!
//! Lint asks a [`QualityReviewer`] to judge a field's text. A reviewer has
//! one capability, `improve_text(prompt, text)`, and answers with free text:
//! `OK` when the text is fine, an explanation otherwise.
//!
//! Commands use [`create_reviewer`] rather than constructing a provider
//! directly.
//!
//! # Modules
//!
//! - [`openai`]: OpenAI-compatible chat completions reviewer
//! - [`noop`]: Returns text unchanged
//! - [`mock`]: Scripted reviewer for deterministic testing

pub mod mock;
pub mod noop;
pub mod openai;

pub use mock::ScriptedReviewer;
pub use noop::NoopReviewer;
pub use openai::OpenAiReviewer;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::core::config::{Config, ConfigError};

/// Errors from reviewer providers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AiError {
    /// Provider answered with an error status.
    #[error("AI provider call failed: {status} - {message}")]
    Api { status: u16, message: String },

    /// Provider could not be reached.
    #[error("AI provider unreachable: {0}")]
    Network(String),

    /// Provider response did not have the expected shape.
    #[error("unexpected AI provider response: {0}")]
    InvalidResponse(String),
}

/// A service that reviews or rewrites text.
#[async_trait]
pub trait QualityReviewer: Send + Sync {
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;

    /// Apply `prompt` to `text` and return the provider's answer.
    async fn improve_text(&self, prompt: &str, text: &str) -> Result<String, AiError>;
}

/// Supported reviewer providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Noop,
}

impl Provider {
    /// Parse a provider name (case-insensitive).
    ///
    /// Returns `None` for names this build does not support.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAi),
            "noop" | "none" => Some(Provider::Noop),
            _ => None,
        }
    }
}

/// Create the reviewer selected by `JIRA_AI_PROVIDER`.
///
/// Unknown provider names log a warning and fall back to [`NoopReviewer`].
///
/// # Errors
///
/// Returns `ConfigError::MissingVariable` if no provider is configured, or if
/// the selected provider needs a value that is missing (e.g. `AI_API_KEY`).
pub fn create_reviewer(config: &Config) -> Result<Arc<dyn QualityReviewer>, ConfigError> {
    let name = config.ai_provider()?;

    match Provider::parse(name) {
        Some(Provider::OpenAi) => Ok(Arc::new(OpenAiReviewer::from_config(config)?)),
        Some(Provider::Noop) => Ok(Arc::new(NoopReviewer)),
        None => {
            warn!(provider = %name, "unknown AI provider, falling back to no-op reviewer");
            Ok(Arc::new(NoopReviewer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FileConfig;

    fn config(pairs: &'static [(&'static str, &'static str)]) -> Config {
        Config::from_sources(FileConfig::default(), move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn parse_provider_names() {
        assert_eq!(Provider::parse("OpenAI"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse("none"), Some(Provider::Noop));
        assert_eq!(Provider::parse("noop"), Some(Provider::Noop));
        assert_eq!(Provider::parse("bart"), None);
    }

    #[test]
    fn provider_is_required() {
        let err = create_reviewer(&config(&[])).err().unwrap();
        assert!(err.to_string().contains("JIRA_AI_PROVIDER"));
    }

    #[test]
    fn unknown_provider_falls_back_to_noop() {
        let reviewer = create_reviewer(&config(&[("JIRA_AI_PROVIDER", "gpt4all")])).unwrap();
        assert_eq!(reviewer.name(), "noop");
    }

    #[test]
    fn openai_requires_api_key() {
        let err = create_reviewer(&config(&[("JIRA_AI_PROVIDER", "openai")]))
            .err()
            .unwrap();
        assert!(err.to_string().contains("AI_API_KEY"));
    }

    #[test]
    fn openai_selected() {
        let reviewer = create_reviewer(&config(&[
            ("JIRA_AI_PROVIDER", "openai"),
            ("AI_API_KEY", "sk-test"),
        ]))
        .unwrap();
        assert_eq!(reviewer.name(), "openai");
    }
}
