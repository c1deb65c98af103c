//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! All settings end up in one [`Config`] value built at process start and
//! passed by reference to whatever needs a field id or a default. Nothing
//! else reads the environment.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment variables (see [`EnvVar`])
//!
//! # Config File Locations
//!
//! Searched in order:
//! 1. `--config <path>` (must exist)
//! 2. `$JIRA_CREATOR_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/rh-issue/config.toml`
//! 4. `~/.config/rh-issue/config.toml`
//!
//! # Example
//!
//! ```
//! use jira_creator::core::config::{Config, FileConfig};
//!
//! let config = Config::from_sources(FileConfig::default(), |name| match name {
//!     "JIRA_URL" => Some("https://issues.example.com".to_string()),
//!     "JIRA_EPIC_FIELD" => Some("customfield_1".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(config.jira_url().unwrap(), "https://issues.example.com");
//! assert_eq!(config.epic_field().unwrap(), "customfield_1");
//! assert_eq!(config.priority_fallback(), "Normal");
//! ```

pub mod schema;

pub use schema::{AiConfig, CacheConfig, DefaultsConfig, EnvVar, FieldsConfig, FileConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::paths::{self, AppPaths};

/// Default OpenAI-compatible chat completions endpoint.
pub const DEFAULT_AI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model for the OpenAI reviewer.
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,

    #[error("missing required configuration: {name} is not set")]
    MissingVariable { name: &'static str },
}

/// Merged configuration from the file and the environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    file: FileConfig,
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, if
    /// `explicit` is given but unreadable, or if validation fails. Missing
    /// config files are not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();

        let (file, loaded_from) = match explicit {
            Some(path) => (Self::read_file(path)?, Some(path.to_path_buf())),
            None => Self::search(&lookup)?,
        };

        let mut config = Self::from_sources(file, lookup)?;
        config.loaded_from = loaded_from;
        Ok(config)
    }

    /// Build configuration from a parsed file and an environment lookup.
    ///
    /// Environment values are trimmed; empty values are treated as unset.
    pub fn from_sources<F>(mut file: FileConfig, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for var in EnvVar::ALL {
            let value = lookup(var.name())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if let Some(value) = value {
                *var.slot(&mut file) = Some(value);
            }
        }

        file.validate()?;

        Ok(Config {
            file,
            loaded_from: None,
        })
    }

    fn search<F>(lookup: &F) -> Result<(FileConfig, Option<PathBuf>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for path in paths::config_candidates(lookup) {
            if path.exists() {
                let file = Self::read_file(&path)?;
                return Ok((file, Some(path)));
            }
        }
        Ok((FileConfig::default(), None))
    }

    /// Read and parse a config file.
    pub fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path of the config file that was loaded, if any.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// The underlying file-level values (after the environment overlay).
    pub fn file(&self) -> &FileConfig {
        &self.file
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    fn require<'a>(value: Option<&'a String>, var: EnvVar) -> Result<&'a str, ConfigError> {
        value
            .map(String::as_str)
            .ok_or(ConfigError::MissingVariable { name: var.name() })
    }

    fn fields(&self) -> Option<&FieldsConfig> {
        self.file.fields.as_ref()
    }

    fn defaults(&self) -> Option<&DefaultsConfig> {
        self.file.defaults.as_ref()
    }

    fn ai(&self) -> Option<&AiConfig> {
        self.file.ai.as_ref()
    }

    /// Jira base URL without a trailing slash.
    pub fn jira_url(&self) -> Result<&str, ConfigError> {
        Self::require(self.file.jira_url.as_ref(), EnvVar::JiraUrl).map(|u| u.trim_end_matches('/'))
    }

    /// Personal access token.
    pub fn token(&self) -> Result<&str, ConfigError> {
        Self::require(self.file.token.as_ref(), EnvVar::Token)
    }

    /// Default project key.
    pub fn project_key(&self) -> Result<&str, ConfigError> {
        Self::require(self.file.project_key.as_ref(), EnvVar::ProjectKey)
    }

    /// Agile board id used for sprint lookups.
    pub fn board_id(&self) -> Result<&str, ConfigError> {
        Self::require(self.file.board_id.as_ref(), EnvVar::BoardId)
    }

    /// Custom field id for the epic link.
    pub fn epic_field(&self) -> Result<&str, ConfigError> {
        Self::require(self.fields().and_then(|f| f.epic.as_ref()), EnvVar::EpicField)
    }

    /// Custom field id for the sprint.
    pub fn sprint_field(&self) -> Result<&str, ConfigError> {
        Self::require(self.fields().and_then(|f| f.sprint.as_ref()), EnvVar::SprintField)
    }

    /// Custom field id for story points.
    pub fn story_points_field(&self) -> Result<&str, ConfigError> {
        Self::require(
            self.fields().and_then(|f| f.story_points.as_ref()),
            EnvVar::StoryPointsField,
        )
    }

    /// Custom field id for the blocked flag.
    pub fn blocked_field(&self) -> Result<&str, ConfigError> {
        Self::require(self.fields().and_then(|f| f.blocked.as_ref()), EnvVar::BlockedField)
    }

    /// Custom field id for the blocked reason.
    pub fn blocked_reason_field(&self) -> Result<&str, ConfigError> {
        Self::require(
            self.fields().and_then(|f| f.blocked_reason.as_ref()),
            EnvVar::BlockedReasonField,
        )
    }

    /// Custom field id for acceptance criteria.
    pub fn acceptance_criteria_field(&self) -> Result<&str, ConfigError> {
        Self::require(
            self.fields().and_then(|f| f.acceptance_criteria.as_ref()),
            EnvVar::AcceptanceCriteriaField,
        )
    }

    /// Custom field id for the workstream.
    pub fn workstream_field(&self) -> Result<&str, ConfigError> {
        Self::require(
            self.fields().and_then(|f| f.workstream.as_ref()),
            EnvVar::WorkstreamField,
        )
    }

    /// Configured default priority, if any.
    pub fn default_priority(&self) -> Option<&str> {
        self.defaults().and_then(|d| d.priority.as_deref())
    }

    /// Priority used when a value is not one of the known names.
    ///
    /// Always `Normal`.
    pub fn priority_fallback(&self) -> &'static str {
        "Normal"
    }

    /// Configured default component, if any.
    pub fn default_component(&self) -> Option<&str> {
        self.defaults().and_then(|d| d.component.as_deref())
    }

    /// Configured default workstream id, if any.
    pub fn default_workstream_id(&self) -> Option<&str> {
        self.defaults().and_then(|d| d.workstream_id.as_deref())
    }

    /// Quality reviewer provider name.
    pub fn ai_provider(&self) -> Result<&str, ConfigError> {
        Self::require(self.ai().and_then(|a| a.provider.as_ref()), EnvVar::AiProvider)
    }

    /// API key for the quality reviewer.
    pub fn ai_api_key(&self) -> Result<&str, ConfigError> {
        Self::require(self.ai().and_then(|a| a.api_key.as_ref()), EnvVar::AiApiKey)
    }

    /// Model for the quality reviewer.
    ///
    /// Defaults to [`DEFAULT_AI_MODEL`].
    pub fn ai_model(&self) -> &str {
        self.ai()
            .and_then(|a| a.model.as_deref())
            .unwrap_or(DEFAULT_AI_MODEL)
    }

    /// Chat completions endpoint.
    ///
    /// Defaults to [`DEFAULT_AI_ENDPOINT`].
    pub fn ai_endpoint(&self) -> &str {
        self.ai()
            .and_then(|a| a.endpoint.as_deref())
            .unwrap_or(DEFAULT_AI_ENDPOINT)
    }

    /// Location of the lint verdict cache.
    ///
    /// Defaults to `~/.config/rh-issue/ai-hashes.json`.
    pub fn lint_cache_path(&self) -> Result<PathBuf, ConfigError> {
        match self.file.cache.as_ref().and_then(|c| c.path.as_deref()) {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(AppPaths::user()?.lint_cache_path()),
        }
    }
}
