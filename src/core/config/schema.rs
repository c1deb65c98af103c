//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Config File
//!
//! Located at (in order of precedence):
//! 1. `--config <path>` on the command line
//! 2. `$JIRA_CREATOR_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/rh-issue/config.toml`
//! 4. `~/.config/rh-issue/config.toml`
//!
//! Environment variables are overlaid on top of the file; see
//! [`EnvVar`] for the names.
//!
//! # Validation
//!
//! Values are validated after parsing and after the environment overlay
//! (e.g. the Jira URL must be http(s), the AI provider must be known).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// jira_url = "https://issues.example.com"
/// project_key = "AAP"
/// board_id = "21125"
///
/// [fields]
/// epic = "customfield_12311140"
/// story_points = "customfield_12310243"
///
/// [defaults]
/// priority = "Normal"
/// component = "analytics-hcc-service"
///
/// [ai]
/// provider = "openai"
/// model = "gpt-4o-mini"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Base URL of the Jira instance
    pub jira_url: Option<String>,

    /// Personal access token
    pub token: Option<String>,

    /// Default project key
    pub project_key: Option<String>,

    /// Agile board used for sprint lookups
    pub board_id: Option<String>,

    /// Custom field ids
    pub fields: Option<FieldsConfig>,

    /// Default values used by commands and auto-fixes
    pub defaults: Option<DefaultsConfig>,

    /// Quality reviewer settings
    pub ai: Option<AiConfig>,

    /// Lint cache settings
    pub cache: Option<CacheConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.jira_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "jira_url must start with http:// or https://, got '{}'",
                    url
                )));
            }
        }

        if let Some(ai) = &self.ai {
            ai.validate()?;
        }

        Ok(())
    }
}

/// Custom field ids for the fields this tool reads and writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FieldsConfig {
    pub epic: Option<String>,
    pub sprint: Option<String>,
    pub story_points: Option<String>,
    pub blocked: Option<String>,
    pub blocked_reason: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub workstream: Option<String>,
}

/// Default values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Priority used by the priority auto-fix
    pub priority: Option<String>,

    /// Component used by the component auto-fix
    pub component: Option<String>,

    /// Workstream id used when `--workstream-id` is omitted
    pub workstream_id: Option<String>,
}

/// Quality reviewer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AiConfig {
    /// Provider name ("openai", "noop")
    pub provider: Option<String>,

    /// API key for the provider
    pub api_key: Option<String>,

    /// Model identifier
    pub model: Option<String>,

    /// Chat completions endpoint override
    pub endpoint: Option<String>,
}

impl AiConfig {
    /// Provider names accepted in the config file.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["openai", "noop", "none"];

    /// Validate the AI configuration.
    ///
    /// Only the file is strict about provider names; an unknown name coming
    /// from the environment falls back to the no-op reviewer at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.to_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid ai provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Lint cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Path of the verdict cache file
    pub path: Option<String>,
}

/// Environment variables recognized by the configuration overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvVar {
    JiraUrl,
    Token,
    ProjectKey,
    BoardId,
    Priority,
    EpicField,
    SprintField,
    StoryPointsField,
    BlockedField,
    BlockedReasonField,
    AcceptanceCriteriaField,
    WorkstreamField,
    WorkstreamId,
    DefaultComponent,
    AiProvider,
    AiApiKey,
    AiModel,
    AiUrl,
    LintCache,
}

impl EnvVar {
    /// Every recognized variable, in overlay order.
    pub const ALL: &'static [EnvVar] = &[
        EnvVar::JiraUrl,
        EnvVar::Token,
        EnvVar::ProjectKey,
        EnvVar::BoardId,
        EnvVar::Priority,
        EnvVar::EpicField,
        EnvVar::SprintField,
        EnvVar::StoryPointsField,
        EnvVar::BlockedField,
        EnvVar::BlockedReasonField,
        EnvVar::AcceptanceCriteriaField,
        EnvVar::WorkstreamField,
        EnvVar::WorkstreamId,
        EnvVar::DefaultComponent,
        EnvVar::AiProvider,
        EnvVar::AiApiKey,
        EnvVar::AiModel,
        EnvVar::AiUrl,
        EnvVar::LintCache,
    ];

    /// The variable name.
    pub fn name(&self) -> &'static str {
        match self {
            EnvVar::JiraUrl => "JIRA_URL",
            EnvVar::Token => "JPAT",
            EnvVar::ProjectKey => "PROJECT_KEY",
            EnvVar::BoardId => "JIRA_BOARD_ID",
            EnvVar::Priority => "PRIORITY",
            EnvVar::EpicField => "JIRA_EPIC_FIELD",
            EnvVar::SprintField => "JIRA_SPRINT_FIELD",
            EnvVar::StoryPointsField => "JIRA_STORY_POINTS_FIELD",
            EnvVar::BlockedField => "JIRA_BLOCKED_FIELD",
            EnvVar::BlockedReasonField => "JIRA_BLOCKED_REASON_FIELD",
            EnvVar::AcceptanceCriteriaField => "JIRA_ACCEPTANCE_CRITERIA_FIELD",
            EnvVar::WorkstreamField => "JIRA_WORKSTREAM_FIELD",
            EnvVar::WorkstreamId => "JIRA_WORKSTREAM_ID",
            EnvVar::DefaultComponent => "JIRA_DEFAULT_COMPONENT",
            EnvVar::AiProvider => "JIRA_AI_PROVIDER",
            EnvVar::AiApiKey => "AI_API_KEY",
            EnvVar::AiModel => "AI_MODEL",
            EnvVar::AiUrl => "AI_URL",
            EnvVar::LintCache => "JIRA_LINT_CACHE",
        }
    }

    /// Mutable slot in the file config that this variable overrides.
    pub(crate) fn slot<'a>(&self, config: &'a mut FileConfig) -> &'a mut Option<String> {
        match self {
            EnvVar::JiraUrl => &mut config.jira_url,
            EnvVar::Token => &mut config.token,
            EnvVar::ProjectKey => &mut config.project_key,
            EnvVar::BoardId => &mut config.board_id,
            EnvVar::Priority => &mut config.defaults.get_or_insert_with(Default::default).priority,
            EnvVar::EpicField => &mut config.fields.get_or_insert_with(Default::default).epic,
            EnvVar::SprintField => &mut config.fields.get_or_insert_with(Default::default).sprint,
            EnvVar::StoryPointsField => {
                &mut config.fields.get_or_insert_with(Default::default).story_points
            }
            EnvVar::BlockedField => &mut config.fields.get_or_insert_with(Default::default).blocked,
            EnvVar::BlockedReasonField => {
                &mut config.fields.get_or_insert_with(Default::default).blocked_reason
            }
            EnvVar::AcceptanceCriteriaField => {
                &mut config
                    .fields
                    .get_or_insert_with(Default::default)
                    .acceptance_criteria
            }
            EnvVar::WorkstreamField => {
                &mut config.fields.get_or_insert_with(Default::default).workstream
            }
            EnvVar::WorkstreamId => {
                &mut config
                    .defaults
                    .get_or_insert_with(Default::default)
                    .workstream_id
            }
            EnvVar::DefaultComponent => {
                &mut config.defaults.get_or_insert_with(Default::default).component
            }
            EnvVar::AiProvider => &mut config.ai.get_or_insert_with(Default::default).provider,
            EnvVar::AiApiKey => &mut config.ai.get_or_insert_with(Default::default).api_key,
            EnvVar::AiModel => &mut config.ai.get_or_insert_with(Default::default).model,
            EnvVar::AiUrl => &mut config.ai.get_or_insert_with(Default::default).endpoint,
            EnvVar::LintCache => &mut config.cache.get_or_insert_with(Default::default).path,
        }
    }
}

impl std::fmt::Display for EnvVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
