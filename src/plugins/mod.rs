//! plugins
//!
//! Command plugins: self-describing units behind every CLI subcommand.
//!
//! # Architecture
//!
//! A [`CommandPlugin`] carries its own metadata (name, help, category,
//! examples), its argument schema, and an `execute` routine. The
//! [`PluginRegistry`] owns one instance of every built-in plugin and the CLI
//! builds its parser and dispatches through it.
//!
//! Plugins receive a [`PluginContext`] instead of reaching for globals: the
//! Jira capability, the loaded configuration, and the output handle.
//!
//! # Errors
//!
//! A plugin's REST step fails with an [`OpError`]. `execute` prints
//! `❌ Failed to {action}: {error}` and returns a [`PluginError`] tagged
//! with the plugin's [`ErrorKind`], which the dispatcher passes through
//! unchanged.
//!
//! # Modules
//!
//! - [`args`]: argument schema and parsed namespace
//! - [`setter`]: generic "set one field" plugin
//! - [`registry`]: plugin table and lookup
//! - [`builtin`]: the built-in plugins

pub mod args;
pub mod builtin;
pub mod registry;
pub mod setter;

pub use args::{ArgKind, ArgSpec, ArgValue, PluginArgs};
pub use registry::{PluginRegistry, RegistrationError};
pub use setter::{FieldSetter, Setter};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::ai::{self, AiError, QualityReviewer};
use crate::core::config::{Config, ConfigError};
use crate::jira::{ApiError, JiraApi};
use crate::ui::output::Output;
use crate::validate::{CacheError, ValidationError};

/// Help grouping for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    IssueCreation,
    SearchView,
    IssueModification,
    SprintManagement,
    IssueRelationships,
    Blocking,
    QualityValidation,
    Reporting,
    Utilities,
    Other,
}

impl Category {
    /// Display order in help output.
    pub const ALL: [Category; 10] = [
        Category::IssueCreation,
        Category::SearchView,
        Category::IssueModification,
        Category::SprintManagement,
        Category::IssueRelationships,
        Category::Blocking,
        Category::QualityValidation,
        Category::Reporting,
        Category::Utilities,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::IssueCreation => "Issue Creation & Management",
            Category::SearchView => "Search & View",
            Category::IssueModification => "Issue Modification",
            Category::SprintManagement => "Sprint Management",
            Category::IssueRelationships => "Issue Relationships",
            Category::Blocking => "Blocking & Issues",
            Category::QualityValidation => "Quality & Validation",
            Category::Reporting => "Reporting",
            Category::Utilities => "Utilities",
            Category::Other => "Other",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::IssueCreation => "📝",
            Category::SearchView => "🔍",
            Category::IssueModification => "✏️",
            Category::SprintManagement => "🎯",
            Category::IssueRelationships => "🔗",
            Category::Blocking => "🚧",
            Category::QualityValidation => "✅",
            Category::Reporting => "📊",
            Category::Utilities => "🛠️",
            Category::Other => "📦",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error kind a plugin reports on failure.
///
/// Displays as the kind name with an `Error` suffix (`SetPriorityError`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SetPriority,
    SetStoryPoints,
    SetComponent,
    SetProject,
    SetSummary,
    SetWorkstream,
    SetStatus,
    SetStoryEpic,
    SetAcceptanceCriteria,
    UpdateDescription,
    AddSprint,
    RemoveFromSprint,
    ListSprints,
    AddFlag,
    RemoveFlag,
    Block,
    Unblock,
    AssignIssue,
    UnassignIssue,
    AddComment,
    VoteStoryPoints,
    ChangeIssueType,
    AddLink,
    ViewIssue,
    Search,
    ListIssues,
    ListBlocked,
    SearchUsers,
    OpenIssue,
    Lint,
    LintAll,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}Error", self)
    }
}

/// Failure of a plugin's REST step.
#[derive(Debug, Error)]
pub enum OpError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A condition detected by the plugin itself (sprint not found, ...).
    #[error("{0}")]
    Domain(String),
}

impl From<ValidationError> for OpError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Ai(e) => OpError::Ai(e),
            ValidationError::Cache(e) => OpError::Cache(e),
        }
    }
}

/// A plugin failure, tagged with the plugin's error kind.
#[derive(Debug, Error)]
#[error("{kind}: {source}")]
pub struct PluginError {
    pub kind: ErrorKind,
    pub source: OpError,
}

impl PluginError {
    pub fn new(kind: ErrorKind, source: impl Into<OpError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

/// Declarative auto-remediation hook.
///
/// A remediation driver calls [`CommandPlugin::execute_fix`] with
/// `method_name` when a lint problem contains one of `problem_patterns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixCapability {
    pub method_name: &'static str,
    pub description: &'static str,
    pub params: Vec<&'static str>,
    pub problem_patterns: Vec<&'static str>,
}

impl FixCapability {
    /// Whether `problem` contains any pattern, ignoring case.
    pub fn matches(&self, problem: &str) -> bool {
        let problem = problem.to_lowercase();
        self.problem_patterns
            .iter()
            .any(|p| problem.contains(&p.to_lowercase()))
    }
}

/// Everything a plugin may use while executing.
pub struct PluginContext<'a> {
    pub client: &'a dyn JiraApi,
    pub config: &'a Config,
    pub output: &'a Output,
    registry: Option<&'a PluginRegistry>,
    reviewer: Option<Arc<dyn QualityReviewer>>,
    cache_path: Option<PathBuf>,
}

impl<'a> PluginContext<'a> {
    pub fn new(client: &'a dyn JiraApi, config: &'a Config, output: &'a Output) -> Self {
        Self {
            client,
            config,
            output,
            registry: None,
            reviewer: None,
            cache_path: None,
        }
    }

    /// Make the registry visible to plugins that drive other plugins.
    pub fn with_registry(mut self, registry: &'a PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use `reviewer` instead of the configured provider.
    pub fn with_reviewer(mut self, reviewer: Arc<dyn QualityReviewer>) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// Use `path` instead of the configured lint cache location.
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn registry(&self) -> Option<&'a PluginRegistry> {
        self.registry
    }

    /// Quality reviewer, built from configuration on first use.
    pub fn reviewer(&self) -> Result<Arc<dyn QualityReviewer>, ConfigError> {
        match &self.reviewer {
            Some(reviewer) => Ok(Arc::clone(reviewer)),
            None => ai::create_reviewer(self.config),
        }
    }

    pub fn cache_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.cache_path {
            Some(path) => Ok(path.clone()),
            None => self.config.lint_cache_path(),
        }
    }
}

/// One CLI subcommand.
#[async_trait]
pub trait CommandPlugin: Send + Sync {
    /// Unique kebab-case name.
    fn command_name(&self) -> String;

    fn help_text(&self) -> String;

    fn category(&self) -> Category {
        Category::Other
    }

    fn example_commands(&self) -> Vec<String> {
        Vec::new()
    }

    /// Argument schema in declaration order.
    fn arguments(&self) -> Vec<ArgSpec> {
        Vec::new()
    }

    fn error_kind(&self) -> ErrorKind;

    /// Run the command.
    ///
    /// Returns `Ok(false)` when the command ran but reports an unsuccessful
    /// outcome (lint problems found, nothing to show).
    async fn execute(&self, ctx: &PluginContext<'_>, args: &PluginArgs)
        -> Result<bool, PluginError>;

    fn fix_capabilities(&self) -> Vec<FixCapability> {
        Vec::new()
    }

    /// Apply the fix named `method_name`. Never fails; returns whether a
    /// fix was applied.
    async fn execute_fix(
        &self,
        _ctx: &PluginContext<'_>,
        _method_name: &str,
        _args: &PluginArgs,
    ) -> bool {
        false
    }
}

/// Print the standard failure line and build the plugin error.
pub(crate) fn failure(
    output: &Output,
    kind: ErrorKind,
    action: &str,
    err: impl Into<OpError>,
) -> PluginError {
    let source = err.into();
    output.failure(format!("❌ Failed to {}: {}", action, source));
    PluginError::new(kind, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::SetPriority.to_string(), "SetPriorityError");
        assert_eq!(ErrorKind::AddSprint.to_string(), "AddSprintError");
    }

    #[test]
    fn plugin_error_display_carries_kind_and_cause() {
        let err = PluginError::new(
            ErrorKind::AddSprint,
            OpError::Domain("Could not find sprint named 'S9'".into()),
        );
        assert_eq!(
            err.to_string(),
            "AddSprintError: Could not find sprint named 'S9'"
        );
    }

    #[test]
    fn fix_capability_matches_case_insensitively() {
        let fix = FixCapability {
            method_name: "set_default_component",
            description: "Set component to default value",
            params: vec!["issue_key"],
            problem_patterns: vec!["component", "Component not set"],
        };
        assert!(fix.matches("COMPONENT missing"));
        assert!(!fix.matches("Priority not set"));
    }

    #[test]
    fn categories_in_help_order() {
        assert_eq!(Category::ALL.first(), Some(&Category::IssueCreation));
        assert_eq!(Category::ALL.last(), Some(&Category::Other));
        assert_eq!(Category::Blocking.to_string(), "Blocking & Issues");
        assert_eq!(Category::SprintManagement.emoji(), "🎯");
    }

    #[test]
    fn validation_errors_convert() {
        let err: OpError = ValidationError::Ai(AiError::Network("down".into())).into();
        assert!(matches!(err, OpError::Ai(_)));
    }
}
