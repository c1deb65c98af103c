//! plugins::setter
//!
//! Generic "set one field" plugin.
//!
//! A [`FieldSetter`] supplies the field name, the value argument and the REST
//! call; wrapping it in [`Setter`] yields a full [`CommandPlugin`] with the
//! derived command name (`set-<field-kebab>`), the standard arguments
//! (`issue_key`, then the value), default examples, and the
//! success/failure reporting flow.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, FixCapability, OpError, PluginArgs,
    PluginContext, PluginError,
};
use crate::core::config::Config;
use crate::jira::JiraApi;

/// `set-` followed by the lowercased field name with spaces as hyphens.
pub fn command_name_for(field_name: &str) -> String {
    format!("set-{}", field_name.to_lowercase().replace(' ', "-"))
}

/// First character uppercased, the rest lowercased.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Example invocations for a setter command.
pub fn default_examples(field_name: &str) -> Vec<String> {
    let command = command_name_for(field_name);
    let example = match field_name.to_lowercase().as_str() {
        "priority" => format!("{} AAP-12345 Critical", command),
        "story points" => format!("{} AAP-12345 5", command),
        "component" => format!("{} AAP-12345 'API Gateway'", command),
        "workstream" => format!("{} AAP-12345 Authentication", command),
        "project" => format!("{} AAP-12345 NEWPROJ", command),
        "summary" => format!("{} AAP-12345 'Updated issue summary'", command),
        _ => format!("{} AAP-12345 <value>", command),
    };
    vec![example]
}

/// The parts of a setter that differ per field.
#[async_trait]
pub trait FieldSetter: Send + Sync {
    /// Human label, lowercase (`story points`).
    fn field_name(&self) -> &'static str;

    /// Name of the value argument in the parsed namespace.
    fn argument_name(&self) -> &'static str;

    fn error_kind(&self) -> ErrorKind;

    /// Derived from the field name unless overridden.
    fn command_name(&self) -> String {
        command_name_for(self.field_name())
    }

    fn help_text(&self) -> String {
        format!("Set the {} of a Jira issue", self.field_name())
    }

    fn argument_help(&self) -> String {
        format!("The {} to set", self.field_name())
    }

    /// The value argument; a required positional string unless overridden.
    fn value_argument(&self) -> ArgSpec {
        ArgSpec::positional(self.argument_name(), self.argument_help())
    }

    /// Arguments declared after the value argument.
    fn additional_arguments(&self) -> Vec<ArgSpec> {
        Vec::new()
    }

    fn example_commands(&self) -> Vec<String> {
        default_examples(self.field_name())
    }

    fn format_success_message(&self, issue_key: &str, value: Option<&str>) -> String {
        format!(
            "✅ {} for {} set to '{}'",
            capitalize(self.field_name()),
            issue_key,
            value.unwrap_or_default()
        )
    }

    /// Perform the update. `value` is `None` when an optional value
    /// argument was omitted.
    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError>;

    fn fix_capabilities(&self) -> Vec<FixCapability> {
        Vec::new()
    }

    /// Configured value used by the fix named `method_name`.
    fn default_fix_value(&self, _method_name: &str, _config: &Config) -> Option<String> {
        None
    }
}

/// [`CommandPlugin`] built from a [`FieldSetter`].
#[derive(Debug, Clone, Default)]
pub struct Setter<F> {
    field: F,
}

impl<F: FieldSetter> Setter<F> {
    pub fn new(field: F) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// The REST step alone, without reporting.
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        self.field
            .rest_operation(client, config, issue_key, value)
            .await
    }
}

#[async_trait]
impl<F: FieldSetter> CommandPlugin for Setter<F> {
    fn command_name(&self) -> String {
        self.field.command_name()
    }

    fn help_text(&self) -> String {
        self.field.help_text()
    }

    fn category(&self) -> Category {
        Category::IssueModification
    }

    fn example_commands(&self) -> Vec<String> {
        self.field.example_commands()
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        let mut args = vec![ArgSpec::issue_key(), self.field.value_argument()];
        args.extend(self.field.additional_arguments());
        args
    }

    fn error_kind(&self) -> ErrorKind {
        self.field.error_kind()
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let kind = self.field.error_kind();
        let action = format!("set {}", self.field.field_name());

        let issue_key = args
            .require_str("issue_key")
            .map_err(|e| failure(ctx.output, kind, &action, e))?;
        let value = args.get_text(&self.field.value_argument().name);

        self.field
            .rest_operation(ctx.client, ctx.config, issue_key, value.as_deref())
            .await
            .map_err(|e| failure(ctx.output, kind, &action, e))?;

        ctx.output
            .print(self.field.format_success_message(issue_key, value.as_deref()));
        Ok(true)
    }

    fn fix_capabilities(&self) -> Vec<FixCapability> {
        self.field.fix_capabilities()
    }

    async fn execute_fix(
        &self,
        ctx: &PluginContext<'_>,
        method_name: &str,
        args: &PluginArgs,
    ) -> bool {
        if !self
            .field
            .fix_capabilities()
            .iter()
            .any(|cap| cap.method_name == method_name)
        {
            return false;
        }

        let Some(value) = self.field.default_fix_value(method_name, ctx.config) else {
            debug!(fix = method_name, "no default configured");
            return false;
        };
        let Some(issue_key) = args.get_str("issue_key") else {
            return false;
        };

        let fix_args = PluginArgs::new()
            .with_str("issue_key", issue_key)
            .with_str(self.field.value_argument().name, value);

        match self.execute(ctx, &fix_args).await {
            Ok(applied) => applied,
            Err(e) => {
                warn!(fix = method_name, issue = issue_key, error = %e, "fix failed");
                false
            }
        }
    }
}
