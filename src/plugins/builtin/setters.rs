//! plugins::builtin::setters
//!
//! Single-field setters.

use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::config::Config;
use crate::jira::{issue_path, ApiRequest, JiraApi};
use crate::plugins::setter::{capitalize, FieldSetter};
use crate::plugins::{ArgSpec, ErrorKind, FixCapability, OpError};

/// Priorities Jira accepts, matched case-insensitively.
pub const PRIORITIES: [&str; 4] = ["Critical", "Major", "Normal", "Minor"];

/// Known priority name for `value`, or `fallback`.
pub fn normalize_priority<'a>(value: &str, fallback: &'a str) -> &'a str {
    PRIORITIES
        .iter()
        .find(|p| p.eq_ignore_ascii_case(value.trim()))
        .copied()
        .unwrap_or(fallback)
}

fn fields_update(field: &str, value: Value) -> Value {
    let mut fields = serde_json::Map::new();
    fields.insert(field.to_string(), value);
    json!({ "fields": fields })
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, OpError> {
    value.ok_or_else(|| OpError::Domain(format!("no {} given", field)))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetPriority;

#[async_trait]
impl FieldSetter for SetPriority {
    fn field_name(&self) -> &'static str {
        "priority"
    }

    fn argument_name(&self) -> &'static str {
        "priority"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetPriority
    }

    fn argument_help(&self) -> String {
        format!("The priority to set ({})", PRIORITIES.join(", "))
    }

    fn format_success_message(&self, issue_key: &str, value: Option<&str>) -> String {
        let name = normalize_priority(value.unwrap_or_default(), "Normal");
        format!("✅ Priority for {} set to '{}'", issue_key, name)
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let name = normalize_priority(value.unwrap_or_default(), config.priority_fallback());
        let payload = fields_update("priority", json!({ "name": name }));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }

    fn fix_capabilities(&self) -> Vec<FixCapability> {
        vec![FixCapability {
            method_name: "set_default_priority",
            description: "Set priority to default value",
            params: vec!["issue_key"],
            problem_patterns: vec!["Priority not set"],
        }]
    }

    fn default_fix_value(&self, _method_name: &str, config: &Config) -> Option<String> {
        config.default_priority().map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetStoryPoints;

#[async_trait]
impl FieldSetter for SetStoryPoints {
    fn field_name(&self) -> &'static str {
        "story points"
    }

    fn argument_name(&self) -> &'static str {
        "points"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetStoryPoints
    }

    fn value_argument(&self) -> ArgSpec {
        ArgSpec::positional(self.argument_name(), self.argument_help()).integer()
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let raw = required(value, "story points")?;
        let points: i64 = raw
            .trim()
            .parse()
            .map_err(|_| OpError::Domain(format!("invalid story points '{}'", raw)))?;
        let payload = fields_update(config.story_points_field()?, json!(points));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetComponent;

#[async_trait]
impl FieldSetter for SetComponent {
    fn field_name(&self) -> &'static str {
        "component"
    }

    fn argument_name(&self) -> &'static str {
        "component"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetComponent
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        _config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let component = required(value, "component")?;
        let payload = fields_update("components", json!([{ "name": component }]));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }

    fn fix_capabilities(&self) -> Vec<FixCapability> {
        vec![FixCapability {
            method_name: "set_default_component",
            description: "Set component to default value",
            params: vec!["issue_key"],
            problem_patterns: vec!["component", "Component not set"],
        }]
    }

    fn default_fix_value(&self, _method_name: &str, config: &Config) -> Option<String> {
        config.default_component().map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetProject;

#[async_trait]
impl FieldSetter for SetProject {
    fn field_name(&self) -> &'static str {
        "project"
    }

    fn argument_name(&self) -> &'static str {
        "project"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetProject
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        _config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let project = required(value, "project")?;
        let payload = fields_update("project", json!({ "key": project }));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetSummary;

#[async_trait]
impl FieldSetter for SetSummary {
    fn field_name(&self) -> &'static str {
        "summary"
    }

    fn argument_name(&self) -> &'static str {
        "summary"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetSummary
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        _config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let summary = required(value, "summary")?;
        let payload = fields_update("summary", json!(summary));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }
}

/// Sets the workstream; the id argument is optional and falls back to the
/// configured default, then to `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetWorkstream;

#[async_trait]
impl FieldSetter for SetWorkstream {
    fn field_name(&self) -> &'static str {
        "workstream"
    }

    fn argument_name(&self) -> &'static str {
        "workstream_id"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetWorkstream
    }

    fn value_argument(&self) -> ArgSpec {
        ArgSpec::option(
            self.argument_name(),
            "The workstream ID (optional, uses default if not provided)",
        )
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "set-workstream AAP-12345".to_string(),
            "set-workstream AAP-12345 --workstream-id 4821".to_string(),
        ]
    }

    fn format_success_message(&self, _issue_key: &str, value: Option<&str>) -> String {
        match value {
            Some(id) if !id.is_empty() => format!("✅ Workstream set to ID '{}'", id),
            _ => "✅ Workstream set to default value".to_string(),
        }
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let id = value
            .filter(|v| !v.is_empty())
            .or_else(|| config.default_workstream_id());
        let payload = fields_update(config.workstream_field()?, json!([{ "id": id }]));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }

    fn fix_capabilities(&self) -> Vec<FixCapability> {
        vec![FixCapability {
            method_name: "set_default_workstream",
            description: "Set workstream to default value",
            params: vec!["issue_key"],
            problem_patterns: vec!["workstream", "Workstream not set"],
        }]
    }

    fn default_fix_value(&self, _method_name: &str, config: &Config) -> Option<String> {
        config.default_workstream_id().map(str::to_string)
    }
}

/// Moves an issue through the workflow transition named like the target status.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetStatus;

#[async_trait]
impl FieldSetter for SetStatus {
    fn field_name(&self) -> &'static str {
        "status"
    }

    fn argument_name(&self) -> &'static str {
        "status"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetStatus
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["set-status AAP-12345 'In Progress'".to_string()]
    }

    fn format_success_message(&self, issue_key: &str, value: Option<&str>) -> String {
        format!(
            "✅ Changed status of {} to '{}'",
            issue_key,
            value.unwrap_or_default()
        )
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        _config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let status = required(value, "status")?;
        let path = format!("{}/transitions", issue_path(issue_key));

        let response = client.get(&path).await?;
        let transitions = response
            .get("transitions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let matching = transitions.iter().find(|t| {
            t.get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| name.eq_ignore_ascii_case(status))
        });

        let Some(id) = matching.and_then(|t| t.get("id")).cloned() else {
            let names: Vec<&str> = transitions
                .iter()
                .filter_map(|t| t.get("name").and_then(Value::as_str))
                .collect();
            return Err(OpError::Domain(format!(
                "Transition to status '{}' not found. Available transitions: {}",
                status,
                if names.is_empty() {
                    "none".to_string()
                } else {
                    names.join(", ")
                }
            )));
        };

        Ok(client
            .request(ApiRequest::post(path, json!({ "transition": { "id": id } })))
            .await?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetStoryEpic;

#[async_trait]
impl FieldSetter for SetStoryEpic {
    fn field_name(&self) -> &'static str {
        "story epic"
    }

    fn argument_name(&self) -> &'static str {
        "epic_key"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetStoryEpic
    }

    fn help_text(&self) -> String {
        "Set the epic of a Jira story".to_string()
    }

    fn argument_help(&self) -> String {
        "The epic issue key (e.g., PROJ-100)".to_string()
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["set-story-epic AAP-12345 AAP-10000".to_string()]
    }

    fn format_success_message(&self, issue_key: &str, value: Option<&str>) -> String {
        format!(
            "✅ Epic for {} set to '{}'",
            issue_key,
            value.unwrap_or_default()
        )
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let epic = required(value, "epic key")?;
        let payload = fields_update(config.epic_field()?, json!(epic));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }
}

/// Sets or clears acceptance criteria; an omitted value clears the field.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetAcceptanceCriteria;

#[async_trait]
impl FieldSetter for SetAcceptanceCriteria {
    fn field_name(&self) -> &'static str {
        "acceptance criteria"
    }

    fn argument_name(&self) -> &'static str {
        "acceptance_criteria"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SetAcceptanceCriteria
    }

    fn help_text(&self) -> String {
        "Set the acceptance criteria for a Jira issue".to_string()
    }

    fn value_argument(&self) -> ArgSpec {
        ArgSpec::positional(self.argument_name(), "The acceptance criteria").optional()
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["set-acceptance-criteria AAP-12345 'User can login successfully'".to_string()]
    }

    fn format_success_message(&self, issue_key: &str, value: Option<&str>) -> String {
        let label = capitalize(self.field_name());
        match value.map(str::trim) {
            Some(text) if !text.is_empty() => format!("✅ {} set for {}", label, issue_key),
            _ => format!("✅ {} cleared for {}", label, issue_key),
        }
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let text = value.map(str::trim).unwrap_or_default();
        let payload = fields_update(config.acceptance_criteria_field()?, json!(text));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }
}

/// Source argument meaning "read standard input".
pub const STDIN_SOURCE: &str = "-";

/// Description text from a file path, or from stdin for `-`.
pub fn read_description(source: &str) -> Result<String, OpError> {
    if source == STDIN_SOURCE {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| OpError::Domain(format!("Failed to read stdin: {}", e)))?;
        return Ok(text);
    }

    let path = Path::new(source);
    if !path.exists() {
        return Err(OpError::Domain(format!("File not found: {}", source)));
    }
    std::fs::read_to_string(path)
        .map_err(|e| OpError::Domain(format!("Failed to read file: {}", e)))
}

/// Replaces the description with the contents of a file or stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateDescription;

#[async_trait]
impl FieldSetter for UpdateDescription {
    fn field_name(&self) -> &'static str {
        "description"
    }

    fn argument_name(&self) -> &'static str {
        "source"
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::UpdateDescription
    }

    fn command_name(&self) -> String {
        "update-description".to_string()
    }

    fn help_text(&self) -> String {
        "Update the description of a Jira issue from file or stdin".to_string()
    }

    fn value_argument(&self) -> ArgSpec {
        ArgSpec::positional(
            self.argument_name(),
            "File containing the new description, or '-' to read stdin",
        )
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "update-description AAP-12345 description.md".to_string(),
            "update-description AAP-12345 -".to_string(),
        ]
    }

    fn format_success_message(&self, issue_key: &str, _value: Option<&str>) -> String {
        format!("✅ Updated description for {}", issue_key)
    }

    async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        _config: &Config,
        issue_key: &str,
        value: Option<&str>,
    ) -> Result<Value, OpError> {
        let description = read_description(required(value, "description source")?)?;
        let payload = fields_update("description", json!(description));
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FileConfig;
    use crate::jira::{Method, MockJira};
    use crate::plugins::{CommandPlugin, Setter};

    fn config() -> Config {
        Config::from_sources(FileConfig::default(), |name| {
            let v = match name {
                "JIRA_STORY_POINTS_FIELD" => "customfield_points",
                "JIRA_WORKSTREAM_FIELD" => "customfield_ws",
                "JIRA_EPIC_FIELD" => "customfield_epic",
                "JIRA_ACCEPTANCE_CRITERIA_FIELD" => "customfield_ac",
                _ => return None,
            };
            Some(v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn priority_normalization() {
        assert_eq!(normalize_priority("critical", "Normal"), "Critical");
        assert_eq!(normalize_priority(" MINOR ", "Normal"), "Minor");
        assert_eq!(normalize_priority("bogus", "Normal"), "Normal");
        assert_eq!(normalize_priority("", "Normal"), "Normal");
    }

    #[tokio::test]
    async fn story_points_rejects_non_numbers() {
        let jira = MockJira::new();
        let err = SetStoryPoints
            .rest_operation(&jira, &config(), "AAP-1", Some("five"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid story points"));
        assert!(jira.requests().is_empty());
    }

    #[tokio::test]
    async fn workstream_without_any_id_sends_null() {
        let jira = MockJira::new();
        SetWorkstream
            .rest_operation(&jira, &config(), "AAP-1", None)
            .await
            .unwrap();
        assert_eq!(
            jira.last_request().unwrap().body,
            Some(json!({"fields": {"customfield_ws": [{"id": null}]}}))
        );
    }

    #[tokio::test]
    async fn status_transition_by_name() {
        let jira = MockJira::new().respond(
            Method::Get,
            "/rest/api/2/issue/AAP-1/transitions",
            json!({"transitions": [
                {"id": "11", "name": "To Do"},
                {"id": "21", "name": "In Progress"}
            ]}),
        );
        SetStatus
            .rest_operation(&jira, &config(), "AAP-1", Some("in progress"))
            .await
            .unwrap();

        let posts = jira.requests_to(Method::Post, "/rest/api/2/issue/AAP-1/transitions");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].body, Some(json!({"transition": {"id": "21"}})));
    }

    #[tokio::test]
    async fn unknown_status_lists_transitions() {
        let jira = MockJira::new().respond(
            Method::Get,
            "/rest/api/2/issue/AAP-1/transitions",
            json!({"transitions": [{"id": "11", "name": "To Do"}]}),
        );
        let err = SetStatus
            .rest_operation(&jira, &config(), "AAP-1", Some("Done"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Transition to status 'Done' not found. Available transitions: To Do"
        );
        assert!(jira
            .requests_to(Method::Post, "/rest/api/2/issue/AAP-1/transitions")
            .is_empty());
    }

    #[tokio::test]
    async fn acceptance_criteria_clears_when_omitted() {
        let jira = MockJira::new();
        SetAcceptanceCriteria
            .rest_operation(&jira, &config(), "AAP-1", None)
            .await
            .unwrap();
        assert_eq!(
            jira.last_request().unwrap().body,
            Some(json!({"fields": {"customfield_ac": ""}}))
        );
        assert_eq!(
            SetAcceptanceCriteria.format_success_message("AAP-1", None),
            "✅ Acceptance criteria cleared for AAP-1"
        );
    }

    #[tokio::test]
    async fn description_is_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("description.md");
        std::fs::write(&path, "h1. Overview\nDetails").unwrap();

        let jira = MockJira::new();
        UpdateDescription
            .rest_operation(&jira, &config(), "AAP-1", path.to_str())
            .await
            .unwrap();

        let puts = jira.requests_to(Method::Put, "/rest/api/2/issue/AAP-1");
        assert_eq!(
            puts[0].body,
            Some(json!({"fields": {"description": "h1. Overview\nDetails"}}))
        );
        assert_eq!(
            UpdateDescription.format_success_message("AAP-1", path.to_str()),
            "✅ Updated description for AAP-1"
        );
    }

    #[tokio::test]
    async fn description_from_missing_file_sends_nothing() {
        let jira = MockJira::new();
        let err = UpdateDescription
            .rest_operation(&jira, &config(), "AAP-1", Some("/nonexistent/description.md"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File not found: /nonexistent/description.md");
        assert!(jira.requests().is_empty());
    }

    #[test]
    fn description_command_keeps_its_own_name() {
        let setter = Setter::new(UpdateDescription);
        assert_eq!(setter.command_name(), "update-description");
        assert_eq!(setter.arguments()[1].name, "source");
    }
}
