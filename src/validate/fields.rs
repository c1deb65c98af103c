//! validate::fields
//!
//! Issue field snapshot used by validation.
//!
//! Jira returns custom fields under ids like `customfield_12310243`; the
//! snapshot resolves those ids through [`Config`] once so the checks read
//! plain named values. Empty strings, empty lists and empty objects count
//! as absent. Story points are the exception: only `null` is absent, so
//! `0` is a valid estimate.

use serde_json::Value;

use crate::core::config::{Config, ConfigError};

/// Text fields reviewed for quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentField {
    Summary,
    Description,
    AcceptanceCriteria,
}

impl ContentField {
    /// Review order.
    pub const ALL: [ContentField; 3] = [
        ContentField::Summary,
        ContentField::Description,
        ContentField::AcceptanceCriteria,
    ];

    /// Label used in problem messages and prompts.
    pub fn label(&self) -> &'static str {
        match self {
            ContentField::Summary => "Summary",
            ContentField::Description => "Description",
            ContentField::AcceptanceCriteria => "Acceptance Criteria",
        }
    }
}

impl std::fmt::Display for ContentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only view of the fields validation looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueSnapshot {
    pub key: Option<String>,
    pub issue_type: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub epic_link: Option<String>,
    pub sprint: Option<String>,
    pub priority: Option<String>,
    pub story_points: Option<f64>,
    pub blocked_value: Option<String>,
    pub blocked_reason: Option<String>,
    pub assignee: Option<String>,
}

impl IssueSnapshot {
    /// Build a snapshot from an issue as returned by `GET /rest/api/2/issue/{key}`.
    pub fn from_issue(issue: &Value, config: &Config) -> Result<Self, ConfigError> {
        let key = issue.get("key").and_then(Value::as_str);
        let fields = issue.get("fields").unwrap_or(&Value::Null);
        Self::from_fields(key, fields, config)
    }

    /// Build a snapshot from an issue's `fields` object.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVariable` if a custom field id needed
    /// for validation is not configured.
    pub fn from_fields(
        key: Option<&str>,
        fields: &Value,
        config: &Config,
    ) -> Result<Self, ConfigError> {
        let field = |id: &str| fields.get(id).unwrap_or(&Value::Null);

        Ok(Self {
            key: key.filter(|k| !k.is_empty()).map(str::to_string),
            issue_type: name_of(field("issuetype")),
            status: name_of(field("status")),
            summary: text_of(field("summary")),
            description: text_of(field("description")),
            acceptance_criteria: text_of(field(config.acceptance_criteria_field()?)),
            epic_link: display_of(field(config.epic_field()?)),
            sprint: display_of(field(config.sprint_field()?)),
            priority: name_of(field("priority")),
            story_points: number_of(field(config.story_points_field()?)),
            blocked_value: name_of(field(config.blocked_field()?)),
            blocked_reason: display_of(field(config.blocked_reason_field()?)),
            assignee: name_of(field("assignee")),
        })
    }

    /// Text of a reviewed field.
    pub fn content(&self, field: ContentField) -> Option<&str> {
        match field {
            ContentField::Summary => self.summary.as_deref(),
            ContentField::Description => self.description.as_deref(),
            ContentField::AcceptanceCriteria => self.acceptance_criteria.as_deref(),
        }
    }
}

/// Non-empty string value.
fn text_of(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Display name of an object (`value`, `name` or `displayName`), or a plain string.
fn name_of(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => text_of(value),
        Value::Object(map) => ["value", "name", "displayName", "key"]
            .iter()
            .find_map(|k| map.get(*k).and_then(text_of))
            .or_else(|| (!map.is_empty()).then(|| value.to_string())),
        _ => None,
    }
}

/// Any non-empty value rendered as text.
fn display_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(_) => text_of(value),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_of).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(_) => name_of(value),
        other => Some(other.to_string()),
    }
}

/// Numeric value; numeric strings are accepted.
fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
