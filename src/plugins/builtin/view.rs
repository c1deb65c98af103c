//! plugins::builtin::view
//!
//! Read-only commands: view, search, open in browser.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::core::config::{Config, ConfigError};
use crate::jira::{issue_path, ApiRequest, JiraApi};
use crate::plugins::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, OpError, PluginArgs, PluginContext,
    PluginError,
};
use crate::ui::output::format_table;

const PLACEHOLDER: &str = "—";

/// Human-readable rendering of a field value.
///
/// Objects show their `name`, `value`, `displayName` or `key`; lists are
/// joined with commas. `None` for `null` and empty values.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => (!s.is_empty()).then(|| s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => ["name", "value", "displayName", "key"]
            .iter()
            .find_map(|k| map.get(*k).and_then(render_value))
            .or_else(|| (!map.is_empty()).then(|| value.to_string())),
        other => Some(other.to_string()),
    }
}

/// Shows every non-empty field of an issue, custom fields by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewIssue;

impl ViewIssue {
    /// The issue's `fields` object.
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
    ) -> Result<Value, OpError> {
        let issue = client.get(&issue_path(issue_key)).await?;
        Ok(issue.get("fields").cloned().unwrap_or(Value::Null))
    }

    /// Field id to display name, from `GET /rest/api/2/field`.
    ///
    /// Best effort: an unavailable field list leaves ids as they are.
    async fn field_names(client: &dyn JiraApi) -> HashMap<String, String> {
        match client.get("/rest/api/2/field").await {
            Ok(Value::Array(fields)) => fields
                .iter()
                .filter_map(|f| {
                    let id = f.get("id")?.as_str()?;
                    let name = f.get("name")?.as_str()?;
                    Some((id.to_string(), name.to_string()))
                })
                .collect(),
            Ok(_) => HashMap::new(),
            Err(e) => {
                debug!(error = %e, "field names unavailable");
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl CommandPlugin for ViewIssue {
    fn command_name(&self) -> String {
        "view-issue".to_string()
    }

    fn help_text(&self) -> String {
        "View detailed information about a Jira issue".to_string()
    }

    fn category(&self) -> Category {
        Category::SearchView
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["view-issue AAP-12345".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::issue_key()]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::ViewIssue
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "view issue", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        let fields = self
            .rest_operation(ctx.client, issue_key)
            .await
            .map_err(fail)?;

        let Some(fields) = fields.as_object() else {
            ctx.output.print(format!("❌ No fields returned for {}", issue_key));
            return Ok(false);
        };

        let names = if fields.keys().any(|k| k.starts_with("customfield_")) {
            Self::field_names(ctx.client).await
        } else {
            HashMap::new()
        };

        let rows: BTreeMap<String, String> = fields
            .iter()
            .filter_map(|(id, value)| {
                let label = names.get(id).cloned().unwrap_or_else(|| id.clone());
                render_value(value).map(|v| (label, v))
            })
            .collect();

        for (label, value) in rows {
            ctx.output.print(format!("{} : {}", label, value));
        }
        Ok(true)
    }
}

/// Name of the active sprint in a sprint field value.
///
/// Jira Server returns sprints as strings like
/// `com.atlassian.greenhopper...Sprint@1[id=3,state=ACTIVE,name=Sprint 3,...]`;
/// newer versions return objects with `state` and `name`.
pub fn active_sprint_name(value: &Value) -> Option<String> {
    value.as_array()?.iter().find_map(|sprint| match sprint {
        Value::String(s) if s.contains("state=ACTIVE") => {
            let rest = &s[s.find("name=")? + "name=".len()..];
            let end = rest.find([',', ']']).unwrap_or(rest.len());
            Some(rest[..end].to_string())
        }
        Value::Object(map)
            if map
                .get("state")
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case("active")) =>
        {
            map.get("name").and_then(Value::as_str).map(str::to_string)
        }
        _ => None,
    })
}

/// JQL search rendered as a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Search;

pub const DEFAULT_MAX_RESULTS: i64 = 50;

impl Search {
    /// Issues matching `jql`.
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        jql: &str,
        max_results: i64,
    ) -> Result<Vec<Value>, OpError> {
        let mut fields = vec!["summary", "status", "assignee", "priority"];
        fields.extend(config.story_points_field().ok());
        fields.extend(config.sprint_field().ok());

        let response = client
            .request(
                ApiRequest::get("/rest/api/2/search")
                    .param("jql", jql)
                    .param("maxResults", max_results)
                    .param("fields", fields.join(",")),
            )
            .await?;

        Ok(response
            .get("issues")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn row(issue: &Value, config: &Config) -> Vec<String> {
        let fields = issue.get("fields").unwrap_or(&Value::Null);
        let field = |id: &str| fields.get(id).unwrap_or(&Value::Null);
        let text = |v: Option<String>| v.unwrap_or_else(|| PLACEHOLDER.to_string());

        let assignee = field("assignee")
            .get("displayName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "Unassigned".to_string());
        let points = config
            .story_points_field()
            .ok()
            .and_then(|id| render_value(field(id)));
        let sprint = config
            .sprint_field()
            .ok()
            .and_then(|id| active_sprint_name(field(id)));

        vec![
            text(issue.get("key").and_then(render_value)),
            text(render_value(field("status"))),
            assignee,
            text(render_value(field("priority"))),
            text(points),
            text(sprint),
            text(render_value(field("summary"))),
        ]
    }
}

#[async_trait]
impl CommandPlugin for Search {
    fn command_name(&self) -> String {
        "search".to_string()
    }

    fn help_text(&self) -> String {
        "Search for issues using JQL (Jira Query Language)".to_string()
    }

    fn category(&self) -> Category {
        Category::SearchView
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "search 'project = AAP AND status = \"In Progress\"'".to_string(),
            "search 'assignee = currentUser()' --max-results 10".to_string(),
        ]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::positional(
                "jql",
                "JQL query string (e.g., 'project = ABC AND status = Open')",
            ),
            ArgSpec::option(
                "max_results",
                "Maximum number of results to return (default: 50)",
            )
            .integer()
            .with_default(DEFAULT_MAX_RESULTS.to_string()),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::Search
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "search issues", e);
        let jql = args.require_str("jql").map_err(fail)?;
        let max_results = args.get_int("max_results").unwrap_or(DEFAULT_MAX_RESULTS);

        let issues = self
            .rest_operation(ctx.client, ctx.config, jql, max_results)
            .await
            .map_err(fail)?;

        if issues.is_empty() {
            ctx.output.print("❌ No issues found for the given JQL.");
            return Ok(false);
        }

        for line in issue_table(&issues, ctx.config) {
            ctx.output.print(line);
        }
        Ok(true)
    }
}

/// Issue rows sorted by sprint, then status, rendered as a table.
pub(crate) fn issue_table(issues: &[Value], config: &Config) -> Vec<String> {
    let mut rows: Vec<Vec<String>> = issues
        .iter()
        .map(|issue| Search::row(issue, config))
        .collect();
    rows.sort_by(|a, b| (&a[5], &a[1]).cmp(&(&b[5], &b[1])));

    let headers = [
        "Key", "Status", "Assignee", "Priority", "Points", "Sprint", "Summary",
    ];
    format_table(&headers, &rows)
}

/// Opens an issue in the default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenIssue;

impl OpenIssue {
    /// `{JIRA_URL}/browse/{key}`
    pub fn issue_url(config: &Config, issue_key: &str) -> Result<String, ConfigError> {
        Ok(format!("{}/browse/{}", config.jira_url()?, issue_key))
    }
}

#[async_trait]
impl CommandPlugin for OpenIssue {
    fn command_name(&self) -> String {
        "open-issue".to_string()
    }

    fn help_text(&self) -> String {
        "Open a Jira issue in your web browser".to_string()
    }

    fn category(&self) -> Category {
        Category::Utilities
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["open-issue AAP-12345".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::issue_key()]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::OpenIssue
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "open issue", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        let url = Self::issue_url(ctx.config, issue_key).map_err(|e| fail(e.into()))?;

        ctx.output.print(format!("🌐 Opening {} in browser...", url));
        open::that(&url).map_err(|e| fail(OpError::Domain(e.to_string())))?;
        Ok(true)
    }
}
