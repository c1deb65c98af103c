//! plugins::builtin::listing
//!
//! Filtered issue lists and user lookup.
//!
//! `list-issues` builds its JQL from filter flags, falling back to the
//! configured project and component and to the current user as assignee.
//! Closed, Done and Cancelled issues are always excluded. `list-blocked`
//! finds issues with inward "is blocked by" links and can show the
//! blockers, as text or JSON.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::view::issue_table;
use crate::core::config::{Config, ConfigError};
use crate::jira::{ApiRequest, JiraApi};
use crate::plugins::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, OpError, PluginArgs, PluginContext,
    PluginError,
};

const LIST_ISSUES_MAX_RESULTS: u32 = 200;
const LIST_BLOCKED_MAX_RESULTS: u32 = 100;
pub const DEFAULT_USER_RESULTS: i64 = 10;

const OPEN_ISSUES_CLAUSE: &str = r#"status NOT IN ("Closed", "Done", "Cancelled")"#;
const BLOCKED_BY_CLAUSE: &str = r#"issueFunction in linkedIssuesOf("project = *", "is blocked by")"#;

fn issues_of(response: &Value) -> Vec<Value> {
    response
        .get("issues")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn name_of(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Filters accepted by `list-issues`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub project: Option<String>,
    pub component: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub blocked: bool,
    pub unblocked: bool,
}

impl IssueFilter {
    pub fn from_args(args: &PluginArgs) -> Self {
        let text = |name: &str| args.get_str(name).map(str::to_string);
        Self {
            project: text("project"),
            component: text("component"),
            assignee: text("assignee"),
            reporter: text("reporter"),
            status: text("status"),
            summary: text("summary"),
            blocked: args.flag("blocked"),
            unblocked: args.flag("unblocked"),
        }
    }

    /// JQL for this filter.
    ///
    /// A reporter filter replaces the assignee filter; without either the
    /// current user is the assignee.
    ///
    /// # Errors
    ///
    /// `--blocked` and `--unblocked` need the blocked field mapping.
    pub fn jql(&self, config: &Config) -> Result<String, ConfigError> {
        let mut clauses = Vec::new();

        let project = self.project.as_deref().or(config.project_key().ok());
        if let Some(project) = project {
            clauses.push(format!(r#"project="{}""#, project));
        }
        let component = self.component.as_deref().or(config.default_component());
        if let Some(component) = component {
            clauses.push(format!(r#"component="{}""#, component));
        }

        match (&self.reporter, &self.assignee) {
            (Some(reporter), _) => clauses.push(format!(r#"reporter="{}""#, reporter)),
            (None, Some(assignee)) => clauses.push(format!(r#"assignee="{}""#, assignee)),
            (None, None) => clauses.push("assignee=currentUser()".to_string()),
        }

        if let Some(status) = &self.status {
            clauses.push(format!(r#"status="{}""#, status));
        }
        if let Some(summary) = &self.summary {
            clauses.push(format!(r#"summary~"{}""#, summary));
        }
        if self.blocked {
            clauses.push(format!(r#"{}="True""#, config.blocked_field()?));
        }
        if self.unblocked {
            clauses.push(format!(r#"{}!="True""#, config.blocked_field()?));
        }

        clauses.push(OPEN_ISSUES_CLAUSE.to_string());
        Ok(clauses.join(" AND "))
    }
}

/// Open issues matching filter flags, as a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListIssues;

impl ListIssues {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        filter: &IssueFilter,
    ) -> Result<Vec<Value>, OpError> {
        let mut fields = vec!["key", "summary", "status", "assignee", "priority"];
        fields.extend(config.story_points_field().ok());
        fields.extend(config.sprint_field().ok());
        fields.extend(config.blocked_field().ok());

        let response = client
            .request(
                ApiRequest::get("/rest/api/2/search")
                    .param("jql", filter.jql(config)?)
                    .param("fields", fields.join(","))
                    .param("maxResults", LIST_ISSUES_MAX_RESULTS),
            )
            .await?;
        Ok(issues_of(&response))
    }
}

#[async_trait]
impl CommandPlugin for ListIssues {
    fn command_name(&self) -> String {
        "list-issues".to_string()
    }

    fn help_text(&self) -> String {
        "List open issues filtered by project, component, and people".to_string()
    }

    fn category(&self) -> Category {
        Category::SearchView
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "list-issues".to_string(),
            "list-issues --project AAP --status 'In Progress'".to_string(),
            "list-issues --reporter jdoe --blocked".to_string(),
        ]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::option("project", "Filter by project key"),
            ArgSpec::option("component", "Filter by component"),
            ArgSpec::option("assignee", "Filter by assignee username"),
            ArgSpec::option("reporter", "Filter by reporter username"),
            ArgSpec::option("status", "Filter by status"),
            ArgSpec::option("summary", "Filter by text in the summary"),
            ArgSpec::flag("blocked", "Only blocked issues"),
            ArgSpec::flag("unblocked", "Only issues that are not blocked"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::ListIssues
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "list issues", e);
        let filter = IssueFilter::from_args(args);
        if filter.blocked && filter.unblocked {
            return Err(fail(OpError::Domain(
                "--blocked and --unblocked cannot be combined".into(),
            )));
        }

        let issues = self
            .rest_operation(ctx.client, ctx.config, &filter)
            .await
            .map_err(fail)?;

        if issues.is_empty() {
            ctx.output.print("No issues found.");
            return Ok(false);
        }
        for line in issue_table(&issues, ctx.config) {
            ctx.output.print(line);
        }
        Ok(true)
    }
}

/// An issue that blocks a listed issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blocker {
    pub key: String,
    pub summary: String,
    pub status: String,
}

/// One row of `list-blocked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockers: Option<Vec<Blocker>>,
}

impl BlockedIssue {
    /// Extract a row from a search hit.
    pub fn from_issue(issue: &Value, with_blockers: bool) -> Self {
        let fields = issue.get("fields").unwrap_or(&Value::Null);
        let nested = |key: &str, inner: &str| {
            fields
                .get(key)
                .and_then(|v| name_of(v, inner))
                .unwrap_or_default()
        };

        Self {
            key: name_of(issue, "key").unwrap_or_default(),
            summary: name_of(fields, "summary").unwrap_or_default(),
            status: nested("status", "name"),
            priority: nested("priority", "name"),
            assignee: fields
                .get("assignee")
                .and_then(|a| name_of(a, "displayName"))
                .unwrap_or_else(|| "Unassigned".to_string()),
            blockers: with_blockers.then(|| blockers_of(fields)),
        }
    }
}

/// Issues linked inward with "is blocked by".
pub fn blockers_of(fields: &Value) -> Vec<Blocker> {
    let Some(links) = fields.get("issuelinks").and_then(Value::as_array) else {
        return Vec::new();
    };

    links
        .iter()
        .filter(|link| {
            link.pointer("/type/inward").and_then(Value::as_str) == Some("is blocked by")
        })
        .filter_map(|link| link.get("inwardIssue"))
        .map(|blocker| Blocker {
            key: name_of(blocker, "key").unwrap_or_default(),
            summary: blocker
                .pointer("/fields/summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            status: blocker
                .pointer("/fields/status/name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
        .collect()
}

/// Output format of `list-blocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Text,
    Json,
}

impl ListFormat {
    pub fn parse(value: &str) -> Result<Self, OpError> {
        match value {
            "text" => Ok(ListFormat::Text),
            "json" => Ok(ListFormat::Json),
            other => Err(OpError::Domain(format!(
                "unsupported output format '{}': expected text or json",
                other
            ))),
        }
    }
}

/// Issues that other issues block.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListBlocked;

impl ListBlocked {
    /// JQL for blocked issues; the project falls back to configuration and
    /// the status to any open state.
    pub fn jql(args: &PluginArgs, config: &Config) -> String {
        let mut clauses = Vec::new();
        let project = args.get_str("project").or(config.project_key().ok());
        if let Some(project) = project.filter(|p| !p.is_empty()) {
            clauses.push(format!(r#"project = "{}""#, project));
        }
        match args.get_str("status") {
            Some(status) => clauses.push(format!(r#"status = "{}""#, status)),
            None => clauses.push("status NOT IN (Closed, Done, Resolved)".to_string()),
        }
        if let Some(assignee) = args.get_str("assignee") {
            clauses.push(format!(r#"assignee = "{}""#, assignee));
        }
        clauses.push(BLOCKED_BY_CLAUSE.to_string());

        format!("{} ORDER BY priority DESC, created ASC", clauses.join(" AND "))
    }

    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        jql: &str,
    ) -> Result<Vec<Value>, OpError> {
        let response = client
            .request(
                ApiRequest::get("/rest/api/2/search")
                    .param("jql", jql)
                    .param("fields", "summary,status,priority,assignee,issuelinks")
                    .param("maxResults", LIST_BLOCKED_MAX_RESULTS),
            )
            .await?;
        Ok(issues_of(&response))
    }

    fn text_lines(issues: &[BlockedIssue]) -> Vec<String> {
        let mut lines = vec![
            format!("🚫 Blocked Issues ({} found)", issues.len()),
            "=".repeat(80),
        ];
        for issue in issues {
            lines.push(String::new());
            lines.push(format!("{}: {}", issue.key, issue.summary));
            lines.push(format!("  Status: {}", issue.status));
            lines.push(format!("  Priority: {}", issue.priority));
            lines.push(format!("  Assignee: {}", issue.assignee));

            if let Some(blockers) = issue.blockers.as_ref().filter(|b| !b.is_empty()) {
                lines.push("  Blocked by:".to_string());
                for blocker in blockers {
                    lines.push(format!(
                        "    - {}: {} [{}]",
                        blocker.key, blocker.summary, blocker.status
                    ));
                }
            }
        }
        lines
    }
}

#[async_trait]
impl CommandPlugin for ListBlocked {
    fn command_name(&self) -> String {
        "list-blocked".to_string()
    }

    fn help_text(&self) -> String {
        "List all blocked issues with blocker details".to_string()
    }

    fn category(&self) -> Category {
        Category::SearchView
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "list-blocked".to_string(),
            "list-blocked --project AAP --show-blockers".to_string(),
        ]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::option("project", "Filter by project key"),
            ArgSpec::option("assignee", "Filter by assignee username"),
            ArgSpec::option("status", "Filter by status (e.g., 'In Progress')"),
            ArgSpec::flag("show_blockers", "Show blocker issue details"),
            ArgSpec::option("output", "Output format: text or json").with_default("text"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::ListBlocked
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "list blocked issues", e);
        let format = ListFormat::parse(args.get_str("output").unwrap_or("text")).map_err(fail)?;
        let show_blockers = args.flag("show_blockers");

        let issues = self
            .rest_operation(ctx.client, &Self::jql(args, ctx.config))
            .await
            .map_err(fail)?;

        if issues.is_empty() {
            ctx.output.print("No blocked issues found.");
            return Ok(true);
        }

        let blocked: Vec<BlockedIssue> = issues
            .iter()
            .map(|issue| BlockedIssue::from_issue(issue, show_blockers))
            .collect();

        match format {
            ListFormat::Json => {
                let json = serde_json::to_string_pretty(&blocked)
                    .map_err(|e| fail(OpError::Domain(e.to_string())))?;
                ctx.output.print(json);
            }
            ListFormat::Text => {
                for line in Self::text_lines(&blocked) {
                    ctx.output.print(line);
                }
            }
        }
        Ok(true)
    }
}

/// Finds users by username.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchUsers;

impl SearchUsers {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        query: &str,
        max_results: i64,
    ) -> Result<Vec<Value>, OpError> {
        let response = client
            .request(
                ApiRequest::get("/rest/api/2/user/search")
                    .param("username", query)
                    .param("maxResults", max_results),
            )
            .await?;
        Ok(response.as_array().cloned().unwrap_or_default())
    }

    /// `👤 Display Name (username) <email>`; missing parts are left out.
    pub fn describe(user: &Value) -> String {
        let name = name_of(user, "name").unwrap_or_default();
        let mut line = match name_of(user, "displayName") {
            Some(display) => format!("👤 {} ({})", display, name),
            None => format!("👤 {}", name),
        };
        if let Some(email) = name_of(user, "emailAddress").filter(|e| !e.is_empty()) {
            line.push_str(&format!(" <{}>", email));
        }
        line
    }
}

#[async_trait]
impl CommandPlugin for SearchUsers {
    fn command_name(&self) -> String {
        "search-users".to_string()
    }

    fn help_text(&self) -> String {
        "Search for Jira users by username".to_string()
    }

    fn category(&self) -> Category {
        Category::Utilities
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "search-users jdoe".to_string(),
            "search-users smith --max-results 5".to_string(),
        ]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::positional("query", "Username or part of it"),
            ArgSpec::option("max_results", "Maximum number of users to return (default: 10)")
                .integer()
                .with_default(DEFAULT_USER_RESULTS.to_string()),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::SearchUsers
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "search users", e);
        let query = args.require_str("query").map_err(fail)?;
        let max_results = args.get_int("max_results").unwrap_or(DEFAULT_USER_RESULTS);

        let users = self
            .rest_operation(ctx.client, query, max_results)
            .await
            .map_err(fail)?;

        if users.is_empty() {
            ctx.output.print(format!("No users found matching '{}'", query));
            return Ok(false);
        }
        for user in &users {
            ctx.output.print(Self::describe(user));
        }
        Ok(true)
    }
}
