//! plugins::builtin::lint
//!
//! Issue lint commands and the auto-fix driver.
//!
//! `lint` validates one issue and, with `--fix`, hands each problem to the
//! plugins whose fix capabilities match it. `lint-all` validates every issue
//! returned by a JQL query built from the filter flags and prints a
//! per-check status table.
//!
//! Quality review is skipped with `--no-ai`; `--no-cache` keeps verdicts in
//! memory for the run instead of the persisted cache file.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::ai::QualityReviewer;
use crate::core::config::Config;
use crate::jira::{issue_path, ApiRequest, JiraApi};
use crate::plugins::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, OpError, PluginArgs, PluginContext,
    PluginError,
};
use crate::ui::output::format_table;
use crate::validate::{
    validate, Check, ContentField, IssueSnapshot, JsonFileCache, MemoryCache, ValidationReport,
    VerdictStore,
};

/// JQL used by `lint-all` when no filter is given.
pub const DEFAULT_LINT_JQL: &str = "assignee = currentUser() AND updated >= -30d";

const LINT_ALL_MAX_RESULTS: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintOptions {
    pub no_ai: bool,
    pub no_cache: bool,
}

impl LintOptions {
    fn from_args(args: &PluginArgs) -> Self {
        Self {
            no_ai: args.flag("no_ai"),
            no_cache: args.flag("no_cache"),
        }
    }
}

/// Reviewer and verdict cache shared by every issue of one run.
struct LintSession {
    reviewer: Option<Arc<dyn QualityReviewer>>,
    cache: Box<dyn VerdictStore>,
}

impl LintSession {
    fn open(ctx: &PluginContext<'_>, options: LintOptions) -> Result<Self, OpError> {
        let reviewer = if options.no_ai {
            None
        } else {
            Some(ctx.reviewer()?)
        };

        let cache: Box<dyn VerdictStore> = if options.no_cache || reviewer.is_none() {
            Box::new(MemoryCache::new())
        } else {
            Box::new(JsonFileCache::open(ctx.cache_path()?)?)
        };

        Ok(Self { reviewer, cache })
    }

    async fn lint(
        &mut self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
    ) -> Result<(IssueSnapshot, ValidationReport), OpError> {
        let issue = client.get(&issue_path(issue_key)).await?;
        let mut snapshot = IssueSnapshot::from_issue(&issue, config)?;
        if snapshot.key.is_none() {
            snapshot.key = Some(issue_key.to_string());
        }

        let report = validate(&snapshot, self.reviewer.as_deref(), self.cache.as_mut()).await?;
        Ok((snapshot, report))
    }
}

/// Outcome of an auto-fix pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub fixed: usize,
    pub unfixed: usize,
}

/// Offer each problem to the registered fix capabilities.
///
/// The first capability whose pattern matches and whose fix applies wins.
/// Never fails; fixes that cannot be applied count as unfixed.
pub async fn apply_fixes(
    ctx: &PluginContext<'_>,
    issue_key: &str,
    problems: &[String],
) -> FixSummary {
    let mut summary = FixSummary::default();

    let Some(registry) = ctx.registry() else {
        ctx.output.warn("Automatic fixes are unavailable");
        summary.unfixed = problems.len();
        return summary;
    };

    let args = PluginArgs::new().with_str("issue_key", issue_key);

    for problem in problems {
        let mut fixed = false;

        'plugins: for plugin in registry.list_plugins() {
            for capability in plugin.fix_capabilities() {
                if capability.matches(problem)
                    && plugin
                        .execute_fix(ctx, capability.method_name, &args)
                        .await
                {
                    fixed = true;
                    break 'plugins;
                }
            }
        }

        if fixed {
            summary.fixed += 1;
            ctx.output.print(format!("🔧 Fixed: {}", problem));
        } else {
            summary.unfixed += 1;
        }
    }

    ctx.output.print(format!(
        "🔧 Applied {} fix(es); {} problem(s) need manual attention",
        summary.fixed, summary.unfixed
    ));
    summary
}

/// Lints a single issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lint;

impl Lint {
    /// Fetch and validate `issue_key`.
    pub async fn rest_operation(
        &self,
        ctx: &PluginContext<'_>,
        issue_key: &str,
        options: LintOptions,
    ) -> Result<ValidationReport, OpError> {
        let mut session = LintSession::open(ctx, options)?;
        let (_, report) = session.lint(ctx.client, ctx.config, issue_key).await?;
        Ok(report)
    }
}

#[async_trait]
impl CommandPlugin for Lint {
    fn command_name(&self) -> String {
        "lint".to_string()
    }

    fn help_text(&self) -> String {
        "Lint a single Jira issue for quality and completeness".to_string()
    }

    fn category(&self) -> Category {
        Category::QualityValidation
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "lint AAP-12345".to_string(),
            "lint AAP-12345 --no-ai".to_string(),
            "lint AAP-12345 --fix".to_string(),
        ]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::positional("issue_key", "The Jira issue key to lint (e.g., PROJ-123)"),
            ArgSpec::flag("no_ai", "Skip AI-powered quality checks"),
            ArgSpec::flag("no_cache", "Skip cache and force fresh validation"),
            ArgSpec::flag("fix", "Apply configured default values for fixable problems"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::Lint
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "lint issue", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;

        let report = self
            .rest_operation(ctx, issue_key, LintOptions::from_args(args))
            .await
            .map_err(fail)?;

        if report.is_clean() {
            ctx.output
                .print(format!("✅ {} passed all lint checks", issue_key));
            return Ok(true);
        }

        ctx.output
            .print(format!("⚠️ Lint issues found in {}:", issue_key));
        for problem in &report.problems {
            ctx.output.print(format!(" - {}", problem));
        }

        if args.flag("fix") {
            let summary = apply_fixes(ctx, issue_key, &report.problems).await;
            return Ok(summary.unfixed == 0);
        }
        Ok(false)
    }
}

/// JQL for `lint-all` from its filter arguments.
pub fn build_jql(args: &PluginArgs) -> String {
    let mut clauses = Vec::new();
    if let Some(project) = args.get_str("project") {
        clauses.push(format!("project = {}", project));
    }
    for (name, field) in [
        ("component", "component"),
        ("reporter", "reporter"),
        ("assignee", "assignee"),
    ] {
        if let Some(value) = args.get_str(name) {
            clauses.push(format!("{} = '{}'", field, value));
        }
    }

    if clauses.is_empty() {
        DEFAULT_LINT_JQL.to_string()
    } else {
        clauses.join(" AND ")
    }
}

const STRUCTURAL_COLUMNS: [Check; 6] = [
    Check::Progress,
    Check::Epic,
    Check::Sprint,
    Check::Priority,
    Check::StoryPoints,
    Check::Blocked,
];

fn status_cell(report: &ValidationReport, check: Check) -> &'static str {
    match report.checks.iter().find(|(c, _)| *c == check) {
        Some((_, true)) => "✅",
        Some((_, false)) => "❌",
        None => "❎",
    }
}

/// Lints every issue matching a JQL filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LintAll;

impl LintAll {
    /// Keys of the issues matching `jql`.
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        jql: &str,
    ) -> Result<Vec<String>, OpError> {
        let response = client
            .request(
                ApiRequest::get("/rest/api/2/search")
                    .param("jql", jql)
                    .param("maxResults", LINT_ALL_MAX_RESULTS)
                    .param("fields", "summary"),
            )
            .await?;

        Ok(response
            .get("issues")
            .and_then(Value::as_array)
            .map(|issues| {
                issues
                    .iter()
                    .filter_map(|i| i.get("key").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl CommandPlugin for LintAll {
    fn command_name(&self) -> String {
        "lint-all".to_string()
    }

    fn help_text(&self) -> String {
        "Lint multiple Jira issues for quality and completeness".to_string()
    }

    fn category(&self) -> Category {
        Category::QualityValidation
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "lint-all".to_string(),
            "lint-all --project AAP --component 'API Gateway'".to_string(),
            "lint-all --assignee jdoe --no-ai".to_string(),
        ]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::option("project", "Filter by project key"),
            ArgSpec::option("component", "Filter by component"),
            ArgSpec::option("reporter", "Filter by reporter username"),
            ArgSpec::option("assignee", "Filter by assignee username"),
            ArgSpec::flag("no_ai", "Skip AI-powered quality checks"),
            ArgSpec::flag("no_cache", "Skip cache and force fresh validation"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::LintAll
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "lint issues", e);
        let options = LintOptions::from_args(args);

        let keys = self
            .rest_operation(ctx.client, &build_jql(args))
            .await
            .map_err(fail)?;

        if keys.is_empty() {
            ctx.output.print("✅ No issues found to lint.");
            return Ok(true);
        }

        let mut columns = STRUCTURAL_COLUMNS.to_vec();
        if !options.no_ai {
            columns.extend(ContentField::ALL.map(Check::Content));
        }

        let mut session = LintSession::open(ctx, options).map_err(fail)?;
        let mut failed = Vec::new();
        let mut rows = Vec::new();

        for key in &keys {
            let (snapshot, report) = session
                .lint(ctx.client, ctx.config, key)
                .await
                .map_err(fail)?;
            let summary = snapshot.summary.unwrap_or_default();

            if report.is_clean() {
                ctx.output.print(format!("✅ {} {} passed", key, summary));
            } else {
                ctx.output
                    .print(format!("❌ {} {} failed lint checks", key, summary));
            }

            let mut row = vec![key.clone()];
            row.extend(
                columns
                    .iter()
                    .map(|check| status_cell(&report, *check).to_string()),
            );
            rows.push(row);

            if !report.is_clean() {
                failed.push((key.clone(), summary, report.problems));
            }
        }

        if failed.is_empty() {
            ctx.output.print("🎉 All issues passed lint checks!");
        } else {
            ctx.output.print("⚠️ Issues with lint problems:");
            for (key, summary, problems) in &failed {
                ctx.output.print(format!("🔍 {} - {}", key, summary));
                for problem in problems {
                    ctx.output.print(format!(" - {}", problem));
                }
            }
        }

        ctx.output.print("📊 Lint Status Summary:");
        let mut headers = vec!["jira_issue_id"];
        headers.extend(columns.iter().map(Check::label));
        for line in format_table(&headers, &rows) {
            ctx.output.print(line);
        }

        Ok(failed.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedReviewer;
    use crate::core::config::FileConfig;
    use crate::jira::{Method, MockJira};
    use crate::plugins::PluginRegistry;
    use crate::ui::output::Output;
    use serde_json::json;

    fn config(extra: &'static [(&'static str, &'static str)]) -> Config {
        Config::from_sources(FileConfig::default(), move |name| {
            let base = [
                ("JIRA_EPIC_FIELD", "epic"),
                ("JIRA_SPRINT_FIELD", "sprint"),
                ("JIRA_STORY_POINTS_FIELD", "points"),
                ("JIRA_BLOCKED_FIELD", "blocked"),
                ("JIRA_BLOCKED_REASON_FIELD", "reason"),
                ("JIRA_ACCEPTANCE_CRITERIA_FIELD", "ac"),
            ];
            base.iter()
                .chain(extra.iter())
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    fn issue(key: &str, priority: Option<&str>) -> Value {
        json!({
            "key": key,
            "fields": {
                "issuetype": {"name": "Story"},
                "status": {"name": "New"},
                "summary": format!("Summary of {}", key),
                "priority": priority.map(|p| json!({"name": p})),
            }
        })
    }

    #[test]
    fn jql_from_filters() {
        assert_eq!(build_jql(&PluginArgs::new()), DEFAULT_LINT_JQL);

        let args = PluginArgs::new()
            .with_str("project", "AAP")
            .with_str("component", "API Gateway")
            .with_str("assignee", "jdoe");
        assert_eq!(
            build_jql(&args),
            "project = AAP AND component = 'API Gateway' AND assignee = 'jdoe'"
        );
    }

    #[tokio::test]
    async fn lint_reports_problems() {
        let jira = MockJira::new().respond(
            Method::Get,
            "/rest/api/2/issue/AAP-1",
            issue("AAP-1", None),
        );
        let config = config(&[]);
        let output = Output::capturing();
        let ctx = PluginContext::new(&jira, &config, &output);

        let args = PluginArgs::new()
            .with_str("issue_key", "AAP-1")
            .with_flag("no_ai", true);
        assert!(!Lint.execute(&ctx, &args).await.unwrap());
        assert_eq!(
            output.lines(),
            vec!["⚠️ Lint issues found in AAP-1:", " - Priority not set"]
        );
    }

    #[tokio::test]
    async fn lint_fix_applies_default_priority() {
        let jira = MockJira::new().respond(
            Method::Get,
            "/rest/api/2/issue/AAP-1",
            issue("AAP-1", None),
        );
        let config = config(&[("PRIORITY", "Major")]);
        let output = Output::capturing();
        let registry = PluginRegistry::with_builtins().unwrap();
        let ctx = PluginContext::new(&jira, &config, &output).with_registry(&registry);

        let args = PluginArgs::new()
            .with_str("issue_key", "AAP-1")
            .with_flag("no_ai", true)
            .with_flag("fix", true);
        assert!(Lint.execute(&ctx, &args).await.unwrap());

        let puts = jira.requests_to(Method::Put, "/rest/api/2/issue/AAP-1");
        assert_eq!(puts.len(), 1);
        assert_eq!(
            puts[0].body,
            Some(json!({"fields": {"priority": {"name": "Major"}}}))
        );
        assert!(output.text().contains("🔧 Fixed: Priority not set"));
    }

    #[tokio::test]
    async fn lint_fix_without_default_leaves_problem() {
        let jira = MockJira::new().respond(
            Method::Get,
            "/rest/api/2/issue/AAP-1",
            issue("AAP-1", None),
        );
        let config = config(&[]);
        let output = Output::capturing();
        let registry = PluginRegistry::with_builtins().unwrap();
        let ctx = PluginContext::new(&jira, &config, &output).with_registry(&registry);

        let summary = apply_fixes(&ctx, "AAP-1", &["Priority not set".to_string()]).await;
        assert_eq!(summary, FixSummary { fixed: 0, unfixed: 1 });
        assert!(jira.requests_to(Method::Put, "/rest/api/2/issue/AAP-1").is_empty());
    }

    #[tokio::test]
    async fn lint_all_summarizes_and_tabulates() {
        let jira = MockJira::new()
            .respond(
                Method::Get,
                "/rest/api/2/search",
                json!({"issues": [{"key": "AAP-1"}, {"key": "AAP-2"}]}),
            )
            .respond(Method::Get, "/rest/api/2/issue/AAP-1", issue("AAP-1", Some("Major")))
            .respond(Method::Get, "/rest/api/2/issue/AAP-2", issue("AAP-2", None));
        let config = config(&[]);
        let output = Output::capturing();
        let dir = tempfile::tempdir().unwrap();
        let reviewer = Arc::new(ScriptedReviewer::new("OK"));
        let ctx = PluginContext::new(&jira, &config, &output)
            .with_reviewer(reviewer.clone())
            .with_cache_path(dir.path().join("cache.json"));

        let args = PluginArgs::new().with_str("project", "AAP");
        assert!(!LintAll.execute(&ctx, &args).await.unwrap());

        let search = jira.requests_to(Method::Get, "/rest/api/2/search");
        assert_eq!(search[0].param_value("jql"), Some("project = AAP"));
        assert_eq!(reviewer.call_count(), 2);

        let lines = output.lines();
        assert!(lines.contains(&"✅ AAP-1 Summary of AAP-1 passed".to_string()));
        assert!(lines.contains(&"❌ AAP-2 Summary of AAP-2 failed lint checks".to_string()));
        assert!(lines.contains(&"🔍 AAP-2 - Summary of AAP-2".to_string()));
        assert!(lines.contains(&" - Priority not set".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("jira_issue_id | Progress")));
        assert!(lines.iter().any(|l| l.starts_with("AAP-2") && l.contains("❌")));
        assert!(dir.path().join("cache.json").exists());
    }

    #[tokio::test]
    async fn lint_all_with_no_matches() {
        let jira = MockJira::new();
        let config = config(&[]);
        let output = Output::capturing();
        let ctx = PluginContext::new(&jira, &config, &output);

        assert!(LintAll.execute(&ctx, &PluginArgs::new()).await.unwrap());
        assert_eq!(output.lines(), vec!["✅ No issues found to lint."]);
    }
}
