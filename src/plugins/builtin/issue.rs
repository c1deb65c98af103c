//! plugins::builtin::issue
//!
//! Issue type changes and planning poker votes.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::jira::{issue_path, JiraApi};
use crate::plugins::setter::capitalize;
use crate::plugins::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, OpError, PluginArgs, PluginContext,
    PluginError,
};

const VOTE_PATH: &str = "/rest/eausm/latest/planningPoker/vote";

/// Casts a planning poker vote.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoteStoryPoints;

impl VoteStoryPoints {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
        points: i64,
    ) -> Result<Value, OpError> {
        let issue = client.get(&issue_path(issue_key)).await?;
        let issue_id = issue
            .get("id")
            .cloned()
            .filter(|id| !id.is_null())
            .ok_or_else(|| OpError::Domain(format!("issue {} has no id", issue_key)))?;

        Ok(client
            .put(VOTE_PATH, json!({ "issueId": issue_id, "vote": points }))
            .await?)
    }
}

#[async_trait]
impl CommandPlugin for VoteStoryPoints {
    fn command_name(&self) -> String {
        "vote-story-points".to_string()
    }

    fn help_text(&self) -> String {
        "Vote on story points".to_string()
    }

    fn category(&self) -> Category {
        Category::QualityValidation
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["vote-story-points AAP-12345 3".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::positional("issue_key", "The Jira issue id/key"),
            ArgSpec::positional("points", "Number of story points to vote").integer(),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::VoteStoryPoints
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "vote story points", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        let points = args.require_int("points").map_err(fail)?;
        self.rest_operation(ctx.client, issue_key, points)
            .await
            .map_err(fail)?;
        ctx.output.print(format!(
            "✅ Voted {} story points on issue {}",
            points, issue_key
        ));
        Ok(true)
    }
}

/// Changes the issue type; sub-tasks are detached from their parent first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeType;

impl ChangeType {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
        new_type: &str,
    ) -> Result<Value, OpError> {
        let path = issue_path(issue_key);
        let issue = client.get(&path).await?;
        let is_subtask = issue
            .pointer("/fields/issuetype/subtask")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut payload = json!({ "fields": { "issuetype": { "name": capitalize(new_type) } } });
        if is_subtask {
            payload["update"] = json!({ "parent": [{ "remove": {} }] });
        }

        Ok(client.put(&path, payload).await?)
    }
}

#[async_trait]
impl CommandPlugin for ChangeType {
    fn command_name(&self) -> String {
        "change-type".to_string()
    }

    fn help_text(&self) -> String {
        "Change the type of a Jira issue".to_string()
    }

    fn category(&self) -> Category {
        Category::IssueModification
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["change-type AAP-12345 story".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::issue_key(),
            ArgSpec::positional("new_type", "The new issue type (e.g., story, bug, task)"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::ChangeIssueType
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "change issue type", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        let new_type = args.require_str("new_type").map_err(fail)?;
        self.rest_operation(ctx.client, issue_key, new_type)
            .await
            .map_err(fail)?;
        ctx.output.print(format!(
            "✅ Changed {} to '{}'",
            issue_key,
            capitalize(new_type)
        ));
        Ok(true)
    }
}
