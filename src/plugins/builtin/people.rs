//! plugins::builtin::people
//!
//! Assignment and comments.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::jira::{issue_path, JiraApi};
use crate::plugins::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, OpError, PluginArgs, PluginContext,
    PluginError,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Assign;

impl Assign {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
        assignee: &str,
    ) -> Result<Value, OpError> {
        Ok(client
            .put(
                &issue_path(issue_key),
                json!({ "fields": { "assignee": { "name": assignee } } }),
            )
            .await?)
    }
}

#[async_trait]
impl CommandPlugin for Assign {
    fn command_name(&self) -> String {
        "assign".to_string()
    }

    fn help_text(&self) -> String {
        "Assign a Jira issue to a user".to_string()
    }

    fn category(&self) -> Category {
        Category::IssueModification
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["assign AAP-12345 jdoe".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::issue_key(),
            ArgSpec::positional("assignee", "Username of the new assignee"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::AssignIssue
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "assign issue", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        let assignee = args.require_str("assignee").map_err(fail)?;
        self.rest_operation(ctx.client, issue_key, assignee)
            .await
            .map_err(fail)?;
        ctx.output
            .print(format!("✅ Assigned {} to {}", issue_key, assignee));
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Unassign;

impl Unassign {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
    ) -> Result<Value, OpError> {
        Ok(client
            .put(
                &issue_path(issue_key),
                json!({ "fields": { "assignee": null } }),
            )
            .await?)
    }
}

#[async_trait]
impl CommandPlugin for Unassign {
    fn command_name(&self) -> String {
        "unassign".to_string()
    }

    fn help_text(&self) -> String {
        "Remove the assignee from a Jira issue".to_string()
    }

    fn category(&self) -> Category {
        Category::IssueModification
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["unassign AAP-12345".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::issue_key()]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::UnassignIssue
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "unassign issue", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        self.rest_operation(ctx.client, issue_key)
            .await
            .map_err(fail)?;
        ctx.output.print(format!("✅ Unassigned {}", issue_key));
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AddComment;

impl AddComment {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
        comment: &str,
    ) -> Result<Value, OpError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(OpError::Domain("comment text is empty".into()));
        }
        Ok(client
            .post(
                &format!("{}/comment", issue_path(issue_key)),
                json!({ "body": comment }),
            )
            .await?)
    }
}

#[async_trait]
impl CommandPlugin for AddComment {
    fn command_name(&self) -> String {
        "add-comment".to_string()
    }

    fn help_text(&self) -> String {
        "Add a comment to a Jira issue".to_string()
    }

    fn category(&self) -> Category {
        Category::IssueModification
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["add-comment AAP-12345 'Deployed to staging'".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::issue_key(),
            ArgSpec::positional("text", "The comment text"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::AddComment
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "add comment", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        let text = args.require_str("text").map_err(fail)?;
        self.rest_operation(ctx.client, issue_key, text)
            .await
            .map_err(fail)?;
        ctx.output.print(format!("✅ Comment added to {}", issue_key));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, FileConfig};
    use crate::jira::{Method, MockJira};
    use crate::ui::output::Output;

    #[tokio::test]
    async fn assign_and_unassign() {
        let jira = MockJira::new();
        Assign.rest_operation(&jira, "AAP-1", "jdoe").await.unwrap();
        Unassign.rest_operation(&jira, "AAP-1").await.unwrap();

        let puts = jira.requests_to(Method::Put, "/rest/api/2/issue/AAP-1");
        assert_eq!(
            puts[0].body,
            Some(json!({"fields": {"assignee": {"name": "jdoe"}}}))
        );
        assert_eq!(puts[1].body, Some(json!({"fields": {"assignee": null}})));
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let jira = MockJira::new();
        let config = Config::from_sources(FileConfig::default(), |_| None).unwrap();
        let output = Output::capturing();
        let ctx = PluginContext::new(&jira, &config, &output);

        let args = PluginArgs::new()
            .with_str("issue_key", "AAP-1")
            .with_str("text", "   ");
        let err = AddComment.execute(&ctx, &args).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AddComment);
        assert_eq!(
            output.lines(),
            vec!["❌ Failed to add comment: comment text is empty"]
        );
        assert!(jira.requests().is_empty());
    }

    #[tokio::test]
    async fn comment_is_posted() {
        let jira = MockJira::new();
        AddComment
            .rest_operation(&jira, "AAP-1", " Shipped ")
            .await
            .unwrap();
        let req = jira.last_request().unwrap();
        assert_eq!(req.path, "/rest/api/2/issue/AAP-1/comment");
        assert_eq!(req.body, Some(json!({"body": "Shipped"})));
    }
}
