//! plugins::builtin::flags
//!
//! Board flags and the blocked field.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::core::config::Config;
use crate::jira::{issue_path, JiraApi};
use crate::plugins::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, OpError, PluginArgs, PluginContext,
    PluginError,
};

const FLAG_PATH: &str = "/rest/greenhopper/1.0/xboard/issue/flag/flag.json";

async fn set_flag(client: &dyn JiraApi, issue_key: &str, flagged: bool) -> Result<Value, OpError> {
    Ok(client
        .post(FLAG_PATH, json!({ "issueKeys": [issue_key], "flag": flagged }))
        .await?)
}

/// `{"fields": {<blocked>: {"value": ...}, <reason>: ...}}`
fn blocked_payload(config: &Config, blocked: bool, reason: &str) -> Result<Value, OpError> {
    let mut fields = Map::new();
    fields.insert(
        config.blocked_field()?.to_string(),
        json!({ "value": if blocked { "True" } else { "False" } }),
    );
    fields.insert(config.blocked_reason_field()?.to_string(), json!(reason));
    Ok(json!({ "fields": fields }))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AddFlag;

impl AddFlag {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
    ) -> Result<Value, OpError> {
        set_flag(client, issue_key, true).await
    }
}

#[async_trait]
impl CommandPlugin for AddFlag {
    fn command_name(&self) -> String {
        "add-flag".to_string()
    }

    fn help_text(&self) -> String {
        "Add a flag to a Jira issue".to_string()
    }

    fn category(&self) -> Category {
        Category::Blocking
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["add-flag AAP-12345".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::issue_key()]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::AddFlag
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "add flag", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        self.rest_operation(ctx.client, issue_key)
            .await
            .map_err(fail)?;
        ctx.output.print(format!("✅ Flag added to {}", issue_key));
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveFlag;

impl RemoveFlag {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
    ) -> Result<Value, OpError> {
        set_flag(client, issue_key, false).await
    }
}

#[async_trait]
impl CommandPlugin for RemoveFlag {
    fn command_name(&self) -> String {
        "remove-flag".to_string()
    }

    fn help_text(&self) -> String {
        "Remove the flag from a Jira issue".to_string()
    }

    fn category(&self) -> Category {
        Category::Blocking
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["remove-flag AAP-12345".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::issue_key()]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::RemoveFlag
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "remove flag", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        self.rest_operation(ctx.client, issue_key)
            .await
            .map_err(fail)?;
        ctx.output.print(format!("✅ Flag removed from {}", issue_key));
        Ok(true)
    }
}

/// Marks an issue blocked with a reason.
#[derive(Debug, Clone, Copy, Default)]
pub struct Block;

impl Block {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        reason: &str,
    ) -> Result<Value, OpError> {
        let payload = blocked_payload(config, true, reason)?;
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }
}

#[async_trait]
impl CommandPlugin for Block {
    fn command_name(&self) -> String {
        "block".to_string()
    }

    fn help_text(&self) -> String {
        "Mark a Jira issue as blocked".to_string()
    }

    fn category(&self) -> Category {
        Category::Blocking
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["block AAP-12345 'Waiting on API credentials'".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::issue_key(),
            ArgSpec::positional("reason", "Why the issue is blocked"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::Block
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "block issue", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        let reason = args.require_str("reason").map_err(fail)?;
        self.rest_operation(ctx.client, ctx.config, issue_key, reason)
            .await
            .map_err(fail)?;
        ctx.output
            .print(format!("✅ {} marked as blocked: {}", issue_key, reason));
        Ok(true)
    }
}

/// Clears the blocked field and its reason.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unblock;

impl Unblock {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
    ) -> Result<Value, OpError> {
        let payload = blocked_payload(config, false, "")?;
        Ok(client.put(&issue_path(issue_key), payload).await?)
    }
}

#[async_trait]
impl CommandPlugin for Unblock {
    fn command_name(&self) -> String {
        "unblock".to_string()
    }

    fn help_text(&self) -> String {
        "Mark a Jira issue as unblocked".to_string()
    }

    fn category(&self) -> Category {
        Category::Blocking
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["unblock AAP-12345".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::issue_key()]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::Unblock
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "unblock issue", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        self.rest_operation(ctx.client, ctx.config, issue_key)
            .await
            .map_err(fail)?;
        ctx.output
            .print(format!("✅ {} marked as unblocked", issue_key));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FileConfig;
    use crate::jira::{Method, MockJira};
    use crate::ui::output::Output;

    fn config() -> Config {
        Config::from_sources(FileConfig::default(), |name| match name {
            "JIRA_BLOCKED_FIELD" => Some("customfield_blocked".into()),
            "JIRA_BLOCKED_REASON_FIELD" => Some("customfield_reason".into()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn block_and_unblock_payloads() {
        let jira = MockJira::new();
        let config = config();
        Block
            .rest_operation(&jira, &config, "AAP-1", "waiting")
            .await
            .unwrap();
        Unblock.rest_operation(&jira, &config, "AAP-1").await.unwrap();

        let puts = jira.requests_to(Method::Put, "/rest/api/2/issue/AAP-1");
        assert_eq!(
            puts[0].body,
            Some(json!({"fields": {
                "customfield_blocked": {"value": "True"},
                "customfield_reason": "waiting"
            }}))
        );
        assert_eq!(
            puts[1].body,
            Some(json!({"fields": {
                "customfield_blocked": {"value": "False"},
                "customfield_reason": ""
            }}))
        );
    }

    #[tokio::test]
    async fn block_without_field_mapping_fails_before_request() {
        let jira = MockJira::new();
        let config = Config::from_sources(FileConfig::default(), |_| None).unwrap();
        let output = Output::capturing();
        let ctx = PluginContext::new(&jira, &config, &output);

        let args = PluginArgs::new()
            .with_str("issue_key", "AAP-1")
            .with_str("reason", "x");
        let err = Block.execute(&ctx, &args).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Block);
        assert!(output.text().contains("JIRA_BLOCKED_FIELD"));
        assert!(jira.requests().is_empty());
    }

    #[tokio::test]
    async fn flags_toggle() {
        let jira = MockJira::new();
        AddFlag.rest_operation(&jira, "AAP-2").await.unwrap();
        RemoveFlag.rest_operation(&jira, "AAP-2").await.unwrap();

        let posts = jira.requests_to(Method::Post, FLAG_PATH);
        assert_eq!(posts[0].body, Some(json!({"issueKeys": ["AAP-2"], "flag": true})));
        assert_eq!(posts[1].body, Some(json!({"issueKeys": ["AAP-2"], "flag": false})));
    }
}
