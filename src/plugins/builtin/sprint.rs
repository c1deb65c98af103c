//! plugins::builtin::sprint
//!
//! Sprint membership and listing.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::config::Config;
use crate::jira::{ApiRequest, JiraApi};
use crate::plugins::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, OpError, PluginArgs, PluginContext,
    PluginError,
};

const PAGE_SIZE: u32 = 50;

fn board_sprints_path(board_id: &str) -> String {
    format!("/rest/agile/1.0/board/{}/sprint", board_id)
}

/// All sprints of a board, following pagination.
pub async fn board_sprints(client: &dyn JiraApi, board_id: &str) -> Result<Vec<Value>, OpError> {
    let path = board_sprints_path(board_id);
    let mut sprints = Vec::new();
    let mut start_at: u64 = 0;

    loop {
        let page = client
            .request(
                ApiRequest::get(path.as_str())
                    .param("startAt", start_at)
                    .param("maxResults", PAGE_SIZE),
            )
            .await?;

        let values = page
            .get("values")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let count = values.len() as u64;
        sprints.extend(values);

        let is_last = page.get("isLast").and_then(Value::as_bool).unwrap_or(true);
        if is_last || count == 0 {
            break;
        }
        start_at += count;
    }

    Ok(sprints)
}

fn sprint_name(sprint: &Value) -> Option<&str> {
    sprint.get("name").and_then(Value::as_str)
}

/// Sprint id as text; Jira returns numbers but strings are tolerated.
fn sprint_id(sprint: &Value) -> Option<String> {
    match sprint.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Adds an issue to a sprint looked up by name on the configured board.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddSprint;

impl AddSprint {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        config: &Config,
        issue_key: &str,
        sprint_name_arg: &str,
    ) -> Result<Value, OpError> {
        let board_id = config.board_id()?;
        let sprints = board_sprints(client, board_id).await?;

        let id = sprints
            .iter()
            .find(|s| sprint_name(s) == Some(sprint_name_arg))
            .and_then(sprint_id)
            .ok_or_else(|| {
                OpError::Domain(format!("Could not find sprint named '{}'", sprint_name_arg))
            })?;

        Ok(client
            .post(
                &format!("/rest/agile/1.0/sprint/{}/issue", id),
                json!({ "issues": [issue_key] }),
            )
            .await?)
    }
}

#[async_trait]
impl CommandPlugin for AddSprint {
    fn command_name(&self) -> String {
        "add-sprint".to_string()
    }

    fn help_text(&self) -> String {
        "Add an issue to a sprint by name".to_string()
    }

    fn category(&self) -> Category {
        Category::SprintManagement
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["add-sprint AAP-12345 'Sprint 42'".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::issue_key(),
            ArgSpec::positional("sprint_name", "The name of the sprint"),
        ]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::AddSprint
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let run = async {
            let issue_key = args.require_str("issue_key")?;
            let name = args.require_str("sprint_name")?;
            self.rest_operation(ctx.client, ctx.config, issue_key, name)
                .await?;
            Ok::<_, OpError>(format!("✅ Added {} to sprint '{}'", issue_key, name))
        };

        match run.await {
            Ok(message) => {
                ctx.output.print(message);
                Ok(true)
            }
            Err(e) => Err(failure(ctx.output, self.error_kind(), "add sprint", e)),
        }
    }
}

/// Moves an issue back to the backlog.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveSprint;

impl RemoveSprint {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        issue_key: &str,
    ) -> Result<Value, OpError> {
        Ok(client
            .post("/rest/agile/1.0/backlog/issue", json!({ "issues": [issue_key] }))
            .await?)
    }
}

#[async_trait]
impl CommandPlugin for RemoveSprint {
    fn command_name(&self) -> String {
        "remove-sprint".to_string()
    }

    fn help_text(&self) -> String {
        "Remove an issue from its current sprint".to_string()
    }

    fn category(&self) -> Category {
        Category::SprintManagement
    }

    fn example_commands(&self) -> Vec<String> {
        vec!["remove-sprint AAP-12345".to_string()]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::issue_key()]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::RemoveFromSprint
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "remove from sprint", e);
        let issue_key = args.require_str("issue_key").map_err(fail)?;
        self.rest_operation(ctx.client, issue_key)
            .await
            .map_err(fail)?;
        ctx.output.print(format!("✅ Moved {} to backlog", issue_key));
        Ok(true)
    }
}

/// Lists the board's sprints that are not closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSprints;

impl ListSprints {
    /// Names of open and future sprints, in board order.
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        board_id: &str,
    ) -> Result<Vec<String>, OpError> {
        let sprints = board_sprints(client, board_id).await?;
        Ok(sprints
            .iter()
            .filter(|s| s.get("state").and_then(Value::as_str) != Some("closed"))
            .filter_map(sprint_name)
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl CommandPlugin for ListSprints {
    fn command_name(&self) -> String {
        "list-sprints".to_string()
    }

    fn help_text(&self) -> String {
        "List the open sprints of a board".to_string()
    }

    fn category(&self) -> Category {
        Category::SprintManagement
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "list-sprints".to_string(),
            "list-sprints --board-id 12345".to_string(),
        ]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::option(
            "board_id",
            "Board to list (defaults to JIRA_BOARD_ID)",
        )]
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::ListSprints
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "retrieve sprints", e);

        let board_id = match args.get_str("board_id") {
            Some(id) => id,
            None => ctx.config.board_id().map_err(|e| fail(OpError::from(e)))?,
        };
        let names = self
            .rest_operation(ctx.client, board_id)
            .await
            .map_err(fail)?;

        for name in &names {
            ctx.output.print(format!("    - {}", name));
        }
        ctx.output.print("✅ Successfully retrieved sprints");
        Ok(true)
    }
}
