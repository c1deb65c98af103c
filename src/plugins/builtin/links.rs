//! plugins::builtin::links
//!
//! Issue links between two issues.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::jira::JiraApi;
use crate::plugins::{
    failure, ArgSpec, Category, CommandPlugin, ErrorKind, OpError, PluginArgs, PluginContext,
    PluginError,
};

/// Relationship created by `add-link`, one per command-line option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Blocks,
    BlockedBy,
    RelatesTo,
    Duplicates,
    Clones,
}

impl LinkKind {
    pub const ALL: [LinkKind; 5] = [
        LinkKind::Blocks,
        LinkKind::BlockedBy,
        LinkKind::RelatesTo,
        LinkKind::Duplicates,
        LinkKind::Clones,
    ];

    /// Argument carrying the target issue key.
    pub fn argument_name(&self) -> &'static str {
        match self {
            LinkKind::Blocks => "blocks",
            LinkKind::BlockedBy => "blocked_by",
            LinkKind::RelatesTo => "relates_to",
            LinkKind::Duplicates => "duplicates",
            LinkKind::Clones => "clones",
        }
    }

    /// Jira link type name.
    pub fn link_type(&self) -> &'static str {
        match self {
            LinkKind::Blocks | LinkKind::BlockedBy => "Blocks",
            LinkKind::RelatesTo => "Relates",
            LinkKind::Duplicates => "Duplicate",
            LinkKind::Clones => "Cloners",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            LinkKind::Blocks => "Target issue that this issue blocks",
            LinkKind::BlockedBy => "Target issue that blocks this issue",
            LinkKind::RelatesTo => "Target issue that relates to this issue",
            LinkKind::Duplicates => "Target issue that this issue duplicates",
            LinkKind::Clones => "Target issue that this issue clones",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            LinkKind::Blocks => "now blocks",
            LinkKind::BlockedBy => "is now blocked by",
            LinkKind::RelatesTo => "now relates to",
            LinkKind::Duplicates => "now duplicates",
            LinkKind::Clones => "now clones",
        }
    }

    /// Request body linking `source` to `target`.
    ///
    /// The source is the outward side, except for `BlockedBy` where the
    /// target blocks the source.
    pub fn payload(&self, source: &str, target: &str) -> Value {
        let (inward, outward) = match self {
            LinkKind::BlockedBy => (source, target),
            _ => (target, source),
        };
        json!({
            "type": { "name": self.link_type() },
            "inwardIssue": { "key": inward },
            "outwardIssue": { "key": outward },
        })
    }
}

/// The single link option given, with its target.
pub fn selected_link(args: &PluginArgs) -> Result<(LinkKind, &str), OpError> {
    let mut given = LinkKind::ALL
        .into_iter()
        .filter_map(|kind| args.get_str(kind.argument_name()).map(|t| (kind, t)));

    let Some(first) = given.next() else {
        return Err(OpError::Domain(
            "No link type specified; use one of --blocks, --blocked-by, --relates-to, \
             --duplicates, --clones"
                .into(),
        ));
    };
    if given.next().is_some() {
        return Err(OpError::Domain("Only one link type may be given".into()));
    }
    Ok(first)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AddLink;

impl AddLink {
    pub async fn rest_operation(
        &self,
        client: &dyn JiraApi,
        kind: LinkKind,
        source: &str,
        target: &str,
    ) -> Result<Value, OpError> {
        Ok(client
            .post("/rest/api/2/issueLink", kind.payload(source, target))
            .await?)
    }
}

#[async_trait]
impl CommandPlugin for AddLink {
    fn command_name(&self) -> String {
        "add-link".to_string()
    }

    fn help_text(&self) -> String {
        "Create an issue link between two Jira issues".to_string()
    }

    fn category(&self) -> Category {
        Category::IssueRelationships
    }

    fn example_commands(&self) -> Vec<String> {
        vec![
            "add-link AAP-12345 --blocks AAP-12346".to_string(),
            "add-link AAP-12345 --relates-to AAP-12347".to_string(),
        ]
    }

    fn arguments(&self) -> Vec<ArgSpec> {
        let mut args = vec![ArgSpec::positional(
            "issue_key",
            "The source issue key (e.g., PROJ-123)",
        )];
        args.extend(
            LinkKind::ALL
                .iter()
                .map(|kind| ArgSpec::option(kind.argument_name(), kind.help())),
        );
        args
    }

    fn error_kind(&self) -> ErrorKind {
        ErrorKind::AddLink
    }

    async fn execute(
        &self,
        ctx: &PluginContext<'_>,
        args: &PluginArgs,
    ) -> Result<bool, PluginError> {
        let fail = |e: OpError| failure(ctx.output, self.error_kind(), "create link", e);
        let source = args.require_str("issue_key").map_err(fail)?;
        let (kind, target) = selected_link(args).map_err(fail)?;

        self.rest_operation(ctx.client, kind, source, target)
            .await
            .map_err(fail)?;
        ctx.output
            .print(format!("✅ {} {} {}", source, kind.verb(), target));
        Ok(true)
    }
}
