//! Integration tests for the field setter plugins.
//!
//! Each setter is looked up by command name in the built-in registry and run
//! against `MockJira`, so these exercise the same path as `rh-issue <cmd>`.

mod common;

use jira_creator::jira::mock::{FailOn, MockJira};
use jira_creator::jira::{ApiError, Method};
use jira_creator::plugins::{ErrorKind, PluginArgs, PluginContext, PluginRegistry};
use jira_creator::ui::output::Output;
use serde_json::{json, Value};

use common::*;

const ISSUE_PATH: &str = "/rest/api/2/issue/AAP-7";

struct Case {
    command: &'static str,
    args: PluginArgs,
    body: Value,
    message: &'static str,
}

fn key() -> PluginArgs {
    PluginArgs::new().with_str("issue_key", "AAP-7")
}

fn cases() -> Vec<Case> {
    vec![
        Case {
            command: "set-priority",
            args: key().with_str("priority", "major"),
            body: json!({"fields": {"priority": {"name": "Major"}}}),
            message: "✅ Priority for AAP-7 set to 'Major'",
        },
        Case {
            command: "set-story-points",
            args: key().with_int("points", 8),
            body: json!({"fields": {STORY_POINTS_FIELD: 8}}),
            message: "✅ Story points for AAP-7 set to '8'",
        },
        Case {
            command: "set-component",
            args: key().with_str("component", "API Gateway"),
            body: json!({"fields": {"components": [{"name": "API Gateway"}]}}),
            message: "✅ Component for AAP-7 set to 'API Gateway'",
        },
        Case {
            command: "set-project",
            args: key().with_str("project", "NEWPROJ"),
            body: json!({"fields": {"project": {"key": "NEWPROJ"}}}),
            message: "✅ Project for AAP-7 set to 'NEWPROJ'",
        },
        Case {
            command: "set-summary",
            args: key().with_str("summary", "Updated issue summary"),
            body: json!({"fields": {"summary": "Updated issue summary"}}),
            message: "✅ Summary for AAP-7 set to 'Updated issue summary'",
        },
        Case {
            command: "set-workstream",
            args: key().with_str("workstream_id", "4821"),
            body: json!({"fields": {WORKSTREAM_FIELD: [{"id": "4821"}]}}),
            message: "✅ Workstream set to ID '4821'",
        },
        Case {
            command: "set-story-epic",
            args: key().with_str("epic_key", "AAP-100"),
            body: json!({"fields": {EPIC_FIELD: "AAP-100"}}),
            message: "✅ Epic for AAP-7 set to 'AAP-100'",
        },
        Case {
            command: "set-acceptance-criteria",
            args: key().with_str("acceptance_criteria", "  Retries are logged  "),
            body: json!({"fields": {ACCEPTANCE_CRITERIA_FIELD: "Retries are logged"}}),
            message: "✅ Acceptance criteria set for AAP-7",
        },
    ]
}

#[tokio::test]
async fn every_setter_writes_once_with_its_payload() {
    let registry = PluginRegistry::with_builtins().unwrap();
    let config = config();

    for case in cases() {
        let mock = MockJira::new();
        let output = Output::capturing();
        let ctx = PluginContext::new(&mock, &config, &output);
        let plugin = registry.get_plugin(case.command).unwrap();

        let ok = plugin.execute(&ctx, &case.args).await.unwrap();

        assert!(ok, "{}", case.command);
        let requests = mock.requests();
        assert_eq!(requests.len(), 1, "{}", case.command);
        assert_eq!(requests[0].method, Method::Put, "{}", case.command);
        assert_eq!(requests[0].path, ISSUE_PATH, "{}", case.command);
        assert_eq!(requests[0].body.as_ref(), Some(&case.body), "{}", case.command);
        assert_eq!(output.lines(), vec![case.message], "{}", case.command);
    }
}

mod priority {
    use super::*;

    async fn run(value: &str) -> Option<Value> {
        let registry = PluginRegistry::with_builtins().unwrap();
        let mock = MockJira::new();
        let config = config();
        let output = Output::capturing();
        let ctx = PluginContext::new(&mock, &config, &output);

        registry
            .get_plugin("set-priority")
            .unwrap()
            .execute(&ctx, &key().with_str("priority", value))
            .await
            .unwrap();
        mock.last_request().and_then(|r| r.body)
    }

    #[tokio::test]
    async fn known_name_is_capitalized() {
        assert_eq!(
            run("critical").await,
            Some(json!({"fields": {"priority": {"name": "Critical"}}}))
        );
    }

    #[tokio::test]
    async fn unknown_name_falls_back_to_normal() {
        assert_eq!(
            run("bogus").await,
            Some(json!({"fields": {"priority": {"name": "Normal"}}}))
        );
    }
}

mod status {
    use super::*;

    const TRANSITIONS: &str = "/rest/api/2/issue/AAP-7/transitions";

    #[tokio::test]
    async fn transition_is_matched_by_name() {
        let registry = PluginRegistry::with_builtins().unwrap();
        let mock = MockJira::new().respond(
            Method::Get,
            TRANSITIONS,
            json!({"transitions": [
                {"id": "11", "name": "To Do"},
                {"id": "31", "name": "In Progress"},
            ]}),
        );
        let config = config();
        let output = Output::capturing();
        let ctx = PluginContext::new(&mock, &config, &output);

        let ok = registry
            .get_plugin("set-status")
            .unwrap()
            .execute(&ctx, &key().with_str("status", "in progress"))
            .await
            .unwrap();

        assert!(ok);
        let posts = mock.requests_to(Method::Post, TRANSITIONS);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].body, Some(json!({"transition": {"id": "31"}})));
        assert_eq!(
            output.lines(),
            vec!["✅ Changed status of AAP-7 to 'in progress'"]
        );
    }

    #[tokio::test]
    async fn missing_transition_lists_available() {
        let registry = PluginRegistry::with_builtins().unwrap();
        let mock = MockJira::new().respond(
            Method::Get,
            TRANSITIONS,
            json!({"transitions": [{"id": "11", "name": "To Do"}]}),
        );
        let config = config();
        let output = Output::capturing();
        let ctx = PluginContext::new(&mock, &config, &output);

        let err = registry
            .get_plugin("set-status")
            .unwrap()
            .execute(&ctx, &key().with_str("status", "Done"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::SetStatus);
        assert!(err
            .to_string()
            .contains("Transition to status 'Done' not found. Available transitions: To Do"));
        assert!(mock.requests_to(Method::Post, TRANSITIONS).is_empty());
    }
}

#[tokio::test]
async fn api_failure_reports_kind_and_message() {
    let registry = PluginRegistry::with_builtins().unwrap();
    let mock = MockJira::new().fail_on(FailOn::Any(ApiError::Api {
        status: 400,
        message: "priority: bad value".into(),
    }));
    let config = config();
    let output = Output::capturing();
    let ctx = PluginContext::new(&mock, &config, &output);

    let err = registry
        .get_plugin("set-priority")
        .unwrap()
        .execute(&ctx, &key().with_str("priority", "High"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::SetPriority);
    assert_eq!(
        err.to_string(),
        "SetPriorityError: JIRA API error (400): priority: bad value"
    );
    assert_eq!(
        output.lines(),
        vec!["❌ Failed to set priority: JIRA API error (400): priority: bad value"]
    );
}

#[tokio::test]
async fn missing_field_mapping_is_a_config_error() {
    let registry = PluginRegistry::with_builtins().unwrap();
    let mock = MockJira::new();
    let config = jira_creator::core::config::Config::from_sources(
        jira_creator::core::config::FileConfig::default(),
        |_| None,
    )
    .unwrap();
    let output = Output::capturing();
    let ctx = PluginContext::new(&mock, &config, &output);

    let err = registry
        .get_plugin("set-story-points")
        .unwrap()
        .execute(&ctx, &key().with_int("points", 3))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::SetStoryPoints);
    assert!(err.to_string().contains("JIRA_STORY_POINTS_FIELD"));
    assert!(mock.requests().is_empty());
}
