//! Shared fixtures for integration tests.

#![allow(dead_code)]

use jira_creator::core::config::{Config, FileConfig};
use serde_json::{json, Value};

pub const EPIC_FIELD: &str = "customfield_12311140";
pub const SPRINT_FIELD: &str = "customfield_12310940";
pub const STORY_POINTS_FIELD: &str = "customfield_12310243";
pub const BLOCKED_FIELD: &str = "customfield_12316543";
pub const BLOCKED_REASON_FIELD: &str = "customfield_12316544";
pub const ACCEPTANCE_CRITERIA_FIELD: &str = "customfield_12315940";
pub const WORKSTREAM_FIELD: &str = "customfield_12319275";

/// Environment every test config starts from.
pub fn base_env() -> Vec<(&'static str, String)> {
    vec![
        ("JIRA_URL", "https://issues.example.com".to_string()),
        ("JPAT", "test-token".to_string()),
        ("PROJECT_KEY", "AAP".to_string()),
        ("JIRA_BOARD_ID", "21125".to_string()),
        ("JIRA_EPIC_FIELD", EPIC_FIELD.to_string()),
        ("JIRA_SPRINT_FIELD", SPRINT_FIELD.to_string()),
        ("JIRA_STORY_POINTS_FIELD", STORY_POINTS_FIELD.to_string()),
        ("JIRA_BLOCKED_FIELD", BLOCKED_FIELD.to_string()),
        ("JIRA_BLOCKED_REASON_FIELD", BLOCKED_REASON_FIELD.to_string()),
        (
            "JIRA_ACCEPTANCE_CRITERIA_FIELD",
            ACCEPTANCE_CRITERIA_FIELD.to_string(),
        ),
        ("JIRA_WORKSTREAM_FIELD", WORKSTREAM_FIELD.to_string()),
    ]
}

/// Config from [`base_env`] plus `extra`, with no config file.
pub fn config_with(extra: &[(&'static str, &str)]) -> Config {
    let mut env = base_env();
    env.extend(extra.iter().map(|(k, v)| (*k, v.to_string())));
    Config::from_sources(FileConfig::default(), move |name| {
        env.iter()
            .rev()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

pub fn config() -> Config {
    config_with(&[])
}

/// An issue as returned by `GET /rest/api/2/issue/{key}`.
pub fn issue(key: &str, fields: Value) -> Value {
    json!({ "key": key, "id": "10001", "fields": fields })
}
