//! Integration tests for issue validation and the verdict cache.
//!
//! Issues are built from REST-shaped JSON through the configured field map,
//! and the file-backed cache is reopened between runs the way separate
//! `rh-issue lint` processes would see it.

mod common;

use jira_creator::ai::ScriptedReviewer;
use jira_creator::validate::{
    content_hash, validate, Check, ContentField, IssueSnapshot, JsonFileCache, MemoryCache,
    VerdictStore,
};
use serde_json::{json, Value};
use tempfile::TempDir;

use common::*;

fn snapshot(fields: Value) -> IssueSnapshot {
    IssueSnapshot::from_issue(&issue("X-1", fields), &config()).unwrap()
}

fn valid_fields() -> Value {
    json!({
        "issuetype": {"name": "Story"},
        "status": {"name": "To Do"},
        "summary": "Add retry to the sync worker",
        "description": "Sync fails on transient 503s; retry with backoff.",
        "priority": {"name": "Normal"},
        "assignee": {"name": "jdoe", "displayName": "J Doe"},
        EPIC_FIELD: "X-100",
        STORY_POINTS_FIELD: 5,
        BLOCKED_FIELD: {"value": "False"},
    })
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn broken_in_progress_issue_reports_six_problems() {
        let issue = snapshot(json!({
            "issuetype": {"name": "Story"},
            "status": {"name": "In Progress"},
            "summary": "Bad",
            "description": "Meh",
            "priority": null,
            "assignee": null,
            EPIC_FIELD: "X-100",
            SPRINT_FIELD: ["Sprint 42"],
            STORY_POINTS_FIELD: null,
            BLOCKED_FIELD: {"value": "True"},
            BLOCKED_REASON_FIELD: "",
        }));
        let reviewer = ScriptedReviewer::new("OK")
            .with_verdict("Bad", "too short")
            .with_verdict("Meh", "too short");

        let report = validate(&issue, Some(&reviewer), &mut MemoryCache::new())
            .await
            .unwrap();

        assert_eq!(
            report.problems,
            vec![
                "Issue is In Progress but unassigned",
                "Priority not set",
                "Story points not assigned",
                "Issue is blocked but has no blocked reason",
                "Summary: too short",
                "Description: too short",
            ]
        );
    }

    #[tokio::test]
    async fn valid_issue_is_clean() {
        let reviewer = ScriptedReviewer::new("OK");
        let report = validate(
            &snapshot(valid_fields()),
            Some(&reviewer),
            &mut MemoryCache::new(),
        )
        .await
        .unwrap();

        assert!(report.is_clean(), "{:?}", report.problems);
        assert!(report
            .checks
            .iter()
            .all(|(_, passed)| *passed));
        assert_eq!(reviewer.call_count(), 2);
    }
}

mod cache {
    use super::*;

    fn open(dir: &TempDir) -> JsonFileCache {
        JsonFileCache::open(dir.path().join("ai-hashes.json")).unwrap()
    }

    #[tokio::test]
    async fn accepted_text_is_not_reviewed_again() {
        let dir = TempDir::new().unwrap();
        let reviewer = ScriptedReviewer::new("OK");
        let issue = snapshot(valid_fields());

        for _ in 0..3 {
            let mut cache = open(&dir);
            let report = validate(&issue, Some(&reviewer), &mut cache).await.unwrap();
            assert!(report.is_clean());
        }

        assert_eq!(reviewer.calls_for("Add retry to the sync worker"), 1);
        assert_eq!(reviewer.call_count(), 2);
    }

    #[tokio::test]
    async fn rejection_sticks_until_text_changes() {
        let dir = TempDir::new().unwrap();
        let reviewer = ScriptedReviewer::new("OK").with_verdict("Bad", "too vague");
        let mut fields = valid_fields();
        fields["summary"] = json!("Bad");
        let issue = snapshot(fields);

        for _ in 0..3 {
            let mut cache = open(&dir);
            let report = validate(&issue, Some(&reviewer), &mut cache).await.unwrap();
            assert_eq!(report.problems, vec!["Summary: too vague"]);
            assert!(report
                .checks
                .contains(&(Check::Content(ContentField::Summary), false)));
        }
        assert_eq!(reviewer.calls_for("Bad"), 1);
    }

    #[tokio::test]
    async fn changed_text_is_reviewed_once_more() {
        let dir = TempDir::new().unwrap();
        let reviewer = ScriptedReviewer::new("OK").with_verdict("Bad", "too vague");

        let mut fields = valid_fields();
        fields["summary"] = json!("Bad");
        let mut cache = open(&dir);
        validate(&snapshot(fields.clone()), Some(&reviewer), &mut cache)
            .await
            .unwrap();

        fields["summary"] = json!("Retry sync worker requests on 503");
        for _ in 0..2 {
            let mut cache = open(&dir);
            let report = validate(&snapshot(fields.clone()), Some(&reviewer), &mut cache)
                .await
                .unwrap();
            assert!(report.is_clean());
        }

        assert_eq!(reviewer.calls_for("Bad"), 1);
        assert_eq!(reviewer.calls_for("Retry sync worker requests on 503"), 1);
    }

    #[tokio::test]
    async fn entry_records_hash_and_verdict() {
        let dir = TempDir::new().unwrap();
        let reviewer = ScriptedReviewer::new("OK").with_verdict("Meh", "needs detail");
        let mut fields = valid_fields();
        fields["description"] = json!("Meh");

        let mut cache = open(&dir);
        validate(&snapshot(fields), Some(&reviewer), &mut cache)
            .await
            .unwrap();

        let entry = open(&dir).get("X-1").unwrap();
        assert_eq!(
            entry.hash(ContentField::Description),
            Some(content_hash("Meh").as_str())
        );
        assert_eq!(entry.verdict(ContentField::Description), Some("needs detail"));
        assert_eq!(entry.verdict(ContentField::Summary), Some("OK"));
        assert_eq!(entry.hash(ContentField::AcceptanceCriteria), None);
    }

    #[tokio::test]
    async fn without_reviewer_cache_is_untouched() {
        let dir = TempDir::new().unwrap();
        let mut cache = open(&dir);
        validate(&snapshot(valid_fields()), None, &mut cache)
            .await
            .unwrap();
        assert!(!dir.path().join("ai-hashes.json").exists());
    }
}

mod epic_rule {
    use super::*;

    fn story(status: &str) -> IssueSnapshot {
        let mut fields = valid_fields();
        fields["status"] = json!({ "name": status });
        fields[EPIC_FIELD] = Value::Null;
        fields["assignee"] = json!({"name": "jdoe"});
        fields[SPRINT_FIELD] = json!(["Sprint 42"]);
        snapshot(fields)
    }

    fn has_epic_problem(problems: &[String]) -> bool {
        problems.iter().any(|p| p == "Issue has no assigned Epic")
    }

    #[tokio::test]
    async fn new_story_is_exempt() {
        let report = validate(&story("New"), None, &mut MemoryCache::new())
            .await
            .unwrap();
        assert!(!has_epic_problem(&report.problems));
    }

    #[tokio::test]
    async fn in_progress_story_needs_epic() {
        let report = validate(&story("In Progress"), None, &mut MemoryCache::new())
            .await
            .unwrap();
        assert!(has_epic_problem(&report.problems));
    }
}
