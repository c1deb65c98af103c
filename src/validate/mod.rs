//! validate
//!
//! Issue lint: structural checks plus cached quality review of text fields.
//!
//! # Checks
//!
//! Structural checks always run, in this order:
//! 1. In Progress issues must be assigned
//! 2. Issues need an epic unless they are epics, or are Bug/Story/Spike/Task
//!    still in New or Refinement
//! 3. In Progress issues must be in a sprint
//! 4. Priority must be set
//! 5. Story points must be set outside New and Refinement
//! 6. Blocked issues need a reason
//!
//! Then Summary, Description and Acceptance Criteria are reviewed.
//!
//! # Review cache
//!
//! The reviewer is called at most once per distinct text per field per
//! issue. After each call the text's SHA-256 and the verdict are stored.
//! When the text hash matches the stored one the stored verdict is reused:
//! an accepted text stays accepted and a rejected text keeps reporting its
//! last verdict until the text changes.
//!
//! A verdict passes when it contains `ok` in any case, so
//! `"OK, but consider..."` passes.

pub mod cache;
pub mod fields;

pub use cache::{CacheEntry, CacheError, JsonFileCache, MemoryCache, VerdictStore};
pub use fields::{ContentField, IssueSnapshot};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::ai::{AiError, QualityReviewer};

/// Errors that abort validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Individual checks, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Check {
    Progress,
    Epic,
    Sprint,
    Priority,
    StoryPoints,
    Blocked,
    Content(ContentField),
}

impl Check {
    /// Short column label.
    pub fn label(&self) -> &'static str {
        match self {
            Check::Progress => "Progress",
            Check::Epic => "Epic",
            Check::Sprint => "Sprint",
            Check::Priority => "Priority",
            Check::StoryPoints => "Story P.",
            Check::Blocked => "Blocked",
            Check::Content(field) => field.label(),
        }
    }
}

/// Outcome of validating one issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Human-readable problems in check order.
    pub problems: Vec<String>,
    /// Pass/fail per check that ran.
    pub checks: Vec<(Check, bool)>,
    /// Cache entry after this validation.
    pub cache_entry: CacheEntry,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    fn check(&mut self, check: Check, problem: Option<String>) {
        self.checks.push((check, problem.is_none()));
        if let Some(problem) = problem {
            self.problems.push(problem);
        }
    }
}

/// Prompt sent to the reviewer for `field`.
pub fn review_prompt(field: ContentField) -> String {
    format!(
        "Check the quality of the following Jira {}. Is it clear, concise, and informative? \
         Respond with 'OK' if fine or explain why not.",
        field.label()
    )
}

/// SHA-256 of `text` as lowercase hex.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Whether a reviewer verdict counts as passing.
pub fn verdict_passes(verdict: &str) -> bool {
    verdict.to_lowercase().contains("ok")
}

const EPIC_EXEMPT_TYPES: &[&str] = &["Bug", "Story", "Spike", "Task"];
const EARLY_STATUSES: &[&str] = &["New", "Refinement"];

/// Absent or empty.
fn blank(value: &Option<String>) -> bool {
    value.as_deref().unwrap_or_default().is_empty()
}

fn structural_checks(issue: &IssueSnapshot, report: &mut ValidationReport) {
    let status = issue.status.as_deref();
    let in_progress = status == Some("In Progress");
    let early = status.is_some_and(|s| EARLY_STATUSES.contains(&s));

    report.check(
        Check::Progress,
        (in_progress && blank(&issue.assignee))
            .then(|| "Issue is In Progress but unassigned".to_string()),
    );

    let issue_type = issue.issue_type.as_deref();
    let epic_exempt = issue_type == Some("Epic")
        || (issue_type.is_some_and(|t| EPIC_EXEMPT_TYPES.contains(&t)) && early);
    report.check(
        Check::Epic,
        (!epic_exempt && blank(&issue.epic_link))
            .then(|| "Issue has no assigned Epic".to_string()),
    );

    report.check(
        Check::Sprint,
        (in_progress && blank(&issue.sprint))
            .then(|| "Issue is In Progress but not assigned to a Sprint".to_string()),
    );

    report.check(
        Check::Priority,
        blank(&issue.priority).then(|| "Priority not set".to_string()),
    );

    report.check(
        Check::StoryPoints,
        (issue.story_points.is_none() && !early).then(|| "Story points not assigned".to_string()),
    );

    report.check(
        Check::Blocked,
        (issue.blocked_value.as_deref() == Some("True") && blank(&issue.blocked_reason))
            .then(|| "Issue is blocked but has no blocked reason".to_string()),
    );
}

/// Validate one issue.
///
/// With no `reviewer` only the structural checks run and the cache is not
/// touched. Otherwise the cache entry for the issue is read, updated after
/// each reviewer call, stored and flushed.
///
/// An issue without a key yields an empty report.
///
/// # Errors
///
/// Reviewer failures and cache I/O failures are returned, not folded into
/// the problem list.
pub async fn validate(
    issue: &IssueSnapshot,
    reviewer: Option<&dyn QualityReviewer>,
    cache: &mut dyn VerdictStore,
) -> Result<ValidationReport, ValidationError> {
    let mut report = ValidationReport::default();

    let Some(key) = issue.key.as_deref() else {
        return Ok(report);
    };

    structural_checks(issue, &mut report);

    let Some(reviewer) = reviewer else {
        return Ok(report);
    };

    let mut entry = cache.get(key).unwrap_or_default();

    for field in ContentField::ALL {
        let Some(text) = issue.content(field).filter(|t| !t.is_empty()) else {
            continue;
        };

        let hash = content_hash(text);
        let verdict = if entry.hash(field) == Some(hash.as_str()) {
            debug!(issue = %key, field = %field, "review cache hit");
            match entry.verdict(field) {
                Some(v) => v.to_string(),
                None => "OK".to_string(),
            }
        } else {
            debug!(issue = %key, field = %field, reviewer = reviewer.name(), "reviewing");
            let verdict = reviewer
                .improve_text(&review_prompt(field), text)
                .await?
                .trim()
                .to_string();
            entry.record(field, hash, verdict.clone());
            verdict
        };

        report.check(
            Check::Content(field),
            (!verdict_passes(&verdict)).then(|| format!("{}: {}", field.label(), verdict)),
        );
    }

    cache.put(key, entry.clone());
    cache.flush()?;
    report.cache_entry = entry;

    Ok(report)
}
