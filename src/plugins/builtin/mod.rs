//! plugins::builtin
//!
//! The built-in plugin table.

pub mod flags;
pub mod issue;
pub mod links;
pub mod lint;
pub mod listing;
pub mod people;
pub mod setters;
pub mod sprint;
pub mod view;

use super::{CommandPlugin, Setter};

/// One instance of every built-in plugin, in help order within each category.
pub fn all() -> Vec<Box<dyn CommandPlugin>> {
    vec![
        Box::new(view::Search),
        Box::new(view::ViewIssue),
        Box::new(listing::ListIssues),
        Box::new(listing::ListBlocked),
        Box::new(Setter::new(setters::SetPriority)),
        Box::new(Setter::new(setters::SetStoryPoints)),
        Box::new(Setter::new(setters::SetComponent)),
        Box::new(Setter::new(setters::SetProject)),
        Box::new(Setter::new(setters::SetSummary)),
        Box::new(Setter::new(setters::SetWorkstream)),
        Box::new(Setter::new(setters::SetStatus)),
        Box::new(Setter::new(setters::SetStoryEpic)),
        Box::new(Setter::new(setters::SetAcceptanceCriteria)),
        Box::new(Setter::new(setters::UpdateDescription)),
        Box::new(people::Assign),
        Box::new(people::Unassign),
        Box::new(people::AddComment),
        Box::new(issue::ChangeType),
        Box::new(links::AddLink),
        Box::new(sprint::AddSprint),
        Box::new(sprint::RemoveSprint),
        Box::new(sprint::ListSprints),
        Box::new(flags::Block),
        Box::new(flags::Unblock),
        Box::new(flags::AddFlag),
        Box::new(flags::RemoveFlag),
        Box::new(lint::Lint),
        Box::new(lint::LintAll),
        Box::new(issue::VoteStoryPoints),
        Box::new(view::OpenIssue),
        Box::new(listing::SearchUsers),
    ]
}
