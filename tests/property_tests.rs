//! Property-based tests.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use jira_creator::plugins::builtin::setters::{normalize_priority, PRIORITIES};
use jira_creator::plugins::registry::is_valid_command_name;
use jira_creator::plugins::setter::command_name_for;
use jira_creator::ui::output::truncate;
use jira_creator::validate::{content_hash, verdict_passes};

/// Lowercase words joined by single spaces, like setter field labels.
fn field_label() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9]{0,9}", 1..4).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn setter_names_are_valid_commands(label in field_label()) {
        let name = command_name_for(&label);
        prop_assert!(name.starts_with("set-"));
        prop_assert!(is_valid_command_name(&name), "{}", name);
        prop_assert!(!name.contains(' '));
    }

    #[test]
    fn hash_is_stable_hex(text in ".*") {
        let a = content_hash(&text);
        prop_assert_eq!(a.len(), 64);
        prop_assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        prop_assert_eq!(a, content_hash(&text));
    }

    #[test]
    fn different_text_different_hash(a in ".{0,40}", b in ".{0,40}") {
        prop_assume!(a != b);
        prop_assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn verdicts_containing_ok_pass(prefix in "[a-z ]{0,10}", suffix in "[a-z ,.]{0,20}") {
        let verdict = format!("{}Ok{}", prefix, suffix);
        prop_assert!(verdict_passes(&verdict));
    }

    #[test]
    fn normalized_priority_is_known_or_fallback(value in "[A-Za-z]{0,12}") {
        let normalized = normalize_priority(&value, "Normal");
        prop_assert!(PRIORITIES.contains(&normalized) || normalized == "Normal");
    }

    #[test]
    fn priority_matching_ignores_case(index in 0..PRIORITIES.len(), upper in any::<bool>()) {
        let name = PRIORITIES[index];
        let input = if upper { name.to_uppercase() } else { name.to_lowercase() };
        prop_assert_eq!(normalize_priority(&input, "Normal"), name);
    }

    #[test]
    fn truncate_never_exceeds_limit(text in ".{0,100}", max in 3usize..80) {
        let out = truncate(&text, max);
        prop_assert!(out.chars().count() <= max);
        if text.chars().count() <= max {
            prop_assert_eq!(out, text);
        }
    }
}
