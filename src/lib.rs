//! rh-issue - create, edit, and lint Jira issues from the command line
//!
//! Every command is a plugin registered in a single table. The CLI builds its
//! argument parser from that table, dispatches to the selected plugin, and
//! maps the outcome to an exit code.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing, dispatch, help overview
//! - [`plugins`] - Plugin contract, registry, generic field setter, built-ins
//! - [`validate`] - Issue lint rules and the content-hash verdict cache
//! - [`jira`] - Jira REST client abstraction and HTTP implementation
//! - [`ai`] - Quality reviewer abstraction and providers
//! - [`core`] - Configuration and storage paths
//! - [`ui`] - User-facing output
//!
//! # Invariants
//!
//! 1. Command names are unique; an unknown name reaches no plugin
//! 2. A setter issues exactly one write request per successful invocation
//! 3. A text field is sent to the AI reviewer at most once per content hash
//! 4. A failing verdict stays failing until the text changes

pub mod ai;
pub mod cli;
pub mod core;
pub mod jira;
pub mod plugins;
pub mod ui;
pub mod validate;
