//! core
//!
//! Configuration and storage locations shared by every command.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for rh-issue storage

pub mod config;
pub mod paths;
