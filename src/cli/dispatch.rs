//! cli::dispatch
//!
//! Routes a parsed invocation to its plugin.
//!
//! # Lifecycle
//!
//! ```text
//! Parsed ──► FailedUnknown
//!    │
//!    ▼
//! Dispatched ──► Succeeded
//!    │
//!    └────────► FailedPluginError
//! ```
//!
//! `Dispatched` is also terminal when the plugin ran without error but
//! reported an unsuccessful outcome.

use thiserror::Error;
use tracing::debug;

use crate::plugins::{PluginArgs, PluginContext, PluginError, PluginRegistry};

/// Errors from dispatching a command.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Where an invocation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Parsed,
    Dispatched,
    FailedUnknown,
    FailedPluginError,
    Succeeded,
}

impl DispatchState {
    /// Final state for a dispatch result.
    pub fn from_result(result: &Result<bool, DispatchError>) -> Self {
        match result {
            Ok(true) => DispatchState::Succeeded,
            Ok(false) => DispatchState::Dispatched,
            Err(DispatchError::UnknownCommand(_)) => DispatchState::FailedUnknown,
            Err(DispatchError::Plugin(_)) => DispatchState::FailedPluginError,
        }
    }

    /// Process exit code for this state.
    pub fn exit_code(&self) -> u8 {
        match self {
            DispatchState::Succeeded => 0,
            _ => 1,
        }
    }
}

/// Run the plugin registered under `name`.
///
/// # Errors
///
/// [`DispatchError::UnknownCommand`] when no plugin matches; otherwise the
/// plugin's own error.
pub async fn dispatch(
    registry: &PluginRegistry,
    ctx: &PluginContext<'_>,
    name: &str,
    args: &PluginArgs,
) -> Result<bool, DispatchError> {
    let plugin = registry
        .get_plugin(name)
        .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;

    debug!(command = %plugin.command_name(), "dispatching");
    let success = plugin.execute(ctx, args).await?;
    debug!(command = %plugin.command_name(), success, "command finished");
    Ok(success)
}
