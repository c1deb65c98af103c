//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Build the command tree from the plugin registry and parse arguments
//! - Load configuration and construct the Jira client
//! - Dispatch to the selected plugin and map the outcome to an exit code
//!
//! The overview, `completion` and unknown-command paths need no
//! configuration, so they work before `JIRA_URL` and `JPAT` are set.

pub mod args;
pub mod dispatch;
pub mod help;
pub mod parser;

pub use args::{GlobalArgs, Shell};
pub use dispatch::{dispatch, DispatchError, DispatchState};
pub use parser::{build_parser, parse_from, Invocation, Parsed};

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::jira::client::HttpJiraClient;
use crate::plugins::{PluginArgs, PluginContext, PluginRegistry};
use crate::ui::output::Output;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Usage errors exit
/// through clap with status 2.
pub fn run() -> Result<ExitCode> {
    let registry = PluginRegistry::with_builtins().context("failed to register plugins")?;
    let parsed = match parse_from(&registry, std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    init_tracing(parsed.globals.debug);
    let output = Output::new(parsed.globals.verbosity());

    match parsed.invocation {
        Invocation::Overview => {
            for line in help::overview(&registry) {
                output.print(line);
            }
            Ok(ExitCode::SUCCESS)
        }
        Invocation::Completion(shell) => {
            parser::write_completion(shell, &registry, &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Invocation::Plugin { name, .. } if registry.get_plugin(&name).is_none() => {
            output.failure(format!("❌ {}", DispatchError::UnknownCommand(name)));
            Ok(ExitCode::from(DispatchState::FailedUnknown.exit_code()))
        }
        Invocation::Plugin { name, args } => {
            run_plugin(&registry, &parsed.globals, &output, &name, &args)
        }
    }
}

fn run_plugin(
    registry: &PluginRegistry,
    globals: &GlobalArgs,
    output: &Output,
    name: &str,
    args: &PluginArgs,
) -> Result<ExitCode> {
    let config = Config::load(globals.config.as_deref())?;
    if let Some(path) = config.loaded_from() {
        debug!(path = %path.display(), "loaded config");
    }
    let client = HttpJiraClient::from_config(&config)?;
    let ctx = PluginContext::new(&client, &config, output).with_registry(registry);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(dispatch(registry, &ctx, name, args));

    let state = DispatchState::from_result(&result);
    debug!(command = name, ?state, "dispatch complete");
    match result {
        Err(DispatchError::UnknownCommand(name)) => {
            output.failure(format!("❌ Unknown command: {}", name));
        }
        Err(DispatchError::Plugin(e)) => {
            debug!(error = %e, "command failed");
        }
        Ok(_) => {}
    }
    Ok(ExitCode::from(state.exit_code()))
}

/// Install the stderr log subscriber.
fn init_tracing(debug: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug, rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `--debug` forces debug output; otherwise a valid `RUST_LOG` wins over
/// the default warn level.
fn log_filter(debug: bool, rust_log: Option<&str>) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
