//! cli::args
//!
//! Global flags shared by every command.
//!
//! # Global Flags
//!
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Failures only
//! - `--config <path>`: Read this config file instead of the default locations
//!
//! Plugin subcommands are built at runtime from the registry (see
//! [`super::parser`]), so the flags are declared with the builder API rather
//! than derive.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, ValueEnum};

use crate::ui::output::Verbosity;

/// Values of the global flags after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    pub debug: bool,
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Clap definitions for the global flags.
    pub fn definitions() -> Vec<Arg> {
        vec![
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Only print failures"),
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to a config file"),
        ]
    }

    /// Read the global flags from parsed matches.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            debug: matches.get_flag("debug"),
            quiet: matches.get_flag("quiet"),
            config: matches.get_one::<PathBuf>("config").cloned(),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Shells supported by the `completion` command.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
