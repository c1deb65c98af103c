//! cli::parser
//!
//! Builds the clap command tree from the plugin registry.
//!
//! Each plugin becomes one subcommand. Positional arguments are added in
//! declaration order, then options and flags. Integer arguments are parsed
//! by clap, so a plugin never sees a non-numeric value for them.
//!
//! Unrecognized subcommands are accepted by the parser and reported by the
//! dispatcher as unknown commands, so they exit 1 rather than with clap's
//! usage status.

use std::ffi::OsString;
use std::io::Write;

use clap::{Arg, ArgAction, ArgMatches, Command};

use super::args::{GlobalArgs, Shell};
use crate::plugins::{ArgKind, ArgSpec, ArgValue, CommandPlugin, PluginArgs, PluginRegistry};

/// Binary name used in help and completion scripts.
pub const BIN_NAME: &str = "rh-issue";

/// Name of the built-in completion subcommand.
pub const COMPLETION_COMMAND: &str = "completion";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// No subcommand given
    Overview,
    /// Print a completion script
    Completion(Shell),
    /// Run a plugin
    Plugin { name: String, args: PluginArgs },
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub globals: GlobalArgs,
    pub invocation: Invocation,
}

/// The full command tree for `registry`.
pub fn build_parser(registry: &PluginRegistry) -> Command {
    let mut cmd = Command::new(BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Create, edit, and lint Jira issues")
        .args(GlobalArgs::definitions())
        .allow_external_subcommands(true)
        .subcommand(completion_command());

    for plugin in registry.list_plugins() {
        cmd = cmd.subcommand(plugin_command(plugin));
    }
    cmd
}

fn completion_command() -> Command {
    Command::new(COMPLETION_COMMAND)
        .about("Generate shell completion scripts")
        .arg(
            Arg::new("shell")
                .required(true)
                .value_parser(clap::value_parser!(Shell))
                .help("Target shell"),
        )
}

fn plugin_command(plugin: &dyn CommandPlugin) -> Command {
    let mut sub = Command::new(plugin.command_name()).about(plugin.help_text());

    let examples = plugin.example_commands();
    if !examples.is_empty() {
        let body = examples
            .iter()
            .map(|e| format!("  {} {}", BIN_NAME, e))
            .collect::<Vec<_>>()
            .join("\n");
        sub = sub.after_help(format!("Examples:\n{}", body));
    }

    let (positional, named): (Vec<ArgSpec>, Vec<ArgSpec>) =
        plugin.arguments().into_iter().partition(|a| a.positional);
    for spec in positional.iter().chain(named.iter()) {
        sub = sub.arg(clap_arg(spec));
    }
    sub
}

fn clap_arg(spec: &ArgSpec) -> Arg {
    let mut arg = Arg::new(spec.name.clone()).help(spec.help.clone());
    if !spec.positional {
        arg = arg.long(spec.long_name());
    }

    match spec.kind {
        ArgKind::Flag => arg.action(ArgAction::SetTrue),
        ArgKind::Integer | ArgKind::String => {
            arg = arg.action(ArgAction::Set).required(spec.required);
            if spec.kind == ArgKind::Integer {
                arg = arg.value_parser(clap::value_parser!(i64));
            }
            if let Some(default) = &spec.default {
                arg = arg.default_value(default.clone());
            }
            arg
        }
    }
}

/// Collect a plugin's argument values from its subcommand matches.
///
/// Arguments the user omitted (and that have no default) are absent from
/// the result.
pub fn plugin_args(plugin: &dyn CommandPlugin, matches: &ArgMatches) -> PluginArgs {
    let mut args = PluginArgs::new();
    for spec in plugin.arguments() {
        let value = match spec.kind {
            ArgKind::Flag => Some(ArgValue::Flag(matches.get_flag(&spec.name))),
            ArgKind::Integer => matches.get_one::<i64>(&spec.name).map(|n| ArgValue::Int(*n)),
            ArgKind::String => matches
                .get_one::<String>(&spec.name)
                .map(|s| ArgValue::Str(s.clone())),
        };
        if let Some(value) = value {
            args.insert(spec.name, value);
        }
    }
    args
}

/// Parse `argv` (including the binary name) against `registry`.
///
/// A command spelled with underscores (`set_priority`) reaches clap as an
/// external subcommand; it is rewritten to the plugin's own name and the
/// line parsed again so the plugin's arguments are declared.
///
/// # Errors
///
/// Returns clap's error for malformed input, `--help` and `--version`;
/// callers normally hand it to [`clap::Error::exit`].
pub fn parse_from<I, T>(registry: &PluginRegistry, argv: I) -> Result<Parsed, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let matches = build_parser(registry).try_get_matches_from(argv.clone())?;

    if let Some((name, _)) = matches.subcommand() {
        if let Some(canonical) = registry
            .get_plugin(name)
            .map(|p| p.command_name())
            .filter(|canonical| canonical != name)
        {
            if let Some(argv) = canonical_argv(&argv, name, &canonical) {
                return parse_from(registry, argv);
            }
        }
    }

    let globals = GlobalArgs::from_matches(&matches);

    let invocation = match matches.subcommand() {
        None => Invocation::Overview,
        Some((COMPLETION_COMMAND, sub)) => match sub.get_one::<Shell>("shell") {
            Some(shell) => Invocation::Completion(*shell),
            None => Invocation::Overview,
        },
        Some((name, sub)) => Invocation::Plugin {
            name: name.to_string(),
            args: registry
                .get_plugin(name)
                .filter(|p| p.command_name() == name)
                .map(|p| plugin_args(p, sub))
                .unwrap_or_default(),
        },
    };

    Ok(Parsed {
        globals,
        invocation,
    })
}

/// `argv` with the first occurrence of `name` after the binary replaced.
fn canonical_argv(argv: &[OsString], name: &str, canonical: &str) -> Option<Vec<OsString>> {
    let pos = argv.iter().skip(1).position(|a| a.as_os_str() == name)? + 1;
    let mut rewritten = argv.to_vec();
    rewritten[pos] = OsString::from(canonical);
    Some(rewritten)
}

/// Write a completion script for `shell` to `out`.
pub fn write_completion(shell: Shell, registry: &PluginRegistry, out: &mut dyn Write) {
    use clap_complete::{generate, shells};

    let mut cmd = build_parser(registry);
    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, BIN_NAME, out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, BIN_NAME, out),
        Shell::Fish => generate(shells::Fish, &mut cmd, BIN_NAME, out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, BIN_NAME, out),
    }
}
