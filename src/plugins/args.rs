//! plugins::args
//!
//! Declarative argument schema and the parsed namespace handed to plugins.
//!
//! A plugin describes its arguments as a list of [`ArgSpec`]; the CLI layer
//! turns that list into clap arguments and hands the parsed values back as
//! [`PluginArgs`]. Plugins never see clap types.

use std::collections::BTreeMap;
use std::fmt;

use super::OpError;

/// Value type of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
    /// Boolean switch (`--no-ai`)
    Flag,
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    /// Name in the parsed namespace (`issue_key`, `workstream_id`)
    pub name: String,
    pub positional: bool,
    pub required: bool,
    pub kind: ArgKind,
    pub help: String,
    /// Long flag without dashes; derived from `name` when unset
    pub long: Option<String>,
    pub default: Option<String>,
}

impl ArgSpec {
    /// Required positional string argument.
    pub fn positional(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: true,
            required: true,
            kind: ArgKind::String,
            help: help.into(),
            long: None,
            default: None,
        }
    }

    /// Optional `--name <value>` string argument.
    pub fn option(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            positional: false,
            required: false,
            ..Self::positional(name, help)
        }
    }

    /// `--name` switch.
    pub fn flag(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Flag,
            ..Self::option(name, help)
        }
    }

    /// The standard `issue_key` positional.
    pub fn issue_key() -> Self {
        Self::positional("issue_key", "The Jira issue key (e.g., PROJ-123)")
    }

    pub fn integer(mut self) -> Self {
        self.kind = ArgKind::Integer;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    /// Long flag name, `max_results` → `max-results` unless overridden.
    pub fn long_name(&self) -> String {
        self.long
            .clone()
            .unwrap_or_else(|| self.name.replace('_', "-"))
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Flag(bool),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Int(n) => write!(f, "{}", n),
            ArgValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// Parsed arguments of one invocation, keyed by argument name.
///
/// Absent optional arguments are simply missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginArgs {
    values: BTreeMap<String, ArgValue>,
}

impl PluginArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn with_str(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, ArgValue::Str(value.into()));
        self
    }

    pub fn with_int(mut self, name: impl Into<String>, value: i64) -> Self {
        self.insert(name, ArgValue::Int(value));
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.insert(name, ArgValue::Flag(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// String value; integers are not converted.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer value; numeric strings are accepted.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Int(n)) => Some(*n),
            Some(ArgValue::Str(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Switch value; absent means off.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Flag(true)))
    }

    /// Any value rendered as text.
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.values.get(name).map(ArgValue::to_string)
    }

    /// Required string value.
    pub fn require_str(&self, name: &str) -> Result<&str, OpError> {
        self.get_str(name)
            .ok_or_else(|| OpError::Domain(format!("missing argument: {}", name)))
    }

    /// Required integer value.
    pub fn require_int(&self, name: &str) -> Result<i64, OpError> {
        self.get_int(name)
            .ok_or_else(|| OpError::Domain(format!("missing or non-numeric argument: {}", name)))
    }
}
