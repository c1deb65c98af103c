//! plugins::registry
//!
//! Plugin table indexed by command name.
//!
//! # Invariants
//!
//! - Command names are unique and kebab-case
//! - Argument names are unique within a plugin
//! - Discovery registers every built-in plugin exactly once; calling it
//!   again is a no-op
//! - Listing order is registration order

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::{builtin, CommandPlugin};

/// Errors from registering a plugin.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("command '{command}' declares argument '{argument}' more than once")]
    DuplicateArgument { command: String, argument: String },

    #[error("invalid command name '{0}': expected lowercase letters, digits and hyphens")]
    InvalidName(String),
}

/// Whether `name` is non-empty kebab-case.
pub fn is_valid_command_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Registered plugins.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn CommandPlugin>>,
    index: HashMap<String, usize>,
    discovered: bool,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("commands", &self.command_names())
            .field("discovered", &self.discovered)
            .finish()
    }
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in plugin.
    pub fn with_builtins() -> Result<Self, RegistrationError> {
        let mut registry = Self::new();
        registry.discover_plugins()?;
        Ok(registry)
    }

    /// Register one plugin.
    ///
    /// # Errors
    ///
    /// Rejects invalid or duplicate command names and duplicate argument
    /// names; the registry is unchanged on error.
    pub fn register(&mut self, plugin: Box<dyn CommandPlugin>) -> Result<(), RegistrationError> {
        let name = plugin.command_name();
        if !is_valid_command_name(&name) {
            return Err(RegistrationError::InvalidName(name));
        }
        if self.index.contains_key(&name) {
            return Err(RegistrationError::DuplicateCommand(name));
        }

        let mut seen = Vec::new();
        for arg in plugin.arguments() {
            if seen.contains(&arg.name) {
                return Err(RegistrationError::DuplicateArgument {
                    command: name,
                    argument: arg.name,
                });
            }
            seen.push(arg.name);
        }

        self.index.insert(name, self.plugins.len());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Register every built-in plugin. Idempotent.
    pub fn discover_plugins(&mut self) -> Result<(), RegistrationError> {
        if self.discovered {
            return Ok(());
        }
        for plugin in builtin::all() {
            self.register(plugin)?;
        }
        self.discovered = true;
        Ok(())
    }

    /// Plugin for `name`; underscores match hyphens.
    pub fn get_plugin(&self, name: &str) -> Option<&dyn CommandPlugin> {
        let name = name.replace('_', "-");
        self.index.get(&name).map(|&i| self.plugins[i].as_ref())
    }

    /// Plugins in registration order.
    pub fn list_plugins(&self) -> impl Iterator<Item = &dyn CommandPlugin> + '_ {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn command_names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.command_name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
