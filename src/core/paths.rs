//! core::paths
//!
//! Centralized path routing for rh-issue storage locations.
//!
//! # Storage Layout
//!
//! Everything lives under `~/.config/rh-issue/` unless overridden:
//! - `config.toml` - User configuration
//! - `ai-hashes.json` - Lint verdict cache
//! - `ai-hashes.json.lock` - Lock file guarding cache writes
//!
//! # Example
//!
//! ```
//! use jira_creator::core::paths::AppPaths;
//! use std::path::PathBuf;
//!
//! let paths = AppPaths::new(PathBuf::from("/home/me/.config/rh-issue"));
//! assert_eq!(
//!     paths.lint_cache_path(),
//!     PathBuf::from("/home/me/.config/rh-issue/ai-hashes.json")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::config::ConfigError;

/// Directory name used under the user's config directory.
pub const APP_DIR: &str = "rh-issue";

/// Storage locations rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    /// Paths rooted at an explicit directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Paths rooted at `~/.config/rh-issue`.
    pub fn user() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(home.join(".config").join(APP_DIR)))
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// `<root>/ai-hashes.json`
    pub fn lint_cache_path(&self) -> PathBuf {
        self.root.join("ai-hashes.json")
    }
}

/// Config file candidates in search order.
///
/// `lookup` resolves environment variables so callers (and tests) control
/// which variables are visible.
pub fn config_candidates<F>(lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let mut candidates = Vec::new();

    if let Some(path) = lookup("JIRA_CREATOR_CONFIG").filter(|p| !p.trim().is_empty()) {
        candidates.push(PathBuf::from(path));
    }

    if let Some(xdg) = lookup("XDG_CONFIG_HOME").filter(|p| !p.trim().is_empty()) {
        candidates.push(PathBuf::from(xdg).join(APP_DIR).join("config.toml"));
    }

    if let Ok(paths) = AppPaths::user() {
        candidates.push(paths.config_path());
    }

    candidates
}

/// Sidecar lock file for a cache file (`<file>.lock`).
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let paths = AppPaths::new(PathBuf::from("/cfg"));
        assert_eq!(paths.root(), Path::new("/cfg"));
        assert_eq!(paths.config_path(), PathBuf::from("/cfg/config.toml"));
        assert_eq!(paths.lint_cache_path(), PathBuf::from("/cfg/ai-hashes.json"));
    }

    #[test]
    fn candidates_respect_env_order() {
        let candidates = config_candidates(|name| match name {
            "JIRA_CREATOR_CONFIG" => Some("/explicit.toml".to_string()),
            "XDG_CONFIG_HOME" => Some("/xdg".to_string()),
            _ => None,
        });
        assert_eq!(candidates[0], PathBuf::from("/explicit.toml"));
        assert_eq!(candidates[1], PathBuf::from("/xdg/rh-issue/config.toml"));
    }

    #[test]
    fn empty_env_values_ignored() {
        let candidates = config_candidates(|name| match name {
            "JIRA_CREATOR_CONFIG" => Some("  ".to_string()),
            _ => None,
        });
        assert!(candidates
            .iter()
            .all(|p| p != &PathBuf::from("  ")));
    }

    #[test]
    fn lock_path_appends_suffix() {
        assert_eq!(
            lock_path_for(Path::new("/tmp/ai-hashes.json")),
            PathBuf::from("/tmp/ai-hashes.json.lock")
        );
    }
}
