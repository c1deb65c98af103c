//! cli::help
//!
//! Categorized command overview, shown when no subcommand is given.
//!
//! Categories appear in [`Category::ALL`] order and empty ones are skipped.
//! Commands are sorted by name within a category.

use super::parser::BIN_NAME;
use crate::plugins::{Category, CommandPlugin, PluginRegistry};
use crate::ui::output::truncate;

const HELP_WIDTH: usize = 60;

/// Overview lines for every registered plugin.
pub fn overview(registry: &PluginRegistry) -> Vec<String> {
    let mut lines = vec![
        "DESCRIPTION".to_string(),
        "  A CLI for managing Jira issues with AI-powered quality checks,".to_string(),
        "  automated fixes, and streamlined workflows.".to_string(),
        String::new(),
        "USAGE".to_string(),
        format!("  {} <command> [options]", BIN_NAME),
        String::new(),
        "COMMANDS".to_string(),
        String::new(),
    ];

    for category in Category::ALL {
        let mut plugins: Vec<&dyn CommandPlugin> = registry
            .list_plugins()
            .filter(|p| p.category() == category)
            .collect();
        if plugins.is_empty() {
            continue;
        }
        plugins.sort_by_key(|p| p.command_name());

        lines.push(format!("  {} {}", category.emoji(), category.label()));
        for (i, plugin) in plugins.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(command_lines(*plugin));
        }
        lines.push(String::new());
    }

    lines.push("OPTIONS".to_string());
    lines.push(format!("  {:<24}Show this help message and exit", "-h, --help"));
    lines.push(format!("  {:<24}Enable debug logging", "--debug"));
    lines.push(format!("  {:<24}Only print failures", "-q, --quiet"));
    lines.push(format!("  {:<24}Path to a config file", "--config <PATH>"));
    lines
}

/// Name, truncated help text, then one line per example.
fn command_lines(plugin: &dyn CommandPlugin) -> Vec<String> {
    let mut lines = vec![format!(
        "    {:<30} {}",
        plugin.command_name(),
        truncate(&plugin.help_text(), HELP_WIDTH)
    )];
    for example in plugin.example_commands() {
        lines.push(format!("      $ {} {}", BIN_NAME, example));
    }
    lines
}
