//! ui::output
//!
//! User-facing output.
//!
//! # Design
//!
//! Command results (`✅ ...`, `❌ ...`, tables) are written through an
//! [`Output`] handle rather than `println!` directly. The handle respects the
//! quiet flag and can capture lines instead of printing them, which is how
//! tests assert on what a plugin reported.
//!
//! Diagnostics that are not part of a command's result go through `tracing`.

use std::fmt::Display;
use std::sync::{Arc, Mutex};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - failures only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Handle for writing command output.
///
/// Cloning shares the capture buffer, so a test can keep one clone and hand
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct Output {
    verbosity: Verbosity,
    capture: Option<Arc<Mutex<Vec<String>>>>,
}

impl Output {
    /// Output that prints to stdout.
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            capture: None,
        }
    }

    /// Output that records every line (regardless of verbosity) instead of printing.
    pub fn capturing() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            capture: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Current verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Print a message (suppressed in quiet mode).
    pub fn print(&self, message: impl Display) {
        self.emit(message.to_string(), false);
    }

    /// Print a failure message. Always shown.
    pub fn failure(&self, message: impl Display) {
        self.emit(message.to_string(), true);
    }

    /// Print a warning (suppressed in quiet mode).
    pub fn warn(&self, message: impl Display) {
        self.emit(format!("⚠️  {}", message), false);
    }

    /// Lines recorded so far. Empty when not capturing.
    pub fn lines(&self) -> Vec<String> {
        match &self.capture {
            Some(buf) => buf.lock().unwrap_or_else(|e| e.into_inner()).clone(),
            None => Vec::new(),
        }
    }

    /// All captured output joined with newlines.
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    fn emit(&self, line: String, always: bool) {
        if let Some(buf) = &self.capture {
            buf.lock().unwrap_or_else(|e| e.into_inner()).push(line);
            return;
        }
        if always || self.verbosity != Verbosity::Quiet {
            println!("{}", line);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render rows as a left-aligned table with a ` | ` separator.
///
/// Returns the header line, a dash rule of the same width, then one line
/// per row. Cells missing from short rows render empty.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let header = render(headers.to_vec());
    let mut lines = vec!["-".repeat(header.chars().count())];
    lines.insert(0, header);
    for row in rows {
        let cells = (0..headers.len())
            .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
            .collect();
        lines.push(render(cells));
    }
    lines
}

/// Truncate `text` to `max` characters, ending with `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
