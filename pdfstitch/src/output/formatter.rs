//! Message formatting and display.
//!
//! Messages go to stdout. Logs go to stderr through `tracing`, so the two
//! never interleave.
//!
//! # Examples
//!
//! ```
//! use pdfstitch::output::formatter::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Loading files...");
//! formatter.success("Merged 3 documents");
//! ```

use std::io::{self, IsTerminal};

use super::format_bytes;
use crate::config::Config;
use crate::controller::StateSnapshot;

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn decoration(self) -> (&'static str, &'static str) {
        match self {
            MessageLevel::Info => ("", ""),
            MessageLevel::Success => ("✓ ", "\x1b[32m"),
            MessageLevel::Warning => ("⚠ ", "\x1b[33m"),
            MessageLevel::Error => ("✗ ", "\x1b[31m"),
            MessageLevel::Debug => ("→ ", "\x1b[36m"),
        }
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: io::stdout().is_terminal() && std::env::var_os("TERM").is_some(),
        }
    }

    /// Create a formatter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Disable ANSI colors regardless of the terminal.
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message, even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a message only shown in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    /// Print a section header.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print a labelled detail line in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print the collection the way the list view shows it.
    pub fn collection(&self, snapshot: &StateSnapshot) {
        if self.quiet {
            return;
        }

        for line in render_collection(snapshot) {
            println!("{line}");
        }
    }

    /// Check if verbose output should be shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        println!("{}", self.decorate(level, message));
    }

    fn decorate(&self, level: MessageLevel, message: &str) -> String {
        let (prefix, color) = level.decoration();
        if self.colored && !color.is_empty() {
            format!("{color}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

/// Lines of the list view for a snapshot.
///
/// Entries are numbered from 1. The dragged entry is marked with `*`, and
/// the footer carries the merge button state.
pub fn render_collection(snapshot: &StateSnapshot) -> Vec<String> {
    let mut lines = Vec::with_capacity(snapshot.candidates.len() + 3);

    if snapshot.candidates.is_empty() {
        lines.push("  (no files)".to_string());
    }

    for (index, candidate) in snapshot.candidates.iter().enumerate() {
        let marker = if snapshot.drag_source == Some(index) { '*' } else { ' ' };
        lines.push(format!(
            "{marker} {}. {} ({})",
            index + 1,
            candidate.name,
            format_bytes(candidate.size, 2)
        ));
    }

    let count = snapshot.candidates.len();
    let button = if snapshot.busy {
        "Merging...".to_string()
    } else {
        format!("Merge {count} PDF{}", if count == 1 { "" } else { "s" })
    };
    let enabled = !snapshot.busy && count >= 2;
    lines.push(format!(
        "  [{button}]{}",
        if enabled { "" } else { " (disabled)" }
    ));

    if let Some(message) = &snapshot.last_error {
        lines.push(format!("  ! {message}"));
    }

    lines
}
