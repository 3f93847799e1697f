//! Output formatting and display for pdfstitch.
//!
//! This module handles user-facing output:
//! - Formatted status messages in quiet and verbose modes
//! - The numbered list view of the collection
//! - Human-readable sizes
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::config::Config;
//! use pdfstitch::output::{OutputFormatter, format_bytes};
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.success(&format!("Wrote {}", format_bytes(1536, 2)));
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter, render_collection};

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count with base-1024 units.
///
/// The value is rounded to `decimals` places and trailing zeros are
/// dropped, so `1536` is `"1.5 KB"` and `2048` is `"2 KB"`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    while exponent + 1 < UNITS.len() && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let value = bytes as f64 / 1024u64.pow(exponent as u32) as f64;

    let rounded = format!("{value:.decimals$}");
    let trimmed = if rounded.contains('.') {
        rounded.trim_end_matches('0').trim_end_matches('.')
    } else {
        &rounded
    };

    format!("{trimmed} {}", UNITS[exponent])
}
