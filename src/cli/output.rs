//! Styled terminal output for symsweep
//!
//! stdout carries the run transcript (echoed tool command lines, per-file
//! failures, the summary); errors go to stderr. Write errors are ignored so
//! a closed pipe (`symsweep | head`) never aborts a worker mid-sweep.

use console::style;
use std::fmt::Arguments;
use std::io::{self, Write};

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    /// Create a new output handler
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            stdout_line(format_args!("{} {}", style("✔").green(), message));
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        // Errors are always shown, even in quiet mode
        stderr_line(format_args!("{} {}", style("✖").red(), message));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            stdout_line(format_args!("{} {}", style("⚠").yellow(), message));
        }
    }

    /// Echo an external command line exactly as it will run
    pub fn command(&self, line: &str) {
        if !self.quiet {
            stdout_line(format_args!("{line}"));
        }
    }

    /// Print a step in a process
    pub fn step(&self, step: &str) {
        if !self.quiet {
            stdout_line(format_args!("{} {}", style("❯").cyan(), step));
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if !self.quiet {
            stdout_line(format_args!("  • {}", item));
        }
    }

    /// Print summary statistics with enhanced styling
    pub fn summary_stats(&self, label: &str, value: usize) {
        if !self.quiet {
            stdout_line(format_args!("  {} {}", style(label).dim(), style(value.to_string()).bold()));
        }
    }

    /// Get verbose mode status
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

fn stdout_line(line: Arguments<'_>) {
    let _ = writeln!(io::stdout().lock(), "{line}");
}

fn stderr_line(line: Arguments<'_>) {
    let _ = writeln!(io::stderr().lock(), "{line}");
}
