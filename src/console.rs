//! User-facing status messages
//!
//! Steps, successes and informational lines go to stdout; warnings and errors
//! go to stderr and are printed at every verbosity.

use crate::manifest::ManifestPreview;
use crate::output::{DiffFormatter, Verbosity};
use colored::Colorize;
use std::io::{self, Write};

/// Status printer shared by the sync and release commands
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    verbosity: Verbosity,
}

impl Console {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Console that only prints warnings and errors
    pub fn quiet() -> Self {
        Self::new(Verbosity::Quiet)
    }

    /// Enables or disables colored output process-wide
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether progress bars should be drawn
    pub fn show_progress(&self) -> bool {
        self.verbosity != Verbosity::Quiet
    }

    /// Section header
    pub fn step(&self, title: &str) {
        if self.verbosity != Verbosity::Quiet {
            println!();
            println!("{} {}", "==>".blue().bold(), title.bold());
        }
    }

    pub fn info(&self, message: &str) {
        if self.verbosity != Verbosity::Quiet {
            println!("{}", message);
        }
    }

    /// Only shown with --verbose
    pub fn detail(&self, message: &str) {
        if self.verbosity == Verbosity::Verbose {
            println!("  {}", message.dimmed());
        }
    }

    pub fn success(&self, message: &str) {
        if self.verbosity != Verbosity::Quiet {
            println!("{} {}", "✓".green(), message);
        }
    }

    /// Prints a dry-run manifest diff
    pub fn preview(&self, preview: &ManifestPreview) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }
        let mut stdout = io::stdout().lock();
        let written = DiffFormatter::new(true)
            .format_preview(preview, &mut stdout)
            .and_then(|_| stdout.flush());
        if let Err(e) = written {
            self.warn(&format!("could not print preview: {}", e));
        }
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message.yellow());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_console_hides_progress() {
        assert!(!Console::quiet().show_progress());
        assert!(Console::new(Verbosity::Normal).show_progress());
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(Console::default().verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_messages_do_not_panic() {
        let console = Console::new(Verbosity::Verbose);
        console.step("Preflight");
        console.info("checking");
        console.detail("go test ./...");
        console.success("done");
        console.warn("skipped");
        console.error("failed");
    }
}
