//! External command-line tools
//!
//! This module provides:
//! - Narrow traits over git, the Go toolchain, the `gh` CLI and each
//!   repository's release script, so the sequencer can run against fakes
//! - `System*` implementations that execute the real commands
//! - Prerequisite detection
//! - The confirmation capability used for interactive gates

mod git;
mod go;
mod host;
mod release;

pub use git::{SystemGit, Vcs};
pub use go::{PackageManager, SystemGo};
pub use host::{CodeHost, GhPullRequests, PullRequest, PullRequestOutcome};
pub use release::{ReleaseProcedure, ScriptRelease};

use crate::error::{CommandError, PrerequisiteError};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;

/// Captured result of an external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command line that was executed
    pub command: String,
    /// Whether the command exited successfully
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Converts an unsuccessful run into an error carrying its most useful output
    pub fn into_result(self) -> Result<CommandOutput, CommandError> {
        if self.success {
            return Ok(self);
        }
        let message = if !self.stderr.trim().is_empty() {
            self.stderr.trim().to_string()
        } else if !self.stdout.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            "exited unsuccessfully".to_string()
        };
        Err(CommandError::new(self.command, message))
    }
}

/// Runs a command in `working_dir`, capturing its output.
///
/// A command that cannot be spawned is reported as an unsuccessful run.
pub fn run_command(program: &str, args: &[&str], working_dir: &Path) -> CommandOutput {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    match Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .output()
    {
        Ok(output) => CommandOutput {
            command,
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        },
        Err(e) => CommandOutput {
            command,
            success: false,
            stdout: String::new(),
            stderr: format!("failed to execute command: {}", e),
        },
    }
}

/// An external tool the commands need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    Git,
    Go,
    Gh,
    /// `gh` logged in to GitHub
    GhAuth,
}

impl Prerequisite {
    /// Everything a live run touches
    pub const ALL: [Prerequisite; 4] = [
        Prerequisite::Git,
        Prerequisite::Go,
        Prerequisite::Gh,
        Prerequisite::GhAuth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Prerequisite::Git => "git",
            Prerequisite::Go => "go",
            Prerequisite::Gh => "gh (GitHub CLI)",
            Prerequisite::GhAuth => "gh authentication (run `gh auth login`)",
        }
    }

    fn probe_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Prerequisite::Git => ("git", &["--version"]),
            Prerequisite::Go => ("go", &["version"]),
            Prerequisite::Gh => ("gh", &["--version"]),
            Prerequisite::GhAuth => ("gh", &["auth", "status"]),
        }
    }

    /// Runs the probe command
    pub fn is_available(&self) -> bool {
        let (program, args) = self.probe_command();
        run_command(program, args, Path::new(".")).success
    }
}

/// Checks every prerequisite with `probe`, reporting all missing ones together
pub fn check_with<F>(required: &[Prerequisite], probe: F) -> Result<(), PrerequisiteError>
where
    F: Fn(&Prerequisite) -> bool,
{
    let missing: Vec<String> = required
        .iter()
        .filter(|p| !probe(*p))
        .map(|p| p.label().to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PrerequisiteError { missing })
    }
}

/// Checks prerequisites against the installed tools
pub fn check_prerequisites(required: &[Prerequisite]) -> Result<(), PrerequisiteError> {
    check_with(required, Prerequisite::is_available)
}

/// Asks a human to approve a step
pub trait Confirm {
    /// Returns true to proceed
    fn confirm(&self, prompt: &str) -> bool;
}

/// Reads the answer from the terminal; only `y`/`Y` proceeds
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

/// Answers every prompt the same way (`--yes`, tests)
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// The external capabilities a sync or release run works through
#[derive(Clone, Copy)]
pub struct Toolbox<'a> {
    pub vcs: &'a dyn Vcs,
    pub go: &'a dyn PackageManager,
    pub host: &'a dyn CodeHost,
    pub release: &'a dyn ReleaseProcedure,
    pub confirm: &'a dyn Confirm,
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}
