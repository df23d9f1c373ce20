//! Per-repository release procedure

use crate::error::CommandError;
use std::path::Path;
use std::process::Command;

/// Cuts a release of one repository
pub trait ReleaseProcedure {
    /// Runs `script` from `repo`; a dry run is forwarded to the script
    fn release(&self, repo: &Path, script: &Path, dry_run: bool) -> Result<(), CommandError>;
}

/// Runs the repository's release script attached to the terminal so its
/// own prompts stay interactive
#[derive(Debug, Default)]
pub struct ScriptRelease;

impl ScriptRelease {
    pub fn new() -> Self {
        Self
    }
}

/// Arguments passed to the release script
pub fn script_args(dry_run: bool) -> Vec<&'static str> {
    if dry_run {
        vec!["--dry-run"]
    } else {
        Vec::new()
    }
}

impl ReleaseProcedure for ScriptRelease {
    fn release(&self, repo: &Path, script: &Path, dry_run: bool) -> Result<(), CommandError> {
        let args = script_args(dry_run);
        let command = std::iter::once(script.display().to_string())
            .chain(args.iter().map(|a| a.to_string()))
            .collect::<Vec<_>>()
            .join(" ");

        let status = Command::new(script)
            .args(&args)
            .current_dir(repo)
            .status()
            .map_err(|e| CommandError::new(&command, format!("failed to execute command: {}", e)))?;

        if status.success() {
            Ok(())
        } else {
            let message = match status.code() {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            };
            Err(CommandError::new(command, message))
        }
    }
}
