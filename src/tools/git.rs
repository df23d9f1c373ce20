//! Git operations on a repository working copy

use super::run_command;
use crate::error::CommandError;
use std::path::Path;

/// Version control operations used by the sync and release commands
pub trait Vcs {
    /// True when the working tree has no uncommitted changes
    fn is_clean(&self, repo: &Path) -> Result<bool, CommandError>;
    fn current_branch(&self, repo: &Path) -> Result<String, CommandError>;
    fn fetch(&self, repo: &Path) -> Result<(), CommandError>;
    fn checkout(&self, repo: &Path, branch: &str) -> Result<(), CommandError>;
    /// Creates `branch` at HEAD and switches to it, replacing a stale branch of the same name
    fn checkout_new(&self, repo: &Path, branch: &str) -> Result<(), CommandError>;
    fn pull(&self, repo: &Path) -> Result<(), CommandError>;
    fn delete_branch(&self, repo: &Path, branch: &str) -> Result<(), CommandError>;
    /// True when staged or unstaged changes exist
    fn has_changes(&self, repo: &Path) -> Result<bool, CommandError> {
        self.is_clean(repo).map(|clean| !clean)
    }
    fn add_all(&self, repo: &Path) -> Result<(), CommandError>;
    fn commit(&self, repo: &Path, message: &str) -> Result<(), CommandError>;
    fn push(&self, repo: &Path, branch: &str) -> Result<(), CommandError>;
    /// Discards every uncommitted change
    fn reset_hard(&self, repo: &Path) -> Result<(), CommandError>;
}

/// Runs the installed `git`
#[derive(Debug, Default)]
pub struct SystemGit;

impl SystemGit {
    pub fn new() -> Self {
        Self
    }

    fn git(&self, repo: &Path, args: &[&str]) -> Result<String, CommandError> {
        run_command("git", args, repo)
            .into_result()
            .map(|output| output.stdout)
    }
}

impl Vcs for SystemGit {
    fn is_clean(&self, repo: &Path) -> Result<bool, CommandError> {
        let status = self.git(repo, &["status", "--porcelain"])?;
        Ok(status.trim().is_empty())
    }

    fn current_branch(&self, repo: &Path) -> Result<String, CommandError> {
        let branch = self.git(repo, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(branch.trim().to_string())
    }

    fn fetch(&self, repo: &Path) -> Result<(), CommandError> {
        self.git(repo, &["fetch", "origin"]).map(drop)
    }

    fn checkout(&self, repo: &Path, branch: &str) -> Result<(), CommandError> {
        self.git(repo, &["checkout", branch]).map(drop)
    }

    fn checkout_new(&self, repo: &Path, branch: &str) -> Result<(), CommandError> {
        self.git(repo, &["checkout", "-B", branch]).map(drop)
    }

    fn pull(&self, repo: &Path) -> Result<(), CommandError> {
        self.git(repo, &["pull", "--ff-only"]).map(drop)
    }

    fn delete_branch(&self, repo: &Path, branch: &str) -> Result<(), CommandError> {
        self.git(repo, &["branch", "-D", branch]).map(drop)
    }

    fn add_all(&self, repo: &Path) -> Result<(), CommandError> {
        self.git(repo, &["add", "-A"]).map(drop)
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<(), CommandError> {
        self.git(repo, &["commit", "-m", message]).map(drop)
    }

    fn push(&self, repo: &Path, branch: &str) -> Result<(), CommandError> {
        self.git(repo, &["push", "--force-with-lease", "-u", "origin", branch])
            .map(drop)
    }

    fn reset_hard(&self, repo: &Path) -> Result<(), CommandError> {
        self.git(repo, &["reset", "--hard"]).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_outside_repository_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let git = SystemGit::new();
        // Fails whether or not git is installed
        let err = git.current_branch(temp_dir.path()).unwrap_err();
        assert!(err.command.starts_with("git rev-parse"));
    }
}
