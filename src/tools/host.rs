//! Pull requests on the code host

use super::run_command;
use crate::error::CommandError;
use std::path::Path;

/// A pull request to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub title: String,
    pub body: String,
    /// Branch carrying the change
    pub head: String,
    /// Branch to merge into
    pub base: String,
}

/// What happened when a pull request was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestOutcome {
    /// Opened; carries the URL
    Created(String),
    /// A pull request for the head branch is already open
    AlreadyExists,
}

pub trait CodeHost {
    fn create_pull_request(
        &self,
        repo: &Path,
        request: &PullRequest,
    ) -> Result<PullRequestOutcome, CommandError>;
}

/// Opens pull requests with `gh pr create`
#[derive(Debug, Default)]
pub struct GhPullRequests;

impl GhPullRequests {
    pub fn new() -> Self {
        Self
    }
}

fn is_already_exists(stderr: &str) -> bool {
    stderr.contains("already exists")
}

impl CodeHost for GhPullRequests {
    fn create_pull_request(
        &self,
        repo: &Path,
        request: &PullRequest,
    ) -> Result<PullRequestOutcome, CommandError> {
        let output = run_command(
            "gh",
            &[
                "pr",
                "create",
                "--title",
                &request.title,
                "--body",
                &request.body,
                "--head",
                &request.head,
                "--base",
                &request.base,
            ],
            repo,
        );
        if !output.success && is_already_exists(&output.stderr) {
            return Ok(PullRequestOutcome::AlreadyExists);
        }
        let output = output.into_result()?;
        Ok(PullRequestOutcome::Created(output.stdout.trim().to_string()))
    }
}
