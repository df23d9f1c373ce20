//! Release source backed by the `gh` CLI
//!
//! Runs `gh release list --repo <org>/<repo> --limit 1 --exclude-drafts --json tagName`
//! and reads the tag of the single entry returned, if any.

use crate::error::SourceError;
use crate::oracle::{Release, ReleaseSource};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// `gh release list` entry
#[derive(Debug, Deserialize)]
struct GhRelease {
    #[serde(rename = "tagName")]
    tag_name: String,
}

/// Release source that shells out to `gh`
#[derive(Debug, Default)]
pub struct GhCliSource;

impl GhCliSource {
    pub fn new() -> Self {
        Self
    }

    fn args(org: &str, repo: &str) -> Vec<String> {
        vec![
            "release".to_string(),
            "list".to_string(),
            "--repo".to_string(),
            format!("{}/{}", org, repo),
            "--limit".to_string(),
            "1".to_string(),
            "--exclude-drafts".to_string(),
            "--json".to_string(),
            "tagName".to_string(),
        ]
    }
}

/// Parses `gh release list --json tagName` output
fn parse_release_list(stdout: &str, slug: &str) -> Result<Option<Release>, SourceError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(None);
    }
    let releases: Vec<GhRelease> = serde_json::from_str(stdout)
        .map_err(|e| SourceError::invalid_response(slug, "gh", e.to_string()))?;
    Ok(releases
        .into_iter()
        .find(|r| !r.tag_name.trim().is_empty())
        .map(|r| Release::new(r.tag_name)))
}

/// Maps a failed `gh` invocation to an error, treating unknown repositories as not found
fn classify_failure(stderr: &str, slug: &str, command: String) -> SourceError {
    let lower = stderr.to_lowercase();
    if lower.contains("could not resolve to a repository") || lower.contains("not found") {
        SourceError::not_found(slug, "gh")
    } else if lower.contains("auth login") || lower.contains("authentication") {
        SourceError::AuthenticationError {
            source_name: "gh".to_string(),
            message: stderr.trim().to_string(),
        }
    } else {
        SourceError::CommandFailed {
            command,
            message: stderr.trim().to_string(),
        }
    }
}

#[async_trait]
impl ReleaseSource for GhCliSource {
    fn source_name(&self) -> &'static str {
        "gh"
    }

    async fn latest_release(&self, org: &str, repo: &str) -> Result<Option<Release>, SourceError> {
        let slug = format!("{}/{}", org, repo);
        let args = Self::args(org, repo);
        let command = format!("gh {}", args.join(" "));

        let output = Command::new("gh")
            .args(&args)
            .output()
            .await
            .map_err(|e| SourceError::CommandFailed {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr, &slug, command));
        }

        parse_release_list(&String::from_utf8_lossy(&output.stdout), &slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = GhCliSource::args("livetemplate", "lvt");
        assert_eq!(
            args.join(" "),
            "release list --repo livetemplate/lvt --limit 1 --exclude-drafts --json tagName"
        );
    }

    #[test]
    fn test_parse_release_list() {
        let release = parse_release_list(r#"[{"tagName":"v0.5.0"}]"#, "a/b")
            .unwrap()
            .unwrap();
        assert_eq!(release.tag, "v0.5.0");
    }

    #[test]
    fn test_parse_empty_release_list() {
        assert!(parse_release_list("[]", "a/b").unwrap().is_none());
        assert!(parse_release_list("", "a/b").unwrap().is_none());
    }

    #[test]
    fn test_parse_invalid_output() {
        let err = parse_release_list("not json", "a/b").unwrap_err();
        assert!(matches!(err, SourceError::InvalidResponse { .. }));
    }

    #[test]
    fn test_classify_failure() {
        let err = classify_failure(
            "GraphQL: Could not resolve to a Repository with the name 'a/b'.",
            "a/b",
            "gh release list".into(),
        );
        assert!(err.is_not_found());

        let err = classify_failure("To get started with GitHub CLI, please run:  gh auth login", "a/b", "gh".into());
        assert!(matches!(err, SourceError::AuthenticationError { .. }));

        let err = classify_failure("boom", "a/b", "gh".into());
        assert!(matches!(err, SourceError::CommandFailed { .. }));
    }
}
