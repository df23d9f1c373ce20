//! Version oracle: latest published releases and currently pinned versions
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - GitHub REST API release source
//! - `gh` CLI release source
//! - The oracle that turns every lookup into a [`Lookup`], never an error

mod client;
mod gh_cli;
mod github;

pub use client::HttpClient;
pub use gh_cli::GhCliSource;
pub use github::GitHubApiSource;

use crate::config::{SourceKind, Workspace};
use crate::domain::{Lookup, Version};
use crate::error::{ManifestError, SourceError};
use crate::manifest;
use crate::registry::Repository;
use async_trait::async_trait;

/// A published release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
}

impl Release {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Where latest releases come from
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Name used in error messages
    fn source_name(&self) -> &'static str;

    /// Most recent non-draft release of `org/repo`, or `None` when nothing is published
    async fn latest_release(&self, org: &str, repo: &str) -> Result<Option<Release>, SourceError>;
}

/// Create the release source selected in the configuration
pub fn create_source(kind: SourceKind) -> Result<Box<dyn ReleaseSource>, SourceError> {
    match kind {
        SourceKind::Gh => Ok(Box::new(GhCliSource::new())),
        SourceKind::Api => {
            let token = std::env::var("GITHUB_TOKEN")
                .or_else(|_| std::env::var("GH_TOKEN"))
                .ok();
            let client = HttpClient::new()?.with_token(token);
            Ok(Box::new(GitHubApiSource::new(client)))
        }
    }
}

/// Read-only queries over the release source and the local working copies
pub struct VersionOracle {
    source: Box<dyn ReleaseSource>,
    workspace: Workspace,
    org: String,
}

impl VersionOracle {
    /// Create an oracle for repositories of `org` checked out under `workspace`
    pub fn new(source: Box<dyn ReleaseSource>, workspace: Workspace, org: impl Into<String>) -> Self {
        Self {
            source,
            workspace,
            org: org.into(),
        }
    }

    /// Workspace the oracle reads manifests from
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Latest published version of a repository
    pub async fn latest_version(&self, repo: &Repository) -> Lookup {
        match self.source.latest_release(&self.org, &repo.name).await {
            Ok(Some(release)) => Lookup::Resolved(Version::new(release.tag)),
            Ok(None) => Lookup::NotConfigured(format!(
                "no releases published for {}/{}",
                self.org, repo.name
            )),
            Err(e) if e.is_not_found() => Lookup::NotConfigured(e.to_string()),
            Err(e) => Lookup::Unreachable(e.to_string()),
        }
    }

    /// Version of `dependency` pinned in `consumer`'s manifest
    pub fn current_version(&self, consumer: &Repository, dependency: &Repository) -> Lookup {
        let dir = self.workspace.repo_dir(&consumer.name);
        if !dir.is_dir() {
            return Lookup::NotConfigured(format!("working copy not found: {}", dir.display()));
        }

        let path = self.workspace.manifest_path(&consumer.name);
        match manifest::pinned_version(&path, &dependency.module) {
            Ok(version) => Lookup::Resolved(Version::new(version)),
            Err(e @ ManifestError::NotFound { .. })
            | Err(e @ ManifestError::ModuleNotRequired { .. }) => {
                Lookup::NotConfigured(e.to_string())
            }
            Err(e) => Lookup::Unreachable(e.to_string()),
        }
    }
}
