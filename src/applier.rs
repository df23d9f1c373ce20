//! Applies a consumer's planned updates as a pull request
//!
//! A live run only starts from a clean working copy and works on a temporary
//! branch cut from the freshly pulled base branch. On failure the working
//! copy is put back on the branch it started on; the temporary branch is
//! reset and deleted only if this run created it.

use crate::config::Workspace;
use crate::console::Console;
use crate::domain::{DependencyEdge, UpdatePlan};
use crate::error::CommandError;
use crate::manifest::ManifestPreview;
use crate::tools::{PullRequest, PullRequestOutcome, Toolbox};
use std::cell::Cell;
use std::path::Path;

/// Branch prefix for update pull requests
pub const BRANCH_PREFIX: &str = "deps/update-";

/// Result of applying one consumer's updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A pull request was opened; carries its URL
    Opened(String),
    /// A pull request for the same branch is already open
    AlreadyOpen,
    /// The toolchain produced no diff
    NoChanges,
    /// Dry run; nothing was touched
    Previewed(ManifestPreview),
    /// The run failed and the working copy was restored
    Abandoned { reason: String },
}

impl ApplyOutcome {
    /// Whether the consumer now has (or already had) a pull request
    pub fn is_opened(&self) -> bool {
        matches!(self, ApplyOutcome::Opened(_) | ApplyOutcome::AlreadyOpen)
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, ApplyOutcome::Abandoned { .. })
    }
}

/// Outcome for one consumer of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub repository: String,
    pub outcome: ApplyOutcome,
}

/// `deps/update-<dep>-<version>[-<dep>-<version>…]`
pub fn branch_name(updates: &[DependencyEdge]) -> String {
    let parts: Vec<String> = updates
        .iter()
        .map(|u| format!("{}-{}", u.dependency, u.latest))
        .collect();
    format!("{}{}", BRANCH_PREFIX, parts.join("-"))
}

/// `chore(deps): update <dep> to <version>[, <dep> to <version>…]`
pub fn pr_title(updates: &[DependencyEdge]) -> String {
    let parts: Vec<String> = updates
        .iter()
        .map(|u| format!("{} to {}", u.dependency, u.latest))
        .collect();
    format!("chore(deps): update {}", parts.join(", "))
}

/// One line per bump: `- <module>: <current> → <latest>`
pub fn pr_body(updates: &[DependencyEdge]) -> String {
    updates
        .iter()
        .map(|u| format!("- {}: {} → {}", u.module, u.current, u.latest))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns planned updates into pull requests
pub struct ChangeApplier<'a> {
    tools: Toolbox<'a>,
    workspace: &'a Workspace,
    console: Console,
    dry_run: bool,
}

enum Applied {
    Pushed(PullRequestOutcome),
    Unchanged,
}

/// How far a live run moved the working copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Untouched,
    OnBase,
    Branched,
}

impl<'a> ChangeApplier<'a> {
    pub fn new(
        tools: Toolbox<'a>,
        workspace: &'a Workspace,
        console: Console,
        dry_run: bool,
    ) -> Self {
        Self {
            tools,
            workspace,
            console,
            dry_run,
        }
    }

    /// Applies `updates` to `repository`.
    ///
    /// Never fails: a failed run is reported as `Abandoned`.
    pub fn apply(&self, repository: &str, updates: &[DependencyEdge]) -> ApplyOutcome {
        if self.dry_run {
            return self.preview(repository, updates);
        }
        if updates.is_empty() {
            return ApplyOutcome::NoChanges;
        }

        let dir = self.workspace.repo_dir(repository);
        match self.tools.vcs.is_clean(&dir) {
            Ok(true) => {}
            Ok(false) => {
                return ApplyOutcome::Abandoned {
                    reason: "uncommitted changes in working copy".to_string(),
                }
            }
            Err(e) => {
                return ApplyOutcome::Abandoned {
                    reason: e.to_string(),
                }
            }
        }
        let original = match self.tools.vcs.current_branch(&dir) {
            Ok(branch) => branch,
            Err(e) => {
                return ApplyOutcome::Abandoned {
                    reason: e.to_string(),
                }
            }
        };
        let branch = branch_name(updates);

        let stage = Cell::new(Stage::Untouched);
        match self.run(&dir, &branch, updates, &stage) {
            Ok(Applied::Pushed(PullRequestOutcome::Created(url))) => {
                self.return_to(&dir, &original);
                ApplyOutcome::Opened(url)
            }
            Ok(Applied::Pushed(PullRequestOutcome::AlreadyExists)) => {
                self.return_to(&dir, &original);
                ApplyOutcome::AlreadyOpen
            }
            Ok(Applied::Unchanged) => {
                self.restore(&dir, &original, &branch, stage.get());
                ApplyOutcome::NoChanges
            }
            Err(e) => {
                self.restore(&dir, &original, &branch, stage.get());
                ApplyOutcome::Abandoned {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Applies every entry of `plan`, in plan order
    pub fn apply_plan(&self, plan: &UpdatePlan) -> Vec<SyncResult> {
        let mut results = Vec::new();
        for entry in plan.entries() {
            self.console.info(&format!(
                "Updating {} ({} dependencies)",
                entry.repository,
                entry.updates.len()
            ));
            let outcome = self.apply(&entry.repository, &entry.updates);
            match &outcome {
                ApplyOutcome::Opened(url) => self
                    .console
                    .success(&format!("{}: {}", entry.repository, url)),
                ApplyOutcome::AlreadyOpen => self.console.success(&format!(
                    "{}: pull request already open",
                    entry.repository
                )),
                ApplyOutcome::NoChanges => self.console.warn(&format!(
                    "{}: go get produced no changes",
                    entry.repository
                )),
                ApplyOutcome::Previewed(preview) => self.console.preview(preview),
                ApplyOutcome::Abandoned { reason } => self
                    .console
                    .warn(&format!("{}: skipped, {}", entry.repository, reason)),
            }
            results.push(SyncResult {
                repository: entry.repository.clone(),
                outcome,
            });
        }
        results
    }

    fn preview(&self, repository: &str, updates: &[DependencyEdge]) -> ApplyOutcome {
        let path = self.workspace.manifest_path(repository);
        match ManifestPreview::compute(&path, updates) {
            Ok(preview) => ApplyOutcome::Previewed(preview),
            Err(e) => ApplyOutcome::Abandoned {
                reason: e.to_string(),
            },
        }
    }

    fn run(
        &self,
        dir: &Path,
        branch: &str,
        updates: &[DependencyEdge],
        stage: &Cell<Stage>,
    ) -> Result<Applied, CommandError> {
        let vcs = self.tools.vcs;
        let base = self.workspace.base_branch();

        vcs.fetch(dir)?;
        vcs.checkout(dir, base)?;
        stage.set(Stage::OnBase);
        vcs.pull(dir)?;
        vcs.checkout_new(dir, branch)?;
        stage.set(Stage::Branched);
        self.console.detail(&format!("created branch {}", branch));

        for update in updates {
            self.console
                .detail(&format!("go get {}@{}", update.module, update.latest));
            self.tools.go.get(dir, &update.module, update.latest.as_str())?;
        }
        self.tools.go.tidy(dir)?;

        if !vcs.has_changes(dir)? {
            return Ok(Applied::Unchanged);
        }

        let title = pr_title(updates);
        vcs.add_all(dir)?;
        vcs.commit(dir, &title)?;
        vcs.push(dir, branch)?;

        let request = PullRequest {
            title,
            body: pr_body(updates),
            head: branch.to_string(),
            base: base.to_string(),
        };
        self.tools
            .host
            .create_pull_request(dir, &request)
            .map(Applied::Pushed)
    }

    fn return_to(&self, dir: &Path, original: &str) {
        if let Err(e) = self.tools.vcs.checkout(dir, original) {
            self.console
                .warn(&format!("could not return to {}: {}", original, e));
        }
    }

    /// Undoes what the run did up to `stage`.
    ///
    /// Best effort; each step runs even if an earlier one failed.
    fn restore(&self, dir: &Path, original: &str, branch: &str, stage: Stage) {
        match stage {
            Stage::Untouched => {}
            Stage::OnBase => self.return_to(dir, original),
            Stage::Branched => {
                if let Err(e) = self.tools.vcs.reset_hard(dir) {
                    self.console.detail(&format!("reset failed: {}", e));
                }
                self.return_to(dir, original);
                if original != branch {
                    if let Err(e) = self.tools.vcs.delete_branch(dir, branch) {
                        self.console.detail(&format!("branch cleanup failed: {}", e));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Version;

    fn edge(dep: &str, current: &str, latest: &str) -> DependencyEdge {
        DependencyEdge::new(
            "examples",
            dep,
            format!("github.com/livetemplate/{}", dep),
            Version::new(current),
            Version::new(latest),
        )
    }

    #[test]
    fn test_branch_name_single() {
        let updates = vec![edge("livetemplate", "v0.0.0-20240101-abc", "v1.0.0")];
        assert_eq!(branch_name(&updates), "deps/update-livetemplate-v1.0.0");
    }

    #[test]
    fn test_branch_name_multiple_keeps_plan_order() {
        let updates = vec![
            edge("livetemplate", "v1.0.0", "v1.1.0"),
            edge("lvt", "v0.2.0", "v0.3.0"),
        ];
        assert_eq!(
            branch_name(&updates),
            "deps/update-livetemplate-v1.1.0-lvt-v0.3.0"
        );
    }

    #[test]
    fn test_pr_title() {
        let updates = vec![
            edge("livetemplate", "v1.0.0", "v1.1.0"),
            edge("components", "v0.1.0", "v0.2.0"),
        ];
        assert_eq!(
            pr_title(&updates),
            "chore(deps): update livetemplate to v1.1.0, components to v0.2.0"
        );
    }

    #[test]
    fn test_pr_body() {
        let updates = vec![
            edge("livetemplate", "v1.0.0", "v1.1.0"),
            edge("lvt", "v0.0.0-20240101-abc", "v0.3.0"),
        ];
        assert_eq!(
            pr_body(&updates),
            "- github.com/livetemplate/livetemplate: v1.0.0 → v1.1.0\n\
             - github.com/livetemplate/lvt: v0.0.0-20240101-abc → v0.3.0"
        );
    }

    #[test]
    fn test_outcome_predicates() {
        assert!(ApplyOutcome::Opened("u".into()).is_opened());
        assert!(ApplyOutcome::AlreadyOpen.is_opened());
        assert!(!ApplyOutcome::NoChanges.is_opened());
        assert!(ApplyOutcome::Abandoned {
            reason: "x".into()
        }
        .is_abandoned());
    }
}
