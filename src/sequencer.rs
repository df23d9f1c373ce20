//! Tiered release sequencer
//!
//! This module provides:
//! - Preflight checks over every managed repository
//! - The release workflow: preflight → tier release → dependency sync → gate
//! - Dry-run mode, which forwards `--dry-run` to release scripts and only
//!   previews dependency updates

use crate::applier::{ChangeApplier, SyncResult};
use crate::config::Workspace;
use crate::console::Console;
use crate::error::SequencerError;
use crate::oracle::VersionOracle;
use crate::registry::{RepoRegistry, Tier};
use crate::tools::Toolbox;
use crate::update::UpdatePlanner;

/// Outcome of the preflight checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreflightReport {
    missing: Vec<String>,
    dirty: Vec<String>,
    failing: Vec<String>,
}

impl PreflightReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty() && self.dirty.is_empty() && self.failing.is_empty()
    }

    /// Repositories without a working copy or manifest
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Repositories with uncommitted changes
    pub fn dirty(&self) -> &[String] {
        &self.dirty
    }

    /// Repositories whose tests fail
    pub fn failing(&self) -> &[String] {
        &self.failing
    }

    pub fn into_error(self) -> SequencerError {
        SequencerError::PreflightFailed {
            missing: self.missing,
            dirty: self.dirty,
            failing: self.failing,
        }
    }
}

/// Checks every repository before anything is released.
///
/// Clean and test checks only run for repositories that exist. Every
/// repository is checked even after a failure.
pub fn run_preflight(
    registry: &RepoRegistry,
    workspace: &Workspace,
    tools: &Toolbox<'_>,
    console: &Console,
) -> PreflightReport {
    let mut report = PreflightReport::default();

    for repo in registry.all_repositories() {
        let dir = workspace.repo_dir(&repo.name);
        if !dir.is_dir() || !workspace.manifest_path(&repo.name).is_file() {
            console.error(&format!("{}: not found at {}", repo.name, dir.display()));
            report.missing.push(repo.name.clone());
            continue;
        }

        match tools.vcs.is_clean(&dir) {
            Ok(true) => {}
            Ok(false) => {
                console.error(&format!("{}: uncommitted changes", repo.name));
                report.dirty.push(repo.name.clone());
            }
            Err(e) => {
                console.error(&format!("{}: {}", repo.name, e));
                report.dirty.push(repo.name.clone());
            }
        }

        console.detail(&format!("{}: go test ./...", repo.name));
        match tools.go.test(&dir) {
            Ok(()) => console.success(&format!("{}: ready", repo.name)),
            Err(e) => {
                console.error(&format!("{}: tests failed", repo.name));
                console.detail(&e.message);
                report.failing.push(repo.name.clone());
            }
        }
    }

    report
}

/// What happened in one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierReport {
    pub index: usize,
    /// Repositories whose release procedure ran
    pub released: Vec<String>,
    /// Repositories without a release script
    pub skipped: Vec<String>,
    /// Dependency sync outcomes after the tier's releases
    pub synced: Vec<SyncResult>,
}

/// State of a release run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    pub tiers: Vec<TierReport>,
    /// False when the operator stopped the run
    pub completed: bool,
}

/// Drives a release of every tier in dependency order
pub struct ReleaseSequencer<'a> {
    registry: &'a RepoRegistry,
    oracle: &'a VersionOracle,
    tools: Toolbox<'a>,
    console: Console,
    dry_run: bool,
}

impl<'a> ReleaseSequencer<'a> {
    pub fn new(
        registry: &'a RepoRegistry,
        oracle: &'a VersionOracle,
        tools: Toolbox<'a>,
        console: Console,
    ) -> Self {
        Self {
            registry,
            oracle,
            tools,
            console,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Runs the full sequence.
    ///
    /// A declined confirmation ends the run with `completed: false`; a failed
    /// preflight or release is an error.
    pub async fn run(&self) -> Result<ReleaseReport, SequencerError> {
        let tiers = self.registry.tiers()?;
        let workspace = self.oracle.workspace();
        let mut report = ReleaseReport::default();

        self.console.step("Preflight");
        let preflight = run_preflight(self.registry, workspace, &self.tools, &self.console);
        if !preflight.passed() {
            return Err(preflight.into_error());
        }

        self.console.step("Release plan");
        for tier in &tiers {
            self.console
                .info(&format!("  tier {}: {}", tier.index, tier.repositories.join(", ")));
        }
        if !self.dry_run
            && !self
                .tools
                .confirm
                .confirm(&format!("Release {} tiers?", tiers.len()))
        {
            self.console.info("Cancelled");
            return Ok(report);
        }

        for (position, tier) in tiers.iter().enumerate() {
            let tier_report = self.run_tier(tier, workspace).await?;
            report.tiers.push(tier_report);

            let is_last = position + 1 == tiers.len();
            if !self.dry_run && !is_last {
                let prompt = format!(
                    "Tier {} done. Merge its dependency pull requests, then continue to tier {}?",
                    tier.index,
                    tier.index + 1
                );
                if !self.tools.confirm.confirm(&prompt) {
                    self.console
                        .warn(&format!("Stopped after tier {}", tier.index));
                    return Ok(report);
                }
            }
        }

        report.completed = true;
        self.console.success("All tiers released");
        Ok(report)
    }

    async fn run_tier(
        &self,
        tier: &Tier,
        workspace: &Workspace,
    ) -> Result<TierReport, SequencerError> {
        self.console.step(&format!(
            "Tier {}: {}",
            tier.index,
            tier.repositories.join(", ")
        ));

        let mut released = Vec::new();
        let mut skipped = Vec::new();
        for name in &tier.repositories {
            let script = workspace.release_script_path(name);
            if !script.is_file() {
                self.console.warn(&format!(
                    "{}: no release script at {}, skipping",
                    name,
                    script.display()
                ));
                skipped.push(name.clone());
                continue;
            }

            self.console.info(&format!("Releasing {}", name));
            self.tools
                .release
                .release(&workspace.repo_dir(name), &script, self.dry_run)
                .map_err(|e| SequencerError::ReleaseFailed {
                    repository: name.clone(),
                    message: e.to_string(),
                })?;
            self.console.success(&format!("{} released", name));
            released.push(name.clone());
        }

        self.console.step("Dependency sync");
        let report = UpdatePlanner::new(self.registry, self.oracle)
            .with_progress(self.console.show_progress())
            .plan()
            .await;
        for skip in &report.skipped {
            self.console.detail(&format!(
                "{} → {}: {}",
                skip.consumer, skip.dependency, skip.reason
            ));
        }

        let synced = if report.plan.is_empty() {
            self.console.info("All dependencies up to date");
            Vec::new()
        } else {
            ChangeApplier::new(self.tools, workspace, self.console, self.dry_run)
                .apply_plan(&report.plan)
        };

        Ok(TierReport {
            index: tier.index,
            released,
            skipped,
            synced,
        })
    }
}
