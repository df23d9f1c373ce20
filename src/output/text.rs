//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-repository update listing with colored change kinds
//! - Pseudo-version commit dates
//! - Skipped edges with reasons (verbose only)
//! - Release tier listing

use crate::domain::{ChangeKind, DependencyEdge, Version};
use crate::output::{OutputFormatter, Verbosity};
use crate::registry::Tier;
use crate::update::PlanReport;
use colored::Colorize;
use std::io::Write;

/// Colored label for a change kind
pub fn colored_label(kind: ChangeKind) -> String {
    match kind {
        ChangeKind::Major => kind.label().red().bold().to_string(),
        ChangeKind::Minor => kind.label().yellow().to_string(),
        ChangeKind::Patch => kind.label().green().to_string(),
        ChangeKind::Release => kind.label().cyan().to_string(),
        ChangeKind::Retag => kind.label().dimmed().to_string(),
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    dry_run: bool,
}

impl TextFormatter {
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self { verbosity, dry_run }
    }

    fn describe_version(version: &Version) -> String {
        match version.pseudo_timestamp() {
            Some(ts) => format!("{} ({})", version, ts.format("%Y-%m-%d")),
            None => version.to_string(),
        }
    }

    fn write_edge(&self, edge: &DependencyEdge, writer: &mut dyn Write) -> std::io::Result<()> {
        let current = if self.verbosity == Verbosity::Verbose {
            Self::describe_version(&edge.current)
        } else {
            edge.current.to_string()
        };
        writeln!(
            writer,
            "    {} {} → {} [{}]",
            edge.dependency,
            current.dimmed(),
            edge.latest.to_string().green(),
            colored_label(edge.change_kind())
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format_plan(&self, report: &PlanReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet && report.plan.is_empty() {
            return Ok(());
        }

        if report.plan.is_empty() {
            writeln!(
                writer,
                "{} All dependencies up to date ({} checked)",
                "✓".green(),
                report.edges_checked
            )?;
        } else {
            let prefix = if self.dry_run { "(dry-run) " } else { "" };
            for entry in report.plan.entries() {
                writeln!(writer, "  {}{}", prefix, entry.repository.bold())?;
                for edge in &entry.updates {
                    self.write_edge(edge, writer)?;
                }
            }
            writeln!(writer)?;
            writeln!(
                writer,
                "{} update(s) across {} repositories ({} edges checked)",
                report.plan.total_updates(),
                report.plan.entries().len(),
                report.edges_checked
            )?;
        }

        if !report.skipped.is_empty() {
            if self.verbosity == Verbosity::Verbose {
                writeln!(writer)?;
                writeln!(writer, "{}", "Skipped:".yellow())?;
                for skip in &report.skipped {
                    writeln!(
                        writer,
                        "    {} → {}: {}",
                        skip.consumer,
                        skip.dependency,
                        skip.reason.dimmed()
                    )?;
                }
            } else if self.verbosity == Verbosity::Normal {
                writeln!(
                    writer,
                    "{}",
                    format!(
                        "{} edge(s) skipped (use --verbose for details)",
                        report.skipped.len()
                    )
                    .yellow()
                )?;
            }
        }

        Ok(())
    }

    fn format_tiers(&self, tiers: &[Tier], writer: &mut dyn Write) -> std::io::Result<()> {
        for tier in tiers {
            writeln!(
                writer,
                "Tier {}: {}",
                tier.index,
                tier.repositories.join(", ")
            )?;
        }
        Ok(())
    }
}
