//! JSON output formatter for machine processing

use crate::output::{OutputFormatter, Verbosity};
use crate::registry::Tier;
use crate::update::PlanReport;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
    dry_run: bool,
}

impl JsonFormatter {
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self { verbosity, dry_run }
    }
}

#[derive(Serialize)]
struct JsonPlan {
    dry_run: bool,
    edges_checked: usize,
    updates: usize,
    repositories: Vec<JsonRepository>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<JsonSkip>,
}

#[derive(Serialize)]
struct JsonRepository {
    name: String,
    updates: Vec<JsonUpdate>,
}

#[derive(Serialize)]
struct JsonUpdate {
    dependency: String,
    module: String,
    from: String,
    to: String,
    kind: &'static str,
}

#[derive(Serialize)]
struct JsonSkip {
    consumer: String,
    dependency: String,
    reason: String,
}

#[derive(Serialize)]
struct JsonTiers<'a> {
    tiers: &'a [Tier],
}

impl OutputFormatter for JsonFormatter {
    fn format_plan(&self, report: &PlanReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let repositories = report
            .plan
            .entries()
            .iter()
            .map(|entry| JsonRepository {
                name: entry.repository.clone(),
                updates: entry
                    .updates
                    .iter()
                    .map(|edge| JsonUpdate {
                        dependency: edge.dependency.clone(),
                        module: edge.module.clone(),
                        from: edge.current.to_string(),
                        to: edge.latest.to_string(),
                        kind: edge.change_kind().label(),
                    })
                    .collect(),
            })
            .collect();

        // Skip reasons are only included in verbose mode
        let skipped = if self.verbosity == Verbosity::Verbose {
            report
                .skipped
                .iter()
                .map(|s| JsonSkip {
                    consumer: s.consumer.clone(),
                    dependency: s.dependency.clone(),
                    reason: s.reason.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let output = JsonPlan {
            dry_run: self.dry_run,
            edges_checked: report.edges_checked,
            updates: report.plan.total_updates(),
            repositories,
            skipped,
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }

    fn format_tiers(&self, tiers: &[Tier], writer: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &JsonTiers { tiers })?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyEdge, SkippedEdge, UpdatePlan, Version};

    fn report() -> PlanReport {
        PlanReport {
            plan: UpdatePlan::from_edges(vec![DependencyEdge::new(
                "components",
                "livetemplate",
                "github.com/livetemplate/livetemplate",
                Version::new("v1.1.0"),
                Version::new("v1.2.0"),
            )]),
            edges_checked: 7,
            skipped: vec![SkippedEdge {
                consumer: "examples".into(),
                dependency: "lvt".into(),
                reason: "no releases".into(),
            }],
        }
    }

    fn render(verbosity: Verbosity) -> serde_json::Value {
        let mut buf = Vec::new();
        JsonFormatter::new(verbosity, true)
            .format_plan(&report(), &mut buf)
            .unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn test_plan_json() {
        let json = render(Verbosity::Normal);
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["edges_checked"], 7);
        assert_eq!(json["updates"], 1);
        let update = &json["repositories"][0]["updates"][0];
        assert_eq!(json["repositories"][0]["name"], "components");
        assert_eq!(update["from"], "v1.1.0");
        assert_eq!(update["to"], "v1.2.0");
        assert_eq!(update["kind"], "minor");
        assert!(json.get("skipped").is_none());
    }

    #[test]
    fn test_verbose_plan_json_includes_skips() {
        let json = render(Verbosity::Verbose);
        assert_eq!(json["skipped"][0]["reason"], "no releases");
    }

    #[test]
    fn test_tiers_json() {
        let tiers = vec![Tier {
            index: 0,
            repositories: vec!["livetemplate".into()],
        }];
        let mut buf = Vec::new();
        JsonFormatter::new(Verbosity::Normal, false)
            .format_tiers(&tiers, &mut buf)
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["tiers"][0]["index"], 0);
        assert_eq!(json["tiers"][0]["repositories"][0], "livetemplate");
    }
}
