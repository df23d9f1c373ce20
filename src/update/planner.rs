//! Update planner: runs the skew detector over every edge of the registry

use super::{decide, Decision};
use crate::domain::{DependencyEdge, Lookup, SkippedEdge, UpdatePlan};
use crate::oracle::VersionOracle;
use crate::progress::EdgeProgress;
use crate::registry::RepoRegistry;
use std::collections::HashMap;

/// Result of one planning pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    /// Updates grouped by consumer
    pub plan: UpdatePlan,
    /// Number of dependency edges examined
    pub edges_checked: usize,
    /// Edges left out because a lookup did not resolve
    pub skipped: Vec<SkippedEdge>,
}

/// Builds update plans from the registry and the version oracle
pub struct UpdatePlanner<'a> {
    registry: &'a RepoRegistry,
    oracle: &'a VersionOracle,
    show_progress: bool,
}

impl<'a> UpdatePlanner<'a> {
    pub fn new(registry: &'a RepoRegistry, oracle: &'a VersionOracle) -> Self {
        Self {
            registry,
            oracle,
            show_progress: false,
        }
    }

    /// Show a progress bar while querying
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Queries every edge and collects the required updates.
    ///
    /// The latest release of each dependency is asked for once per pass.
    pub async fn plan(&self) -> PlanReport {
        let total: usize = self
            .registry
            .all_repositories()
            .iter()
            .map(|r| r.deps.len())
            .sum();

        let mut progress = EdgeProgress::new(self.show_progress, total);

        let mut latest_cache: HashMap<&str, Lookup> = HashMap::new();
        let mut edges = Vec::new();
        let mut skipped = Vec::new();
        let mut edges_checked = 0;

        for consumer in self.registry.all_repositories() {
            for dep_name in &consumer.deps {
                progress.checking(&consumer.name, dep_name);
                edges_checked += 1;

                // Registry construction guarantees every dependency is declared
                let Ok(dependency) = self.registry.get(dep_name) else {
                    progress.checked();
                    continue;
                };

                if !latest_cache.contains_key(dep_name.as_str()) {
                    let lookup = self.oracle.latest_version(dependency).await;
                    latest_cache.insert(dep_name.as_str(), lookup);
                }
                let latest = &latest_cache[dep_name.as_str()];
                let current = self.oracle.current_version(consumer, dependency);

                match decide(&current, latest) {
                    Decision::Update => {
                        if let (Some(current), Some(latest)) = (current.version(), latest.version())
                        {
                            edges.push(DependencyEdge::new(
                                &consumer.name,
                                &dependency.name,
                                &dependency.module,
                                current.clone(),
                                latest.clone(),
                            ));
                        }
                    }
                    Decision::UpToDate => {}
                    Decision::Undecidable(reason) => skipped.push(SkippedEdge {
                        consumer: consumer.name.clone(),
                        dependency: dependency.name.clone(),
                        reason,
                    }),
                }
                progress.checked();
            }
        }
        progress.finish();

        PlanReport {
            plan: UpdatePlan::from_edges(edges),
            edges_checked,
            skipped,
        }
    }
}
