//! Dependency edges and the update plan built from them

use super::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A consumer's pin of one upstream repository, with the upstream's latest release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Repository whose manifest pins the dependency
    pub consumer: String,
    /// Upstream repository name
    pub dependency: String,
    /// Go module path of the upstream repository
    pub module: String,
    /// Version currently pinned by the consumer
    pub current: Version,
    /// Latest published release of the upstream repository
    pub latest: Version,
}

impl DependencyEdge {
    /// Creates a new edge
    pub fn new(
        consumer: impl Into<String>,
        dependency: impl Into<String>,
        module: impl Into<String>,
        current: Version,
        latest: Version,
    ) -> Self {
        Self {
            consumer: consumer.into(),
            dependency: dependency.into(),
            module: module.into(),
            current,
            latest,
        }
    }

    /// Classifies the bump for display
    pub fn change_kind(&self) -> ChangeKind {
        ChangeKind::between(&self.current, &self.latest)
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}: {} → {}",
            self.consumer, self.dependency, self.current, self.latest
        )
    }
}

/// An edge that produced no decision because a lookup did not resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEdge {
    pub consumer: String,
    pub dependency: String,
    pub reason: String,
}

/// Kind of version change, for display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Major component changed
    Major,
    /// Minor component changed
    Minor,
    /// Patch or pre-release changed
    Patch,
    /// Untagged commit to a tagged release
    Release,
    /// Anything that is not comparable as semver
    Retag,
}

impl ChangeKind {
    /// Classify the change between two versions
    pub fn between(current: &Version, latest: &Version) -> Self {
        if current.is_pseudo() && latest.is_tagged() {
            return ChangeKind::Release;
        }
        let parsed = (
            semver::Version::parse(current.stripped()),
            semver::Version::parse(latest.stripped()),
        );
        match parsed {
            (Ok(old), Ok(new)) => {
                if old.major != new.major {
                    ChangeKind::Major
                } else if old.minor != new.minor {
                    ChangeKind::Minor
                } else {
                    ChangeKind::Patch
                }
            }
            _ => ChangeKind::Retag,
        }
    }

    /// Plain label
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Major => "major",
            ChangeKind::Minor => "minor",
            ChangeKind::Patch => "patch",
            ChangeKind::Release => "release",
            ChangeKind::Retag => "?",
        }
    }
}

/// Pending updates of one consumer, in the order they were planned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub repository: String,
    pub updates: Vec<DependencyEdge>,
}

/// Updates required across the registry, grouped by consumer.
///
/// Built once by the planner and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePlan {
    entries: Vec<PlanEntry>,
}

impl UpdatePlan {
    /// Groups edges by consumer, keeping the first-seen order of consumers and
    /// the relative order of each consumer's edges
    pub fn from_edges(edges: impl IntoIterator<Item = DependencyEdge>) -> Self {
        let mut entries: Vec<PlanEntry> = Vec::new();
        for edge in edges {
            match entries.iter_mut().find(|e| e.repository == edge.consumer) {
                Some(entry) => entry.updates.push(edge),
                None => entries.push(PlanEntry {
                    repository: edge.consumer.clone(),
                    updates: vec![edge],
                }),
            }
        }
        Self { entries }
    }

    /// All entries, one per consumer with pending updates
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Pending updates of a consumer (empty if none)
    pub fn updates_for(&self, repository: &str) -> &[DependencyEdge] {
        self.entries
            .iter()
            .find(|e| e.repository == repository)
            .map(|e| e.updates.as_slice())
            .unwrap_or(&[])
    }

    /// Names of consumers with pending updates
    pub fn repositories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.repository.as_str())
    }

    /// Returns true if nothing needs updating
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of pending updates
    pub fn total_updates(&self) -> usize {
        self.entries.iter().map(|e| e.updates.len()).sum()
    }

    /// Iterates every pending edge
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.entries.iter().flat_map(|e| e.updates.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(consumer: &str, dep: &str, current: &str, latest: &str) -> DependencyEdge {
        DependencyEdge::new(
            consumer,
            dep,
            format!("github.com/livetemplate/{}", dep),
            Version::new(current),
            Version::new(latest),
        )
    }

    #[test]
    fn test_from_edges_groups_by_consumer() {
        let plan = UpdatePlan::from_edges(vec![
            edge("lvt", "livetemplate", "v1.0.0", "v1.1.0"),
            edge("examples", "livetemplate", "v1.0.0", "v1.1.0"),
            edge("lvt", "components", "v0.1.0", "v0.2.0"),
        ]);

        assert_eq!(plan.entries().len(), 2);
        assert_eq!(plan.total_updates(), 3);
        let lvt = plan.updates_for("lvt");
        assert_eq!(lvt.len(), 2);
        assert_eq!(lvt[0].dependency, "livetemplate");
        assert_eq!(lvt[1].dependency, "components");
        assert_eq!(
            plan.repositories().collect::<Vec<_>>(),
            vec!["lvt", "examples"]
        );
    }

    #[test]
    fn test_empty_plan() {
        let plan = UpdatePlan::default();
        assert!(plan.is_empty());
        assert_eq!(plan.total_updates(), 0);
        assert!(plan.updates_for("lvt").is_empty());
    }

    #[test]
    fn test_change_kind() {
        assert_eq!(
            edge("a", "b", "v1.0.0", "v2.0.0").change_kind(),
            ChangeKind::Major
        );
        assert_eq!(
            edge("a", "b", "v1.0.0", "v1.1.0").change_kind(),
            ChangeKind::Minor
        );
        assert_eq!(
            edge("a", "b", "v1.0.0", "v1.0.1").change_kind(),
            ChangeKind::Patch
        );
        assert_eq!(
            edge("a", "b", "v0.0.0-20240101000000-aaaa", "v1.0.0").change_kind(),
            ChangeKind::Release
        );
        assert_eq!(edge("a", "b", "v1", "v2").change_kind(), ChangeKind::Retag);
    }

    #[test]
    fn test_edge_display() {
        let e = edge("lvt", "livetemplate", "v1.0.0", "v1.1.0");
        assert_eq!(format!("{}", e), "lvt → livetemplate: v1.0.0 → v1.1.0");
    }
}
