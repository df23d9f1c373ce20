//! Update judgment for dependency pins
//!
//! This module provides:
//! - The skew detector that decides whether a pin needs updating
//! - The planner that runs it over every edge of the registry

mod planner;

pub use planner::{PlanReport, UpdatePlanner};

use crate::domain::{Lookup, Version};

/// Outcome of judging one dependency edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The pin differs from the latest release
    Update,
    /// Nothing to do
    UpToDate,
    /// One side of the edge could not be resolved
    Undecidable(String),
}

/// Decides whether `current` must move to `latest`.
///
/// - pseudo → tagged: always an update
/// - pseudo → pseudo: never an update (pseudo-versions are not compared)
/// - tagged: an update iff the versions differ once a leading `v` is stripped.
///   This is an equality test, not an ordering, so an older "latest" still
///   counts as an update.
pub fn needs_update(current: &Version, latest: &Version) -> bool {
    if current.is_pseudo() {
        return latest.is_tagged();
    }
    current.stripped() != latest.stripped()
}

/// Judges an edge from its two lookups
pub fn decide(current: &Lookup, latest: &Lookup) -> Decision {
    match (current, latest) {
        (Lookup::Resolved(current), Lookup::Resolved(latest)) => {
            if needs_update(current, latest) {
                Decision::Update
            } else {
                Decision::UpToDate
            }
        }
        (Lookup::Resolved(_), unresolved) => Decision::Undecidable(format!(
            "latest version unknown: {}",
            unresolved.reason().unwrap_or_default()
        )),
        (unresolved, _) => Decision::Undecidable(format!(
            "current version unknown: {}",
            unresolved.reason().unwrap_or_default()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(current: &str, latest: &str) -> bool {
        needs_update(&Version::new(current), &Version::new(latest))
    }

    #[test]
    fn test_pseudo_to_tagged_needs_update() {
        assert!(check("v0.0.0-20251224004709-1f8c1de230b4", "v1.0.0"));
        assert!(check("v0.0.0-20240101-abc", "v0.0.0"));
    }

    #[test]
    fn test_pseudo_to_pseudo_never_updates() {
        assert!(!check(
            "v0.0.0-20240101000000-aaaa",
            "v0.0.0-20250101000000-bbbb"
        ));
    }

    #[test]
    fn test_tagged_equality() {
        assert!(!check("v1.2.3", "v1.2.3"));
        assert!(!check("v1.2.3", "1.2.3"));
        assert!(!check("1.2.3", "v1.2.3"));
    }

    #[test]
    fn test_tagged_inequality_ignores_direction() {
        assert!(check("v1.2.3", "v1.2.4"));
        assert!(check("v2.0.0", "v1.9.0"));
    }

    #[test]
    fn test_tagged_to_pseudo_is_an_update() {
        assert!(check("v1.0.0", "v1.0.1-0.20250101000000-abcdef"));
    }

    #[test]
    fn test_decide_resolved() {
        let current = Lookup::Resolved(Version::new("v1.0.0"));
        assert_eq!(
            decide(&current, &Lookup::Resolved(Version::new("v1.1.0"))),
            Decision::Update
        );
        assert_eq!(
            decide(&current, &Lookup::Resolved(Version::new("1.0.0"))),
            Decision::UpToDate
        );
    }

    #[test]
    fn test_decide_absent_short_circuits() {
        let resolved = Lookup::Resolved(Version::new("v1.0.0"));
        let missing = Lookup::NotConfigured("no releases".into());
        let offline = Lookup::Unreachable("timeout".into());

        assert!(matches!(
            decide(&resolved, &missing),
            Decision::Undecidable(reason) if reason.contains("no releases")
        ));
        assert!(matches!(
            decide(&offline, &resolved),
            Decision::Undecidable(reason) if reason.contains("timeout")
        ));
        assert!(matches!(decide(&missing, &offline), Decision::Undecidable(_)));
    }
}
