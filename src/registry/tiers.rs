//! Release tiers derived from the dependency graph
//!
//! A repository's layer is 0 when it has no dependencies, otherwise one more
//! than the highest layer among its dependencies. Every dependency therefore
//! sits in a strictly lower tier than its consumers.

use super::Repository;
use crate::error::RegistryError;
use serde::Serialize;
use std::collections::HashMap;

/// One release tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
    /// Zero-based position in the release sequence
    pub index: usize,
    /// Repository names, in registry declaration order
    pub repositories: Vec<String>,
}

impl Tier {
    /// Returns true if the tier contains the repository
    pub fn contains(&self, name: &str) -> bool {
        self.repositories.iter().any(|r| r == name)
    }
}

pub(super) fn layer(repos: &[Repository]) -> Result<Vec<Tier>, RegistryError> {
    let mut layers: HashMap<&str, usize> = HashMap::new();
    for repo in repos {
        let mut path = Vec::new();
        visit(repo.name.as_str(), repos, &mut layers, &mut path)?;
    }

    let depth = layers.values().max().map(|m| m + 1).unwrap_or(0);
    let mut tiers: Vec<Tier> = (0..depth)
        .map(|index| Tier {
            index,
            repositories: Vec::new(),
        })
        .collect();
    for repo in repos {
        if let Some(&l) = layers.get(repo.name.as_str()) {
            tiers[l].repositories.push(repo.name.clone());
        }
    }
    Ok(tiers)
}

fn visit<'a>(
    name: &'a str,
    repos: &'a [Repository],
    layers: &mut HashMap<&'a str, usize>,
    path: &mut Vec<&'a str>,
) -> Result<usize, RegistryError> {
    if let Some(&l) = layers.get(name) {
        return Ok(l);
    }
    if let Some(pos) = path.iter().position(|p| *p == name) {
        let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
        cycle.push(name.to_string());
        return Err(RegistryError::CyclicDependency { cycle });
    }

    let repo = repos
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| RegistryError::unknown_repository(name))?;

    path.push(name);
    let mut layer = 0;
    for dep in &repo.deps {
        layer = layer.max(visit(dep.as_str(), repos, layers, path)? + 1);
    }
    path.pop();

    layers.insert(name, layer);
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RepoRegistry;

    fn names(tiers: &[Tier]) -> Vec<Vec<&str>> {
        tiers
            .iter()
            .map(|t| t.repositories.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_livetemplate_has_four_tiers() {
        let tiers = RepoRegistry::livetemplate().tiers().unwrap();
        assert_eq!(
            names(&tiers),
            vec![
                vec!["livetemplate"],
                vec!["components"],
                vec!["lvt", "tinkerdown"],
                vec!["examples"],
            ]
        );
        assert_eq!(tiers[2].index, 2);
    }

    #[test]
    fn test_every_dependency_is_in_an_earlier_tier() {
        let registry = RepoRegistry::livetemplate();
        let tiers = registry.tiers().unwrap();
        let tier_of = |name: &str| tiers.iter().position(|t| t.contains(name)).unwrap();

        for repo in registry.all_repositories() {
            for dep in &repo.deps {
                assert!(
                    tier_of(dep) < tier_of(&repo.name),
                    "{} must be released before {}",
                    dep,
                    repo.name
                );
            }
        }
    }

    #[test]
    fn test_tiers_ignore_declaration_order() {
        let registry = RepoRegistry::new(
            "acme",
            vec![
                Repository::new("acme", "app", &["lib"]),
                Repository::new("acme", "lib", &["core"]),
                Repository::new("acme", "core", &[]),
            ],
        )
        .unwrap();
        assert_eq!(
            names(&registry.tiers().unwrap()),
            vec![vec!["core"], vec!["lib"], vec!["app"]]
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let registry = RepoRegistry::new(
            "acme",
            vec![
                Repository::new("acme", "a", &["b"]),
                Repository::new("acme", "b", &["c"]),
                Repository::new("acme", "c", &["a"]),
            ],
        )
        .unwrap();
        match registry.tiers() {
            Err(RegistryError::CyclicDependency { cycle }) => {
                assert_eq!(cycle, vec!["a", "b", "c", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let registry =
            RepoRegistry::new("acme", vec![Repository::new("acme", "a", &["a"])]).unwrap();
        assert!(matches!(
            registry.tiers(),
            Err(RegistryError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_empty_registry_has_no_tiers() {
        let registry = RepoRegistry::new("acme", Vec::new()).unwrap();
        assert!(registry.tiers().unwrap().is_empty());
    }
}
