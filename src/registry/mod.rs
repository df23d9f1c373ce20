//! Repository registry: the managed repositories and their direct dependencies
//!
//! This module provides:
//! - The static repository declarations (validated on construction)
//! - Dependency lookups by repository name
//! - Tier derivation by topological layering (see [`tiers`])

mod tiers;

pub use tiers::Tier;

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};

/// GitHub organization of the built-in repositories
pub const DEFAULT_ORG: &str = "livetemplate";

/// A managed repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name (also its directory name under the workspace root)
    pub name: String,
    /// Go module path other repositories require it by
    pub module: String,
    /// Names of repositories it depends on directly
    pub deps: Vec<String>,
}

impl Repository {
    /// Creates a repository whose module path follows the `github.com/<org>/<name>` convention
    pub fn new(org: &str, name: impl Into<String>, deps: &[&str]) -> Self {
        let name = name.into();
        Self {
            module: format!("github.com/{}/{}", org, name),
            name,
            deps: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Overrides the module path
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }
}

/// The set of managed repositories, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRegistry {
    org: String,
    repos: Vec<Repository>,
}

impl RepoRegistry {
    /// Creates a registry, rejecting duplicate names and dangling dependencies
    pub fn new(org: impl Into<String>, repos: Vec<Repository>) -> Result<Self, RegistryError> {
        for (i, repo) in repos.iter().enumerate() {
            if repos[..i].iter().any(|r| r.name == repo.name) {
                return Err(RegistryError::DuplicateRepository {
                    name: repo.name.clone(),
                });
            }
        }
        for repo in &repos {
            for dep in &repo.deps {
                if !repos.iter().any(|r| &r.name == dep) {
                    return Err(RegistryError::unknown_dependency(&repo.name, dep));
                }
            }
        }
        Ok(Self {
            org: org.into(),
            repos,
        })
    }

    /// The livetemplate repository family
    pub fn livetemplate() -> Self {
        Self::livetemplate_in(DEFAULT_ORG)
    }

    /// The livetemplate repository family, hosted under another organization
    pub fn livetemplate_in(org: &str) -> Self {
        let repos = vec![
            Repository::new(org, "livetemplate", &[]),
            Repository::new(org, "components", &["livetemplate"]),
            Repository::new(org, "lvt", &["livetemplate", "components"]),
            Repository::new(org, "tinkerdown", &["livetemplate", "components"]),
            Repository::new(org, "examples", &["livetemplate", "components", "lvt"]),
        ];
        Self {
            org: org.to_string(),
            repos,
        }
    }

    /// Code-hosting organization owning the repositories
    pub fn org(&self) -> &str {
        &self.org
    }

    /// All repositories, in declaration order
    pub fn all_repositories(&self) -> &[Repository] {
        &self.repos
    }

    /// Looks up a repository by name
    pub fn get(&self, name: &str) -> Result<&Repository, RegistryError> {
        self.repos
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RegistryError::unknown_repository(name))
    }

    /// Direct dependencies of a repository
    pub fn dependencies_of(&self, name: &str) -> Result<&[String], RegistryError> {
        self.get(name).map(|r| r.deps.as_slice())
    }

    /// Number of repositories
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// Returns true if no repositories are declared
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Partitions the repositories into release tiers
    pub fn tiers(&self) -> Result<Vec<Tier>, RegistryError> {
        tiers::layer(&self.repos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livetemplate_registry() {
        let registry = RepoRegistry::livetemplate();
        let names: Vec<&str> = registry
            .all_repositories()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["livetemplate", "components", "lvt", "tinkerdown", "examples"]
        );
        assert_eq!(registry.org(), "livetemplate");
    }

    #[test]
    fn test_module_path_convention() {
        let registry = RepoRegistry::livetemplate();
        assert_eq!(
            registry.get("lvt").unwrap().module,
            "github.com/livetemplate/lvt"
        );
    }

    #[test]
    fn test_dependencies_of() {
        let registry = RepoRegistry::livetemplate();
        assert!(registry.dependencies_of("livetemplate").unwrap().is_empty());
        assert_eq!(
            registry.dependencies_of("components").unwrap(),
            &["livetemplate".to_string()]
        );
    }

    #[test]
    fn test_dependencies_of_unknown() {
        let registry = RepoRegistry::livetemplate();
        assert_eq!(
            registry.dependencies_of("nope"),
            Err(RegistryError::unknown_repository("nope"))
        );
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let result = RepoRegistry::new(
            "acme",
            vec![Repository::new("acme", "a", &[]), Repository::new("acme", "a", &[])],
        );
        assert_eq!(
            result,
            Err(RegistryError::DuplicateRepository { name: "a".into() })
        );
    }

    #[test]
    fn test_new_rejects_unknown_dependency() {
        let result = RepoRegistry::new("acme", vec![Repository::new("acme", "a", &["ghost"])]);
        assert_eq!(result, Err(RegistryError::unknown_dependency("a", "ghost")));
    }

    #[test]
    fn test_with_module_override() {
        let repo = Repository::new("acme", "core", &[]).with_module("example.com/core/v2");
        assert_eq!(repo.module, "example.com/core/v2");
    }
}
