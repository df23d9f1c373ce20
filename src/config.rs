//! Configuration loading
//!
//! Configuration comes from, in order of precedence:
//! - `--config <PATH>`
//! - `tierup.toml` in the current directory
//! - built-in defaults (the livetemplate repositories, checked out side by side in `..`)
//!
//! `--root` overrides the workspace root from any of them.

use crate::error::ConfigError;
use crate::manifest::DEFAULT_MANIFEST;
use crate::registry::{RepoRegistry, Repository, DEFAULT_ORG};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "tierup.toml";

/// Default location of each repository's release procedure
pub const DEFAULT_RELEASE_SCRIPT: &str = "scripts/release.sh";

/// Default branch pull requests target
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Where latest releases are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// `gh release list`
    #[default]
    Gh,
    /// GitHub REST API
    Api,
}

/// Layout of the local working copies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    manifest: String,
    release_script: PathBuf,
    base_branch: String,
}

impl Workspace {
    /// Working copies live in `root/<repository name>`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest: DEFAULT_MANIFEST.to_string(),
            release_script: PathBuf::from(DEFAULT_RELEASE_SCRIPT),
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    pub fn with_release_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.release_script = script.into();
        self
    }

    pub fn with_base_branch(mut self, branch: impl Into<String>) -> Self {
        self.base_branch = branch.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    pub fn manifest_name(&self) -> &str {
        &self.manifest
    }

    /// Working copy of a repository
    pub fn repo_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Manifest of a repository
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.repo_dir(name).join(&self.manifest)
    }

    /// Release procedure of a repository
    pub fn release_script_path(&self, name: &str) -> PathBuf {
        self.repo_dir(name).join(&self.release_script)
    }
}

/// Raw `tierup.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    org: Option<String>,
    root: Option<PathBuf>,
    base_branch: Option<String>,
    manifest: Option<String>,
    release_script: Option<PathBuf>,
    source: Option<SourceKind>,
    #[serde(default, rename = "repo")]
    repos: Vec<RepoEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RepoEntry {
    name: String,
    #[serde(default)]
    deps: Vec<String>,
    module: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub registry: RepoRegistry,
    pub workspace: Workspace,
    pub source: SourceKind,
}

impl Config {
    /// Built-in configuration rooted at `root`
    pub fn builtin(root: impl Into<PathBuf>) -> Self {
        Self {
            registry: RepoRegistry::livetemplate(),
            workspace: Workspace::new(root),
            source: SourceKind::default(),
        }
    }

    /// Parses TOML, resolving a relative `root` against `base_dir`
    pub fn from_toml_str(
        content: &str,
        origin: &Path,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            message: e.message().to_string(),
        })?;

        let org = file.org.unwrap_or_else(|| DEFAULT_ORG.to_string());
        let registry = if file.repos.is_empty() {
            RepoRegistry::livetemplate_in(&org)
        } else {
            let repos: Vec<Repository> = file
                .repos
                .into_iter()
                .map(|entry| {
                    let deps: Vec<&str> = entry.deps.iter().map(String::as_str).collect();
                    let repo = Repository::new(&org, entry.name.clone(), &deps);
                    match entry.module {
                        Some(module) => repo.with_module(module),
                        None => repo,
                    }
                })
                .collect();
            RepoRegistry::new(org, repos)?
        };
        registry.tiers()?;

        let root = match file.root {
            Some(root) if root.is_relative() => base_dir.join(root),
            Some(root) => root,
            None => base_dir.join(".."),
        };
        let mut workspace = Workspace::new(root);
        if let Some(manifest) = file.manifest {
            workspace = workspace.with_manifest(manifest);
        }
        if let Some(script) = file.release_script {
            workspace = workspace.with_release_script(script);
        }
        if let Some(branch) = file.base_branch {
            workspace = workspace.with_base_branch(branch);
        }

        Ok(Self {
            registry,
            workspace,
            source: file.source.unwrap_or_default(),
        })
    }

    /// Reads a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&content, path, base_dir)
    }

    /// Resolves configuration from CLI options
    pub fn load(
        explicit: Option<&Path>,
        root_override: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::builtin("..")
                }
            }
        };

        if let Some(root) = root_override {
            if !root.is_dir() {
                return Err(ConfigError::InvalidRoot {
                    path: root.to_path_buf(),
                    message: "not a directory".to_string(),
                });
            }
            config.workspace = config.workspace.with_root(root);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use std::fs;

    fn parse(content: &str) -> Result<Config, ConfigError> {
        Config::from_toml_str(content, Path::new("tierup.toml"), Path::new("/work/tools"))
    }

    #[test]
    fn test_builtin() {
        let config = Config::builtin("/work");
        assert_eq!(config.registry.len(), 5);
        assert_eq!(config.source, SourceKind::Gh);
        assert_eq!(config.workspace.repo_dir("lvt"), PathBuf::from("/work/lvt"));
        assert_eq!(
            config.workspace.manifest_path("lvt"),
            PathBuf::from("/work/lvt/go.mod")
        );
        assert_eq!(
            config.workspace.release_script_path("lvt"),
            PathBuf::from("/work/lvt/scripts/release.sh")
        );
        assert_eq!(config.workspace.base_branch(), "main");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.registry.len(), 5);
        assert_eq!(config.workspace.root(), Path::new("/work/tools/.."));
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
org = "acme"
root = "/src"
base_branch = "trunk"
manifest = "go.mod"
release_script = "release"
source = "api"

[[repo]]
name = "core"

[[repo]]
name = "app"
deps = ["core"]
module = "example.com/app"
"#,
        )
        .unwrap();

        assert_eq!(config.registry.org(), "acme");
        assert_eq!(config.registry.get("core").unwrap().module, "github.com/acme/core");
        assert_eq!(config.registry.get("app").unwrap().module, "example.com/app");
        assert_eq!(config.source, SourceKind::Api);
        assert_eq!(config.workspace.base_branch(), "trunk");
        assert_eq!(
            config.workspace.release_script_path("app"),
            PathBuf::from("/src/app/release")
        );
    }

    #[test]
    fn test_relative_root_resolves_against_config_dir() {
        let config = parse("root = \"repos\"").unwrap();
        assert_eq!(config.workspace.root(), Path::new("/work/tools/repos"));
    }

    #[test]
    fn test_org_without_repos_keeps_family() {
        let config = parse("org = \"fork\"").unwrap();
        assert_eq!(
            config.registry.get("lvt").unwrap().module,
            "github.com/fork/lvt"
        );
    }

    #[test]
    fn test_cycle_is_a_config_error() {
        let err = parse(
            r#"
[[repo]]
name = "a"
deps = ["b"]

[[repo]]
name = "b"
deps = ["a"]
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Graph(RegistryError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse("colour = true").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_load_with_root_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tierup.toml");
        fs::write(&path, "base_branch = \"dev\"\n").unwrap();

        let config = Config::load(Some(&path), Some(temp_dir.path())).unwrap();
        assert_eq!(config.workspace.root(), temp_dir.path());
        assert_eq!(config.workspace.base_branch(), "dev");
    }

    #[test]
    fn test_load_with_missing_root() {
        let err = Config::load(None, Some(Path::new("/definitely/not/here"))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoot { .. }));
    }
}
