//! Application error types using thiserror
//!
//! Error hierarchy:
//! - RegistryError: Issues with the repository graph (unknown names, cycles)
//! - SourceError: Issues talking to the release source (gh CLI or GitHub API)
//! - ManifestError: Issues reading go.mod files
//! - ConfigError: Issues loading tierup.toml
//! - PrerequisiteError: Missing external tools
//! - CommandError: An external command that exited unsuccessfully
//! - SequencerError: Fatal failures of the release sequence
//!
//! The binary collects all of them through `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors related to the repository registry and its dependency graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Queried a repository that is not declared
    #[error("unknown repository '{name}'")]
    UnknownRepository { name: String },

    /// A repository depends on a name that is not declared
    #[error("repository '{repository}' depends on unknown repository '{dependency}'")]
    UnknownDependency {
        repository: String,
        dependency: String,
    },

    /// The same name was declared twice
    #[error("repository '{name}' is declared more than once")]
    DuplicateRepository { name: String },

    /// The dependency graph is not acyclic
    #[error("cyclic dependency between repositories: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

/// Errors related to querying the latest published release
#[derive(Error, Debug)]
pub enum SourceError {
    /// Repository (or its release list) not found
    #[error("repository '{repository}' not found on {source_name}")]
    NotFound {
        repository: String,
        source_name: String,
    },

    /// Network request failed
    #[error("failed to fetch releases of '{repository}' from {source_name}: {message}")]
    NetworkError {
        repository: String,
        source_name: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {source_name}")]
    RateLimitExceeded { source_name: String },

    /// Invalid response
    #[error("invalid response from {source_name} for '{repository}': {message}")]
    InvalidResponse {
        repository: String,
        source_name: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching releases of '{repository}' from {source_name}")]
    Timeout {
        repository: String,
        source_name: String,
    },

    /// Authentication error
    #[error("authentication failed for {source_name}: {message}")]
    AuthenticationError {
        source_name: String,
        message: String,
    },

    /// The release CLI exited unsuccessfully
    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },
}

/// Errors related to go.mod files
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The module has no require entry
    #[error("module '{module}' is not required in {path}")]
    ModuleNotRequired { path: PathBuf, module: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Invalid workspace root
    #[error("invalid workspace root '{path}': {message}")]
    InvalidRoot { path: PathBuf, message: String },

    /// The declared repositories do not form a valid graph
    #[error("invalid repository graph: {0}")]
    Graph(#[from] RegistryError),
}

/// Required external tools that are absent or not authenticated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing prerequisites: {}", .missing.join(", "))]
pub struct PrerequisiteError {
    pub missing: Vec<String>,
}

/// An external command that could not be run or exited unsuccessfully
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{command}` failed: {message}")]
pub struct CommandError {
    pub command: String,
    pub message: String,
}

impl CommandError {
    pub fn new(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Fatal failures of the tiered release sequence
#[derive(Error, Debug)]
pub enum SequencerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// One or more repositories failed preflight checks
    #[error("preflight failed: {}", preflight_summary(.missing, .dirty, .failing))]
    PreflightFailed {
        missing: Vec<String>,
        dirty: Vec<String>,
        failing: Vec<String>,
    },

    /// A repository's release procedure failed
    #[error("release of '{repository}' failed: {message}")]
    ReleaseFailed { repository: String, message: String },
}

fn preflight_summary(missing: &[String], dirty: &[String], failing: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing [{}]", missing.join(", ")));
    }
    if !dirty.is_empty() {
        parts.push(format!("uncommitted changes [{}]", dirty.join(", ")));
    }
    if !failing.is_empty() {
        parts.push(format!("failing tests [{}]", failing.join(", ")));
    }
    parts.join("; ")
}

impl RegistryError {
    /// Creates a new UnknownRepository error
    pub fn unknown_repository(name: impl Into<String>) -> Self {
        RegistryError::UnknownRepository { name: name.into() }
    }

    /// Creates a new UnknownDependency error
    pub fn unknown_dependency(repository: impl Into<String>, dependency: impl Into<String>) -> Self {
        RegistryError::UnknownDependency {
            repository: repository.into(),
            dependency: dependency.into(),
        }
    }
}

impl SourceError {
    /// Creates a new NotFound error
    pub fn not_found(repository: impl Into<String>, source_name: impl Into<String>) -> Self {
        SourceError::NotFound {
            repository: repository.into(),
            source_name: source_name.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        repository: impl Into<String>,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SourceError::NetworkError {
            repository: repository.into(),
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        repository: impl Into<String>,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SourceError::InvalidResponse {
            repository: repository.into(),
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(repository: impl Into<String>, source_name: impl Into<String>) -> Self {
        SourceError::Timeout {
            repository: repository.into(),
            source_name: source_name.into(),
        }
    }

    /// True when the source answered that nothing exists, as opposed to not answering
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ModuleNotRequired error
    pub fn module_not_required(path: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        ManifestError::ModuleNotRequired {
            path: path.into(),
            module: module.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_unknown_repository() {
        let err = RegistryError::unknown_repository("nope");
        assert_eq!(format!("{}", err), "unknown repository 'nope'");
    }

    #[test]
    fn test_registry_error_cycle_lists_path() {
        let err = RegistryError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("a -> b -> a"));
    }

    #[test]
    fn test_source_error_not_found() {
        let err = SourceError::not_found("livetemplate/lvt", "GitHub API");
        assert!(err.is_not_found());
        assert!(format!("{}", err).contains("livetemplate/lvt"));
    }

    #[test]
    fn test_source_error_network() {
        let err = SourceError::network_error("livetemplate/lvt", "gh", "connection refused");
        assert!(!err.is_not_found());
        assert!(format!("{}", err).contains("connection refused"));
    }

    #[test]
    fn test_manifest_error_module_not_required() {
        let err = ManifestError::module_not_required("/w/lvt/go.mod", "github.com/x/y");
        let msg = format!("{}", err);
        assert!(msg.contains("github.com/x/y"));
        assert!(msg.contains("go.mod"));
    }

    #[test]
    fn test_prerequisite_error_lists_all() {
        let err = PrerequisiteError {
            missing: vec!["gh".into(), "go".into()],
        };
        assert_eq!(format!("{}", err), "missing prerequisites: gh, go");
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::new("git push", "rejected");
        assert_eq!(format!("{}", err), "`git push` failed: rejected");
    }

    #[test]
    fn test_preflight_failed_lists_every_category() {
        let err = SequencerError::PreflightFailed {
            missing: vec!["a".into()],
            dirty: vec!["b".into()],
            failing: vec!["c".into()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("missing [a]"));
        assert!(msg.contains("uncommitted changes [b]"));
        assert!(msg.contains("failing tests [c]"));
    }

    #[test]
    fn test_config_error_from_registry_error() {
        let err: ConfigError = RegistryError::unknown_repository("x").into();
        assert!(format!("{}", err).contains("invalid repository graph"));
    }
}
