//! Go toolchain operations

use super::run_command;
use crate::error::CommandError;
use std::path::Path;

/// Module maintenance commands run in a consumer repository
pub trait PackageManager {
    /// Pins `module` at `version` (`go get module@version`)
    fn get(&self, repo: &Path, module: &str, version: &str) -> Result<(), CommandError>;
    /// Normalises the module file (`go mod tidy`)
    fn tidy(&self, repo: &Path) -> Result<(), CommandError>;
    /// Runs the repository's test suite
    fn test(&self, repo: &Path) -> Result<(), CommandError>;
}

/// Runs the installed `go`
#[derive(Debug, Default)]
pub struct SystemGo;

impl SystemGo {
    pub fn new() -> Self {
        Self
    }
}

/// `go get` argument for a module pin
pub fn module_query(module: &str, version: &str) -> String {
    format!("{}@{}", module, version)
}

impl PackageManager for SystemGo {
    fn get(&self, repo: &Path, module: &str, version: &str) -> Result<(), CommandError> {
        let query = module_query(module, version);
        run_command("go", &["get", &query], repo)
            .into_result()
            .map(drop)
    }

    fn tidy(&self, repo: &Path) -> Result<(), CommandError> {
        run_command("go", &["mod", "tidy"], repo)
            .into_result()
            .map(drop)
    }

    fn test(&self, repo: &Path) -> Result<(), CommandError> {
        run_command("go", &["test", "./..."], repo)
            .into_result()
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_query() {
        assert_eq!(
            module_query("github.com/livetemplate/livetemplate", "v0.8.1"),
            "github.com/livetemplate/livetemplate@v0.8.1"
        );
    }
}
