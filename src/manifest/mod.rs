//! Manifest handling for managed repositories
//!
//! Every managed repository is a Go module; its pins live in `go.mod`.

pub mod go_mod;

use crate::domain::DependencyEdge;
use crate::error::ManifestError;
use std::path::{Path, PathBuf};

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "go.mod";

/// Path of a repository's manifest
pub fn manifest_path(repo_dir: &Path, manifest: &str) -> PathBuf {
    repo_dir.join(manifest)
}

/// Reads a manifest, distinguishing a missing file from an unreadable one
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ManifestError::not_found(path)
        } else {
            ManifestError::read_error(path, e)
        }
    })
}

/// Reads the version a manifest pins for `module`
pub fn pinned_version(path: &Path, module: &str) -> Result<String, ManifestError> {
    let content = read_manifest(path)?;
    go_mod::required_version(&content, module)
        .ok_or_else(|| ManifestError::module_not_required(path, module))
}

/// A manifest before and after a set of pin updates, computed without writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPreview {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

impl ManifestPreview {
    /// Applies `updates` to the manifest at `path` in memory
    pub fn compute(path: &Path, updates: &[DependencyEdge]) -> Result<Self, ManifestError> {
        let before = read_manifest(path)?;
        let mut after = before.clone();
        for update in updates {
            after = go_mod::update_version(path, &after, &update.module, update.latest.as_str())?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            before,
            after,
        })
    }

    pub fn is_changed(&self) -> bool {
        self.before != self.after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path(Path::new("/w/lvt"), DEFAULT_MANIFEST),
            PathBuf::from("/w/lvt/go.mod")
        );
    }

    #[test]
    fn test_read_manifest_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = read_manifest(&temp_dir.path().join("go.mod")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_pinned_version() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("go.mod");
        fs::write(&path, "module x\n\nrequire github.com/a/b v1.2.3\n").unwrap();

        assert_eq!(pinned_version(&path, "github.com/a/b").unwrap(), "v1.2.3");
        assert!(matches!(
            pinned_version(&path, "github.com/a/c"),
            Err(ManifestError::ModuleNotRequired { .. })
        ));
    }

    #[test]
    fn test_preview_does_not_write() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("go.mod");
        let original = "module x\n\nrequire (\n\tgithub.com/a/b v0.0.0-20240101-abc\n\tgithub.com/a/c v1.0.0\n)\n";
        fs::write(&path, original).unwrap();

        let updates = vec![DependencyEdge::new(
            "x",
            "b",
            "github.com/a/b",
            crate::domain::Version::new("v0.0.0-20240101-abc"),
            crate::domain::Version::new("v1.0.0"),
        )];
        let preview = ManifestPreview::compute(&path, &updates).unwrap();

        assert!(preview.is_changed());
        assert!(preview.after.contains("\tgithub.com/a/b v1.0.0\n"));
        assert!(preview.after.contains("github.com/a/c v1.0.0"));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }
}
