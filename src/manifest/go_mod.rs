//! go.mod reader and writer
//!
//! Handles:
//! - require statements (single and block)
//! - `// indirect` markers
//! - replace directives (ignored; they are local overrides, not pins)

use crate::error::ManifestError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

// require module/path v1.2.3 [// comment]
static SINGLE_REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*require\s+(\S+)\s+(v[\d]+\.[\d]+\.[\d]+[^\s]*)\s*(//.*)?\s*$").unwrap()
});

// module/path v1.2.3 [// comment]
static BLOCK_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)\s+(v[\d]+\.[\d]+\.[\d]+[^\s]*)\s*(//.*)?\s*$").unwrap()
});

/// A single require entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub module: String,
    pub version: String,
    pub indirect: bool,
}

/// Lists the require entries of a go.mod
pub fn parse(content: &str) -> Vec<Requirement> {
    let mut requirements = Vec::new();
    let mut in_require_block = false;
    let mut in_replace_block = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        if trimmed.starts_with("require (") {
            in_require_block = true;
            continue;
        }
        if trimmed.starts_with("replace (") {
            in_replace_block = true;
            continue;
        }
        if trimmed == ")" {
            in_require_block = false;
            in_replace_block = false;
            continue;
        }

        if in_replace_block || trimmed.starts_with("replace ") {
            continue;
        }

        let caps = if let Some(caps) = SINGLE_REQUIRE_RE.captures(trimmed) {
            caps
        } else if in_require_block {
            match BLOCK_ENTRY_RE.captures(trimmed) {
                Some(caps) => caps,
                None => continue,
            }
        } else {
            continue;
        };

        let comment = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        requirements.push(Requirement {
            module: caps[1].to_string(),
            version: caps[2].to_string(),
            indirect: comment.contains("indirect"),
        });
    }

    requirements
}

/// Version the go.mod requires for a module, if any
pub fn required_version(content: &str, module: &str) -> Option<String> {
    parse(content)
        .into_iter()
        .find(|r| r.module == module)
        .map(|r| r.version)
}

/// Rewrites the require entry of `module` to `new_version`.
///
/// Indentation and trailing comments are preserved; a missing `v` prefix is added.
pub fn update_version(
    path: &Path,
    content: &str,
    module: &str,
    new_version: &str,
) -> Result<String, ManifestError> {
    let mut result = String::with_capacity(content.len());
    let mut updated = false;
    let mut in_require_block = false;

    let new_ver = if new_version.starts_with('v') {
        new_version.to_string()
    } else {
        format!("v{}", new_version)
    };

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("require (") {
            in_require_block = true;
        } else if trimmed == ")" {
            in_require_block = false;
        }

        let mut replacement = None;
        if trimmed.contains(module) {
            if let Some(caps) = SINGLE_REQUIRE_RE.captures(trimmed) {
                if &caps[1] == module {
                    replacement = Some(match caps.get(3) {
                        Some(comment) => {
                            format!("require {} {} {}", module, new_ver, comment.as_str())
                        }
                        None => format!("require {} {}", module, new_ver),
                    });
                }
            } else if in_require_block {
                if let Some(caps) = BLOCK_ENTRY_RE.captures(trimmed) {
                    if &caps[1] == module {
                        let leading_ws = line.len() - line.trim_start().len();
                        let indent = &line[..leading_ws];
                        replacement = Some(match caps.get(3) {
                            Some(comment) => {
                                format!("{}{} {} {}", indent, module, new_ver, comment.as_str())
                            }
                            None => format!("{}{} {}", indent, module, new_ver),
                        });
                    }
                }
            }
        }

        match replacement {
            Some(new_line) => {
                updated = true;
                result.push_str(&new_line);
            }
            None => result.push_str(line),
        }
        result.push('\n');
    }

    if !content.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    if updated {
        Ok(result)
    } else {
        Err(ManifestError::module_not_required(path, module))
    }
}
