//! Version strings and lookup outcomes

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A version string as pinned in a go.mod or published as a release tag.
///
/// Versions are opaque: the only structure recognized is the leading `v` and
/// whether the string carries a `-<suffix>` (a pseudo-version pinned to an
/// untagged commit, e.g. `v0.0.0-20251224004709-1f8c1de230b4`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Creates a version from its raw string, trimming surrounding whitespace
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self(raw.trim().to_string())
    }

    /// Returns the raw string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the version with a single leading `v` removed
    pub fn stripped(&self) -> &str {
        self.0.strip_prefix('v').unwrap_or(&self.0)
    }

    /// Returns true for pseudo-versions (any `-` followed by a suffix)
    pub fn is_pseudo(&self) -> bool {
        match self.stripped().split_once('-') {
            Some((_, suffix)) => !suffix.is_empty(),
            None => false,
        }
    }

    /// Returns true for tagged releases
    pub fn is_tagged(&self) -> bool {
        !self.is_pseudo()
    }

    /// Commit timestamp encoded in a Go pseudo-version, if present
    pub fn pseudo_timestamp(&self) -> Option<chrono::DateTime<Utc>> {
        if !self.is_pseudo() {
            return None;
        }
        // vX.Y.Z-[pre.]yyyymmddhhmmss-abcdefabcdef
        let mut parts = self.stripped().rsplit('-');
        let _hash = parts.next()?;
        let stamp = parts.next()?;
        let stamp = stamp.rsplit('.').next().unwrap_or(stamp);
        if stamp.len() != 14 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S").ok()?;
        Some(Utc.from_utc_datetime(&naive))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Version::new(raw)
    }
}

/// Outcome of a version lookup.
///
/// Lookups never fail the run: an unresolved lookup only removes the edge it
/// belongs to from consideration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The version is known
    Resolved(Version),
    /// The lookup was attempted but the external service or file could not be reached
    Unreachable(String),
    /// There is nothing to find (no release published, no manifest entry)
    NotConfigured(String),
}

impl Lookup {
    /// Returns the resolved version, if any
    pub fn version(&self) -> Option<&Version> {
        match self {
            Lookup::Resolved(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if the lookup produced a version
    pub fn is_resolved(&self) -> bool {
        matches!(self, Lookup::Resolved(_))
    }

    /// Human-readable reason for an unresolved lookup
    pub fn reason(&self) -> Option<&str> {
        match self {
            Lookup::Resolved(_) => None,
            Lookup::Unreachable(reason) | Lookup::NotConfigured(reason) => Some(reason),
        }
    }
}
