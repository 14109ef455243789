//! Semantic version identifiers for mutable clinical resources
//!
//! Every resource carries a `meta.versionId` of the form
//! `MAJOR.MINOR.PATCH`. Updates bump either the major or the minor
//! component; the patch component is reserved for a finer-grained update
//! path that is not exposed at this layer and therefore never incremented
//! here.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored `versionId` that does not parse as three dot-separated
/// integers. Surfaced, not recovered: it indicates data corruption
/// upstream of the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed version identifier {value:?}: expected MAJOR.MINOR.PATCH")]
pub struct MalformedVersion {
    /// The raw string as found in the document.
    pub value: String,
}

/// Which component an update bumps.
///
/// `Major` marks a breaking change to the resource
/// (`MAJOR.MINOR.PATCH` → `(MAJOR+1).0.0`), `Minor` a compatible one
/// (`MAJOR.MINOR.PATCH` → `MAJOR.(MINOR+1).0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
}

/// A validated three-component version identifier.
///
/// Backed by [`semver::Version`], restricted to bare versions: parsing
/// rejects pre-release and build metadata in addition to anything that is
/// not three dot-separated integers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId(semver::Version);

impl VersionId {
    /// The version assigned to every newly created resource.
    pub fn initial() -> Self {
        VersionId(semver::Version::new(1, 0, 0))
    }

    /// Parse a stored `versionId` string.
    ///
    /// # Errors
    /// [`MalformedVersion`] when the string is not exactly
    /// `MAJOR.MINOR.PATCH` with integer components.
    pub fn parse(value: &str) -> Result<Self, MalformedVersion> {
        let malformed = || MalformedVersion {
            value: value.to_string(),
        };

        let version = semver::Version::parse(value).map_err(|_| malformed())?;
        if !version.pre.is_empty() || !version.build.is_empty() {
            return Err(malformed());
        }

        Ok(VersionId(version))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Produce the successor version under the bump policy.
    ///
    /// The result is strictly greater than `self` under the
    /// `(major, minor, patch)` ordering, which is what keeps version
    /// numbers for a given resource totally ordered and increasing.
    pub fn bump(&self, bump: VersionBump) -> VersionId {
        let next = match bump {
            VersionBump::Major => semver::Version::new(self.0.major + 1, 0, 0),
            VersionBump::Minor => semver::Version::new(self.0.major, self.0.minor + 1, 0),
        };
        VersionId(next)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for VersionId {
    type Err = MalformedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionId::parse(s)
    }
}

/// Ordering applied when listing version history.
///
/// `Lexical` compares raw `versionId` strings and is the default: it
/// mirrors the behavior of sorting on the stored string field, where
/// `"10.0.0"` sorts before `"2.0.0"`. `Numeric` compares parsed
/// `(major, minor, patch)` triples; identifiers that fail to parse fall
/// back to the lexical comparison so corrupt history remains listable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrder {
    #[default]
    Lexical,
    Numeric,
}

impl VersionOrder {
    /// Compare two raw `versionId` strings under this ordering.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            VersionOrder::Lexical => a.cmp(b),
            VersionOrder::Numeric => match (VersionId::parse(a), VersionId::parse(b)) {
                (Ok(left), Ok(right)) => left.cmp(&right),
                _ => a.cmp(b),
            },
        }
    }
}
