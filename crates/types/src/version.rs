//! Software version strings used to tag saved configurations
//!
//! Versions are dotted numeric cores ("0.13.0", "1.2") with an optional
//! pre-release suffix ("0.14.0-beta.2") and optional build metadata
//! ("1.0.0+build.5"). Ordering follows the usual release rules:
//! - missing core segments count as zero, so "1.0" == "1.0.0"
//! - a pre-release sorts before its release
//! - build metadata never affects ordering

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Error raised for strings that are not dotted version numbers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("version string is empty")]
    Empty,
    #[error("version '{input}' has an empty segment")]
    EmptySegment { input: String },
    #[error("version '{input}' has a non-numeric segment '{segment}'")]
    InvalidSegment { input: String, segment: String },
    #[error("version '{input}' has a segment too large to compare: '{segment}'")]
    Overflow { input: String, segment: String },
    #[error("version '{input}' has an invalid pre-release identifier '{identifier}'")]
    InvalidPreRelease { input: String, identifier: String },
}

/// One dot-separated pre-release identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Identifier {
    // Variant order matters: numeric identifiers sort before alphanumeric ones.
    Numeric(u64),
    Alpha(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::Alpha(s) => f.write_str(s),
        }
    }
}

/// A parsed, totally ordered software version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    core: Vec<u64>,
    pre: Vec<Identifier>,
}

impl SchemaVersion {
    /// Build a release version from numeric segments
    pub fn new(segments: Vec<u64>) -> Self {
        Self {
            core: segments,
            pre: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[u64] {
        &self.core
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Core segment at `index`, zero past the end
    fn segment(&self, index: usize) -> u64 {
        self.core.get(index).copied().unwrap_or(0)
    }

    /// Core without trailing zero segments, the form used for equality and hashing
    fn significant_core(&self) -> &[u64] {
        let len = self
            .core
            .iter()
            .rposition(|&s| s != 0)
            .map_or(0, |i| i + 1);
        &self.core[..len]
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let unprefixed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        if unprefixed.is_empty() {
            return Err(VersionError::Empty);
        }

        // Build metadata is accepted and dropped
        let without_build = match unprefixed.split_once('+') {
            Some((version, _build)) => version,
            None => unprefixed,
        };
        let (core_str, pre_str) = match without_build.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (without_build, None),
        };

        let mut core = Vec::new();
        for segment in core_str.split('.') {
            if segment.is_empty() {
                return Err(VersionError::EmptySegment {
                    input: input.to_string(),
                });
            }
            if !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::InvalidSegment {
                    input: input.to_string(),
                    segment: segment.to_string(),
                });
            }
            let value = segment.parse::<u64>().map_err(|_| VersionError::Overflow {
                input: input.to_string(),
                segment: segment.to_string(),
            })?;
            core.push(value);
        }

        let mut pre = Vec::new();
        if let Some(pre_str) = pre_str {
            for identifier in pre_str.split('.') {
                let valid = !identifier.is_empty()
                    && identifier
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'-');
                if !valid {
                    return Err(VersionError::InvalidPreRelease {
                        input: input.to_string(),
                        identifier: identifier.to_string(),
                    });
                }
                if identifier.bytes().all(|b| b.is_ascii_digit()) {
                    let value = identifier.parse::<u64>().map_err(|_| VersionError::Overflow {
                        input: input.to_string(),
                        segment: identifier.to_string(),
                    })?;
                    pre.push(Identifier::Numeric(value));
                } else {
                    pre.push(Identifier::Alpha(identifier.to_string()));
                }
            }
        }

        Ok(Self { core, pre })
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchemaVersion> for String {
    fn from(version: SchemaVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core: Vec<String> = self.core.iter().map(|s| s.to_string()).collect();
        f.write_str(&core.join("."))?;
        if !self.pre.is_empty() {
            let pre: Vec<String> = self.pre.iter().map(|i| i.to_string()).collect();
            write!(f, "-{}", pre.join("."))?;
        }
        Ok(())
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.core.len().max(other.core.len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            // Lexicographic: element-wise, then the longer list wins
            (false, false) => self.pre.cmp(&other.pre),
        }
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SchemaVersion {}

impl Hash for SchemaVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_core().hash(state);
        self.pre.hash(state);
    }
}

/// Compare two version strings.
///
/// Returns `Less` when `a` is older than `b`, `Greater` when newer.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let a: SchemaVersion = a.parse()?;
    let b: SchemaVersion = b.parse()?;
    Ok(a.cmp(&b))
}
