//! Version parsing and comparison
//!
//! Release tags may carry a leading `v`. The text must start with a
//! numeric `major.minor.patch` triple; anything after it is kept when it
//! forms valid semver pre-release or build metadata and dropped otherwise.

use crate::error::{Result, UpdateError};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static VERSION_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)").expect("version regex is valid"));

/// A parsed semantic version
#[derive(Debug, Clone)]
pub struct Version(semver::Version);

impl Version {
    /// Parse a version string, accepting an optional leading `v`
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let stripped = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let caps = VERSION_PREFIX_RE
            .captures(stripped)
            .ok_or_else(|| UpdateError::InvalidVersionFormat {
                version: text.to_string(),
            })?;

        if let Ok(full) = semver::Version::parse(stripped) {
            return Ok(Self(full));
        }

        let component = |i: usize| -> Result<u64> {
            caps[i].parse().map_err(|_| UpdateError::InvalidVersionFormat {
                version: text.to_string(),
            })
        };

        Ok(Self(semver::Version::new(
            component(1)?,
            component(2)?,
            component(3)?,
        )))
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

    /// Access the underlying semver value
    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Precedence ignores build metadata
        self.0.cmp_precedence(&other.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// True when `latest` is strictly newer than `current`
pub fn needs_update(current: &str, latest: &str) -> Result<bool> {
    let current = Version::parse(current)?;
    let latest = Version::parse(latest)?;
    Ok(latest > current)
}
