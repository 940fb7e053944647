// crates/backdrop-core/src/core/version.rs
// ============================================================================
// Module: Backdrop Semantic Versions
// Description: Scenario document version parsing and ordering.
// Purpose: Drive major-version store resets with a comparable version type.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Scenario documents carry a `"MAJOR.MINOR.PATCH[-build]"` version string.
//! Ordering is lexicographic on `(major, minor, patch)`; build metadata is
//! retained for display only. A change in `major` triggers a scenario-scope
//! store reset via the manager.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Semantic version parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// Version string does not have three dotted numeric components.
    #[error("version must be MAJOR.MINOR.PATCH[-build]: {0}")]
    MalformedVersion(String),
    /// A numeric component failed to parse.
    #[error("non-numeric version component in: {0}")]
    NonNumericComponent(String),
}

// ============================================================================
// SECTION: Semantic Version
// ============================================================================

/// Parsed semantic version.
///
/// # Invariants
/// - Ordering and equality ignore `build`; build metadata is display-only.
#[derive(Debug, Clone, Eq)]
pub struct SemanticVersion {
    /// Major component; a change here resets scenario-scoped stores.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Optional build metadata after `-`.
    pub build: Option<String>,
}

impl SemanticVersion {
    /// Creates a version without build metadata.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            build: None,
        }
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        (self.major, self.minor, self.patch) == (other.major, other.minor, other.patch)
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (numbers, build) = match raw.split_once('-') {
            Some((numbers, build)) if !build.is_empty() => (numbers, Some(build.to_string())),
            Some((numbers, _)) => (numbers, None),
            None => (raw, None),
        };
        let mut parts = numbers.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VersionError::MalformedVersion(raw.to_string()));
        };
        let parse = |component: &str| {
            component
                .parse::<u64>()
                .map_err(|_| VersionError::NonNumericComponent(raw.to_string()))
        };
        Ok(Self {
            major: parse(major)?,
            minor: parse(minor)?,
            patch: parse(patch)?,
            build,
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(build) = &self.build {
            write!(f, "-{build}")?;
        }
        Ok(())
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
