// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes release versions and API version tags.
//!
//! API version tags (`v1alpha0`, `v1beta1`, `v1`) are ordered the way the
//! API machinery orders them: major first, then GA > beta > alpha, then the
//! numeric suffix. Lexicographic order is wrong for these tags.

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("invalid Kubernetes version {value:?}: {source}")]
    InvalidKubernetesVersion {
        value: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid API version tag {0:?}")]
    InvalidApiVersion(String),
}

/// A Kubernetes release, e.g. `v1.30.2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KubernetesVersion(semver::Version);

impl KubernetesVersion {
    /// Parse `v1.30.2`, `1.30.2` or the short `v1.30` form.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let trimmed = raw.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let core = bare.split(['-', '+']).next().unwrap_or(bare);
        let candidate = if core.matches('.').count() == 1 {
            bare.replacen(core, &format!("{}.0", core), 1)
        } else {
            bare.to_string()
        };

        semver::Version::parse(&candidate)
            .map(Self)
            .map_err(|source| VersionError::InvalidKubernetesVersion {
                value: raw.to_string(),
                source,
            })
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// True if this release is `major.minor` or newer.
    pub fn at_least(&self, major: u64, minor: u64) -> bool {
        (self.0.major, self.0.minor) >= (major, minor)
    }
}

impl fmt::Display for KubernetesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Maturity level of an API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stability {
    Alpha,
    Beta,
    Stable,
}

/// A parsed API version tag such as `v1beta1`.
///
/// Field order matters: the derived ordering compares major, then
/// stability, then revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    major: u32,
    stability: Stability,
    revision: u32,
}

fn api_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^v([1-9][0-9]*)(?:(alpha|beta)([0-9]+))?$").expect("valid API version pattern")
    })
}

impl ApiVersion {
    pub fn parse(tag: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidApiVersion(tag.to_string());
        let caps = api_version_pattern().captures(tag).ok_or_else(invalid)?;

        let major = caps[1].parse().map_err(|_| invalid())?;
        let (stability, revision) = match (caps.get(2), caps.get(3)) {
            (Some(level), Some(rev)) => {
                let stability = if level.as_str() == "alpha" {
                    Stability::Alpha
                } else {
                    Stability::Beta
                };
                (stability, rev.as_str().parse().map_err(|_| invalid())?)
            }
            _ => (Stability::Stable, 0),
        };

        Ok(Self {
            major,
            stability,
            revision,
        })
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stability {
            Stability::Alpha => write!(f, "v{}alpha{}", self.major, self.revision),
            Stability::Beta => write!(f, "v{}beta{}", self.major, self.revision),
            Stability::Stable => write!(f, "v{}", self.major),
        }
    }
}

/// Compare two raw version tags.
///
/// Unparsable tags sort below every parsable one and among themselves
/// lexicographically, so the order stays total.
pub fn compare_version_tags(a: &str, b: &str) -> Ordering {
    match (ApiVersion::parse(a), ApiVersion::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
