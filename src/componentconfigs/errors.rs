// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for component config operations.
//!
//! Every variant names the component group, and the version tag wherever
//! one was known, so an operator can tell which document to fix.

use thiserror::Error;

use crate::k8s::validation::ValidationError;
use crate::k8s::{ClusterError, DocumentError, VersionError};

#[derive(Error, Debug)]
pub enum ComponentConfigError {
    #[error("malformed {group}/{version} document: {reason}")]
    MalformedDocument {
        group: String,
        version: String,
        reason: String,
    },

    #[error(
        "unsupported version {version:?} for {group} (supported: {})",
        .supported.join(", ")
    )]
    UnsupportedVersion {
        group: String,
        version: String,
        supported: Vec<String>,
    },

    #[error(
        "{group} configuration in the cluster is at version {} and needs a local override at a supported version to proceed (preferred: {preferred})",
        display_version(.version)
    )]
    IncompatibleVersion {
        group: String,
        version: String,
        preferred: String,
    },

    #[error("failed to read {group} configuration from the cluster: {source}")]
    ClusterRead {
        group: String,
        #[source]
        source: ClusterError,
    },

    #[error("ConfigMap {namespace}/{name} holding {group} configuration has no {key:?} key")]
    MissingDataKey {
        group: String,
        namespace: String,
        name: String,
        key: String,
    },

    #[error("invalid {group} documents: {source}")]
    Document {
        group: String,
        #[source]
        source: DocumentError,
    },

    #[error("invalid storage key for {group}: {source}")]
    InvalidStorageKey {
        group: String,
        #[source]
        source: ValidationError,
    },

    #[error("invalid cluster version: {0}")]
    ClusterVersion(#[from] VersionError),

    #[error("value handed to the {group} handler belongs to another component")]
    ValueMismatch { group: String },

    #[error("no handler registered for {group}")]
    UnknownGroup { group: String },
}

fn display_version(version: &str) -> &str {
    if version.is_empty() {
        "unknown (legacy)"
    } else {
        version
    }
}

impl ComponentConfigError {
    /// The component group the error concerns, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::MalformedDocument { group, .. }
            | Self::UnsupportedVersion { group, .. }
            | Self::IncompatibleVersion { group, .. }
            | Self::ClusterRead { group, .. }
            | Self::MissingDataKey { group, .. }
            | Self::Document { group, .. }
            | Self::InvalidStorageKey { group, .. }
            | Self::ValueMismatch { group }
            | Self::UnknownGroup { group } => Some(group),
            Self::ClusterVersion(_) => None,
        }
    }
}
