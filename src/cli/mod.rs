// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Command implementations behind the `component-configs` binary.
//!
//! Each command returns a process exit code:
//! 0 success, 1 manual upgrade required, 2 configuration error,
//! 3 cluster read error.

pub mod configs_cmd;
pub mod versions;
pub mod versions_format;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::componentconfigs::ComponentConfigError;
use crate::config::{ConfigError, ToolConfig};
use crate::k8s::{split_yaml_documents, ClusterConfiguration, ClusterError, DocumentError, DocumentMap, InMemoryClient};

pub use configs_cmd::{run_defaults, run_fetch};
pub use versions::run_versions;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_UPGRADE_REQUIRED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_CLUSTER_ERROR: i32 = 3;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no cluster snapshot configured (use --snapshot or COMPONENT_CONFIGS_CLUSTER_SNAPSHOT)")]
    NoSnapshot,

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid documents in {path}: {source}")]
    Documents {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error(transparent)]
    Component(#[from] ComponentConfigError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cluster(_) | Self::Component(ComponentConfigError::ClusterRead { .. }) => EXIT_CLUSTER_ERROR,
            _ => EXIT_CONFIG_ERROR,
        }
    }
}

/// Cluster configuration seeded from the tool configuration.
pub fn cluster_configuration(config: &ToolConfig) -> ClusterConfiguration {
    let mut cluster = ClusterConfiguration::with_kubernetes_version(config.kubernetes_version.clone());
    cluster.networking = config.networking.clone();
    cluster
}

/// Open the configured cluster snapshot.
pub fn load_cluster(config: &ToolConfig) -> Result<InMemoryClient, CliError> {
    let path = config.cluster_snapshot.as_ref().ok_or(CliError::NoSnapshot)?;
    Ok(InMemoryClient::from_snapshot_file(path)?)
}

/// Read and split a local document file. No file means no documents.
pub fn load_documents(path: Option<&Path>) -> Result<DocumentMap, CliError> {
    let Some(path) = path else {
        return Ok(DocumentMap::new());
    };
    let bytes = std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    split_yaml_documents(&bytes).map_err(|source| CliError::Documents {
        path: path.to_path_buf(),
        source,
    })
}
