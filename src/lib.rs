// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Versioned component configuration for cluster bootstrap and upgrade.
//!
//! The `componentconfigs` registry defaults, fetches, merges and reports on
//! the configuration of auxiliary cluster components (the node agent and
//! the network proxy). Each component may be stored at several API
//! versions; the registry decides which ones can be used as-is and which
//! need an operator-supplied override.

pub mod cli;
pub mod componentconfigs;
pub mod config;
pub mod k8s;
pub mod telemetry;

pub use componentconfigs::{
    ComponentConfig, ComponentConfigError, ComponentConfigHandler, ComponentConfigValue,
    ComponentConfigVersionState, ComponentConfigs, Registry, RegistryError,
};
pub use config::{ConfigError, ToolConfig};
pub use k8s::{ClusterClient, ClusterConfiguration, DocumentMap, InMemoryClient};
