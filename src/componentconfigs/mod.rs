// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Versioned component configuration.
//!
//! A `Registry` of handlers, one per component group, drives four
//! operations on the aggregate held by `ClusterConfiguration`:
//! defaulting, fetching (from the cluster or local documents), merging
//! local overrides over cluster state, and version reporting.

pub mod config;
pub mod errors;
mod fetch;
pub mod handler;
pub mod kubelet;
pub mod kubeproxy;
pub mod legacy;
mod overrides;
pub mod registry;
pub mod version_state;

pub use config::{ComponentConfig, ComponentConfigValue, ComponentConfigs};
pub use errors::ComponentConfigError;
pub use handler::{ComponentConfigHandler, StorageKey};
pub use kubelet::{KubeletConfiguration, KubeletHandler, KUBELET_GROUP};
pub use kubeproxy::{KubeProxyConfiguration, KubeProxyHandler, KUBE_PROXY_GROUP};
pub use registry::{Registry, RegistryError};
pub use version_state::ComponentConfigVersionState;
