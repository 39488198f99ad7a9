// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes object types consumed by the component config core.
//!
//! Only the subset of fields the registry actually reads is modelled.
//! Unknown fields in cluster snapshots are ignored on decode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::version::{KubernetesVersion, VersionError};
use crate::componentconfigs::ComponentConfigs;

/// Namespace holding cluster-wide component configuration.
pub const NAMESPACE_SYSTEM: &str = "kube-system";

/// Service subnet used when the cluster configuration does not name one.
pub const DEFAULT_SERVICE_SUBNET: &str = "10.96.0.0/12";

/// DNS domain used when the cluster configuration does not name one.
pub const DEFAULT_DNS_DOMAIN: &str = "cluster.local";

/// Port the API server binds to by default.
pub const DEFAULT_API_BIND_PORT: u16 = 6443;

/// Object metadata shared by every stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// A ConfigMap as stored in the cluster object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    #[serde(default = "config_map_api_version")]
    pub api_version: String,
    #[serde(default = "config_map_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

fn config_map_api_version() -> String {
    "v1".to_string()
}

fn config_map_kind() -> String {
    "ConfigMap".to_string()
}

impl ConfigMap {
    /// Create an empty ConfigMap at `namespace/name`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: config_map_api_version(),
            kind: config_map_kind(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: Some(namespace.into()),
                ..Default::default()
            },
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Namespace of the object, `default` when unset.
    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or("default")
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }
}

/// Cluster networking settings used for component defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Networking {
    /// Service subnet(s), comma separated for dual-stack clusters.
    pub service_subnet: String,
    /// Pod subnet(s), comma separated for dual-stack clusters.
    pub pod_subnet: String,
    pub dns_domain: String,
}

impl Default for Networking {
    fn default() -> Self {
        Self {
            service_subnet: DEFAULT_SERVICE_SUBNET.to_string(),
            pod_subnet: String::new(),
            dns_domain: DEFAULT_DNS_DOMAIN.to_string(),
        }
    }
}

/// Top-level cluster configuration owned by the bootstrap tool.
///
/// `component_configs` is the aggregate every registry operation mutates.
/// It is never serialized with the rest of the configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfiguration {
    #[serde(default)]
    pub kubernetes_version: String,
    #[serde(default)]
    pub networking: Networking,
    #[serde(skip)]
    pub component_configs: ComponentConfigs,
}

impl ClusterConfiguration {
    pub fn with_kubernetes_version(version: impl Into<String>) -> Self {
        Self {
            kubernetes_version: version.into(),
            ..Default::default()
        }
    }

    /// Parse the advertised Kubernetes version.
    ///
    /// # Errors
    /// Returns a `VersionError` if the version string is not a release.
    pub fn parsed_kubernetes_version(&self) -> Result<KubernetesVersion, VersionError> {
        KubernetesVersion::parse(&self.kubernetes_version)
    }
}

/// Local API server endpoint of the node being configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiEndpoint {
    pub advertise_address: String,
    pub bind_port: u16,
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self {
            advertise_address: String::new(),
            bind_port: DEFAULT_API_BIND_PORT,
        }
    }
}

/// Node registration options of the node being configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeRegistrationOptions {
    pub name: String,
    pub cri_socket: String,
    /// Extra node-agent flags, keyed without the leading dashes.
    pub kubelet_extra_args: BTreeMap<String, String>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
