// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Network proxy component config.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::config::ComponentConfigValue;
use super::errors::ComponentConfigError;
use super::handler::{decode, encode, ensure_supported, value_mismatch, ComponentConfigHandler, StorageKey};
use crate::k8s::{ApiEndpoint, ClusterConfiguration, KubernetesVersion, NodeRegistrationOptions, NAMESPACE_SYSTEM};

pub const KUBE_PROXY_GROUP: &str = "kubeproxy.config.k8s.io";
pub const KUBE_PROXY_KIND: &str = "KubeProxyConfiguration";
pub const KUBE_PROXY_CONFIG_MAP: &str = "kube-proxy";
pub const KUBE_PROXY_CONFIG_MAP_KEY: &str = "config.conf";

const SUPPORTED_VERSIONS: &[&str] = &["v1alpha1", "v1alpha0"];

const DEFAULT_KUBECONFIG: &str = "/var/lib/kube-proxy/kubeconfig.conf";
const METRICS_PORT: u16 = 10249;

/// Version-independent network proxy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeProxyConfiguration {
    pub bind_address: String,
    pub cluster_cidr: String,
    pub hostname_override: String,
    pub mode: String,
    pub metrics_bind_address: String,
    pub kubeconfig: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ClientConnection {
    #[serde(skip_serializing_if = "String::is_empty")]
    kubeconfig: String,
}

mod v1alpha1 {
    use super::*;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct KubeProxyConfiguration {
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) bind_address: String,
        #[serde(rename = "clusterCIDR", skip_serializing_if = "String::is_empty")]
        pub(super) cluster_cidr: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) hostname_override: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) mode: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) metrics_bind_address: String,
        pub(super) client_connection: ClientConnection,
    }
}

mod v1alpha0 {
    use super::*;

    /// Predates the metrics endpoint; still carries the removed
    /// `resourceContainer` knob, which is dropped on conversion.
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct KubeProxyConfiguration {
        pub(super) bind_address: String,
        #[serde(rename = "clusterCIDR")]
        pub(super) cluster_cidr: String,
        pub(super) hostname_override: String,
        pub(super) mode: String,
        #[allow(dead_code)]
        pub(super) resource_container: String,
        pub(super) client_connection: ClientConnection,
    }
}

impl From<v1alpha1::KubeProxyConfiguration> for KubeProxyConfiguration {
    fn from(v: v1alpha1::KubeProxyConfiguration) -> Self {
        Self {
            bind_address: v.bind_address,
            cluster_cidr: v.cluster_cidr,
            hostname_override: v.hostname_override,
            mode: v.mode,
            metrics_bind_address: v.metrics_bind_address,
            kubeconfig: v.client_connection.kubeconfig,
        }
    }
}

impl From<v1alpha0::KubeProxyConfiguration> for KubeProxyConfiguration {
    fn from(v: v1alpha0::KubeProxyConfiguration) -> Self {
        let metrics_bind_address = metrics_address(is_ipv6(&v.bind_address));
        Self {
            bind_address: v.bind_address,
            cluster_cidr: v.cluster_cidr,
            hostname_override: v.hostname_override,
            mode: v.mode,
            metrics_bind_address,
            kubeconfig: v.client_connection.kubeconfig,
        }
    }
}

impl From<&KubeProxyConfiguration> for v1alpha1::KubeProxyConfiguration {
    fn from(cfg: &KubeProxyConfiguration) -> Self {
        Self {
            bind_address: cfg.bind_address.clone(),
            cluster_cidr: cfg.cluster_cidr.clone(),
            hostname_override: cfg.hostname_override.clone(),
            mode: cfg.mode.clone(),
            metrics_bind_address: cfg.metrics_bind_address.clone(),
            client_connection: ClientConnection {
                kubeconfig: cfg.kubeconfig.clone(),
            },
        }
    }
}

fn is_ipv6(address: &str) -> bool {
    address.parse::<IpAddr>().map(|ip| ip.is_ipv6()).unwrap_or(false)
}

fn metrics_address(ipv6: bool) -> String {
    if ipv6 {
        format!("[::1]:{}", METRICS_PORT)
    } else {
        format!("127.0.0.1:{}", METRICS_PORT)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KubeProxyHandler;

impl ComponentConfigHandler for KubeProxyHandler {
    fn group(&self) -> &'static str {
        KUBE_PROXY_GROUP
    }

    fn kind(&self) -> &'static str {
        KUBE_PROXY_KIND
    }

    fn supported_versions(&self) -> &'static [&'static str] {
        SUPPORTED_VERSIONS
    }

    fn default_value(
        &self,
        cluster: &ClusterConfiguration,
        endpoint: &ApiEndpoint,
        _node: &NodeRegistrationOptions,
    ) -> ComponentConfigValue {
        let ipv6 = is_ipv6(&endpoint.advertise_address);
        ComponentConfigValue::KubeProxy(KubeProxyConfiguration {
            bind_address: if ipv6 { "::" } else { "0.0.0.0" }.to_string(),
            cluster_cidr: cluster.networking.pod_subnet.clone(),
            hostname_override: String::new(),
            mode: String::new(),
            metrics_bind_address: metrics_address(ipv6),
            kubeconfig: DEFAULT_KUBECONFIG.to_string(),
        })
    }

    fn unmarshal(&self, version: &str, bytes: &[u8]) -> Result<ComponentConfigValue, ComponentConfigError> {
        ensure_supported(self, version)?;
        let cfg: KubeProxyConfiguration = match version {
            "v1alpha0" => decode::<v1alpha0::KubeProxyConfiguration>(KUBE_PROXY_GROUP, version, bytes)?.into(),
            _ => decode::<v1alpha1::KubeProxyConfiguration>(KUBE_PROXY_GROUP, version, bytes)?.into(),
        };
        Ok(ComponentConfigValue::KubeProxy(cfg))
    }

    fn marshal(&self, value: &ComponentConfigValue) -> Result<Vec<u8>, ComponentConfigError> {
        let cfg = value.as_kube_proxy().ok_or_else(|| value_mismatch(self))?;
        encode(self, &v1alpha1::KubeProxyConfiguration::from(cfg))
    }

    fn storage_key(&self, _cluster_version: &KubernetesVersion) -> StorageKey {
        StorageKey::new(NAMESPACE_SYSTEM, KUBE_PROXY_CONFIG_MAP, KUBE_PROXY_CONFIG_MAP_KEY)
    }
}

#[cfg(test)]
#[path = "kubeproxy_tests.rs"]
mod tests;
