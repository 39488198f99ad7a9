// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Node agent component config.
//!
//! The node agent's ConfigMap name carried the release until 1.24; from
//! 1.24 on a single unversioned ConfigMap is used.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use cidr::IpCidr;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::config::ComponentConfigValue;
use super::errors::ComponentConfigError;
use super::handler::{decode, encode, ensure_supported, value_mismatch, ComponentConfigHandler, StorageKey};
use crate::k8s::types::DEFAULT_DNS_DOMAIN;
use crate::k8s::{ApiEndpoint, ClusterConfiguration, KubernetesVersion, NodeRegistrationOptions, NAMESPACE_SYSTEM};

pub const KUBELET_GROUP: &str = "kubelet.config.k8s.io";
pub const KUBELET_KIND: &str = "KubeletConfiguration";
pub const KUBELET_CONFIG_MAP: &str = "kubelet-config";
pub const KUBELET_CONFIG_MAP_KEY: &str = "kubelet";

const SUPPORTED_VERSIONS: &[&str] = &["v1beta1", "v1alpha1"];

/// First release storing the node agent config under an unversioned name.
const UNVERSIONED_CONFIG_MAP_SINCE: (u64, u64) = (1, 24);

const DEFAULT_CLUSTER_DNS: Ipv4Addr = Ipv4Addr::new(10, 96, 0, 10);
const DNS_ADDRESS_OFFSET: u32 = 10;
const STATIC_POD_PATH: &str = "/etc/kubernetes/manifests";
const CLIENT_CA_FILE: &str = "/etc/kubernetes/pki/ca.crt";
const SYSTEMD_RESOLV_CONF: &str = "/run/systemd/resolve/resolv.conf";

/// Version-independent node agent settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeletConfiguration {
    pub cluster_dns: Vec<String>,
    pub cluster_domain: String,
    pub static_pod_path: String,
    pub client_ca_file: String,
    pub authorization_mode: String,
    pub healthz_bind_address: String,
    pub rotate_certificates: bool,
    pub cgroup_driver: String,
    pub resolv_conf: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct X509Authentication {
    #[serde(rename = "clientCAFile", skip_serializing_if = "String::is_empty")]
    client_ca_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Authentication {
    x509: X509Authentication,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Authorization {
    #[serde(skip_serializing_if = "String::is_empty")]
    mode: String,
}

mod v1beta1 {
    use super::*;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct KubeletConfiguration {
        #[serde(rename = "clusterDNS", skip_serializing_if = "Vec::is_empty")]
        pub(super) cluster_dns: Vec<String>,
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) cluster_domain: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) static_pod_path: String,
        pub(super) authentication: Authentication,
        pub(super) authorization: Authorization,
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) healthz_bind_address: String,
        pub(super) rotate_certificates: bool,
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) cgroup_driver: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        pub(super) resolv_conf: String,
    }
}

mod v1alpha1 {
    use super::*;

    /// Single cluster DNS address instead of a list.
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct KubeletConfiguration {
        #[serde(rename = "clusterDNS")]
        pub(super) cluster_dns: String,
        pub(super) cluster_domain: String,
        pub(super) static_pod_path: String,
        pub(super) authentication: Authentication,
        pub(super) authorization: Authorization,
        pub(super) healthz_bind_address: String,
        pub(super) rotate_certificates: bool,
        pub(super) cgroup_driver: String,
        pub(super) resolv_conf: String,
    }
}

impl From<v1beta1::KubeletConfiguration> for KubeletConfiguration {
    fn from(v: v1beta1::KubeletConfiguration) -> Self {
        Self {
            cluster_dns: v.cluster_dns,
            cluster_domain: v.cluster_domain,
            static_pod_path: v.static_pod_path,
            client_ca_file: v.authentication.x509.client_ca_file,
            authorization_mode: v.authorization.mode,
            healthz_bind_address: v.healthz_bind_address,
            rotate_certificates: v.rotate_certificates,
            cgroup_driver: v.cgroup_driver,
            resolv_conf: v.resolv_conf,
        }
    }
}

impl From<v1alpha1::KubeletConfiguration> for KubeletConfiguration {
    fn from(v: v1alpha1::KubeletConfiguration) -> Self {
        let cluster_dns = if v.cluster_dns.is_empty() {
            Vec::new()
        } else {
            vec![v.cluster_dns]
        };
        Self {
            cluster_dns,
            cluster_domain: v.cluster_domain,
            static_pod_path: v.static_pod_path,
            client_ca_file: v.authentication.x509.client_ca_file,
            authorization_mode: v.authorization.mode,
            healthz_bind_address: v.healthz_bind_address,
            rotate_certificates: v.rotate_certificates,
            cgroup_driver: v.cgroup_driver,
            resolv_conf: v.resolv_conf,
        }
    }
}

impl From<&KubeletConfiguration> for v1beta1::KubeletConfiguration {
    fn from(cfg: &KubeletConfiguration) -> Self {
        Self {
            cluster_dns: cfg.cluster_dns.clone(),
            cluster_domain: cfg.cluster_domain.clone(),
            static_pod_path: cfg.static_pod_path.clone(),
            authentication: Authentication {
                x509: X509Authentication {
                    client_ca_file: cfg.client_ca_file.clone(),
                },
            },
            authorization: Authorization {
                mode: cfg.authorization_mode.clone(),
            },
            healthz_bind_address: cfg.healthz_bind_address.clone(),
            rotate_certificates: cfg.rotate_certificates,
            cgroup_driver: cfg.cgroup_driver.clone(),
            resolv_conf: cfg.resolv_conf.clone(),
        }
    }
}

/// The cluster DNS service address: the tenth address of the first
/// service subnet.
pub fn cluster_dns_address(service_subnet: &str) -> Option<IpAddr> {
    let first = service_subnet.split(',').next()?.trim();
    let cidr = IpCidr::from_str(first).ok()?;

    match cidr {
        IpCidr::V4(net) => {
            let base = u32::from(net.first_address());
            let candidate = Ipv4Addr::from(base.checked_add(DNS_ADDRESS_OFFSET)?);
            net.contains(&candidate).then_some(IpAddr::V4(candidate))
        }
        IpCidr::V6(net) => {
            let base = u128::from(net.first_address());
            let candidate = Ipv6Addr::from(base.checked_add(u128::from(DNS_ADDRESS_OFFSET))?);
            net.contains(&candidate).then_some(IpAddr::V6(candidate))
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KubeletHandler;

impl ComponentConfigHandler for KubeletHandler {
    fn group(&self) -> &'static str {
        KUBELET_GROUP
    }

    fn kind(&self) -> &'static str {
        KUBELET_KIND
    }

    fn supported_versions(&self) -> &'static [&'static str] {
        SUPPORTED_VERSIONS
    }

    fn default_value(
        &self,
        cluster: &ClusterConfiguration,
        _endpoint: &ApiEndpoint,
        node: &NodeRegistrationOptions,
    ) -> ComponentConfigValue {
        let service_subnet = &cluster.networking.service_subnet;
        let dns = cluster_dns_address(service_subnet).unwrap_or_else(|| {
            warn!(
                service_subnet = %service_subnet,
                fallback = %DEFAULT_CLUSTER_DNS,
                "Cannot derive cluster DNS address from service subnet, using fallback"
            );
            IpAddr::V4(DEFAULT_CLUSTER_DNS)
        });

        let cluster_domain = if cluster.networking.dns_domain.is_empty() {
            DEFAULT_DNS_DOMAIN.to_string()
        } else {
            cluster.networking.dns_domain.clone()
        };

        let resolv_conf = node
            .kubelet_extra_args
            .get("resolv-conf")
            .cloned()
            .unwrap_or_else(|| SYSTEMD_RESOLV_CONF.to_string());

        ComponentConfigValue::Kubelet(KubeletConfiguration {
            cluster_dns: vec![dns.to_string()],
            cluster_domain,
            static_pod_path: STATIC_POD_PATH.to_string(),
            client_ca_file: CLIENT_CA_FILE.to_string(),
            authorization_mode: "Webhook".to_string(),
            healthz_bind_address: "127.0.0.1".to_string(),
            rotate_certificates: true,
            cgroup_driver: "systemd".to_string(),
            resolv_conf,
        })
    }

    fn unmarshal(&self, version: &str, bytes: &[u8]) -> Result<ComponentConfigValue, ComponentConfigError> {
        ensure_supported(self, version)?;
        let cfg: KubeletConfiguration = match version {
            "v1alpha1" => decode::<v1alpha1::KubeletConfiguration>(KUBELET_GROUP, version, bytes)?.into(),
            _ => decode::<v1beta1::KubeletConfiguration>(KUBELET_GROUP, version, bytes)?.into(),
        };
        Ok(ComponentConfigValue::Kubelet(cfg))
    }

    fn marshal(&self, value: &ComponentConfigValue) -> Result<Vec<u8>, ComponentConfigError> {
        let cfg = value.as_kubelet().ok_or_else(|| value_mismatch(self))?;
        encode(self, &v1beta1::KubeletConfiguration::from(cfg))
    }

    fn storage_key(&self, cluster_version: &KubernetesVersion) -> StorageKey {
        let (major, minor) = UNVERSIONED_CONFIG_MAP_SINCE;
        let name = if cluster_version.at_least(major, minor) {
            KUBELET_CONFIG_MAP.to_string()
        } else {
            format!(
                "{}-{}.{}",
                KUBELET_CONFIG_MAP,
                cluster_version.major(),
                cluster_version.minor()
            )
        };
        StorageKey::new(NAMESPACE_SYSTEM, name, KUBELET_CONFIG_MAP_KEY)
    }
}

#[cfg(test)]
#[path = "kubelet_tests.rs"]
mod tests;
