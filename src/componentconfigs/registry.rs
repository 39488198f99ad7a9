// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The table of known component kinds.
//!
//! A `Registry` is built once at startup and only ever read afterwards.
//! Every operation takes it by reference; iteration order is registration
//! order and is what reports and rendered output follow.

use std::cmp::Ordering;

use thiserror::Error;
use tracing::debug;

use super::config::{ComponentConfig, ComponentConfigValue};
use super::errors::ComponentConfigError;
use super::handler::ComponentConfigHandler;
use super::kubelet::KubeletHandler;
use super::kubeproxy::KubeProxyHandler;
use crate::k8s::version::compare_version_tags;
use crate::k8s::{
    sign_config_map, ApiEndpoint, ApiVersion, ClusterConfiguration, ConfigMap, GroupVersionKind,
    KubernetesVersion, NodeRegistrationOptions,
};

/// Rejected handler sets.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("group {0} is registered more than once")]
    DuplicateGroup(String),

    #[error("group {0} declares no supported versions")]
    NoVersions(String),

    #[error("group {group} declares unparsable version {version:?}")]
    InvalidVersion { group: String, version: String },

    #[error("group {group} lists {version} out of order (versions must be unique, newest first)")]
    VersionOrder { group: String, version: String },
}

/// Immutable, ordered set of component handlers keyed by group.
#[derive(Debug)]
pub struct Registry {
    handlers: Vec<Box<dyn ComponentConfigHandler>>,
}

impl Registry {
    /// The built-in handlers: network proxy, then node agent.
    pub fn known() -> Self {
        Self {
            handlers: vec![Box::new(KubeProxyHandler), Box::new(KubeletHandler)],
        }
    }

    /// Build a registry from a custom handler set.
    ///
    /// # Errors
    /// Fails if a group repeats or a handler's version list is empty,
    /// unparsable, or not strictly descending.
    pub fn new(handlers: Vec<Box<dyn ComponentConfigHandler>>) -> Result<Self, RegistryError> {
        for (index, handler) in handlers.iter().enumerate() {
            let group = handler.group();
            if handlers[..index].iter().any(|h| h.group() == group) {
                return Err(RegistryError::DuplicateGroup(group.to_string()));
            }
            validate_versions(group, handler.supported_versions())?;
        }
        Ok(Self { handlers })
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handlers in registration order.
    pub fn handlers(&self) -> impl Iterator<Item = &dyn ComponentConfigHandler> {
        self.handlers.iter().map(|h| h.as_ref())
    }

    pub fn handler(&self, group: &str) -> Option<&dyn ComponentConfigHandler> {
        self.handlers().find(|h| h.group() == group)
    }

    /// Handler owning a document envelope, matched on group and kind.
    pub fn owning_handler(&self, gvk: &GroupVersionKind) -> Option<&dyn ComponentConfigHandler> {
        self.handlers().find(|h| gvk.is(h.group(), h.kind()))
    }

    /// Replace the aggregate entry of every registered group with its
    /// default value.
    pub fn default_component_configs(
        &self,
        cluster: &mut ClusterConfiguration,
        endpoint: &ApiEndpoint,
        node: &NodeRegistrationOptions,
    ) {
        let defaults: Vec<(&dyn ComponentConfigHandler, ComponentConfigValue)> = self
            .handlers()
            .map(|h| (h, h.default_value(cluster, endpoint, node)))
            .collect();

        for (handler, value) in defaults {
            debug!(group = handler.group(), version = handler.preferred_version(), "Defaulted component config");
            cluster.component_configs.insert(ComponentConfig::new(
                handler.group(),
                Some(handler.preferred_version().to_string()),
                value,
            ));
        }
    }

    /// Serialize one instance with its owning handler.
    pub fn marshal(&self, config: &ComponentConfig) -> Result<Vec<u8>, ComponentConfigError> {
        self.require(config.group())?.marshal(config.value())
    }

    /// Build the signed ConfigMap that stores `config` for the given
    /// cluster release. Nothing is written to the cluster.
    pub fn config_map_for(
        &self,
        config: &ComponentConfig,
        cluster_version: &KubernetesVersion,
    ) -> Result<ConfigMap, ComponentConfigError> {
        let handler = self.require(config.group())?;
        let key = handler.storage_key(cluster_version);
        key.validate()
            .map_err(|source| ComponentConfigError::InvalidStorageKey {
                group: handler.group().to_string(),
                source,
            })?;

        let bytes = handler.marshal(config.value())?;
        let mut config_map = ConfigMap::new(key.namespace, key.name)
            .with_data(key.data_key, String::from_utf8_lossy(&bytes).into_owned());
        sign_config_map(&mut config_map);
        Ok(config_map)
    }

    fn require(&self, group: &str) -> Result<&dyn ComponentConfigHandler, ComponentConfigError> {
        self.handler(group).ok_or_else(|| ComponentConfigError::UnknownGroup {
            group: group.to_string(),
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::known()
    }
}

fn validate_versions(group: &str, versions: &[&str]) -> Result<(), RegistryError> {
    if versions.is_empty() {
        return Err(RegistryError::NoVersions(group.to_string()));
    }
    for version in versions {
        ApiVersion::parse(version).map_err(|_| RegistryError::InvalidVersion {
            group: group.to_string(),
            version: version.to_string(),
        })?;
    }
    for pair in versions.windows(2) {
        if compare_version_tags(pair[0], pair[1]) != Ordering::Greater {
            return Err(RegistryError::VersionOrder {
                group: group.to_string(),
                version: pair[1].to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
