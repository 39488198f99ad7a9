// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configured component instances and the per-cluster aggregate.

use std::collections::BTreeMap;

use super::errors::ComponentConfigError;
use super::kubelet::KubeletConfiguration;
use super::kubeproxy::KubeProxyConfiguration;
use super::registry::Registry;

/// A deserialized configuration value, one variant per component kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentConfigValue {
    KubeProxy(KubeProxyConfiguration),
    Kubelet(KubeletConfiguration),
}

impl ComponentConfigValue {
    pub fn as_kube_proxy(&self) -> Option<&KubeProxyConfiguration> {
        match self {
            Self::KubeProxy(cfg) => Some(cfg),
            _ => None,
        }
    }

    pub fn as_kubelet(&self) -> Option<&KubeletConfiguration> {
        match self {
            Self::Kubelet(cfg) => Some(cfg),
            _ => None,
        }
    }
}

/// One component's configuration plus where it came from.
///
/// Instances are replaced wholesale on re-fetch, never edited in place by
/// the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentConfig {
    group: String,
    /// Version tag the value was decoded from. `None` for legacy documents.
    version: Option<String>,
    legacy: bool,
    user_supplied: bool,
    value: ComponentConfigValue,
}

impl ComponentConfig {
    pub fn new(group: impl Into<String>, version: Option<String>, value: ComponentConfigValue) -> Self {
        Self {
            group: group.into(),
            version,
            legacy: false,
            user_supplied: false,
            value,
        }
    }

    /// Mark the instance as decoded from a legacy, pre-versioning document.
    /// Its version becomes unknown.
    pub(crate) fn into_legacy(mut self) -> Self {
        self.legacy = true;
        self.version = None;
        self
    }

    pub(crate) fn with_user_supplied(mut self, user_supplied: bool) -> Self {
        self.user_supplied = user_supplied;
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// True unless the value was defaulted or read from a signed,
    /// tool-generated ConfigMap.
    pub fn is_user_supplied(&self) -> bool {
        self.user_supplied
    }

    pub fn value(&self) -> &ComponentConfigValue {
        &self.value
    }

    pub fn into_value(self) -> ComponentConfigValue {
        self.value
    }
}

/// The cluster-wide collection of configured components, keyed by group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentConfigs {
    entries: BTreeMap<String, ComponentConfig>,
}

impl ComponentConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an instance, replacing and returning any previous one for
    /// the same group.
    pub fn insert(&mut self, config: ComponentConfig) -> Option<ComponentConfig> {
        self.entries.insert(config.group.clone(), config)
    }

    pub fn get(&self, group: &str) -> Option<&ComponentConfig> {
        self.entries.get(group)
    }

    pub fn remove(&mut self, group: &str) -> Option<ComponentConfig> {
        self.entries.remove(group)
    }

    pub fn contains(&self, group: &str) -> bool {
        self.entries.contains_key(group)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentConfig> {
        self.entries.values()
    }

    /// Render every entry as one multi-document YAML stream in registry
    /// order. Groups without a registered handler are skipped.
    pub fn to_yaml(&self, registry: &Registry) -> Result<String, ComponentConfigError> {
        let mut documents = Vec::new();
        for handler in registry.handlers() {
            if let Some(config) = self.get(handler.group()) {
                let bytes = handler.marshal(config.value())?;
                documents.push(String::from_utf8_lossy(&bytes).into_owned());
            }
        }
        Ok(documents.join("---\n"))
    }
}
