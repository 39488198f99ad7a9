// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The contract every component kind implements.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::config::ComponentConfigValue;
use super::errors::ComponentConfigError;
use crate::k8s::validation::{validate_data_key, validate_namespace, validate_object_name, ValidationError};
use crate::k8s::{ApiEndpoint, ClusterConfiguration, KubernetesVersion, NodeRegistrationOptions};

/// Where a component's configuration lives in the cluster object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    pub namespace: String,
    pub name: String,
    /// Key inside the ConfigMap data holding the serialized document.
    pub data_key: String,
}

impl StorageKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, data_key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            data_key: data_key.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_namespace(&self.namespace)?;
        validate_object_name(&self.name)?;
        validate_data_key(&self.data_key)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}[{}]", self.namespace, self.name, self.data_key)
    }
}

/// Per-kind behaviour: defaulting, versioned decode/encode and storage
/// location. Handlers are stateless and shared through the `Registry`.
pub trait ComponentConfigHandler: fmt::Debug + Send + Sync {
    /// API group identifying the component, e.g. `kubelet.config.k8s.io`.
    fn group(&self) -> &'static str;

    fn kind(&self) -> &'static str;

    /// Supported version tags, most preferred first.
    fn supported_versions(&self) -> &'static [&'static str];

    fn preferred_version(&self) -> &'static str {
        self.supported_versions().first().copied().unwrap_or_default()
    }

    /// Oldest supported version. Legacy documents are decoded as this one.
    fn oldest_version(&self) -> &'static str {
        self.supported_versions().last().copied().unwrap_or_default()
    }

    fn supports(&self, version: &str) -> bool {
        self.supported_versions().contains(&version)
    }

    /// Build the default value for this component.
    fn default_value(
        &self,
        cluster: &ClusterConfiguration,
        endpoint: &ApiEndpoint,
        node: &NodeRegistrationOptions,
    ) -> ComponentConfigValue;

    /// Decode `bytes` as `version`.
    ///
    /// # Errors
    /// `UnsupportedVersion` if `version` is not in `supported_versions`,
    /// `MalformedDocument` if the content does not decode.
    fn unmarshal(&self, version: &str, bytes: &[u8]) -> Result<ComponentConfigValue, ComponentConfigError>;

    /// Encode at the preferred version, envelope included.
    fn marshal(&self, value: &ComponentConfigValue) -> Result<Vec<u8>, ComponentConfigError>;

    /// Storage location, which may differ between cluster releases.
    fn storage_key(&self, cluster_version: &KubernetesVersion) -> StorageKey;
}

pub(crate) fn ensure_supported(
    handler: &dyn ComponentConfigHandler,
    version: &str,
) -> Result<(), ComponentConfigError> {
    if handler.supports(version) {
        return Ok(());
    }
    Err(ComponentConfigError::UnsupportedVersion {
        group: handler.group().to_string(),
        version: version.to_string(),
        supported: handler.supported_versions().iter().map(|v| v.to_string()).collect(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(
    group: &str,
    version: &str,
    bytes: &[u8],
) -> Result<T, ComponentConfigError> {
    serde_yaml::from_slice(bytes).map_err(|e| ComponentConfigError::MalformedDocument {
        group: group.to_string(),
        version: version.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    api_version: String,
    kind: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

/// Encode `body` with an `apiVersion`/`kind` envelope.
pub(crate) fn encode<T: Serialize>(
    handler: &dyn ComponentConfigHandler,
    body: &T,
) -> Result<Vec<u8>, ComponentConfigError> {
    let version = handler.preferred_version();
    let envelope = Envelope {
        api_version: format!("{}/{}", handler.group(), version),
        kind: handler.kind(),
        body,
    };
    serde_yaml::to_string(&envelope)
        .map(String::into_bytes)
        .map_err(|e| ComponentConfigError::MalformedDocument {
            group: handler.group().to_string(),
            version: version.to_string(),
            reason: e.to_string(),
        })
}

pub(crate) fn value_mismatch(handler: &dyn ComponentConfigHandler) -> ComponentConfigError {
    ComponentConfigError::ValueMismatch {
        group: handler.group().to_string(),
    }
}
