// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Populating the aggregate from cluster storage or local documents.
//!
//! Both entry points stop at the first error. Entries written for earlier
//! groups in the same call stay in place.

use tracing::{debug, info, warn};

use super::config::ComponentConfig;
use super::errors::ComponentConfigError;
use super::handler::{ComponentConfigHandler, StorageKey};
use super::legacy::is_legacy_config_map;
use super::registry::Registry;
use crate::k8s::documents::newest_document_for;
use crate::k8s::{
    split_yaml_documents, verify_config_map_signature, ClusterClient, ClusterConfiguration, DocumentMap,
    GroupVersionKind, KubernetesVersion,
};

/// Raw payload read from a component's storage location.
#[derive(Debug, Clone)]
pub(crate) struct ClusterDocument {
    pub key: StorageKey,
    pub payload: Vec<u8>,
    /// The ConfigMap carries a known legacy signature.
    pub legacy: bool,
    /// The ConfigMap signature matches its data.
    pub generated: bool,
}

/// Read the payload stored for `handler`. `Ok(None)` if the ConfigMap does
/// not exist.
pub(crate) fn read_cluster_document<C: ClusterClient + ?Sized>(
    handler: &dyn ComponentConfigHandler,
    client: &C,
    cluster_version: &KubernetesVersion,
) -> Result<Option<ClusterDocument>, ComponentConfigError> {
    let group = handler.group();
    let key = handler.storage_key(cluster_version);
    key.validate().map_err(|source| ComponentConfigError::InvalidStorageKey {
        group: group.to_string(),
        source,
    })?;

    let config_map = client
        .get_config_map(&key.namespace, &key.name)
        .map_err(|source| ComponentConfigError::ClusterRead {
            group: group.to_string(),
            source,
        })?;
    let Some(config_map) = config_map else {
        debug!(group, namespace = %key.namespace, name = %key.name, "Component config not found in cluster");
        return Ok(None);
    };

    let payload = config_map
        .data
        .get(&key.data_key)
        .ok_or_else(|| ComponentConfigError::MissingDataKey {
            group: group.to_string(),
            namespace: key.namespace.clone(),
            name: key.name.clone(),
            key: key.data_key.clone(),
        })?
        .clone()
        .into_bytes();

    Ok(Some(ClusterDocument {
        legacy: is_legacy_config_map(&config_map, group),
        generated: verify_config_map_signature(&config_map),
        key,
        payload,
    }))
}

/// The document in `payload` owned by `handler`. When several match, the
/// one at the newest API version is used.
pub(crate) fn owned_document(
    handler: &dyn ComponentConfigHandler,
    payload: &[u8],
) -> Result<Option<(GroupVersionKind, Vec<u8>)>, ComponentConfigError> {
    let documents = split_yaml_documents(payload).map_err(|source| ComponentConfigError::Document {
        group: handler.group().to_string(),
        source,
    })?;

    for (gvk, _) in documents.iter().filter(|(gvk, _)| !gvk.is(handler.group(), handler.kind())) {
        debug!(group = handler.group(), document = %gvk, "Ignoring foreign document in component storage");
    }

    Ok(newest_document_for(&documents, handler.group(), handler.kind())
        .map(|(gvk, bytes)| (gvk.clone(), bytes.to_vec())))
}

/// Decode one versioned document into an aggregate entry.
pub(crate) fn unmarshal_document(
    handler: &dyn ComponentConfigHandler,
    gvk: &GroupVersionKind,
    bytes: &[u8],
    user_supplied: bool,
) -> Result<ComponentConfig, ComponentConfigError> {
    let value = handler.unmarshal(&gvk.version, bytes)?;
    Ok(ComponentConfig::new(handler.group(), Some(gvk.version.clone()), value).with_user_supplied(user_supplied))
}

/// Decode a legacy payload as the handler's oldest supported version.
///
/// The envelope is not trusted; if the payload does not split cleanly the
/// whole of it is decoded.
pub(crate) fn decode_legacy(
    handler: &dyn ComponentConfigHandler,
    payload: &[u8],
) -> Result<ComponentConfig, ComponentConfigError> {
    let body = split_yaml_documents(payload)
        .ok()
        .and_then(|docs| {
            newest_document_for(&docs, handler.group(), handler.kind()).map(|(_, bytes)| bytes.to_vec())
        })
        .unwrap_or_else(|| payload.to_vec());

    let oldest = handler.oldest_version();
    let value = handler.unmarshal(oldest, &body)?;
    Ok(ComponentConfig::new(handler.group(), Some(oldest.to_string()), value).into_legacy())
}

/// Insert `config`, replacing any entry for the same group.
pub(crate) fn replace_entry(cluster: &mut ClusterConfiguration, config: ComponentConfig) {
    let group = config.group().to_string();
    let version = config.version().unwrap_or_default().to_string();
    if cluster.component_configs.insert(config).is_some() {
        info!(group = %group, version = %version, "Replaced component config");
    } else {
        debug!(group = %group, version = %version, "Loaded component config");
    }
}

impl Registry {
    /// Load every registered component's configuration from the cluster.
    ///
    /// Storage keys are resolved for the release in
    /// `cluster.kubernetes_version`. Groups whose ConfigMap is missing are
    /// left untouched. Legacy-signed payloads are decoded as the oldest
    /// supported version and flagged as legacy.
    ///
    /// # Errors
    /// The first cluster read, envelope, or decode failure; an unsupported
    /// version aborts the whole fetch.
    pub fn fetch_from_cluster<C: ClusterClient + ?Sized>(
        &self,
        cluster: &mut ClusterConfiguration,
        client: &C,
    ) -> Result<(), ComponentConfigError> {
        let cluster_version = cluster.parsed_kubernetes_version()?;

        for handler in self.handlers() {
            let Some(document) = read_cluster_document(handler, client, &cluster_version)? else {
                continue;
            };

            let config = if document.legacy {
                warn!(group = handler.group(), storage = %document.key, "Cluster holds a legacy component config");
                decode_legacy(handler, &document.payload)?
            } else {
                match owned_document(handler, &document.payload)? {
                    Some((gvk, bytes)) => unmarshal_document(handler, &gvk, &bytes, !document.generated)?,
                    None => {
                        debug!(group = handler.group(), storage = %document.key, "No matching document in component storage");
                        continue;
                    }
                }
            };
            replace_entry(cluster, config);
        }
        Ok(())
    }

    /// Load component configurations from local documents.
    ///
    /// Documents whose group and kind no handler owns are skipped. When a
    /// group has several documents the newest API version is loaded. Every
    /// loaded entry is marked user supplied.
    ///
    /// # Errors
    /// The first decode failure, including unsupported versions.
    pub fn fetch_from_document_map(
        &self,
        cluster: &mut ClusterConfiguration,
        documents: &DocumentMap,
    ) -> Result<(), ComponentConfigError> {
        for gvk in documents.keys().filter(|gvk| self.owning_handler(gvk).is_none()) {
            debug!(document = %gvk, "Skipping unrecognized document");
        }
        for handler in self.handlers() {
            let Some((gvk, bytes)) = newest_document_for(documents, handler.group(), handler.kind()) else {
                continue;
            };
            let config = unmarshal_document(handler, gvk, bytes, true)?;
            replace_entry(cluster, config);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
