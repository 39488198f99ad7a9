// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Merging cluster state with local overrides during upgrade planning.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::errors::ComponentConfigError;
use super::fetch::{decode_legacy, owned_document, read_cluster_document, replace_entry, unmarshal_document};
use super::registry::Registry;
use crate::k8s::documents::newest_document_for;
use crate::k8s::{ClusterClient, ClusterConfiguration, DocumentMap};

impl Registry {
    /// Load component configurations from the cluster, then let local
    /// documents replace them.
    ///
    /// A cluster document that is legacy, at an unsupported version, or at
    /// a supported version other than the preferred one is not accepted on
    /// its own: the group needs an override, and any override that decodes
    /// is enough. Overrides always win and are marked user supplied.
    ///
    /// # Errors
    /// `IncompatibleVersion` for the first group, in registry order, whose
    /// cluster document still needs an override; otherwise the first cluster
    /// read, envelope, or override decode failure.
    pub fn fetch_from_cluster_with_local_overwrites<C: ClusterClient + ?Sized>(
        &self,
        cluster: &mut ClusterConfiguration,
        client: &C,
        overrides: &DocumentMap,
    ) -> Result<(), ComponentConfigError> {
        let cluster_version = cluster.parsed_kubernetes_version()?;
        // Group -> version observed in the cluster, empty when unknown.
        let mut needs_override: BTreeMap<&str, String> = BTreeMap::new();

        for handler in self.handlers() {
            let group = handler.group();
            let Some(document) = read_cluster_document(handler, client, &cluster_version)? else {
                continue;
            };

            if document.legacy {
                warn!(group, storage = %document.key, "Cluster holds a legacy component config");
                match decode_legacy(handler, &document.payload) {
                    Ok(config) => replace_entry(cluster, config),
                    Err(err) => warn!(group, error = %err, "Cannot decode legacy component config"),
                }
                needs_override.insert(group, String::new());
                continue;
            }

            let Some((gvk, bytes)) = owned_document(handler, &document.payload)? else {
                debug!(group, storage = %document.key, "No matching document in component storage");
                continue;
            };

            match unmarshal_document(handler, &gvk, &bytes, !document.generated) {
                Ok(config) => {
                    if gvk.version != handler.preferred_version() {
                        needs_override.insert(group, gvk.version.clone());
                    }
                    replace_entry(cluster, config);
                }
                Err(ComponentConfigError::UnsupportedVersion { .. }) => {
                    warn!(group, version = %gvk.version, "Cluster holds an unsupported component config version");
                    needs_override.insert(group, gvk.version.clone());
                }
                Err(err) => return Err(err),
            }
        }

        for gvk in overrides.keys().filter(|gvk| self.owning_handler(gvk).is_none()) {
            debug!(document = %gvk, "Skipping unrecognized override");
        }
        for handler in self.handlers() {
            let Some((gvk, bytes)) = newest_document_for(overrides, handler.group(), handler.kind()) else {
                continue;
            };
            let config = unmarshal_document(handler, gvk, bytes, true)?;
            info!(group = handler.group(), version = %gvk.version, "Using local override");
            needs_override.remove(handler.group());
            replace_entry(cluster, config);
        }

        let mut unresolved = self
            .handlers()
            .filter_map(|h| needs_override.get(h.group()).map(|version| (h, version)));
        let Some((handler, version)) = unresolved.next() else {
            return Ok(());
        };
        for (other, other_version) in unresolved {
            warn!(group = other.group(), version = %other_version, "Component config also needs a local override");
        }
        Err(ComponentConfigError::IncompatibleVersion {
            group: handler.group().to_string(),
            version: version.clone(),
            preferred: handler.preferred_version().to_string(),
        })
    }
}

#[cfg(test)]
#[path = "overrides_tests.rs"]
mod tests;
