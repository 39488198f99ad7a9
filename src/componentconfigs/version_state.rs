// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-component version report for upgrade planning.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::ComponentConfigError;
use super::fetch::{owned_document, read_cluster_document};
use super::registry::Registry;
use crate::k8s::documents::newest_document_for;
use crate::k8s::{ClusterClient, ClusterConfiguration, DocumentMap};

/// Observed and preferred version of one component's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfigVersionState {
    pub group: String,
    /// Empty when the version is unknown: the component is not installed,
    /// or its stored document is legacy.
    pub current_version: String,
    pub preferred_version: String,
    pub manual_upgrade_required: bool,
}

impl Registry {
    /// Report, for every registered group in registry order, which version
    /// the cluster (or a substitute document) holds and whether an operator
    /// must migrate it by hand.
    ///
    /// Only envelopes are inspected for cluster documents. A group with no
    /// stored object and no substitute is not installed and needs no
    /// upgrade. A substitute
    /// replaces the cluster version once it decodes with the group's
    /// handler. The aggregate in `cluster` is not touched.
    ///
    /// # Errors
    /// Cluster read and envelope failures, and any substitute that fails to
    /// decode. No partial report is returned.
    pub fn get_version_states<C: ClusterClient + ?Sized>(
        &self,
        cluster: &ClusterConfiguration,
        client: &C,
        substitutes: &DocumentMap,
    ) -> Result<Vec<ComponentConfigVersionState>, ComponentConfigError> {
        let cluster_version = cluster.parsed_kubernetes_version()?;
        let mut states = Vec::with_capacity(self.len());

        for handler in self.handlers() {
            let group = handler.group();
            let stored = read_cluster_document(handler, client, &cluster_version)?;
            let installed = stored.is_some();
            let (mut current_version, legacy) = match stored {
                None => (String::new(), false),
                Some(document) if document.legacy => (String::new(), true),
                Some(document) => {
                    let observed = owned_document(handler, &document.payload)?;
                    (observed.map(|(gvk, _)| gvk.version).unwrap_or_default(), false)
                }
            };

            let mut substituted = false;
            if let Some((gvk, bytes)) = newest_document_for(substitutes, group, handler.kind()) {
                handler.unmarshal(&gvk.version, bytes)?;
                debug!(group, version = %gvk.version, "Substitute replaces cluster version");
                current_version = gvk.version.clone();
                substituted = true;
            }

            let preferred_version = handler.preferred_version().to_string();
            // A component the cluster does not run has nothing to migrate.
            let manual_upgrade_required = if !installed && !substituted {
                debug!(group, "Component config not installed");
                false
            } else {
                current_version != preferred_version || (legacy && !substituted)
            };
            states.push(ComponentConfigVersionState {
                group: group.to_string(),
                current_version,
                preferred_version,
                manual_upgrade_required,
            });
        }

        Ok(states)
    }
}

#[cfg(test)]
#[path = "version_state_tests.rs"]
mod tests;
