// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Signatures of ConfigMaps written before component configs carried a
//! usable API version.
//!
//! A ConfigMap stamped with one of these signatures holds a document whose
//! version cannot be trusted, whatever its `apiVersion` line says. The
//! table is a closed list of historical releases and only ever grows.

use crate::k8s::checksum::config_map_signature;
use crate::k8s::ConfigMap;

use super::kubeproxy::KUBE_PROXY_GROUP;

/// Known legacy signatures and the group each one belongs to.
const LEGACY_SIGNATURES: &[(&str, &str)] = &[(
    "sha256:8d3dfd7abcac205f6744d8e9db44505cce0c15b0a5395501e272fc18bd54c13c",
    KUBE_PROXY_GROUP,
)];

/// Group owning a legacy signature, if the signature is a known one.
pub fn legacy_group_for_signature(signature: &str) -> Option<&'static str> {
    LEGACY_SIGNATURES
        .iter()
        .find(|(known, _)| *known == signature)
        .map(|(_, group)| *group)
}

/// True if `config_map` carries a legacy signature belonging to `group`.
pub fn is_legacy_config_map(config_map: &ConfigMap, group: &str) -> bool {
    config_map_signature(config_map)
        .and_then(legacy_group_for_signature)
        .is_some_and(|owner| owner == group)
}
