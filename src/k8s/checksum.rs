// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Content signatures for tool-generated ConfigMaps.
//!
//! The bootstrap tool stamps a SHA-256 over the ConfigMap data on every
//! ConfigMap it writes. A matching stamp means nobody edited the object
//! since; a mismatch means the content was supplied or changed by a user.

use sha2::{Digest, Sha256};

use super::types::ConfigMap;

/// Annotation carrying the content signature.
pub const COMPONENT_CONFIG_HASH_ANNOTATION: &str = "kubeadm.kubernetes.io/component-config.hash";

const CHECKSUM_PREFIX: &str = "sha256:";

/// Compute the signature of a ConfigMap's data.
///
/// Keys are hashed in sorted order, each key followed by its value.
pub fn checksum_for_config_map(config_map: &ConfigMap) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in &config_map.data {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    format!("{}{}", CHECKSUM_PREFIX, hex::encode(hasher.finalize()))
}

/// The signature currently stamped on the ConfigMap, if any.
pub fn config_map_signature(config_map: &ConfigMap) -> Option<&str> {
    config_map.annotation(COMPONENT_CONFIG_HASH_ANNOTATION)
}

/// Stamp the current data signature onto the ConfigMap.
pub fn sign_config_map(config_map: &mut ConfigMap) {
    let checksum = checksum_for_config_map(config_map);
    config_map
        .metadata
        .annotations
        .insert(COMPONENT_CONFIG_HASH_ANNOTATION.to_string(), checksum);
}

/// True if the stamped signature matches the data.
pub fn verify_config_map_signature(config_map: &ConfigMap) -> bool {
    match config_map_signature(config_map) {
        Some(signature) => signature == checksum_for_config_map(config_map),
        None => false,
    }
}
