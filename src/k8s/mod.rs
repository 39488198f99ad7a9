// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes integration types.
//!
//! The object model, version types and cluster-client seam the component
//! config registry is built on.

pub mod checksum;
pub mod client;
pub mod documents;
pub mod types;
pub mod validation;
pub mod version;

pub use checksum::{
    checksum_for_config_map, sign_config_map, verify_config_map_signature,
    COMPONENT_CONFIG_HASH_ANNOTATION,
};
pub use client::{ClusterClient, ClusterError, InMemoryClient};
pub use documents::{split_yaml_documents, DocumentError, DocumentMap, GroupVersionKind};
pub use types::{
    ApiEndpoint, ClusterConfiguration, ConfigMap, Networking, NodeRegistrationOptions, ObjectMeta,
    NAMESPACE_SYSTEM,
};
pub use version::{ApiVersion, KubernetesVersion, VersionError};
