// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cluster object store seam.
//!
//! The core only ever reads ConfigMaps. Each read is one blocking round
//! trip with no retry; callers that want retries wrap the client.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::types::ConfigMap;
use super::validation::{validate_namespace, validate_object_name, ValidationError};

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("cluster unavailable while reading {namespace}/{name}: {reason}")]
    Unavailable {
        namespace: String,
        name: String,
        reason: String,
    },

    #[error("failed to read cluster snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode cluster snapshot: {0}")]
    Decode(String),

    #[error("invalid object in cluster snapshot: {0}")]
    InvalidObject(#[from] ValidationError),
}

/// Read access to the cluster's ConfigMaps.
pub trait ClusterClient {
    /// Fetch `namespace/name`. `Ok(None)` means the object does not exist.
    fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>, ClusterError>;
}

impl<T: ClusterClient + ?Sized> ClusterClient for &T {
    fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>, ClusterError> {
        (**self).get_config_map(namespace, name)
    }
}

type ObjectKey = (String, String);

/// In-memory object store.
///
/// Used by tests as a fake cluster and by the CLI to replay a snapshot of
/// ConfigMaps exported from a live cluster.
#[derive(Debug, Default)]
pub struct InMemoryClient {
    objects: BTreeMap<ObjectKey, ConfigMap>,
    failures: BTreeMap<ObjectKey, String>,
    reads: AtomicUsize,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(objects: impl IntoIterator<Item = ConfigMap>) -> Self {
        let mut client = Self::new();
        for object in objects {
            client.insert(object);
        }
        client
    }

    /// Store an object, replacing any existing one at the same key.
    pub fn insert(&mut self, object: ConfigMap) -> Option<ConfigMap> {
        let key = (object.namespace().to_string(), object.name().to_string());
        self.objects.insert(key, object)
    }

    /// Make every read of `namespace/name` fail with `reason`.
    pub fn fail_reads(&mut self, namespace: &str, name: &str, reason: impl Into<String>) {
        self.failures
            .insert((namespace.to_string(), name.to_string()), reason.into());
    }

    /// Number of reads served so far, failed ones included.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Load a multi-document YAML snapshot of ConfigMaps.
    ///
    /// Documents of any other kind are skipped. Object names and namespaces
    /// are validated.
    pub fn from_snapshot_str(snapshot: &str) -> Result<Self, ClusterError> {
        let mut client = Self::new();
        for document in serde_yaml::Deserializer::from_str(snapshot) {
            let value = serde_yaml::Value::deserialize(document)
                .map_err(|e| ClusterError::Decode(e.to_string()))?;
            if value.is_null() {
                continue;
            }

            let kind = value.get("kind").and_then(|k| k.as_str()).unwrap_or("ConfigMap");
            if kind != "ConfigMap" {
                debug!(kind, "Skipping non-ConfigMap object in snapshot");
                continue;
            }

            let object: ConfigMap =
                serde_yaml::from_value(value).map_err(|e| ClusterError::Decode(e.to_string()))?;
            validate_object_name(object.name())?;
            validate_namespace(object.namespace())?;
            client.insert(object);
        }
        Ok(client)
    }

    pub fn from_snapshot_file(path: impl AsRef<Path>) -> Result<Self, ClusterError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading cluster snapshot");
        let content = std::fs::read_to_string(path).map_err(|source| ClusterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_snapshot_str(&content)
    }
}

impl ClusterClient for InMemoryClient {
    fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>, ClusterError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let key = (namespace.to_string(), name.to_string());

        if let Some(reason) = self.failures.get(&key) {
            return Err(ClusterError::Unavailable {
                namespace: namespace.to_string(),
                name: name.to_string(),
                reason: reason.clone(),
            });
        }

        Ok(self.objects.get(&key).cloned())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
