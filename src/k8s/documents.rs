// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Document envelopes and multi-document YAML splitting.
//!
//! Every component config document declares `apiVersion: <group>/<version>`
//! and `kind`. The envelope is all that is read here; the body is handed to
//! the owning handler for decoding.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use super::version::compare_version_tags;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("document is not valid UTF-8")]
    InvalidUtf8,

    #[error("document {index} is not valid YAML: {reason}")]
    InvalidYaml { index: usize, reason: String },

    #[error("document {index} is missing the mandatory {field} field")]
    MissingField { index: usize, field: &'static str },

    #[error("malformed apiVersion {0:?}")]
    MalformedApiVersion(String),

    #[error("duplicate document for {0}")]
    Duplicate(GroupVersionKind),
}

/// Group, version and kind extracted from a document envelope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Build from envelope fields. A bare `v1` is the core (empty) group.
    pub fn from_envelope(api_version: &str, kind: &str) -> Result<Self, DocumentError> {
        let malformed = || DocumentError::MalformedApiVersion(api_version.to_string());
        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };

        if version.is_empty() || version.contains('/') || (api_version.contains('/') && group.is_empty()) {
            return Err(malformed());
        }

        Ok(Self::new(group, version, kind))
    }

    /// The `apiVersion` string this GVK serializes to.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn is(&self, group: &str, kind: &str) -> bool {
        self.group == group && self.kind == kind
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// Raw documents keyed by their envelope, iterated in GVK order.
pub type DocumentMap = BTreeMap<GroupVersionKind, Vec<u8>>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeMeta {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
}

/// Split a multi-document YAML (or JSON) stream into a `DocumentMap`.
///
/// Empty documents are skipped. Every other document must declare both
/// `apiVersion` and `kind`, and no GVK may appear twice. Each stored body is
/// the document re-serialized on its own, so content sharing a line with its
/// `---` marker is kept.
pub fn split_yaml_documents(bytes: &[u8]) -> Result<DocumentMap, DocumentError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DocumentError::InvalidUtf8)?;

    let mut documents = DocumentMap::new();
    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let invalid = |e: serde_yaml::Error| DocumentError::InvalidYaml {
            index,
            reason: e.to_string(),
        };

        let value = serde_yaml::Value::deserialize(document).map_err(invalid)?;
        if value.is_null() {
            continue;
        }

        let body = serde_yaml::to_string(&value).map_err(invalid)?;
        let gvk = envelope_of(value, index)?;
        if documents.contains_key(&gvk) {
            return Err(DocumentError::Duplicate(gvk));
        }
        documents.insert(gvk, body.into_bytes());
    }

    Ok(documents)
}

fn envelope_of(value: serde_yaml::Value, index: usize) -> Result<GroupVersionKind, DocumentError> {
    let meta: TypeMeta = serde_yaml::from_value(value).map_err(|e| DocumentError::InvalidYaml {
        index,
        reason: e.to_string(),
    })?;

    let api_version = meta
        .api_version
        .filter(|v| !v.is_empty())
        .ok_or(DocumentError::MissingField {
            index,
            field: "apiVersion",
        })?;
    let kind = meta.kind.filter(|k| !k.is_empty()).ok_or(DocumentError::MissingField {
        index,
        field: "kind",
    })?;

    GroupVersionKind::from_envelope(&api_version, &kind)
}

/// Documents in `documents` owned by the `(group, kind)` pair.
pub fn documents_for<'a>(
    documents: &'a DocumentMap,
    group: &'a str,
    kind: &'a str,
) -> impl Iterator<Item = (&'a GroupVersionKind, &'a [u8])> + 'a {
    documents
        .iter()
        .filter(move |(gvk, _)| gvk.is(group, kind))
        .map(|(gvk, bytes)| (gvk, bytes.as_slice()))
}

/// The document owned by `(group, kind)` at the newest API version, ordered
/// by `compare_version_tags`.
pub fn newest_document_for<'a>(
    documents: &'a DocumentMap,
    group: &'a str,
    kind: &'a str,
) -> Option<(&'a GroupVersionKind, &'a [u8])> {
    documents_for(documents, group, kind).max_by(|(a, _), (b, _)| compare_version_tags(&a.version, &b.version))
}

#[cfg(test)]
#[path = "documents_tests.rs"]
mod tests;
