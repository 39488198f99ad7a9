// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Validation functions for cluster object names and ConfigMap keys.
//!
//! Storage keys come from handlers and snapshot objects come from disk;
//! both are checked before they reach the object store.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum length of an object name (DNS-1123 subdomain).
pub const MAX_NAME_LENGTH: usize = 253;

/// Maximum length of a namespace (DNS-1123 label).
const MAX_NAMESPACE_LENGTH: usize = 63;

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name is not a DNS-1123 subdomain.
    InvalidName(String),
    /// Namespace is not a DNS-1123 label.
    InvalidNamespace(String),
    /// ConfigMap data key has characters outside `[-._a-zA-Z0-9]`.
    InvalidDataKey(String),
    /// Field exceeds maximum length.
    MaxLengthExceeded { field: String, max: usize },
    /// Field is empty but required.
    EmptyField(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "Invalid object name: {}", name),
            Self::InvalidNamespace(ns) => write!(f, "Invalid namespace: {}", ns),
            Self::InvalidDataKey(key) => write!(f, "Invalid data key: {}", key),
            Self::MaxLengthExceeded { field, max } => {
                write!(f, "Field '{}' exceeds maximum length of {}", field, max)
            }
            Self::EmptyField(field) => write!(f, "Field '{}' cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

fn subdomain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
            .expect("valid subdomain pattern")
    })
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid label pattern"))
}

fn data_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[-._a-zA-Z0-9]+$").expect("valid data key pattern"))
}

/// Validate an object name.
pub fn validate_object_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::MaxLengthExceeded {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    if !subdomain_pattern().is_match(name) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }

    Ok(())
}

/// Validate a namespace.
pub fn validate_namespace(namespace: &str) -> Result<(), ValidationError> {
    if namespace.is_empty() {
        return Err(ValidationError::EmptyField("namespace".to_string()));
    }

    if namespace.len() > MAX_NAMESPACE_LENGTH {
        return Err(ValidationError::MaxLengthExceeded {
            field: "namespace".to_string(),
            max: MAX_NAMESPACE_LENGTH,
        });
    }

    if !label_pattern().is_match(namespace) {
        return Err(ValidationError::InvalidNamespace(namespace.to_string()));
    }

    Ok(())
}

/// Validate a ConfigMap data key.
///
/// `.` and `..` are rejected even though they match the character set.
pub fn validate_data_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyField("data key".to_string()));
    }

    if key.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::MaxLengthExceeded {
            field: "data key".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    if key == "." || key == ".." || !data_key_pattern().is_match(key) {
        return Err(ValidationError::InvalidDataKey(key.to_string()));
    }

    Ok(())
}
