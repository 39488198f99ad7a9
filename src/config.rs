// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tool configuration for the command line front end.
//!
//! Precedence, highest first: command line flags, environment, config
//! file, built-in defaults.

use std::collections::HashMap;
use std::fs;
use std::hash::BuildHasher;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::k8s::{KubernetesVersion, Networking};

pub const ENV_CONFIG_FILE: &str = "COMPONENT_CONFIGS_CONFIG";
pub const ENV_KUBERNETES_VERSION: &str = "COMPONENT_CONFIGS_KUBERNETES_VERSION";
pub const ENV_CLUSTER_SNAPSHOT: &str = "COMPONENT_CONFIGS_CLUSTER_SNAPSHOT";
pub const ENV_LOG_FORMAT: &str = "COMPONENT_CONFIGS_LOG_FORMAT";

/// Release assumed when nothing else names one.
pub const DEFAULT_KUBERNETES_VERSION: &str = "v1.30.0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(String),

    #[error("invalid value {value:?} for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Effective configuration of one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub kubernetes_version: String,
    /// Multi-document YAML of ConfigMaps standing in for a live cluster.
    pub cluster_snapshot: Option<PathBuf>,
    pub log_format: LogFormat,
    /// Used when defaulting component configs.
    pub networking: Networking,
    pub advertise_address: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            kubernetes_version: DEFAULT_KUBERNETES_VERSION.to_string(),
            cluster_snapshot: None,
            log_format: LogFormat::Text,
            networking: Networking::default(),
            advertise_address: String::new(),
        }
    }
}

/// Values set on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub kubernetes_version: Option<String>,
    pub cluster_snapshot: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

/// Partial config as read from a file; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolConfigPatch {
    kubernetes_version: Option<String>,
    cluster_snapshot: Option<PathBuf>,
    log_format: Option<LogFormat>,
    advertise_address: Option<String>,
    networking: Option<NetworkingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkingPatch {
    service_subnet: Option<String>,
    pod_subnet: Option<String>,
    dns_domain: Option<String>,
}

/// Load configuration from every layer.
///
/// The config file path comes from the command line, then from
/// `COMPONENT_CONFIGS_CONFIG`. A named file that does not exist is an error.
///
/// # Errors
/// `ConfigError` on unreadable or malformed files and invalid values.
pub fn load<S: BuildHasher>(env: &HashMap<String, String, S>, cli: &CliOverrides) -> Result<ToolConfig, ConfigError> {
    let config_file = cli
        .config_file
        .clone()
        .or_else(|| env.get(ENV_CONFIG_FILE).map(PathBuf::from));

    let contents = match &config_file {
        Some(path) => Some(fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?),
        None => None,
    };

    load_from_str(contents.as_deref(), env, cli)
}

/// Load configuration from raw TOML plus the environment and flag layers.
pub fn load_from_str<S: BuildHasher>(
    config_toml: Option<&str>,
    env: &HashMap<String, String, S>,
    cli: &CliOverrides,
) -> Result<ToolConfig, ConfigError> {
    let mut config = ToolConfig::default();

    if let Some(config_toml) = config_toml {
        let patch: ToolConfigPatch = toml::from_str(config_toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        apply_patch(&mut config, patch);
    }

    apply_env_overrides(&mut config, env)?;
    apply_cli_overrides(&mut config, cli);
    validate(&config)?;
    Ok(config)
}

fn apply_patch(config: &mut ToolConfig, patch: ToolConfigPatch) {
    if let Some(version) = patch.kubernetes_version {
        config.kubernetes_version = version;
    }
    if let Some(snapshot) = patch.cluster_snapshot {
        config.cluster_snapshot = Some(snapshot);
    }
    if let Some(format) = patch.log_format {
        config.log_format = format;
    }
    if let Some(address) = patch.advertise_address {
        config.advertise_address = address;
    }
    if let Some(networking) = patch.networking {
        if let Some(subnet) = networking.service_subnet {
            config.networking.service_subnet = subnet;
        }
        if let Some(subnet) = networking.pod_subnet {
            config.networking.pod_subnet = subnet;
        }
        if let Some(domain) = networking.dns_domain {
            config.networking.dns_domain = domain;
        }
    }
}

fn apply_env_overrides<S: BuildHasher>(
    config: &mut ToolConfig,
    env: &HashMap<String, String, S>,
) -> Result<(), ConfigError> {
    if let Some(value) = env.get(ENV_KUBERNETES_VERSION) {
        config.kubernetes_version.clone_from(value);
    }
    if let Some(value) = env.get(ENV_CLUSTER_SNAPSHOT) {
        config.cluster_snapshot = Some(PathBuf::from(value));
    }
    if let Some(value) = env.get(ENV_LOG_FORMAT) {
        config.log_format = LogFormat::from_str(value).map_err(|()| ConfigError::InvalidValue {
            field: "log_format",
            value: value.clone(),
            reason: "expected text|json".to_string(),
        })?;
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut ToolConfig, cli: &CliOverrides) {
    if let Some(version) = &cli.kubernetes_version {
        config.kubernetes_version.clone_from(version);
    }
    if let Some(snapshot) = &cli.cluster_snapshot {
        config.cluster_snapshot = Some(snapshot.clone());
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
}

fn validate(config: &ToolConfig) -> Result<(), ConfigError> {
    KubernetesVersion::parse(&config.kubernetes_version).map_err(|e| ConfigError::InvalidValue {
        field: "kubernetes_version",
        value: config.kubernetes_version.clone(),
        reason: e.to_string(),
    })?;
    if let Some(path) = &config.cluster_snapshot {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cluster_snapshot",
                value: String::new(),
                reason: "path must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = load_from_str(None, &env(&[]), &CliOverrides::default()).unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.kubernetes_version, DEFAULT_KUBERNETES_VERSION);
        assert!(config.cluster_snapshot.is_none());
    }

    #[test]
    fn test_precedence_is_cli_then_env_then_file() {
        let toml = "kubernetes_version = \"v1.27.0\"\nlog_format = \"json\"\ncluster_snapshot = \"/file.yaml\"\n";
        let env = env(&[
            (ENV_KUBERNETES_VERSION, "v1.28.1"),
            (ENV_CLUSTER_SNAPSHOT, "/env.yaml"),
        ]);
        let cli = CliOverrides {
            kubernetes_version: Some("v1.29.3".to_string()),
            ..Default::default()
        };

        let config = load_from_str(Some(toml), &env, &cli).unwrap();
        assert_eq!(config.kubernetes_version, "v1.29.3");
        assert_eq!(config.cluster_snapshot, Some(PathBuf::from("/env.yaml")));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_file_networking() {
        let toml = "[networking]\nservice_subnet = \"10.100.0.0/16\"\npod_subnet = \"192.168.0.0/16\"\n";
        let config = load_from_str(Some(toml), &env(&[]), &CliOverrides::default()).unwrap();
        assert_eq!(config.networking.service_subnet, "10.100.0.0/16");
        assert_eq!(config.networking.pod_subnet, "192.168.0.0/16");
        assert_eq!(config.networking.dns_domain, "cluster.local");
    }

    #[test]
    fn test_unknown_file_keys_rejected() {
        let err = load_from_str(Some("kubernetes_verison = \"v1.30.0\"\n"), &env(&[]), &CliOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_env_log_format() {
        let err = load_from_str(None, &env(&[(ENV_LOG_FORMAT, "xml")]), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "log_format", .. }));
    }

    #[test]
    fn test_invalid_kubernetes_version() {
        let cli = CliOverrides {
            kubernetes_version: Some("stable".to_string()),
            ..Default::default()
        };
        let err = load_from_str(None, &env(&[]), &cli).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "kubernetes_version", .. }));
    }

    #[test]
    fn test_load_reads_file_named_in_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "kubernetes_version = \"v1.23.5\"").unwrap();
        let env = env(&[(ENV_CONFIG_FILE, file.path().to_str().unwrap())]);

        let config = load(&env, &CliOverrides::default()).unwrap();
        assert_eq!(config.kubernetes_version, "v1.23.5");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = CliOverrides {
            config_file: Some(dir.path().join("absent.toml")),
            ..Default::default()
        };
        let err = load(&env(&[]), &cli).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
