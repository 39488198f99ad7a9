// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the command implementations.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use super::super::configs_cmd::{render_defaults, render_fetched};
use super::super::versions_format::*;
use super::super::{load_documents, EXIT_CLUSTER_ERROR, EXIT_CONFIG_ERROR};
use super::*;
use crate::componentconfigs::ComponentConfigError;

const SNAPSHOT: &str = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: kube-proxy
  namespace: kube-system
data:
  config.conf: |
    apiVersion: kubeproxy.config.k8s.io/v1alpha0
    kind: KubeProxyConfiguration
    hostnameOverride: node-a
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: kubelet-config
  namespace: kube-system
data:
  kubelet: |
    apiVersion: kubelet.config.k8s.io/v1beta1
    kind: KubeletConfiguration
";

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn config_for(snapshot: &NamedTempFile) -> ToolConfig {
    ToolConfig {
        cluster_snapshot: Some(snapshot.path().to_path_buf()),
        ..Default::default()
    }
}

fn state(group: &str, current: &str, preferred: &str, manual: bool) -> ComponentConfigVersionState {
    ComponentConfigVersionState {
        group: group.to_string(),
        current_version: current.to_string(),
        preferred_version: preferred.to_string(),
        manual_upgrade_required: manual,
    }
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("kubeproxy.config.k8s.io", 10), "kubepro...");
}

#[test]
fn test_display_version() {
    assert_eq!(display_version(""), "-");
    assert_eq!(display_version("v1beta1"), "v1beta1");
}

#[test]
fn test_format_versions_table() {
    let table = format_versions_table(&[
        state("kubeproxy.config.k8s.io", "", "v1alpha1", true),
        state("kubelet.config.k8s.io", "v1beta1", "v1beta1", false),
    ]);
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("API GROUP"));
    assert!(lines[2].contains("| -          | v1alpha1   | yes"));
    assert!(lines[3].ends_with("| no"));
}

#[test]
fn test_exit_code_for() {
    assert_eq!(exit_code_for(&[]), EXIT_SUCCESS);
    assert_eq!(exit_code_for(&[state("a", "v1", "v1", false)]), EXIT_SUCCESS);
    assert_eq!(
        exit_code_for(&[state("a", "v1", "v1", false), state("b", "v1", "v2", true)]),
        EXIT_UPGRADE_REQUIRED
    );
}

#[test]
fn test_version_states_from_snapshot() {
    let snapshot = write_file(SNAPSHOT);
    let states = version_states(&Registry::known(), &config_for(&snapshot), None).unwrap();

    assert_eq!(states[0], state("kubeproxy.config.k8s.io", "v1alpha0", "v1alpha1", true));
    assert_eq!(states[1], state("kubelet.config.k8s.io", "v1beta1", "v1beta1", false));
    assert_eq!(run_versions(&Registry::known(), &config_for(&snapshot), None, true), EXIT_UPGRADE_REQUIRED);
}

#[test]
fn test_version_states_with_substitute_file() {
    let snapshot = write_file(SNAPSHOT);
    let substitutes = write_file("apiVersion: kubeproxy.config.k8s.io/v1alpha1\nkind: KubeProxyConfiguration\n");

    let states = version_states(&Registry::known(), &config_for(&snapshot), Some(substitutes.path())).unwrap();
    assert!(states.iter().all(|s| !s.manual_upgrade_required));
    assert_eq!(
        run_versions(&Registry::known(), &config_for(&snapshot), Some(substitutes.path()), false),
        EXIT_SUCCESS
    );
}

#[test]
fn test_missing_snapshot_is_config_error() {
    let err = version_states(&Registry::known(), &ToolConfig::default(), None).unwrap_err();
    assert!(matches!(err, CliError::NoSnapshot));
    assert_eq!(err.exit_code(), EXIT_CONFIG_ERROR);
}

#[test]
fn test_unreadable_snapshot_is_cluster_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ToolConfig {
        cluster_snapshot: Some(dir.path().join("absent.yaml")),
        ..Default::default()
    };
    assert_eq!(run_versions(&Registry::known(), &config, None, false), EXIT_CLUSTER_ERROR);
}

#[test]
fn test_cluster_read_errors_map_to_cluster_exit_code() {
    let err = CliError::Component(ComponentConfigError::ClusterRead {
        group: "kubelet.config.k8s.io".to_string(),
        source: crate::k8s::ClusterError::Decode("bad".to_string()),
    });
    assert_eq!(err.exit_code(), EXIT_CLUSTER_ERROR);

    let err = CliError::Component(ComponentConfigError::ValueMismatch {
        group: "kubelet.config.k8s.io".to_string(),
    });
    assert_eq!(err.exit_code(), EXIT_CONFIG_ERROR);
}

#[test]
fn test_load_documents() {
    assert!(load_documents(None).unwrap().is_empty());

    let bad = write_file("kind: KubeProxyConfiguration\n");
    assert!(matches!(load_documents(Some(bad.path())), Err(CliError::Documents { .. })));

    let missing = PathBuf::from("/nonexistent/overrides.yaml");
    assert!(matches!(load_documents(Some(missing.as_path())), Err(CliError::Io { .. })));
}

#[test]
fn test_render_defaults() {
    let yaml = render_defaults(&Registry::known(), &ToolConfig::default()).unwrap();
    assert!(yaml.contains("apiVersion: kubeproxy.config.k8s.io/v1alpha1"));
    assert!(yaml.contains("apiVersion: kubelet.config.k8s.io/v1beta1"));
    assert!(yaml.contains("10.96.0.10"));
}

#[test]
fn test_render_fetched_requires_override_for_old_config() {
    let snapshot = write_file(SNAPSHOT);
    let err = render_fetched(&Registry::known(), &config_for(&snapshot), None).unwrap_err();
    assert!(matches!(err, CliError::Component(ComponentConfigError::IncompatibleVersion { .. })));

    let overrides = write_file("apiVersion: kubeproxy.config.k8s.io/v1alpha1\nkind: KubeProxyConfiguration\nhostnameOverride: node-b\n");
    let yaml = render_fetched(&Registry::known(), &config_for(&snapshot), Some(overrides.path())).unwrap();
    assert!(yaml.contains("hostnameOverride: node-b"));
}
