// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the node agent handler.

use super::*;
use crate::componentconfigs::kubeproxy::KubeProxyConfiguration;

fn defaults(cluster: &ClusterConfiguration, node: &NodeRegistrationOptions) -> KubeletConfiguration {
    match KubeletHandler.default_value(cluster, &ApiEndpoint::default(), node) {
        ComponentConfigValue::Kubelet(cfg) => cfg,
        other => panic!("unexpected value {:?}", other),
    }
}

#[test]
fn test_cluster_dns_address() {
    assert_eq!(cluster_dns_address("10.96.0.0/12"), Some("10.96.0.10".parse().unwrap()));
    assert_eq!(
        cluster_dns_address("172.20.0.0/16,fd00:10:96::/112"),
        Some("172.20.0.10".parse().unwrap())
    );
    assert_eq!(
        cluster_dns_address("fd00:10:96::/112"),
        Some("fd00:10:96::a".parse().unwrap())
    );
}

#[test]
fn test_cluster_dns_address_rejects_bad_subnets() {
    assert_eq!(cluster_dns_address(""), None);
    assert_eq!(cluster_dns_address("not-a-subnet"), None);
    // Too small to hold a tenth address.
    assert_eq!(cluster_dns_address("10.0.0.0/29"), None);
}

#[test]
fn test_defaults() {
    let cfg = defaults(&ClusterConfiguration::default(), &NodeRegistrationOptions::default());

    assert_eq!(cfg.cluster_dns, vec!["10.96.0.10".to_string()]);
    assert_eq!(cfg.cluster_domain, "cluster.local");
    assert_eq!(cfg.static_pod_path, "/etc/kubernetes/manifests");
    assert_eq!(cfg.client_ca_file, "/etc/kubernetes/pki/ca.crt");
    assert_eq!(cfg.authorization_mode, "Webhook");
    assert_eq!(cfg.healthz_bind_address, "127.0.0.1");
    assert!(cfg.rotate_certificates);
    assert_eq!(cfg.cgroup_driver, "systemd");
    assert_eq!(cfg.resolv_conf, "/run/systemd/resolve/resolv.conf");
}

#[test]
fn test_defaults_follow_cluster_networking() {
    let mut cluster = ClusterConfiguration::default();
    cluster.networking.service_subnet = "10.100.0.0/16".to_string();
    cluster.networking.dns_domain = "corp.internal".to_string();

    let cfg = defaults(&cluster, &NodeRegistrationOptions::default());
    assert_eq!(cfg.cluster_dns, vec!["10.100.0.10".to_string()]);
    assert_eq!(cfg.cluster_domain, "corp.internal");
}

#[test]
fn test_defaults_fall_back_on_bad_subnet() {
    let mut cluster = ClusterConfiguration::default();
    cluster.networking.service_subnet = "garbage".to_string();
    cluster.networking.dns_domain = String::new();

    let cfg = defaults(&cluster, &NodeRegistrationOptions::default());
    assert_eq!(cfg.cluster_dns, vec!["10.96.0.10".to_string()]);
    assert_eq!(cfg.cluster_domain, "cluster.local");
}

#[test]
fn test_defaults_honour_resolv_conf_flag() {
    let mut node = NodeRegistrationOptions::default();
    node.kubelet_extra_args
        .insert("resolv-conf".to_string(), "/etc/resolv.conf".to_string());

    let cfg = defaults(&ClusterConfiguration::default(), &node);
    assert_eq!(cfg.resolv_conf, "/etc/resolv.conf");
}

#[test]
fn test_unmarshal_v1beta1() {
    let doc = b"apiVersion: kubelet.config.k8s.io/v1beta1\n\
kind: KubeletConfiguration\n\
clusterDNS:\n- 10.96.0.10\n- fd00::a\n\
authentication:\n  x509:\n    clientCAFile: /pki/ca.crt\n\
authorization:\n  mode: AlwaysAllow\n\
cgroupDriver: cgroupfs\n";

    let value = KubeletHandler.unmarshal("v1beta1", doc).unwrap();
    let cfg = value.as_kubelet().unwrap();
    assert_eq!(cfg.cluster_dns, vec!["10.96.0.10".to_string(), "fd00::a".to_string()]);
    assert_eq!(cfg.client_ca_file, "/pki/ca.crt");
    assert_eq!(cfg.authorization_mode, "AlwaysAllow");
    assert_eq!(cfg.cgroup_driver, "cgroupfs");
    assert!(!cfg.rotate_certificates);
}

#[test]
fn test_unmarshal_v1alpha1_single_dns() {
    let doc = b"apiVersion: kubelet.config.k8s.io/v1alpha1\n\
kind: KubeletConfiguration\n\
clusterDNS: 10.32.0.10\n";

    let value = KubeletHandler.unmarshal("v1alpha1", doc).unwrap();
    assert_eq!(value.as_kubelet().unwrap().cluster_dns, vec!["10.32.0.10".to_string()]);

    let empty = KubeletHandler
        .unmarshal("v1alpha1", b"kind: KubeletConfiguration\n")
        .unwrap();
    assert!(empty.as_kubelet().unwrap().cluster_dns.is_empty());
}

#[test]
fn test_unmarshal_unsupported_version() {
    let err = KubeletHandler.unmarshal("v1", b"{}").unwrap_err();
    assert!(matches!(err, ComponentConfigError::UnsupportedVersion { ref version, .. } if version == "v1"));
}

#[test]
fn test_marshal_writes_preferred_version() {
    let cfg = defaults(&ClusterConfiguration::default(), &NodeRegistrationOptions::default());
    let bytes = KubeletHandler.marshal(&ComponentConfigValue::Kubelet(cfg.clone())).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();

    assert!(text.contains("apiVersion: kubelet.config.k8s.io/v1beta1"));
    assert!(text.contains("kind: KubeletConfiguration"));
    assert!(text.contains("clientCAFile: /etc/kubernetes/pki/ca.crt"));

    let back = KubeletHandler.unmarshal("v1beta1", &bytes).unwrap();
    assert_eq!(back.as_kubelet(), Some(&cfg));
}

#[test]
fn test_marshal_rejects_foreign_value() {
    let value = ComponentConfigValue::KubeProxy(KubeProxyConfiguration::default());
    assert!(matches!(
        KubeletHandler.marshal(&value),
        Err(ComponentConfigError::ValueMismatch { .. })
    ));
}

#[test]
fn test_storage_key_versioned_before_1_24() {
    let key = KubeletHandler.storage_key(&KubernetesVersion::parse("v1.23.7").unwrap());
    assert_eq!(key.namespace, "kube-system");
    assert_eq!(key.name, "kubelet-config-1.23");
    assert_eq!(key.data_key, "kubelet");
    assert!(key.validate().is_ok());
}

#[test]
fn test_storage_key_unversioned_from_1_24() {
    for release in ["v1.24.0", "1.30"] {
        let key = KubeletHandler.storage_key(&KubernetesVersion::parse(release).unwrap());
        assert_eq!(key.name, "kubelet-config");
    }
}
