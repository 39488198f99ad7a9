// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end component config registry tests.
//!
//! Drives the public API the way the bootstrap and upgrade flows do:
//! default, store, fetch back, resolve overrides, report versions.

use pretty_assertions::assert_eq;

use component_configs::componentconfigs::kubelet::{KUBELET_CONFIG_MAP, KUBELET_CONFIG_MAP_KEY};
use component_configs::componentconfigs::kubeproxy::{KUBE_PROXY_CONFIG_MAP, KUBE_PROXY_CONFIG_MAP_KEY};
use component_configs::componentconfigs::{KUBELET_GROUP, KUBE_PROXY_GROUP};
use component_configs::k8s::{
    split_yaml_documents, ApiEndpoint, ConfigMap, KubernetesVersion, NodeRegistrationOptions,
    COMPONENT_CONFIG_HASH_ANNOTATION, NAMESPACE_SYSTEM,
};
use component_configs::{
    ClusterConfiguration, ComponentConfigError, ComponentConfigVersionState, DocumentMap, InMemoryClient, Registry,
};

const CLUSTER_VERSION: &str = "v1.30.2";
const LEGACY_SIGNATURE: &str = "sha256:8d3dfd7abcac205f6744d8e9db44505cce0c15b0a5395501e272fc18bd54c13c";

fn proxy(version: &str, hostname: &str) -> String {
    format!(
        "apiVersion: kubeproxy.config.k8s.io/{}\nkind: KubeProxyConfiguration\nhostnameOverride: {}\n",
        version, hostname
    )
}

fn kubelet(version: &str) -> String {
    format!("apiVersion: kubelet.config.k8s.io/{}\nkind: KubeletConfiguration\n", version)
}

fn proxy_config_map(contents: &str) -> ConfigMap {
    ConfigMap::new(NAMESPACE_SYSTEM, KUBE_PROXY_CONFIG_MAP).with_data(KUBE_PROXY_CONFIG_MAP_KEY, contents)
}

fn legacy_proxy_config_map(contents: &str) -> ConfigMap {
    proxy_config_map(contents).with_annotation(COMPONENT_CONFIG_HASH_ANNOTATION, LEGACY_SIGNATURE)
}

fn cluster_with_proxy(proxy: ConfigMap) -> InMemoryClient {
    InMemoryClient::with_objects([
        proxy,
        ConfigMap::new(NAMESPACE_SYSTEM, KUBELET_CONFIG_MAP).with_data(KUBELET_CONFIG_MAP_KEY, kubelet("v1beta1")),
    ])
}

fn documents(yaml: &str) -> DocumentMap {
    split_yaml_documents(yaml.as_bytes()).unwrap()
}

fn hostname_override(cluster: &ClusterConfiguration) -> String {
    cluster
        .component_configs
        .get(KUBE_PROXY_GROUP)
        .and_then(|c| c.value().as_kube_proxy())
        .map(|p| p.hostname_override.clone())
        .unwrap()
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
fn test_defaults_cover_every_registered_group() {
    let registry = Registry::known();
    let mut cluster = ClusterConfiguration::with_kubernetes_version(CLUSTER_VERSION);
    registry.default_component_configs(&mut cluster, &ApiEndpoint::default(), &NodeRegistrationOptions::default());

    assert_eq!(cluster.component_configs.len(), registry.len());
    for handler in registry.handlers() {
        let config = cluster.component_configs.get(handler.group()).unwrap();
        assert_eq!(config.version(), Some(handler.preferred_version()));
        assert!(!config.is_legacy());
        assert!(!config.is_user_supplied());
    }
}

#[test]
fn test_stored_defaults_fetch_back_unchanged() {
    let registry = Registry::known();
    let mut cluster = ClusterConfiguration::with_kubernetes_version(CLUSTER_VERSION);
    registry.default_component_configs(&mut cluster, &ApiEndpoint::default(), &NodeRegistrationOptions::default());

    let release = KubernetesVersion::parse(CLUSTER_VERSION).unwrap();
    let mut client = InMemoryClient::new();
    for config in cluster.component_configs.iter() {
        client.insert(registry.config_map_for(config, &release).unwrap());
    }

    let mut fetched = ClusterConfiguration::with_kubernetes_version(CLUSTER_VERSION);
    registry.fetch_from_cluster(&mut fetched, &client).unwrap();

    assert_eq!(fetched.component_configs, cluster.component_configs);
}

#[test]
fn test_fetch_from_cluster() {
    let client = cluster_with_proxy(proxy_config_map(&proxy("v1alpha1", "foo")));
    let mut cluster = ClusterConfiguration::with_kubernetes_version(CLUSTER_VERSION);
    Registry::known().fetch_from_cluster(&mut cluster, &client).unwrap();

    assert_eq!(cluster.component_configs.len(), 2);
    assert_eq!(hostname_override(&cluster), "foo");
    assert_eq!(
        cluster.component_configs.get(KUBELET_GROUP).and_then(|c| c.version()),
        Some("v1beta1")
    );
}

#[test]
fn test_fetch_from_document_map() {
    let docs = documents(&format!("{}---\n{}", proxy("v1alpha1", "foo"), kubelet("v1beta1")));
    let mut cluster = ClusterConfiguration::with_kubernetes_version(CLUSTER_VERSION);
    Registry::known().fetch_from_document_map(&mut cluster, &docs).unwrap();

    assert_eq!(cluster.component_configs.len(), 2);
    assert_eq!(hostname_override(&cluster), "foo");
    assert!(cluster.component_configs.iter().all(|c| c.is_user_supplied()));
}

#[test]
fn test_fetch_with_local_overwrites() {
    struct Case {
        name: &'static str,
        proxy: ConfigMap,
        overrides: String,
        expected_hostname: Option<&'static str>,
    }

    let cases = [
        Case {
            name: "current cluster config without overwrite",
            proxy: proxy_config_map(&proxy("v1alpha1", "foo")),
            overrides: String::new(),
            expected_hostname: Some("foo"),
        },
        Case {
            name: "current cluster config with current overwrite",
            proxy: proxy_config_map(&proxy("v1alpha1", "foo")),
            overrides: proxy("v1alpha1", "bar"),
            expected_hostname: Some("bar"),
        },
        Case {
            name: "old cluster config without overwrite",
            proxy: proxy_config_map(&proxy("v1alpha0", "foo")),
            overrides: String::new(),
            expected_hostname: None,
        },
        Case {
            name: "old cluster config with current overwrite",
            proxy: proxy_config_map(&proxy("v1alpha0", "foo")),
            overrides: proxy("v1alpha1", "bar"),
            expected_hostname: Some("bar"),
        },
        Case {
            name: "old cluster config with old overwrite",
            proxy: proxy_config_map(&proxy("v1alpha0", "foo")),
            overrides: proxy("v1alpha0", "bar"),
            expected_hostname: Some("bar"),
        },
        Case {
            name: "unsupported cluster config without overwrite",
            proxy: proxy_config_map(&proxy("v1alpha9", "foo")),
            overrides: String::new(),
            expected_hostname: None,
        },
        Case {
            name: "unsupported cluster config with current overwrite",
            proxy: proxy_config_map(&proxy("v1alpha9", "foo")),
            overrides: proxy("v1alpha1", "bar"),
            expected_hostname: Some("bar"),
        },
        Case {
            name: "legacy cluster config without overwrite",
            proxy: legacy_proxy_config_map(&proxy("v1alpha1", "foo")),
            overrides: String::new(),
            expected_hostname: None,
        },
        Case {
            name: "legacy cluster config with current overwrite",
            proxy: legacy_proxy_config_map(&proxy("v1alpha1", "foo")),
            overrides: proxy("v1alpha1", "bar"),
            expected_hostname: Some("bar"),
        },
    ];

    for case in cases {
        let client = cluster_with_proxy(case.proxy);
        let mut cluster = ClusterConfiguration::with_kubernetes_version(CLUSTER_VERSION);
        let result =
            Registry::known().fetch_from_cluster_with_local_overwrites(&mut cluster, &client, &documents(&case.overrides));

        match case.expected_hostname {
            Some(hostname) => {
                assert!(result.is_ok(), "{}: {:?}", case.name, result);
                assert_eq!(hostname_override(&cluster), hostname, "{}", case.name);
            }
            None => match result {
                Err(ComponentConfigError::IncompatibleVersion { group, preferred, .. }) => {
                    assert_eq!(group, KUBE_PROXY_GROUP, "{}", case.name);
                    assert_eq!(preferred, "v1alpha1", "{}", case.name);
                }
                other => panic!("{}: expected incompatible version, got {:?}", case.name, other),
            },
        }
    }
}

#[test]
fn test_get_version_states() {
    let current_kubelet = state(KUBELET_GROUP, "v1beta1", "v1beta1", false);
    let cases = [
        (
            "current cluster config",
            proxy_config_map(&proxy("v1alpha1", "foo")),
            String::new(),
            state(KUBE_PROXY_GROUP, "v1alpha1", "v1alpha1", false),
        ),
        (
            "old cluster config",
            proxy_config_map(&proxy("v1alpha0", "foo")),
            String::new(),
            state(KUBE_PROXY_GROUP, "v1alpha0", "v1alpha1", true),
        ),
        (
            "old cluster config with current substitute",
            proxy_config_map(&proxy("v1alpha0", "foo")),
            proxy("v1alpha1", "bar"),
            state(KUBE_PROXY_GROUP, "v1alpha1", "v1alpha1", false),
        ),
        (
            "unsupported cluster config",
            proxy_config_map(&proxy("v1alpha9", "foo")),
            String::new(),
            state(KUBE_PROXY_GROUP, "v1alpha9", "v1alpha1", true),
        ),
        (
            "legacy cluster config",
            legacy_proxy_config_map(&proxy("v1alpha1", "foo")),
            String::new(),
            state(KUBE_PROXY_GROUP, "", "v1alpha1", true),
        ),
        (
            "legacy cluster config with current substitute",
            legacy_proxy_config_map(&proxy("v1alpha1", "foo")),
            proxy("v1alpha1", "bar"),
            state(KUBE_PROXY_GROUP, "v1alpha1", "v1alpha1", false),
        ),
    ];

    for (name, proxy, substitutes, expected_proxy) in cases {
        let client = cluster_with_proxy(proxy);
        let cluster = ClusterConfiguration::with_kubernetes_version(CLUSTER_VERSION);
        let states = Registry::known()
            .get_version_states(&cluster, &client, &documents(&substitutes))
            .unwrap_or_else(|e| panic!("{}: {}", name, e));

        assert_eq!(states, vec![expected_proxy, current_kubelet.clone()], "{}", name);
        assert!(cluster.component_configs.is_empty(), "{}", name);
    }
}

#[test]
fn test_get_version_states_for_component_not_installed() {
    let client = InMemoryClient::with_objects([
        ConfigMap::new(NAMESPACE_SYSTEM, KUBELET_CONFIG_MAP).with_data(KUBELET_CONFIG_MAP_KEY, kubelet("v1beta1")),
    ]);
    let cluster = ClusterConfiguration::with_kubernetes_version(CLUSTER_VERSION);
    let states = Registry::known()
        .get_version_states(&cluster, &client, &DocumentMap::new())
        .unwrap();

    assert_eq!(
        states,
        vec![
            state(KUBE_PROXY_GROUP, "", "v1alpha1", false),
            state(KUBELET_GROUP, "v1beta1", "v1beta1", false),
        ]
    );
}
