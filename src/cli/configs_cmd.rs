// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! `defaults` and `fetch` commands: render component configs as YAML.

use std::path::Path;

use super::{cluster_configuration, load_cluster, load_documents, CliError, EXIT_SUCCESS};
use crate::componentconfigs::Registry;
use crate::config::ToolConfig;
use crate::k8s::{ApiEndpoint, NodeRegistrationOptions};

/// Print the defaulted component configs.
pub fn run_defaults(registry: &Registry, config: &ToolConfig) -> i32 {
    report(render_defaults(registry, config))
}

/// Print the component configs the cluster holds once `overrides` are
/// applied.
pub fn run_fetch(registry: &Registry, config: &ToolConfig, overrides: Option<&Path>) -> i32 {
    report(render_fetched(registry, config, overrides))
}

fn report(rendered: Result<String, CliError>) -> i32 {
    match rendered {
        Ok(yaml) => {
            print!("{}", yaml);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

pub fn render_defaults(registry: &Registry, config: &ToolConfig) -> Result<String, CliError> {
    let mut cluster = cluster_configuration(config);
    let endpoint = ApiEndpoint {
        advertise_address: config.advertise_address.clone(),
        ..Default::default()
    };
    registry.default_component_configs(&mut cluster, &endpoint, &NodeRegistrationOptions::default());
    Ok(cluster.component_configs.to_yaml(registry)?)
}

pub fn render_fetched(registry: &Registry, config: &ToolConfig, overrides: Option<&Path>) -> Result<String, CliError> {
    let client = load_cluster(config)?;
    let documents = load_documents(overrides)?;
    let mut cluster = cluster_configuration(config);
    registry.fetch_from_cluster_with_local_overwrites(&mut cluster, &client, &documents)?;
    Ok(cluster.component_configs.to_yaml(registry)?)
}
