// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! `versions` command: component config upgrade guidance.

use std::path::Path;

use super::versions_format::print_versions_human;
use super::{cluster_configuration, load_cluster, load_documents, CliError, EXIT_SUCCESS, EXIT_UPGRADE_REQUIRED};
use crate::componentconfigs::{ComponentConfigVersionState, Registry};
use crate::config::ToolConfig;

/// Run the versions command and display results.
pub fn run_versions(registry: &Registry, config: &ToolConfig, substitutes: Option<&Path>, json_output: bool) -> i32 {
    match version_states(registry, config, substitutes) {
        Ok(states) => {
            if json_output {
                match serde_json::to_string_pretty(&states) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error encoding report: {}", e);
                        return super::EXIT_CONFIG_ERROR;
                    }
                }
            } else {
                print_versions_human(&states);
            }
            exit_code_for(&states)
        }
        Err(e) => {
            eprintln!("Error computing component config versions: {}", e);
            e.exit_code()
        }
    }
}

/// Compute the version report for the configured snapshot.
pub fn version_states(
    registry: &Registry,
    config: &ToolConfig,
    substitutes: Option<&Path>,
) -> Result<Vec<ComponentConfigVersionState>, CliError> {
    let client = load_cluster(config)?;
    let documents = load_documents(substitutes)?;
    let cluster = cluster_configuration(config);
    Ok(registry.get_version_states(&cluster, &client, &documents)?)
}

/// 1 when any component needs a manual upgrade, 0 otherwise.
pub fn exit_code_for(states: &[ComponentConfigVersionState]) -> i32 {
    if states.iter().any(|s| s.manual_upgrade_required) {
        EXIT_UPGRADE_REQUIRED
    } else {
        EXIT_SUCCESS
    }
}

#[cfg(test)]
#[path = "versions_tests.rs"]
mod tests;
