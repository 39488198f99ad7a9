// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing and help text for component-configs.

use std::path::PathBuf;

use component_configs::config::{CliOverrides, LogFormat};

/// Flags shared by every command.
#[derive(Debug, Default)]
pub struct ParsedArgs {
    pub overrides: CliOverrides,
    /// Local documents: overrides for `fetch`, substitutes for `versions`.
    pub documents: Option<PathBuf>,
    pub json: bool,
}

/// Parse the flags following the command name.
pub fn parse_flags(args: &[String]) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--json" => {
                parsed.json = true;
                i += 1;
                continue;
            }
            "--config-file" | "--kubernetes-version" | "--snapshot" | "--overrides" | "--log-format" => {}
            _ => return Err(format!("Unknown argument: {}", flag)),
        }

        let value = args
            .get(i + 1)
            .ok_or_else(|| format!("Missing value for {}", flag))?
            .clone();
        match flag {
            "--config-file" => parsed.overrides.config_file = Some(PathBuf::from(value)),
            "--kubernetes-version" => parsed.overrides.kubernetes_version = Some(value),
            "--snapshot" => parsed.overrides.cluster_snapshot = Some(PathBuf::from(value)),
            "--overrides" => parsed.documents = Some(PathBuf::from(value)),
            _ => {
                let format = value
                    .parse::<LogFormat>()
                    .map_err(|()| format!("Invalid value for --log-format: {} (expected text|json)", value))?;
                parsed.overrides.log_format = Some(format);
            }
        }
        i += 2;
    }

    Ok(parsed)
}

/// Print general usage information.
pub fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "component-configs - Versioned component configuration registry v{}

USAGE:
    component-configs <COMMAND> [OPTIONS]

COMMANDS:
    versions     Report component config versions and required manual upgrades
    defaults     Print the default component configs
    fetch        Print the cluster's component configs with local overrides applied
    version      Show version information
    help         Show this help message

OPTIONS:
    --config-file FILE          Load tool configuration from a TOML file
    --kubernetes-version VER    Cluster release used to locate stored configs
    --snapshot FILE             Multi-document YAML of the cluster's ConfigMaps
    --overrides FILE            Local component config documents
    --log-format text|json      Log output format (logs go to stderr)
    --json                      JSON output (versions only)

EXAMPLES:
    component-configs versions --snapshot cluster.yaml
    component-configs versions --snapshot cluster.yaml --overrides proxy.yaml --json
    component-configs fetch --snapshot cluster.yaml --overrides proxy.yaml
    component-configs defaults --kubernetes-version v1.30.2

ENVIRONMENT:
    COMPONENT_CONFIGS_CONFIG               Tool configuration file
    COMPONENT_CONFIGS_KUBERNETES_VERSION   Cluster release
    COMPONENT_CONFIGS_CLUSTER_SNAPSHOT     Cluster snapshot file
    COMPONENT_CONFIGS_LOG_FORMAT           Log output format (text, json)
    RUST_LOG                               Log level (debug, info, warn, error)

EXIT CODES:
    0  Success / no manual upgrade required
    1  Manual upgrade required
    2  Configuration error
    3  Cluster read error
",
        version
    );
}

/// Print detailed help for a specific command.
pub fn print_command_help(command: &str) {
    match command {
        "versions" => print_versions_help(),
        "defaults" => print_defaults_help(),
        "fetch" => print_fetch_help(),
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'component-configs help' for general usage.",
                command
            );
        }
    }
}

fn print_versions_help() {
    eprintln!(
        "component-configs versions - Report component config versions

USAGE:
    component-configs versions --snapshot FILE [OPTIONS]

OPTIONS:
    --overrides FILE   Substitute documents replacing the cluster's versions
    --json             Output in JSON format

DESCRIPTION:
    For every known component, prints the version stored in the cluster,
    the preferred version, and whether an operator must migrate it by hand.
    A substitute only counts if it decodes for its component.

EXIT CODES:
    0  No manual upgrade required
    1  At least one component requires a manual upgrade
    2  Configuration or document error
    3  Cluster read error
"
    );
}

fn print_defaults_help() {
    eprintln!(
        "component-configs defaults - Print default component configs

USAGE:
    component-configs defaults [OPTIONS]

DESCRIPTION:
    Renders every known component's default configuration at its preferred
    version. Networking settings come from the tool configuration file.
"
    );
}

fn print_fetch_help() {
    eprintln!(
        "component-configs fetch - Print the effective component configs

USAGE:
    component-configs fetch --snapshot FILE [--overrides FILE]

DESCRIPTION:
    Loads component configs from the snapshot and replaces them with any
    local overrides. Fails if a stored config is legacy or not at the
    preferred version and no override was supplied for it.

EXIT CODES:
    0  Success
    2  Configuration, document, or version error
    3  Cluster read error
"
    );
}
