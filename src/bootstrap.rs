// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration loading and logging setup for component-configs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use component_configs::config::{self, CliOverrides, ToolConfig};
use component_configs::telemetry;

/// Load the tool configuration from file, environment and flags, then
/// install the log subscriber in the configured format.
pub fn load_config(overrides: &CliOverrides) -> Result<ToolConfig, config::ConfigError> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let config = config::load(&env, overrides)?;
    telemetry::init_logging(config.log_format);

    // The subscriber only exists from here on, so load events are logged now.
    let config_file = overrides
        .config_file
        .clone()
        .or_else(|| env.get(config::ENV_CONFIG_FILE).map(PathBuf::from));
    log_loaded(&config, config_file.as_deref());
    Ok(config)
}

fn log_loaded(config: &ToolConfig, config_file: Option<&Path>) {
    tracing::info!(
        config_file = ?config_file,
        kubernetes_version = %config.kubernetes_version,
        cluster_snapshot = ?config.cluster_snapshot,
        "Configuration loaded"
    );
}
