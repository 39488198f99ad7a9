// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! component-configs entry point.
//!
//! Loads the tool configuration, installs logging and dispatches to the
//! registry commands.

mod bootstrap;
mod cli_parser;

use std::process::ExitCode;

use component_configs::cli::{run_defaults, run_fetch, run_versions, EXIT_CONFIG_ERROR};
use component_configs::Registry;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "help" | "--help" | "-h" => {
            if let Some(sub) = args.get(2) {
                cli_parser::print_command_help(sub);
            } else {
                cli_parser::print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("component-configs {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        "versions" | "defaults" | "fetch" => ExitCode::from(run_command(command, &args[2..]) as u8),
        _ => {
            eprintln!("Unknown command: {}", command);
            cli_parser::print_usage();
            ExitCode::from(EXIT_CONFIG_ERROR as u8)
        }
    }
}

fn run_command(command: &str, flags: &[String]) -> i32 {
    let parsed = match cli_parser::parse_flags(flags) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            cli_parser::print_command_help(command);
            return EXIT_CONFIG_ERROR;
        }
    };

    let config = match bootstrap::load_config(&parsed.overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let registry = Registry::known();
    let documents = parsed.documents.as_deref();
    match command {
        "versions" => run_versions(&registry, &config, documents, parsed.json),
        "defaults" => run_defaults(&registry, &config),
        _ => run_fetch(&registry, &config, documents),
    }
}
