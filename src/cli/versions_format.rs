// Copyright 2024-2026 component-configs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Formatting helpers for the versions command display.

use crate::componentconfigs::ComponentConfigVersionState;

const GROUP_WIDTH: usize = 30;
const VERSION_WIDTH: usize = 10;

/// Print the report as a table.
pub fn print_versions_human(states: &[ComponentConfigVersionState]) {
    print!("{}", format_versions_table(states));
}

/// Render the report as a table, one row per component.
pub fn format_versions_table(states: &[ComponentConfigVersionState]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:gw$} | {:vw$} | {:vw$} | {}\n",
        "API GROUP",
        "CURRENT",
        "PREFERRED",
        "MANUAL UPGRADE",
        gw = GROUP_WIDTH,
        vw = VERSION_WIDTH
    ));
    out.push_str(&format!(
        "{}-+-{}-+-{}-+-{}\n",
        "-".repeat(GROUP_WIDTH),
        "-".repeat(VERSION_WIDTH),
        "-".repeat(VERSION_WIDTH),
        "-".repeat(14)
    ));
    for state in states {
        out.push_str(&format!(
            "{:gw$} | {:vw$} | {:vw$} | {}\n",
            truncate(&state.group, GROUP_WIDTH),
            truncate(display_version(&state.current_version), VERSION_WIDTH),
            truncate(&state.preferred_version, VERSION_WIDTH),
            if state.manual_upgrade_required { "yes" } else { "no" },
            gw = GROUP_WIDTH,
            vw = VERSION_WIDTH
        ));
    }
    out
}

/// Current version for display; unknown versions show as `-`.
pub fn display_version(version: &str) -> &str {
    if version.is_empty() {
        "-"
    } else {
        version
    }
}

/// Truncate a string to a maximum length.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
