//! Integration Test: Core Isolation
//!
//! **Policy**: `investigator-core` is pure sequencing logic. It MUST NOT talk
//! to the network or depend on terminal/UI crates; transports and renderers
//! plug in through `FragmentSource` and `BlockSink`.

use std::fs;

use architectural_enforcement::{find_violations, report, workspace_root};

/// Crates that belong to transports or renderers, never to the core
const FORBIDDEN_CORE_DEPENDENCIES: &[&str] = &[
    "reqwest",
    "hyper",
    "tokio-tungstenite",
    "ratatui",
    "crossterm",
    "termimad",
    "tracing-subscriber",
];

#[test]
fn test_core_manifest_has_no_transport_or_ui_crates() {
    let manifest = fs::read_to_string(workspace_root().join("investigator/core/Cargo.toml"))
        .expect("core manifest should be readable");

    let violations: Vec<String> = manifest
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            let name = line.split('=').next()?.trim();
            FORBIDDEN_CORE_DEPENDENCIES
                .contains(&name)
                .then(|| format!("investigator/core/Cargo.toml - {}", line.trim()))
        })
        .collect();

    report(
        &violations,
        "Core crate depends on a transport or UI crate",
        "Move transport/rendering code into a separate crate (see investigator/replay)",
    );
}

#[test]
fn test_no_network_io_in_core() {
    let violations = find_violations(
        "investigator/core/src",
        &["std::net::", "tokio::net::", "reqwest::", "hyper::"],
    );

    report(
        &violations,
        "Network I/O found in the core crate",
        "Implement FragmentSource in a transport crate instead",
    );
}

#[test]
fn test_no_terminal_output_in_core() {
    let violations = find_violations(
        "investigator/core/src",
        &["println!", "eprintln!", "std::io::stdout()", "std::io::stderr()"],
    );

    report(
        &violations,
        "Direct terminal output found in the core crate",
        "Return OutputBlocks and let a BlockSink render them; use tracing for diagnostics",
    );
}
