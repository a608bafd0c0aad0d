//! Investigator Replay - Capture Playback Through the Block Sequencer
//!
//! Replays a recorded investigation stream (NDJSON, one fragment per line)
//! through the streaming bridge and prints the resulting blocks as plain text.
//! Useful for reproducing rendering bugs from a captured backend response.
//!
//! # Usage
//!
//! ```bash
//! # Replay a capture file
//! investigator-replay captures/checkout-outage.ndjson
//!
//! # Read from stdin
//! cat capture.ndjson | investigator-replay -
//!
//! # Hide sources, show progress immediately
//! investigator-replay --hide-sources --no-defer-progress capture.ndjson
//!
//! # Watch status changes
//! RUST_LOG=investigator_replay=debug investigator-replay capture.ndjson
//! ```
//!
//! # Signals
//!
//! - `SIGINT` (Ctrl-C): Stop reading, flush buffered text and exit

mod capture;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use investigator_core::{
    default_config_path, load_config_from_path, ConfigOverrides, InvestigationOutcome,
    StreamConfig, StreamProcessor, StreamingBridge,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use render::PlainRenderer;

/// Investigator Replay - play back a captured investigation stream
#[derive(Parser, Debug)]
#[command(name = "investigator-replay")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Capture file (NDJSON); `-` or omitted reads stdin
    #[arg(value_name = "CAPTURE")]
    capture: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "INVESTIGATOR_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "INVESTIGATOR_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Capacity of the fragment handoff queue
    #[arg(long, value_name = "N")]
    queue_capacity: Option<usize>,

    /// Do not print consulted sources
    #[arg(long)]
    hide_sources: bool,

    /// Print progress lines immediately, even mid-paragraph
    #[arg(long)]
    no_defer_progress: bool,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "investigator_replay={level},investigator_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Resolve configuration: CLI > env > file > defaults
fn resolve_config(args: &Args) -> Result<StreamConfig> {
    if let Some(ref path) = args.config {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    }

    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(capacity) = args.queue_capacity {
        overrides = overrides.with_queue_capacity(capacity);
    }
    if args.hide_sources {
        overrides = overrides.with_show_sources(false);
    }
    if args.no_defer_progress {
        overrides = overrides.with_defer_progress(false);
    }
    overrides
        .apply(&mut config)
        .context("Invalid command-line options")?;

    Ok(config)
}

/// Log every status change until the bridge goes away
async fn log_status(mut status: watch::Receiver<String>) {
    while status.changed().await.is_ok() {
        let current = status.borrow_and_update().clone();
        if !current.is_empty() {
            debug!(status = %current, "Status changed");
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Received SIGINT, stopping replay");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    let config = resolve_config(&args)?;
    info!(
        source = %config.source(),
        queue_capacity = config.queue_capacity,
        defer_progress = config.defer_progress,
        show_sources = config.show_sources,
        "Configuration resolved"
    );

    let source = capture::open_capture(args.capture.as_deref())
        .await
        .context("Failed to open capture")?;

    let bridge = StreamingBridge::spawn(source, config.queue_capacity);
    let status_task = tokio::spawn(log_status(bridge.status()));

    let processor = StreamProcessor::with_options(config.processor_options());
    let mut renderer = PlainRenderer::new(std::io::stdout());
    let report = bridge
        .run(processor, &mut renderer, interrupted())
        .await
        .context("Replay failed")?;

    let _ = status_task.await;

    if report.outcome == InvestigationOutcome::Cancelled {
        warn!("Replay cancelled before the capture ended");
    }
    info!(
        fragments = report.stats.fragments_received,
        blocks = report.stats.blocks_emitted,
        elapsed_ms = u64::try_from(report.stats.elapsed.as_millis()).unwrap_or(u64::MAX),
        "Replay finished"
    );

    Ok(())
}
