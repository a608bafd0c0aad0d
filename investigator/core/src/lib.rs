//! Investigator Core - Stream Reassembly for Investigation Fragments
//!
//! This crate turns the live, incrementally delivered fragments of a remote
//! investigation (status updates, reasoning steps, the final answer and
//! follow-up suggestions) into a deterministic sequence of display blocks.
//! It is completely independent of any terminal or network library.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                 Transport (HTTP + SSE, capture file)             │
//! │                 implements FragmentSource                        │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │ InputFragment
//! ┌───────────────────────────────┼──────────────────────────────────┐
//! │                      INVESTIGATOR CORE                           │
//! │  ┌────────────────────────────┴───────────────────────────────┐  │
//! │  │                    StreamingBridge                         │  │
//! │  │  reader worker ──> bounded queue ──> consumer              │  │
//! │  │                                        │                   │  │
//! │  │                               ┌────────┴────────┐          │  │
//! │  │                               │ StreamProcessor │          │  │
//! │  │                               └────────┬────────┘          │  │
//! │  └────────────────────────────────────────┼───────────────────┘  │
//! └───────────────────────────────────────────┼──────────────────────┘
//!                                             │ OutputBlock
//!                                   ┌─────────┴─────────┐
//!                                   │ BlockSink (render)│
//!                                   └───────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`InputFragment`]: One typed fragment from the backend
//! - [`OutputBlock`]: One display block for a renderer
//! - [`StreamProcessor`]: Stateful fragment-to-block sequencer
//! - [`StreamingBridge`]: Background reader plus single consumer
//! - [`FragmentSource`]: Boundary trait implemented by transports
//! - [`StreamConfig`]: Layered configuration (CLI, env, TOML, defaults)
//!
//! # Module Overview
//!
//! - [`blocks`]: Display block model
//! - [`config`]: TOML configuration file support
//! - [`events`]: Fragment and payload model
//! - [`processor`]: The stream processor
//! - [`streaming`]: Producer/consumer bridge
//! - [`transport`]: Fragment source boundary
//!
//! # No UI or Network Dependencies
//!
//! This crate has **zero** dependencies on terminal crates or HTTP clients.
//! Transports and renderers plug in through [`FragmentSource`] and
//! [`BlockSink`].

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blocks;
pub mod config;
pub mod events;
pub mod processor;
pub mod streaming;
pub mod transport;

// Re-exports for convenience
pub use blocks::{BlockKind, OutputBlock};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, StreamConfig,
};
pub use events::{DeltaKind, FragmentCategory, InputFragment, PayloadRecord};
pub use processor::{ProcessorOptions, StreamProcessor};
pub use streaming::{
    BlockSink, BridgeError, InvestigationOutcome, InvestigationReport, StreamStats,
    StreamingBridge, DEFAULT_QUEUE_CAPACITY,
};
pub use transport::{FragmentSource, StreamSource, TransportError};
