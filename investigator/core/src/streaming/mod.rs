//! Streaming Bridge
//!
//! Connects a blocking-capable [`FragmentSource`](crate::transport::FragmentSource)
//! to a single-threaded consumer without data races.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  bounded mpsc   ┌──────────────────────────────────┐
//! │ Reader worker    │ ──────────────> │ Consumer (StreamingBridge::run)  │
//! │ (spawn / spawn_  │   Handoff FIFO  │  process -> render -> next       │
//! │  blocking)       │                 │  flush on end or cancel          │
//! └──────────────────┘                 └───────────────┬──────────────────┘
//!                                                      │ watch
//!                                                      v
//!                                              live status indicator
//! ```

mod bridge;

pub use bridge::{
    BlockSink, BridgeError, Handoff, InvestigationOutcome, InvestigationReport, StreamStats,
    StreamingBridge, DEFAULT_QUEUE_CAPACITY,
};
