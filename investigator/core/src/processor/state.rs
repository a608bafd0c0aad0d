//! Per-investigation mutable state

use std::collections::{HashMap, HashSet, VecDeque};

/// Everything the processor remembers about one investigation
///
/// A fresh instance is created per investigation and dropped after the final
/// flush. Only the consumer side of the bridge ever touches it, so nothing in
/// here is synchronized.
#[derive(Debug, Default)]
pub(crate) struct ProcessorState {
    /// Full text seen so far per step, in either protocol
    pub step_text: HashMap<String, String>,
    /// Unterminated line per step
    pub step_partial: HashMap<String, String>,
    /// Steps whose header was already emitted
    pub shown_headers: HashSet<String>,
    /// Steps that were left for another step or ended explicitly
    pub superseded_steps: HashSet<String>,
    /// Step currently receiving text
    pub active_step: Option<String>,
    /// Active step is streaming via delta events
    pub step_streaming: bool,
    /// Active step holds legacy text awaiting completion
    pub step_legacy_pending: bool,
    /// A step ended via its own end event and no divider followed yet
    pub divider_pending: bool,
    /// Step that produced the pending divider
    pub last_ended_step: Option<String>,

    /// Table rows waiting for the first non-table line
    pub table_rows: Vec<String>,
    /// Group of the buffered table rows
    pub table_group: String,
    /// Emission is inside a fenced code block
    pub in_code_block: bool,

    /// Unterminated answer line
    pub answer_partial: String,
    /// Answer characters already consumed, in either protocol
    pub answer_consumed: usize,
    /// Answer is streaming via delta events
    pub answer_streaming: bool,
    /// Answer holds legacy text awaiting completion
    pub answer_legacy_pending: bool,

    /// Normalized progress keys already emitted (or deferred)
    pub seen_progress: HashSet<String>,
    /// Source labels already emitted
    pub seen_sources: HashSet<String>,
    /// Progress lines held back while a block streams
    pub deferred_progress: VecDeque<String>,
    /// Most recent progress text
    pub last_status: String,
}

impl ProcessorState {
    /// Whether a delta-protocol block is mid-stream
    pub fn is_streaming(&self) -> bool {
        self.step_streaming || self.answer_streaming
    }

    /// Whether any block is accumulating text, in either protocol
    pub fn is_accumulating(&self) -> bool {
        self.is_streaming() || self.step_legacy_pending || self.answer_legacy_pending
    }
}
