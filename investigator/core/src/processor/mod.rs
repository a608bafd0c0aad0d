//! Stream Processor
//!
//! The stateful engine that turns [`InputFragment`]s into ordered
//! [`OutputBlock`]s. One processor exists per investigation; it is fed strictly
//! in arrival order by a single consumer and flushed once at the end.
//!
//! # Sequencing Rules
//!
//! - **Progress** lines are deduplicated on a normalized key and deferred while
//!   a delta-delivered block is mid-stream, so a status line never lands in
//!   the middle of a paragraph.
//! - **Sources** are shown once per label and only between blocks.
//! - **Reasoning** text is grouped per step; each step transition yields one
//!   divider and each step header is shown once.
//! - **Answer** text follows the reasoning with a single divider.
//! - **Tables** are batched: consecutive `|` rows become one [`BlockKind::Table`].
//! - Unterminated lines stay buffered until completed or flushed.
//!
//! Both delivery protocols are supported transparently. Delta events
//! (`start`/`delta`/`end`) carry new text only; legacy events carry the full
//! text so far and are diffed by character count.
//!
//! # Example
//!
//! ```
//! use investigator_core::{InputFragment, StreamProcessor};
//!
//! let mut processor = StreamProcessor::new();
//! assert!(processor.process(&InputFragment::answer_delta("Hello ")).is_empty());
//!
//! let blocks = processor.process(&InputFragment::answer_delta("world!\n"));
//! assert_eq!(blocks[0].text, "Hello world!");
//! assert!(processor.flush().is_empty());
//! ```

mod answer;
mod lines;
mod reasoning;
mod state;
mod status;
mod text;

use tracing::trace;

use crate::blocks::{BlockKind, OutputBlock};
use crate::events::{FragmentCategory, InputFragment, PayloadRecord};

use self::state::ProcessorState;
use self::status::{extract_status, normalize_status, source_label};
use self::text::Lane;

/// Behavior switches for a [`StreamProcessor`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Hold progress lines back while a block is streaming
    pub defer_progress: bool,
    /// Emit source blocks at all
    pub show_sources: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            defer_progress: true,
            show_sources: true,
        }
    }
}

/// Stateful fragment-to-block sequencer for one investigation
#[derive(Debug, Default)]
pub struct StreamProcessor {
    state: ProcessorState,
    options: ProcessorOptions,
}

impl StreamProcessor {
    /// Create a processor with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with custom options
    #[must_use]
    pub fn with_options(options: ProcessorOptions) -> Self {
        Self {
            state: ProcessorState::default(),
            options,
        }
    }

    /// Get the active options
    #[must_use]
    pub fn options(&self) -> ProcessorOptions {
        self.options
    }

    /// Most recent progress text, for a live status indicator
    #[must_use]
    pub fn last_status(&self) -> &str {
        &self.state.last_status
    }

    /// Whether a reasoning step or the answer is mid-stream
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.state.is_streaming()
    }

    /// Consume one fragment and return the blocks it releases, in order
    pub fn process(&mut self, fragment: &InputFragment) -> Vec<OutputBlock> {
        let mut out = Vec::new();

        match fragment.category {
            FragmentCategory::Progress => self.on_progress(&fragment.payload, &mut out),
            FragmentCategory::Source => self.on_source(&fragment.payload, &mut out),
            FragmentCategory::Reasoning => {
                self.on_reasoning(fragment.delta_kind, &fragment.record(), &mut out);
            }
            FragmentCategory::Answer => {
                self.on_answer(fragment.delta_kind, &fragment.payload, &mut out);
            }
            FragmentCategory::FollowUp => self.on_follow_up(&fragment.payload, &mut out),
            FragmentCategory::Title => {
                let record = fragment.record();
                let title = if record.title.trim().is_empty() {
                    record.investigation.trim()
                } else {
                    record.title.trim()
                };
                if !title.is_empty() {
                    out.push(OutputBlock::new(BlockKind::Title, title));
                }
            }
            FragmentCategory::Duration => {
                let millis = fragment.payload.trim();
                if !millis.is_empty() {
                    out.push(OutputBlock::new(BlockKind::Duration, millis));
                }
            }
            // Internal retry diagnostics
            FragmentCategory::Error => {}
        }

        out
    }

    /// Emit everything still buffered
    ///
    /// Finalizes the active step and the answer, releases pending table rows
    /// and deferred progress. Returns nothing when nothing is pending.
    pub fn flush(&mut self) -> Vec<OutputBlock> {
        let mut out = Vec::new();

        if let Some(step) = self.state.active_step.clone() {
            self.finalize_lane(&Lane::Reasoning(step), &mut out);
        }
        self.finalize_lane(&Lane::Answer, &mut out);
        self.flush_table(&mut out);
        self.release_deferred(&mut out);

        self.state.step_streaming = false;
        self.state.step_legacy_pending = false;
        self.state.answer_streaming = false;
        self.state.answer_legacy_pending = false;
        self.state.in_code_block = false;

        out
    }

    fn on_progress(&mut self, payload: &str, out: &mut Vec<OutputBlock>) {
        let status = extract_status(payload);
        self.state.last_status.clone_from(&status);

        // Progress is the implicit completion signal of the legacy protocol
        if self.state.step_legacy_pending {
            if let Some(step) = self.state.active_step.clone() {
                self.finalize_lane(&Lane::Reasoning(step), out);
            }
            self.state.step_legacy_pending = false;
        }
        if self.state.answer_legacy_pending {
            self.finish_answer(out);
        }

        if status.is_empty() {
            return;
        }
        if !self.state.seen_progress.insert(normalize_status(&status)) {
            trace!(status = %status, "duplicate progress dropped");
            return;
        }

        if self.options.defer_progress && self.state.is_streaming() {
            trace!(status = %status, "progress deferred while block streams");
            self.state.deferred_progress.push_back(status);
        } else {
            out.push(OutputBlock::progress(status));
        }
    }

    fn on_source(&mut self, payload: &str, out: &mut Vec<OutputBlock>) {
        if !self.options.show_sources || self.state.is_accumulating() {
            return;
        }

        let label = source_label(&PayloadRecord::decode(payload));
        if label.is_empty() {
            return;
        }
        if self.state.seen_sources.insert(label.clone()) {
            out.push(OutputBlock::new(BlockKind::Source, label));
        }
    }

    /// Emit progress lines held back during streaming
    fn release_deferred(&mut self, out: &mut Vec<OutputBlock>) {
        out.extend(self.state.deferred_progress.drain(..).map(OutputBlock::progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DeltaKind;

    #[test]
    fn test_fresh_flush_is_empty() {
        let mut processor = StreamProcessor::new();
        assert!(processor.flush().is_empty());
        assert!(processor.flush().is_empty());
    }

    #[test]
    fn test_last_status_tracks_every_progress() {
        let mut processor = StreamProcessor::new();
        processor.process(&InputFragment::progress("Status(Found 2 results)"));
        processor.process(&InputFragment::progress("Status(Found 5 results)"));
        // Deduplicated for display, but still the latest status
        assert_eq!(processor.last_status(), "Found 5 results");
    }

    #[test]
    fn test_error_fragments_are_swallowed() {
        let mut processor = StreamProcessor::new();
        let blocks = processor.process(&InputFragment::legacy(
            FragmentCategory::Error,
            "retrying upstream call (attempt 2)",
        ));
        assert!(blocks.is_empty());
        assert_eq!(processor.last_status(), "");
    }

    #[test]
    fn test_title_and_duration() {
        let mut processor = StreamProcessor::new();
        let blocks = processor.process(&InputFragment::legacy(
            FragmentCategory::Title,
            r#"{"title":"Checkout latency spike"}"#,
        ));
        assert_eq!(blocks[0].kind, BlockKind::Title);
        assert_eq!(blocks[0].text, "Checkout latency spike");

        let blocks = processor.process(&InputFragment::legacy(FragmentCategory::Title, " Raw title "));
        assert_eq!(blocks[0].text, "Raw title");

        let blocks = processor.process(&InputFragment::legacy(FragmentCategory::Duration, "83512"));
        assert_eq!(blocks[0].kind, BlockKind::Duration);
        assert_eq!(blocks[0].text, "83512");
    }

    #[test]
    fn test_progress_deferred_while_answer_streams() {
        let mut processor = StreamProcessor::new();
        processor.process(&InputFragment::answer_delta("Partial"));
        let blocks = processor.process(&InputFragment::progress("Checking metrics"));
        assert!(blocks.is_empty());

        let blocks = processor.process(&InputFragment::new(
            FragmentCategory::Answer,
            DeltaKind::End,
            " sentence\n",
        ));
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Answer, BlockKind::Progress]);
        assert_eq!(blocks[0].text, "Partial sentence");
    }

    #[test]
    fn test_progress_not_deferred_when_disabled() {
        let mut processor = StreamProcessor::with_options(ProcessorOptions {
            defer_progress: false,
            show_sources: true,
        });
        processor.process(&InputFragment::answer_delta("Partial"));
        let blocks = processor.process(&InputFragment::progress("Checking metrics"));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Progress);
    }

    #[test]
    fn test_sources_hidden_when_disabled() {
        let mut processor = StreamProcessor::with_options(ProcessorOptions {
            defer_progress: true,
            show_sources: false,
        });
        let blocks = processor.process(&InputFragment::legacy(
            FragmentCategory::Source,
            r#"{"id":"logs:api"}"#,
        ));
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_flush_releases_deferred_progress() {
        let mut processor = StreamProcessor::new();
        processor.process(&InputFragment::answer_delta("Half a line"));
        processor.process(&InputFragment::progress("Still working"));

        let blocks = processor.flush();
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Answer, BlockKind::Progress]);
        assert!(!processor.is_streaming());
        assert!(processor.flush().is_empty());
    }
}
