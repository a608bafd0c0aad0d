//! Final answer text and follow-up suggestions

use tracing::trace;

use super::lines::strip_list_marker;
use super::text::{unseen_suffix, Lane};
use super::StreamProcessor;
use crate::blocks::{BlockKind, OutputBlock};
use crate::events::{DeltaKind, PayloadRecord};

/// Text of the follow-up list header
pub(crate) const FOLLOW_UP_HEADER: &str = "Follow-up questions";

impl StreamProcessor {
    pub(super) fn on_answer(&mut self, kind: DeltaKind, text: &str, out: &mut Vec<OutputBlock>) {
        self.leave_reasoning(out);
        if !self.state.answer_streaming {
            self.release_deferred(out);
        }

        if kind.is_incremental() {
            // Later snapshots diff against streamed text too
            self.state.answer_consumed += text.chars().count();
        }

        match kind {
            DeltaKind::Start | DeltaKind::Delta => {
                self.state.answer_streaming = true;
                self.append_text(&Lane::Answer, text, out);
            }
            DeltaKind::End => {
                self.append_text(&Lane::Answer, text, out);
                self.finish_answer(out);
                self.release_deferred(out);
            }
            DeltaKind::None => {
                self.append_answer_suffix(text, out);
                self.state.answer_legacy_pending = true;
            }
            DeltaKind::Full => {
                self.append_answer_suffix(text, out);
                self.finish_answer(out);
            }
        }
    }

    /// Close reasoning activity before answer text starts
    fn leave_reasoning(&mut self, out: &mut Vec<OutputBlock>) {
        if let Some(step) = self.state.active_step.take() {
            trace!(step = %step, "reasoning finished, answer starting");
            self.leave_step(&step, out);
            self.release_deferred(out);
            out.push(OutputBlock::divider());
        } else if self.state.divider_pending {
            out.push(OutputBlock::divider());
        }
        self.state.divider_pending = false;
        self.state.last_ended_step = None;
    }

    /// Legacy protocol: append the characters not consumed yet
    fn append_answer_suffix(&mut self, full: &str, out: &mut Vec<OutputBlock>) {
        let Some(suffix) = unseen_suffix(full, self.state.answer_consumed) else {
            return;
        };
        self.state.answer_consumed = full.chars().count();
        self.append_text(&Lane::Answer, suffix, out);
    }

    /// Finalize the answer buffer and clear its activity flags
    pub(super) fn finish_answer(&mut self, out: &mut Vec<OutputBlock>) {
        self.finalize_lane(&Lane::Answer, out);
        self.state.answer_streaming = false;
        self.state.answer_legacy_pending = false;
    }

    pub(super) fn on_follow_up(&mut self, payload: &str, out: &mut Vec<OutputBlock>) {
        self.finish_answer(out);
        self.release_deferred(out);

        let record = PayloadRecord::decode(payload);
        let items: Vec<&str> = record
            .investigation
            .lines()
            .map(strip_list_marker)
            .filter(|item| !item.is_empty())
            .collect();
        if items.is_empty() {
            return;
        }

        out.push(OutputBlock::blank());
        out.push(OutputBlock::new(BlockKind::FollowUpHeader, FOLLOW_UP_HEADER));
        for (position, item) in items.into_iter().enumerate() {
            out.push(OutputBlock::new(BlockKind::FollowUpItem, item).numbered(position + 1));
        }
    }
}
