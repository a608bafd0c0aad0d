//! Reasoning (chain-of-thought) steps
//!
//! Steps are keyed by identity. Switching identity finalizes the previous step
//! and emits one divider. Delta events append literal text and `end` finalizes
//! the step. Legacy events carry the full text so far: only the unseen suffix is
//! appended, and the step is finalized only once its status says it completed.

use tracing::trace;

use super::status::is_completed;
use super::text::{unseen_suffix, Lane};
use super::StreamProcessor;
use crate::blocks::{BlockKind, OutputBlock};
use crate::events::{DeltaKind, PayloadRecord};

/// Identity used when a fragment names no step and none is active
pub(crate) const PLACEHOLDER_STEP: &str = "reasoning";

impl StreamProcessor {
    pub(super) fn on_reasoning(
        &mut self,
        kind: DeltaKind,
        record: &PayloadRecord,
        out: &mut Vec<OutputBlock>,
    ) {
        let step = self.resolve_step(record);

        if kind == DeltaKind::End && self.is_stale_end(&step) {
            trace!(step = %step, "ignoring end event for superseded step");
            return;
        }

        self.enter_step(&step, out);
        self.emit_header(&step, record, out);

        if kind.is_incremental() {
            self.state
                .step_text
                .entry(step.clone())
                .or_default()
                .push_str(&record.investigation);
        }

        let lane = Lane::Reasoning(step.clone());
        match kind {
            DeltaKind::Start | DeltaKind::Delta => {
                self.state.step_streaming = true;
                self.append_text(&lane, &record.investigation, out);
            }
            DeltaKind::End => {
                self.append_text(&lane, &record.investigation, out);
                self.finalize_lane(&lane, out);
                self.end_active_step(&step);
                self.release_deferred(out);
            }
            DeltaKind::None => {
                if let Some(suffix) = self.legacy_suffix(&step, &record.investigation) {
                    self.append_text(&lane, &suffix, out);
                }
                if is_completed(&record.status) {
                    self.finalize_lane(&lane, out);
                    self.state.step_legacy_pending = false;
                } else if self.has_partial(&lane) || !self.state.table_rows.is_empty() {
                    self.state.step_legacy_pending = true;
                }
            }
            DeltaKind::Full => {
                if let Some(suffix) = self.legacy_suffix(&step, &record.investigation) {
                    self.append_text(&lane, &suffix, out);
                }
                self.finalize_lane(&lane, out);
                self.state.step_streaming = false;
                self.state.step_legacy_pending = false;
            }
        }
    }

    /// Step identity: id, then description, then the active step
    fn resolve_step(&self, record: &PayloadRecord) -> String {
        let id = record.id.trim();
        if !id.is_empty() {
            return id.to_string();
        }
        let description = record.description.trim();
        if !description.is_empty() {
            return description.to_string();
        }
        self.state
            .active_step
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_STEP.to_string())
    }

    fn is_stale_end(&self, step: &str) -> bool {
        self.state.active_step.as_deref() != Some(step)
            && self.state.superseded_steps.contains(step)
    }

    /// Make `step` the active step, emitting the transition divider if needed
    fn enter_step(&mut self, step: &str, out: &mut Vec<OutputBlock>) {
        if self.state.active_step.as_deref() == Some(step) {
            return;
        }

        if let Some(previous) = self.state.active_step.take() {
            trace!(from = %previous, to = %step, "reasoning step transition");
            self.leave_step(&previous, out);
            self.release_deferred(out);
            out.push(OutputBlock::divider());
        } else if self.state.divider_pending
            && self.state.last_ended_step.as_deref() != Some(step)
        {
            out.push(OutputBlock::divider());
        }

        self.state.divider_pending = false;
        self.state.last_ended_step = None;
        self.state.active_step = Some(step.to_string());
    }

    /// Finalize a step that is no longer active
    pub(super) fn leave_step(&mut self, step: &str, out: &mut Vec<OutputBlock>) {
        self.finalize_lane(&Lane::Reasoning(step.to_string()), out);
        self.state.step_streaming = false;
        self.state.step_legacy_pending = false;
        self.state.superseded_steps.insert(step.to_string());
    }

    /// The active step finished via its own end event
    fn end_active_step(&mut self, step: &str) {
        self.state.active_step = None;
        self.state.step_streaming = false;
        self.state.step_legacy_pending = false;
        self.state.divider_pending = true;
        self.state.last_ended_step = Some(step.to_string());
        self.state.superseded_steps.insert(step.to_string());
    }

    fn emit_header(&mut self, step: &str, record: &PayloadRecord, out: &mut Vec<OutputBlock>) {
        let description = record.description.trim();
        if description.is_empty() || self.state.shown_headers.contains(step) {
            return;
        }
        self.state.shown_headers.insert(step.to_string());

        out.push(OutputBlock::new(BlockKind::ReasoningHeader, description).in_group(step));
        let explanation = record.explanation.trim();
        if !explanation.is_empty() {
            out.push(OutputBlock::new(BlockKind::ReasoningNote, explanation).in_group(step));
        }
    }

    /// Text beyond what was already seen for this step
    fn legacy_suffix(&mut self, step: &str, full: &str) -> Option<String> {
        let stored = self.state.step_text.entry(step.to_string()).or_default();
        let suffix = unseen_suffix(full, stored.chars().count())?.to_string();
        *stored = full.to_string();
        Some(suffix)
    }
}
