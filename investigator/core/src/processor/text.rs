//! Shared text path for reasoning and answer blocks
//!
//! Both protocols end up here: new text is appended to a lane's partial-line
//! buffer, complete lines are split off and each one is classified as a table
//! row, a code fence line, a code body line or plain text for the lane.

use super::lines::{is_code_fence, is_table_row, split_lines};
use super::StreamProcessor;
use crate::blocks::{BlockKind, OutputBlock};

/// Destination of appended text
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Lane {
    /// Text of one reasoning step
    Reasoning(String),
    /// Final answer text
    Answer,
}

impl Lane {
    fn line_kind(&self) -> BlockKind {
        match self {
            Self::Reasoning(_) => BlockKind::ReasoningLine,
            Self::Answer => BlockKind::Answer,
        }
    }

    fn group(&self) -> &str {
        match self {
            Self::Reasoning(step) => step,
            Self::Answer => "",
        }
    }
}

/// Text of `full` past the first `seen` characters, if it grew
pub(crate) fn unseen_suffix(full: &str, seen: usize) -> Option<&str> {
    let (start, _) = full.char_indices().nth(seen)?;
    Some(&full[start..])
}

impl StreamProcessor {
    fn partial_mut(&mut self, lane: &Lane) -> &mut String {
        match lane {
            Lane::Reasoning(step) => self.state.step_partial.entry(step.clone()).or_default(),
            Lane::Answer => &mut self.state.answer_partial,
        }
    }

    /// Append text to a lane and emit every line it completes
    pub(super) fn append_text(&mut self, lane: &Lane, text: &str, out: &mut Vec<OutputBlock>) {
        if text.is_empty() {
            return;
        }

        let mut buffer = std::mem::take(self.partial_mut(lane));
        buffer.push_str(text);
        let split = split_lines(&buffer, self.state.in_code_block, false);
        *self.partial_mut(lane) = split.remainder;

        for line in split.complete {
            self.emit_line(lane, line, out);
        }
    }

    /// Emit everything buffered for a lane, including the unterminated line
    pub(super) fn finalize_lane(&mut self, lane: &Lane, out: &mut Vec<OutputBlock>) {
        let start = out.len();
        let buffer = std::mem::take(self.partial_mut(lane));
        let split = split_lines(&buffer, self.state.in_code_block, true);

        for line in split.complete {
            self.emit_line(lane, line, out);
        }
        self.flush_table(out);
        self.state.in_code_block = false;

        for block in &mut out[start..] {
            block.finished = true;
        }
    }

    /// Whether a lane still holds unterminated text
    pub(super) fn has_partial(&self, lane: &Lane) -> bool {
        match lane {
            Lane::Reasoning(step) => self
                .state
                .step_partial
                .get(step)
                .is_some_and(|partial| !partial.is_empty()),
            Lane::Answer => !self.state.answer_partial.is_empty(),
        }
    }

    fn emit_line(&mut self, lane: &Lane, line: String, out: &mut Vec<OutputBlock>) {
        if !self.state.in_code_block && is_table_row(&line) {
            if self.state.table_rows.is_empty() {
                self.state.table_group = lane.group().to_string();
            }
            self.state.table_rows.push(line);
            return;
        }

        self.flush_table(out);

        let kind = if is_code_fence(&line) {
            self.state.in_code_block = !self.state.in_code_block;
            BlockKind::CodeFenceLine
        } else if self.state.in_code_block {
            BlockKind::CodeBodyLine
        } else {
            lane.line_kind()
        };
        out.push(OutputBlock::new(kind, line).in_group(lane.group()));
    }

    /// Emit buffered table rows as one block
    pub(super) fn flush_table(&mut self, out: &mut Vec<OutputBlock>) {
        if self.state.table_rows.is_empty() {
            return;
        }
        let rows = std::mem::take(&mut self.state.table_rows);
        let group = std::mem::take(&mut self.state.table_group);
        out.push(OutputBlock::new(BlockKind::Table, rows.join("\n")).in_group(group));
    }
}
