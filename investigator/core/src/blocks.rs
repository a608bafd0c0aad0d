//! Display Blocks
//!
//! Blocks emitted by the [`StreamProcessor`](crate::processor::StreamProcessor)
//! for an external renderer. A renderer maps each [`BlockKind`] to styled
//! terminal output (colors, markdown inline formatting, box drawing for
//! tables, code fence borders). None of that affects sequencing: the order and
//! content of blocks are fully decided here.

use serde::{Deserialize, Serialize};

/// Kind of a display block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Deduplicated status line
    Progress,
    /// Reasoning step title
    ReasoningHeader,
    /// Explanation shown under a reasoning step title
    ReasoningNote,
    /// One line of reasoning text
    ReasoningLine,
    /// One line of answer text
    Answer,
    /// Title of the follow-up list
    FollowUpHeader,
    /// Numbered follow-up suggestion
    FollowUpItem,
    /// Consulted source label
    Source,
    /// Investigation title
    Title,
    /// Total duration in milliseconds (formatted by the renderer)
    Duration,
    /// Empty spacer line
    Blank,
    /// Separator between reasoning steps or before the answer
    Divider,
    /// Batched table rows, joined by `\n`
    Table,
    /// Opening or closing code fence
    CodeFenceLine,
    /// Line inside a fenced code block
    CodeBodyLine,
}

/// A single display block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBlock {
    /// Block kind
    pub kind: BlockKind,
    /// Block text (single line, except for tables)
    pub text: String,
    /// Reasoning step this block belongs to (empty outside reasoning)
    #[serde(default)]
    pub group_id: String,
    /// Set on blocks emitted while finalizing a step or the answer
    #[serde(default)]
    pub finished: bool,
    /// 1-based ordinal for follow-up items, 0 otherwise
    #[serde(default)]
    pub index: usize,
}

impl OutputBlock {
    /// Create a block with text
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            group_id: String::new(),
            finished: false,
            index: 0,
        }
    }

    /// Status line
    pub fn progress(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Progress, text)
    }

    /// Separator block
    #[must_use]
    pub fn divider() -> Self {
        Self::new(BlockKind::Divider, "")
    }

    /// Spacer block
    #[must_use]
    pub fn blank() -> Self {
        Self::new(BlockKind::Blank, "")
    }

    /// Attach a reasoning step identity
    #[must_use]
    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    /// Attach a 1-based ordinal
    #[must_use]
    pub fn numbered(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Mark as emitted by a finalizing flush
    #[must_use]
    pub fn finished(mut self) -> Self {
        self.finished = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_builders() {
        let block = OutputBlock::new(BlockKind::ReasoningLine, "text")
            .in_group("cot1")
            .finished();
        assert_eq!(block.kind, BlockKind::ReasoningLine);
        assert_eq!(block.group_id, "cot1");
        assert!(block.finished);
        assert_eq!(block.index, 0);

        let item = OutputBlock::new(BlockKind::FollowUpItem, "why?").numbered(2);
        assert_eq!(item.index, 2);
        assert!(!item.finished);
    }

    #[test]
    fn test_divider_and_blank_are_empty() {
        assert!(OutputBlock::divider().text.is_empty());
        assert!(OutputBlock::blank().text.is_empty());
        assert_eq!(OutputBlock::divider().kind, BlockKind::Divider);
    }

    #[test]
    fn test_block_serde_kind_names() {
        let block = OutputBlock::new(BlockKind::CodeFenceLine, "```");
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"code_fence_line\""));
    }
}
