//! Plain-text block renderer
//!
//! Writes one line (or a few, for tables) per block without any styling.
//! Reasoning output is indented under its step header.

use std::io::Write;

use investigator_core::{BlockKind, BlockSink, OutputBlock};

const REASONING_INDENT: &str = "  ";

/// Renders blocks as plain text into any writer
#[derive(Debug)]
pub struct PlainRenderer<W> {
    out: W,
}

impl<W: Write> PlainRenderer<W> {
    /// Create a renderer writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Get the underlying writer back
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BlockSink for PlainRenderer<W> {
    fn render(&mut self, block: &OutputBlock) -> std::io::Result<()> {
        let indent = if block.group_id.is_empty() {
            ""
        } else {
            REASONING_INDENT
        };

        match block.kind {
            BlockKind::Progress => writeln!(self.out, "> {}", block.text)?,
            BlockKind::Source => writeln!(self.out, "[source] {}", block.text)?,
            BlockKind::Title => writeln!(self.out, "# {}", block.text)?,
            BlockKind::Duration => writeln!(self.out, "Completed in {}", duration_text(&block.text))?,
            BlockKind::ReasoningHeader => writeln!(self.out, "## {}", block.text)?,
            BlockKind::ReasoningNote => writeln!(self.out, "{indent}({})", block.text)?,
            BlockKind::ReasoningLine
            | BlockKind::Answer
            | BlockKind::CodeFenceLine
            | BlockKind::CodeBodyLine => writeln!(self.out, "{indent}{}", block.text)?,
            BlockKind::Table => {
                for row in block.text.lines() {
                    writeln!(self.out, "{indent}{row}")?;
                }
            }
            BlockKind::FollowUpHeader => writeln!(self.out, "{}:", block.text)?,
            BlockKind::FollowUpItem => writeln!(self.out, "  {}. {}", block.index, block.text)?,
            BlockKind::Blank => writeln!(self.out)?,
            BlockKind::Divider => writeln!(self.out, "----")?,
        }
        self.out.flush()
    }
}

/// Millisecond payload as a human duration, or the raw text if not a number
fn duration_text(millis: &str) -> String {
    millis
        .trim()
        .parse::<u64>()
        .map_or_else(|_| millis.to_string(), format_duration)
}

/// Format milliseconds as `850ms`, `12.3s`, `2m 05s` or `1h 02m`
pub fn format_duration(millis: u64) -> String {
    const SECOND: u64 = 1_000;
    const MINUTE: u64 = 60 * SECOND;
    const HOUR: u64 = 60 * MINUTE;

    if millis < SECOND {
        format!("{millis}ms")
    } else if millis < MINUTE {
        format!("{:.1}s", millis as f64 / SECOND as f64)
    } else if millis < HOUR {
        format!("{}m {:02}s", millis / MINUTE, (millis % MINUTE) / SECOND)
    } else {
        format!("{}h {:02}m", millis / HOUR, (millis % HOUR) / MINUTE)
    }
}
