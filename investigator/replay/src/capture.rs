//! Capture file reader
//!
//! A capture is newline-delimited JSON: one serialized [`InputFragment`] per
//! line. Blank lines and lines starting with `#` are skipped, so captures can
//! be annotated by hand.
//!
//! ```text
//! # checkout outage, 2026-03-02
//! {"category":"progress","payload":"Status(Searching logs)"}
//! {"category":"answer","delta":"delta","payload":"web-2 has a bad config.\n"}
//! ```

use std::io::BufRead;
use std::path::Path;

use async_trait::async_trait;
use investigator_core::{FragmentSource, InputFragment, TransportError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;

/// Lines buffered between the stdin thread and the reader task
const STDIN_LINE_BUFFER: usize = 64;

/// Producer of raw capture lines
#[async_trait]
pub trait LineFeed: Send {
    /// Next line without its terminator, `None` at end of input
    async fn next_line(&mut self) -> std::io::Result<Option<String>>;
}

#[async_trait]
impl<R> LineFeed for Lines<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        Lines::next_line(self).await
    }
}

#[async_trait]
impl LineFeed for mpsc::Receiver<std::io::Result<String>> {
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.recv().await.transpose()
    }
}

/// Fragment source over an NDJSON capture
pub struct NdjsonSource {
    lines: Box<dyn LineFeed>,
    line: usize,
    name: String,
}

impl NdjsonSource {
    /// Create a source reading `reader` line by line
    pub fn new<R>(reader: R, name: impl Into<String>) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::from_feed(Box::new(reader.lines()), name)
    }

    /// Create a source over any line feed
    pub fn from_feed(lines: Box<dyn LineFeed>, name: impl Into<String>) -> Self {
        Self {
            lines,
            line: 0,
            name: name.into(),
        }
    }
}

/// Open a capture file, or stdin for `None` / `-`
pub async fn open_capture(path: Option<&Path>) -> std::io::Result<NdjsonSource> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = tokio::fs::File::open(path).await?;
            Ok(NdjsonSource::new(BufReader::new(file), path.display().to_string()))
        }
        _ => Ok(NdjsonSource::from_feed(Box::new(spawn_stdin_reader()?), "stdin")),
    }
}

/// Read stdin on a dedicated OS thread
///
/// Never on the runtime's blocking pool: shutdown after Ctrl-C must not wait
/// for a pending read. The thread ends with the process or on its next failed
/// send.
fn spawn_stdin_reader() -> std::io::Result<mpsc::Receiver<std::io::Result<String>>> {
    let (tx, rx) = mpsc::channel(STDIN_LINE_BUFFER);
    std::thread::Builder::new()
        .name("capture-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}

#[async_trait]
impl FragmentSource for NdjsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_fragment(&mut self) -> Result<Option<InputFragment>, TransportError> {
        while let Some(raw) = self.lines.next_line().await? {
            self.line += 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|e| TransportError::Envelope {
                    line: self.line,
                    reason: e.to_string(),
                });
        }
        Ok(None)
    }
}
