//! Transport Boundary
//!
//! The core never performs network I/O. Whatever talks to the investigation
//! backend (HTTP + SSE framing, a recorded capture, a test fixture) implements
//! [`FragmentSource`] and hands fragments over already decoded.
//!
//! # Design Philosophy
//!
//! A source only has to answer one question: "what is the next fragment?".
//! `Ok(None)` means the backend finished the investigation. Errors are
//! terminal; retries belong to the transport itself.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::events::InputFragment;

/// Errors raised by a fragment source
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading the underlying stream failed
    #[error("I/O error while reading investigation stream: {0}")]
    Io(#[from] std::io::Error),

    /// A wire envelope could not be decoded into a fragment
    #[error("Malformed fragment envelope at line {line}: {reason}")]
    Envelope {
        /// 1-based line (or frame) number in the stream
        line: usize,
        /// Why decoding failed
        reason: String,
    },

    /// The backend reported a failure
    #[error("Investigation backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Producer of decoded fragments
///
/// Implementations may block for a long time (investigations can run for
/// tens of minutes); they are always driven from the bridge's background
/// worker, never from the consumer.
#[async_trait]
pub trait FragmentSource: Send {
    /// Get a short name for log output
    fn name(&self) -> &str {
        "fragment-source"
    }

    /// Wait for the next fragment
    ///
    /// Returns `Ok(None)` once the investigation is complete.
    async fn next_fragment(&mut self) -> Result<Option<InputFragment>, TransportError>;
}

#[async_trait]
impl FragmentSource for mpsc::Receiver<InputFragment> {
    fn name(&self) -> &str {
        "channel"
    }

    async fn next_fragment(&mut self) -> Result<Option<InputFragment>, TransportError> {
        Ok(self.recv().await)
    }
}

/// Adapter turning any stream of fragment results into a [`FragmentSource`]
pub struct StreamSource {
    inner: Pin<Box<dyn Stream<Item = Result<InputFragment, TransportError>> + Send>>,
}

impl StreamSource {
    /// Wrap a stream
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<InputFragment, TransportError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl std::fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl FragmentSource for StreamSource {
    fn name(&self) -> &str {
        "stream"
    }

    async fn next_fragment(&mut self) -> Result<Option<InputFragment>, TransportError> {
        self.inner.next().await.transpose()
    }
}
