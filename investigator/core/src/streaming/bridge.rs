//! Streaming Bridge Implementation
//!
//! A background worker reads fragments and pushes them onto a bounded queue;
//! a single consumer drains the queue into the [`StreamProcessor`] and renders
//! each batch of blocks before pulling the next fragment.

use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn, Instrument};

use crate::blocks::OutputBlock;
use crate::events::InputFragment;
use crate::processor::StreamProcessor;
use crate::transport::{FragmentSource, TransportError};

/// Default capacity of the handoff queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Item travelling through the handoff queue
pub type Handoff = Result<InputFragment, TransportError>;

// ============================================================================
// Renderer Boundary
// ============================================================================

/// Receiver of display blocks (the external renderer)
pub trait BlockSink {
    /// Render one block
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be written out.
    fn render(&mut self, block: &OutputBlock) -> std::io::Result<()>;
}

impl BlockSink for Vec<OutputBlock> {
    fn render(&mut self, block: &OutputBlock) -> std::io::Result<()> {
        self.push(block.clone());
        Ok(())
    }
}

// ============================================================================
// Results
// ============================================================================

/// Errors that end an investigation stream
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The transport failed; buffered content was discarded
    #[error("Investigation stream failed: {0}")]
    Transport(#[from] TransportError),

    /// The renderer could not write a block
    #[error("Failed to render block: {0}")]
    Render(#[source] std::io::Error),
}

/// How an investigation stream ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvestigationOutcome {
    /// The source reported completion
    Completed,
    /// The caller cancelled; the reader was abandoned
    Cancelled,
}

/// Statistics for one investigation stream
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Fragments taken off the queue
    pub fragments_received: u64,
    /// Blocks handed to the sink
    pub blocks_emitted: u64,
    /// Wall time spent consuming
    pub elapsed: Duration,
}

/// Result of a finished (or cancelled) investigation stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvestigationReport {
    /// How the stream ended
    pub outcome: InvestigationOutcome,
    /// Counters collected while consuming
    pub stats: StreamStats,
}

// ============================================================================
// Bridge
// ============================================================================

/// Producer/consumer harness around a [`StreamProcessor`]
///
/// Only the consumer (the task calling [`StreamingBridge::run`]) ever touches
/// the processor, so processing needs no locking at all.
#[derive(Debug)]
pub struct StreamingBridge {
    /// Consumer end of the handoff queue
    receiver: mpsc::Receiver<Handoff>,
    /// Latest status text for live indicators
    status: watch::Sender<String>,
}

impl StreamingBridge {
    /// Start an async background reader on the current tokio runtime
    pub fn spawn<S>(source: S, capacity: usize) -> Self
    where
        S: FragmentSource + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let span = tracing::debug_span!("fragment_reader", source = %source.name());
        tokio::spawn(read_source(source, tx).instrument(span));
        Self::from_receiver(rx)
    }

    /// Start a blocking background reader on the blocking thread pool
    ///
    /// For transports that expose a synchronous iterator over the response.
    pub fn spawn_blocking<I>(source: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = Handoff> + Send + 'static,
        I::IntoIter: Send,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::task::spawn_blocking(move || {
            for item in source {
                let failed = item.is_err();
                if tx.blocking_send(item).is_err() {
                    debug!("consumer gone, abandoning blocking reader");
                    return;
                }
                if failed {
                    return;
                }
            }
            debug!("blocking reader finished");
        });
        Self::from_receiver(rx)
    }

    /// Wrap a queue fed by a caller-managed worker
    #[must_use]
    pub fn from_receiver(receiver: mpsc::Receiver<Handoff>) -> Self {
        let (status, _) = watch::channel(String::new());
        Self { receiver, status }
    }

    /// Subscribe to status updates (the processor's last status)
    #[must_use]
    pub fn status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    /// Consume until the source ends, without cancellation
    ///
    /// # Errors
    ///
    /// See [`StreamingBridge::run`].
    pub async fn run_to_end<K>(
        self,
        processor: StreamProcessor,
        sink: &mut K,
    ) -> Result<InvestigationReport, BridgeError>
    where
        K: BlockSink + ?Sized,
    {
        self.run(processor, sink, std::future::pending()).await
    }

    /// Drive `processor` with every queued fragment, in order
    ///
    /// Stops when the source ends or `cancel` resolves. Either way the
    /// processor is flushed once and the remaining blocks are rendered. The
    /// processor is consumed: every investigation starts from a fresh state.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] when the source fails (buffered text
    /// is discarded, no flush happens) and [`BridgeError::Render`] when the
    /// sink fails.
    pub async fn run<K, C>(
        self,
        mut processor: StreamProcessor,
        sink: &mut K,
        cancel: C,
    ) -> Result<InvestigationReport, BridgeError>
    where
        K: BlockSink + ?Sized,
        C: Future<Output = ()>,
    {
        let started = Instant::now();
        let mut stats = StreamStats::default();
        let options = processor.options();
        debug!(
            defer_progress = options.defer_progress,
            show_sources = options.show_sources,
            "investigation stream started"
        );
        let Self {
            mut receiver,
            status,
        } = self;
        tokio::pin!(cancel);

        let outcome = loop {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    debug!(
                        fragments = stats.fragments_received,
                        "investigation cancelled, abandoning reader"
                    );
                    break InvestigationOutcome::Cancelled;
                }
                item = receiver.recv() => match item {
                    Some(Ok(fragment)) => {
                        stats.fragments_received += 1;
                        trace!(
                            category = ?fragment.category,
                            delta = ?fragment.delta_kind,
                            "fragment received"
                        );
                        let blocks = processor.process(&fragment);
                        publish_status(&status, processor.last_status());
                        render_all(sink, &blocks, &mut stats)?;
                    }
                    Some(Err(err)) => {
                        warn!(error = %err, "investigation stream failed");
                        return Err(BridgeError::Transport(err));
                    }
                    None => break InvestigationOutcome::Completed,
                },
            }
        };

        // Never joined: the reader stops on its next failed send
        drop(receiver);

        let blocks = processor.flush();
        render_all(sink, &blocks, &mut stats)?;
        stats.elapsed = started.elapsed();

        info!(
            outcome = ?outcome,
            fragments = stats.fragments_received,
            blocks = stats.blocks_emitted,
            elapsed_ms = u64::try_from(stats.elapsed.as_millis()).unwrap_or(u64::MAX),
            "investigation stream finished"
        );

        Ok(InvestigationReport { outcome, stats })
    }
}

/// Background reader loop
async fn read_source<S>(mut source: S, tx: mpsc::Sender<Handoff>)
where
    S: FragmentSource,
{
    loop {
        match source.next_fragment().await {
            Ok(Some(fragment)) => {
                if tx.send(Ok(fragment)).await.is_err() {
                    debug!("consumer gone, abandoning reader");
                    return;
                }
            }
            Ok(None) => {
                debug!("source finished");
                return;
            }
            Err(err) => {
                // Delivered in order after everything read so far
                let _ = tx.send(Err(err)).await;
                return;
            }
        }
    }
}

fn publish_status(status: &watch::Sender<String>, latest: &str) {
    status.send_if_modified(|current| {
        if current.as_str() == latest {
            false
        } else {
            latest.clone_into(current);
            true
        }
    });
}

fn render_all<K>(
    sink: &mut K,
    blocks: &[OutputBlock],
    stats: &mut StreamStats,
) -> Result<(), BridgeError>
where
    K: BlockSink + ?Sized,
{
    for block in blocks {
        sink.render(block).map_err(BridgeError::Render)?;
        stats.blocks_emitted += 1;
    }
    Ok(())
}
