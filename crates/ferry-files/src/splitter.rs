//! Stream splitting into fixed-size batches.
//!
//! The splitter reads a source stream and produces an ordered, finite
//! sequence of batches. Every batch except possibly the last is exactly
//! `batch_size` bytes; the last carries the remainder. Two delivery modes:
//!
//! - **Batch stream** ([`Splitter::stream`]): a producer task pushes batches
//!   through a bounded channel. The producer awaits when the consumer is
//!   behind, the consumer awaits when no batch is ready - that channel is
//!   the backpressure contract. The stream ending (`None`) is the explicit
//!   completion signal.
//! - **Framed writes** ([`Splitter::write_framed`]): each batch is encoded
//!   as a wire frame and written straight to a sink. The first write error
//!   aborts the split; nothing already written is rolled back.

use crate::error::SplitError;
use ferry_core::{Frame, FrameError, MAX_PATH_SCALARS, Metadata};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Bound on the in-flight batch handoff queue. Small: the queue exists for
/// backpressure, not buffering.
const BATCH_CHANNEL_CAPACITY: usize = 16;

/// Configuration for a split operation.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Destination path carried in every batch's metadata.
    pub path: String,
    /// Batch size in bytes. Must be at least 1 and fit the wire
    /// payload-length field.
    pub batch_size: usize,
}

impl SplitOptions {
    /// Create options with the given destination path and batch size.
    #[must_use]
    pub fn new(path: impl Into<String>, batch_size: usize) -> Self {
        Self {
            path: path.into(),
            batch_size,
        }
    }
}

/// One batch of source bytes plus its metadata snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based sequence number, strictly increasing across a split.
    pub sequence: u32,
    /// Metadata snapshot (`meta.sequence == sequence`,
    /// `meta.payload_len == payload.len()`).
    pub meta: Metadata,
    /// Batch content, at most `batch_size` bytes.
    pub payload: Vec<u8>,
}

/// Summary of a framed split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitStats {
    /// Number of batches produced.
    pub batches: u64,
    /// Total payload bytes read from the source.
    pub bytes: u64,
}

/// Receiving end of the batch handoff queue.
///
/// Yields `Some(Ok(batch))` per batch in sequence order, `Some(Err(_))` if
/// the producer hit an error (the stream ends after it), and `None` once
/// the source is exhausted. Dropping the stream abandons the queue and
/// stops the producer.
pub struct BatchStream {
    rx: mpsc::Receiver<Result<Batch, SplitError>>,
}

impl BatchStream {
    /// Receive the next batch, awaiting until one is ready.
    pub async fn next(&mut self) -> Option<Result<Batch, SplitError>> {
        self.rx.recv().await
    }
}

/// Splits a source stream into fixed-size batches.
pub struct Splitter {
    opts: SplitOptions,
}

impl Splitter {
    /// Create a splitter, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidBatchSize`] for a zero batch size or one
    /// exceeding `u32::MAX`, and [`SplitError::Frame`] if the destination
    /// path cannot be encoded. Both checks run before any I/O.
    pub fn new(opts: SplitOptions) -> Result<Self, SplitError> {
        if opts.batch_size == 0 || opts.batch_size > u32::MAX as usize {
            return Err(SplitError::InvalidBatchSize(opts.batch_size));
        }
        let count = opts.path.chars().count();
        if count > MAX_PATH_SCALARS {
            return Err(SplitError::Frame(FrameError::PathTooLong {
                count,
                max: MAX_PATH_SCALARS,
            }));
        }
        Ok(Self { opts })
    }

    /// Configured batch size.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.opts.batch_size
    }

    /// Configured destination path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.opts.path
    }

    /// Split the source into a stream of batches (handoff mode).
    ///
    /// Spawns a producer task that reads the source and sends each batch
    /// through a bounded channel. Read errors reach the consumer as a final
    /// `Err` item; the producer task itself never panics.
    pub fn stream<R>(&self, source: R) -> BatchStream
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(BATCH_CHANNEL_CAPACITY);
        let path = self.opts.path.clone();
        let batch_size = self.opts.batch_size;
        tokio::spawn(produce(source, path, batch_size, tx));
        BatchStream { rx }
    }

    /// Split the source into frames written directly to the sink.
    ///
    /// For each chunk read, writes the metadata header (destination path,
    /// sequence, chunk byte length), the payload, and the 4-zero-byte
    /// terminator. Zero-length input writes no frame.
    ///
    /// # Errors
    ///
    /// The first read or write error aborts the whole split and is returned
    /// as-is; frames already written stay written.
    pub async fn write_framed<R, W>(
        &self,
        source: &mut R,
        sink: &mut W,
    ) -> Result<SplitStats, SplitError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut stats = SplitStats::default();
        let mut sequence: u32 = 1;

        loop {
            let mut payload = vec![0u8; self.opts.batch_size];
            let n = read_full(source, &mut payload).await?;
            if n == 0 {
                break;
            }
            payload.truncate(n);

            let frame = Frame::new(self.opts.path.clone(), sequence, payload)?;
            let written = frame.write_to(sink).await.map_err(|e| match e {
                FrameError::Io(io) => SplitError::Io(io),
                other => SplitError::Frame(other),
            })?;
            stats.batches += 1;
            stats.bytes += n as u64;
            trace!(sequence, payload = n, frame = written, "frame written");

            if n < self.opts.batch_size {
                break;
            }
            sequence = sequence.checked_add(1).ok_or(SplitError::SequenceOverflow)?;
        }

        sink.flush().await?;
        debug!(
            batches = stats.batches,
            bytes = stats.bytes,
            "framed split complete"
        );
        Ok(stats)
    }
}

/// Producer task for handoff mode. Owns the source; every batch is owned
/// here until it is handed off through the channel.
async fn produce<R>(
    mut source: R,
    path: String,
    batch_size: usize,
    tx: mpsc::Sender<Result<Batch, SplitError>>,
) where
    R: AsyncRead + Unpin,
{
    let mut sequence: u32 = 1;

    loop {
        let mut payload = vec![0u8; batch_size];
        let n = match read_full(&mut source, &mut payload).await {
            Ok(n) => n,
            Err(e) => {
                let _ = tx.send(Err(SplitError::Io(e))).await;
                return;
            }
        };
        if n == 0 {
            break;
        }
        payload.truncate(n);

        let meta = Metadata::new(path.clone(), sequence, n as u32);
        let batch = Batch {
            sequence,
            meta,
            payload,
        };
        trace!(sequence, len = n, "batch ready");
        if tx.send(Ok(batch)).await.is_err() {
            debug!("batch receiver dropped, stopping split");
            return;
        }

        if n < batch_size {
            break;
        }
        sequence = match sequence.checked_add(1) {
            Some(next) => next,
            None => {
                let _ = tx.send(Err(SplitError::SequenceOverflow)).await;
                return;
            }
        };
    }
    // Dropping the sender closes the channel - the completion signal.
}

/// Read until `buf` is full or the source is exhausted. A return value
/// smaller than `buf.len()` means end of input was reached.
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
