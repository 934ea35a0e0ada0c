//! Frame collection into a destination file.
//!
//! The collector is the receiving counterpart of the splitter. Two modes:
//!
//! - [`Collector::collect`]: decodes exactly one metadata header, then
//!   copies every remaining source byte to the destination through a
//!   `batch_size`-sized buffer. This is the raw single-header mode; the
//!   stream after the header is treated as opaque payload.
//! - [`Collector::collect_frames`]: decodes self-describing frames in a
//!   loop until end-of-stream, writing each payload in arrival order.
//!
//! In both modes the caller-supplied destination path takes precedence over
//! the path carried inside the decoded metadata, and the destination is
//! flushed and closed exactly once on success and failure paths alike.

use crate::error::CollectError;
use ferry_core::{Frame, Metadata};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, trace};

/// Configuration for a collect operation.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Destination file path. Created or truncated once a header has been
    /// decoded; takes precedence over the path inside the metadata.
    pub path: PathBuf,
    /// Copy buffer size in bytes. Must be at least 1.
    pub batch_size: usize,
}

impl CollectOptions {
    /// Create options with the given destination path and batch size.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            path: path.into(),
            batch_size,
        }
    }
}

/// Summary of a collect operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Metadata headers decoded (always 1 for raw mode).
    pub frames: u64,
    /// Payload bytes written to the destination.
    pub bytes: u64,
}

/// Collects a frame stream into a destination file.
pub struct Collector {
    opts: CollectOptions,
}

impl Collector {
    /// Create a collector, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidBatchSize`] for a zero batch size,
    /// before any I/O or file creation.
    pub fn new(opts: CollectOptions) -> Result<Self, CollectError> {
        if opts.batch_size == 0 {
            return Err(CollectError::InvalidBatchSize(0));
        }
        Ok(Self { opts })
    }

    /// Configured destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.opts.path
    }

    /// Configured copy buffer size.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.opts.batch_size
    }

    /// Decode one metadata header, then copy all remaining bytes to the
    /// destination.
    ///
    /// Returns `Ok(None)` if the source is already exhausted at the header
    /// boundary; no file is created in that case.
    ///
    /// # Errors
    ///
    /// Header corruption, destination creation failure, and copy errors are
    /// surfaced as-is with no partial cleanup.
    pub async fn collect<R>(&self, source: &mut R) -> Result<Option<CollectStats>, CollectError>
    where
        R: AsyncRead + Unpin,
    {
        let Some(meta) = Metadata::read_from(source).await? else {
            return Ok(None);
        };
        debug!(
            decoded = %meta.path,
            dest = %self.opts.path.display(),
            sequence = meta.sequence,
            "collecting stream"
        );

        let mut dest = File::create(&self.opts.path).await?;
        let copied = self.copy_remaining(source, &mut dest).await;
        let finished = finish(&mut dest).await;
        // The copy error wins; the flush still ran either way.
        let bytes = copied?;
        finished?;

        Ok(Some(CollectStats { frames: 1, bytes }))
    }

    /// Decode frames in a loop until end-of-stream, writing each payload to
    /// the destination in arrival order.
    ///
    /// The destination is created on the first frame; a frameless source
    /// yields zero stats and no file.
    ///
    /// # Errors
    ///
    /// The first decode or write error aborts collection and is returned;
    /// payloads already written stay written.
    pub async fn collect_frames<R>(&self, source: &mut R) -> Result<CollectStats, CollectError>
    where
        R: AsyncRead + Unpin,
    {
        let mut stats = CollectStats::default();

        // The destination only comes into existence once a frame has been
        // decoded; a frameless source leaves the filesystem untouched.
        let Some(mut frame) = Frame::read_from(source).await? else {
            return Ok(stats);
        };
        let mut dest = File::create(&self.opts.path).await?;

        loop {
            if let Err(e) = dest.write_all(&frame.payload).await {
                let _ = finish(&mut dest).await;
                return Err(e.into());
            }
            stats.frames += 1;
            stats.bytes += frame.payload.len() as u64;
            trace!(
                sequence = frame.meta.sequence,
                len = frame.payload.len(),
                "frame collected"
            );

            match Frame::read_from(source).await {
                Ok(Some(next)) => frame = next,
                Ok(None) => break,
                Err(e) => {
                    let _ = finish(&mut dest).await;
                    return Err(e.into());
                }
            }
        }

        finish(&mut dest).await?;
        debug!(
            frames = stats.frames,
            bytes = stats.bytes,
            dest = %self.opts.path.display(),
            "collection complete"
        );
        Ok(stats)
    }

    /// Copy every remaining source byte through a `batch_size` buffer.
    async fn copy_remaining<R>(&self, source: &mut R, dest: &mut File) -> Result<u64, CollectError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.opts.batch_size];
        let mut total: u64 = 0;
        loop {
            let n = source.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            dest.write_all(&buf[..n]).await?;
            total += n as u64;
        }
        Ok(total)
    }
}

/// Flush and sync the destination. Runs once on every exit path before the
/// file handle is dropped.
async fn finish(file: &mut File) -> Result<(), CollectError> {
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::{SplitOptions, Splitter};
    use ferry_core::FrameError;
    use tempfile::tempdir;

    fn collector(path: impl Into<PathBuf>, batch_size: usize) -> Collector {
        Collector::new(CollectOptions::new(path, batch_size)).unwrap()
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(matches!(
            Collector::new(CollectOptions::new("/tmp/out", 0)),
            Err(CollectError::InvalidBatchSize(0))
        ));
    }

    #[tokio::test]
    async fn test_collect_raw_copy() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("collected.bin");

        // One header, then opaque payload bytes.
        let meta = Metadata::new("ignored/name.bin", 1, 11);
        let mut wire = meta.encode().unwrap();
        wire.extend_from_slice(b"hello world");

        let mut source: &[u8] = &wire;
        let stats = collector(&dest, 4)
            .collect(&mut source)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stats.frames, 1);
        assert_eq!(stats.bytes, 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_collect_caller_path_wins() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("caller.bin");

        // Metadata names a different file; the caller-supplied path is used.
        let meta = Metadata::new("decoded/other.bin", 1, 3);
        let mut wire = meta.encode().unwrap();
        wire.extend_from_slice(b"abc");

        let mut source: &[u8] = &wire;
        collector(&dest, 8).collect(&mut source).await.unwrap();

        assert!(dest.exists());
        assert!(!dir.path().join("decoded/other.bin").exists());
    }

    #[tokio::test]
    async fn test_collect_empty_source_is_end_of_stream() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("never.bin");

        let mut source: &[u8] = &[];
        let stats = collector(&dest, 8).collect(&mut source).await.unwrap();
        assert!(stats.is_none());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_collect_truncated_header_is_corrupt() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("never.bin");

        let meta = Metadata::new("some/path.bin", 1, 5);
        let wire = meta.encode().unwrap();
        let mut source: &[u8] = &wire[..5];
        let err = collector(&dest, 8).collect(&mut source).await.unwrap_err();
        assert!(matches!(
            err,
            CollectError::Frame(FrameError::UnexpectedEof(_))
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_collect_frames_roundtrip() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("reassembled.bin");

        let original: &[u8] = b"0123456789abcdefg";
        let mut source = original;
        let mut wire: Vec<u8> = Vec::new();
        Splitter::new(SplitOptions::new("reassembled.bin", 5))
            .unwrap()
            .write_framed(&mut source, &mut wire)
            .await
            .unwrap();

        let mut rd: &[u8] = &wire;
        let stats = collector(&dest, 5).collect_frames(&mut rd).await.unwrap();

        assert_eq!(stats.frames, 4);
        assert_eq!(stats.bytes, 17);
        assert_eq!(std::fs::read(&dest).unwrap(), original);
    }

    #[tokio::test]
    async fn test_collect_frames_empty_source() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("never.bin");

        let mut source: &[u8] = &[];
        let stats = collector(&dest, 8).collect_frames(&mut source).await.unwrap();
        assert_eq!(stats, CollectStats::default());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_collect_frames_truncated_mid_frame() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("partial.bin");

        let mut source: &[u8] = b"0123456789";
        let mut wire: Vec<u8> = Vec::new();
        Splitter::new(SplitOptions::new("partial.bin", 5))
            .unwrap()
            .write_framed(&mut source, &mut wire)
            .await
            .unwrap();

        // Cut inside the second frame's payload.
        let cut = wire.len() - 6;
        let mut rd: &[u8] = &wire[..cut];
        let err = collector(&dest, 5)
            .collect_frames(&mut rd)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CollectError::Frame(FrameError::UnexpectedEof(_))
        ));
        // The first frame landed before the corruption was hit.
        assert_eq!(std::fs::read(&dest).unwrap(), b"01234");
    }
}
