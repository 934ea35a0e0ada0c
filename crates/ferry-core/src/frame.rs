//! Frame encoding and decoding.
//!
//! A frame is the wire encoding of one batch:
//!
//! ```text
//! +-----------------+-----------------+------------------------+
//! | Metadata header | Payload (N)     | Terminator (4 zeroes)  |
//! +-----------------+-----------------+------------------------+
//! ```
//!
//! The metadata header carries the payload length, so frames are
//! self-describing; the terminator is retained as a framing check and must
//! be exactly four zero bytes.

use crate::error::FrameError;
use crate::metadata::Metadata;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Frame terminator: four zero bytes after the payload.
pub const FRAME_TERMINATOR: [u8; 4] = [0u8; 4];

/// One self-contained wire unit: metadata header, payload, terminator.
///
/// Invariant: `meta.payload_len == payload.len()`. [`Frame::new`] and the
/// decoder both uphold it; code constructing a `Frame` literal must too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Metadata header for this frame.
    pub meta: Metadata,
    /// Batch payload bytes.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Build a frame, filling in the metadata payload length.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadTooLarge`] if the payload does not fit
    /// the 32-bit length field.
    pub fn new(path: impl Into<String>, sequence: u32, payload: Vec<u8>) -> Result<Self, FrameError> {
        let payload_len =
            u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge(payload.len()))?;
        Ok(Self {
            meta: Metadata::new(path, sequence, payload_len),
            payload,
        })
    }

    /// Exact encoded size of this frame in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.meta.encoded_len() + self.payload.len() + FRAME_TERMINATOR.len()
    }

    /// Encode the whole frame into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PathTooLong`] if the metadata path exceeds the
    /// 16-bit length prefix.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.meta.encode_into(&mut buf)?;
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&FRAME_TERMINATOR);
        Ok(buf)
    }

    /// Write the frame to an async sink, returning the bytes written.
    ///
    /// # Errors
    ///
    /// Returns encoding errors as for [`Frame::encode`] and any I/O error
    /// from the sink.
    pub async fn write_to<W>(&self, writer: &mut W) -> Result<usize, FrameError>
    where
        W: AsyncWrite + Unpin,
    {
        let buf = self.encode()?;
        writer.write_all(&buf).await?;
        Ok(buf.len())
    }

    /// Decode one frame from an async stream.
    ///
    /// Returns `Ok(None)` on a clean end-of-stream at the frame boundary.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnexpectedEof`] if the stream ends inside the
    /// frame and [`FrameError::BadTerminator`] if the terminator bytes are
    /// not all zero. Corrupt frames are never retried.
    pub async fn read_from<R>(reader: &mut R) -> Result<Option<Self>, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        let Some(meta) = Metadata::read_from(reader).await? else {
            return Ok(None);
        };

        let mut payload = vec![0u8; meta.payload_len as usize];
        reader
            .read_exact(&mut payload)
            .await
            .map_err(|e| FrameError::from_read(e, "payload"))?;

        let mut term = [0u8; 4];
        reader
            .read_exact(&mut term)
            .await
            .map_err(|e| FrameError::from_read(e, "terminator"))?;
        if term != FRAME_TERMINATOR {
            return Err(FrameError::BadTerminator(term));
        }

        Ok(Some(Self { meta, payload }))
    }
}
