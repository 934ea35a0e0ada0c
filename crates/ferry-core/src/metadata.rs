//! Batch metadata encoding and decoding.
//!
//! The metadata header precedes every batch payload on the wire:
//!
//! ```text
//!  Offset           Size            Field
//!  0                2               Path Length (little-endian, scalar count)
//!  2                4 * path_len    Path (one u32 per Unicode scalar value)
//!  2 + 4*path_len   4               Sequence Number (little-endian, 32-bit)
//!  6 + 4*path_len   4               Payload Length (little-endian, 32-bit)
//! ```
//!
//! All multi-byte fields are little-endian. The path is encoded one fixed
//! 4-byte unit per Unicode scalar value rather than UTF-8, so the length
//! prefix always equals the scalar-value count of the path, never a byte
//! count. Non-ASCII paths expand 4x relative to a byte-oriented encoding.

use crate::error::FrameError;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Maximum number of Unicode scalar values in an encodable path.
pub const MAX_PATH_SCALARS: usize = u16::MAX as usize;

/// Fixed-size tail of the header: sequence number + payload length.
const FIXED_TAIL_LEN: usize = 8;

/// Per-batch metadata header.
///
/// Carries the destination path plus two explicit integers: a monotonic
/// 1-based sequence number and the payload byte length. The payload length
/// makes frames self-describing; a receiver does not need out-of-band
/// batch-size agreement to find the payload/terminator boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Destination path, at most [`MAX_PATH_SCALARS`] scalar values.
    pub path: String,
    /// 1-based batch sequence number.
    pub sequence: u32,
    /// Payload length in bytes.
    pub payload_len: u32,
}

impl Metadata {
    /// Create a new metadata header.
    #[must_use]
    pub fn new(path: impl Into<String>, sequence: u32, payload_len: u32) -> Self {
        Self {
            path: path.into(),
            sequence,
            payload_len,
        }
    }

    /// Exact encoded size of this header in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        2 + 4 * self.path.chars().count() + FIXED_TAIL_LEN
    }

    /// Encode the header into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PathTooLong`] if the path has more than
    /// [`MAX_PATH_SCALARS`] scalar values.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Encode the header, appending to `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PathTooLong`] if the path has more than
    /// [`MAX_PATH_SCALARS`] scalar values. Nothing is appended on error.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<(), FrameError> {
        let count = self.path.chars().count();
        if count > MAX_PATH_SCALARS {
            return Err(FrameError::PathTooLong {
                count,
                max: MAX_PATH_SCALARS,
            });
        }

        buf.reserve(2 + 4 * count + FIXED_TAIL_LEN);
        buf.extend_from_slice(&(count as u16).to_le_bytes());
        for ch in self.path.chars() {
            buf.extend_from_slice(&(ch as u32).to_le_bytes());
        }
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.payload_len.to_le_bytes());
        Ok(())
    }

    /// Decode a header from a byte buffer, returning it together with the
    /// number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TooShort`] if the buffer ends mid-header and
    /// [`FrameError::InvalidScalar`] if a path unit is not a Unicode scalar
    /// value.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), FrameError> {
        if buf.len() < 2 {
            return Err(FrameError::TooShort {
                expected: 2,
                actual: buf.len(),
            });
        }
        let path_len = u16::from_le_bytes([buf[0], buf[1]]) as usize;

        let need = 2 + 4 * path_len + FIXED_TAIL_LEN;
        if buf.len() < need {
            return Err(FrameError::TooShort {
                expected: need,
                actual: buf.len(),
            });
        }

        let mut path = String::with_capacity(path_len);
        for i in 0..path_len {
            let off = 2 + 4 * i;
            let unit = u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]]);
            let ch = char::from_u32(unit).ok_or(FrameError::InvalidScalar(unit))?;
            path.push(ch);
        }

        let off = 2 + 4 * path_len;
        let sequence = u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]]);
        let payload_len =
            u32::from_le_bytes([buf[off + 4], buf[off + 5], buf[off + 6], buf[off + 7]]);

        Ok((
            Self {
                path,
                sequence,
                payload_len,
            },
            need,
        ))
    }

    /// Decode a header from an async stream.
    ///
    /// Returns `Ok(None)` when the stream is already exhausted at the header
    /// boundary - the normal end-of-stream signal, distinct from corruption.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnexpectedEof`] if the stream ends after the
    /// length prefix has been read, and [`FrameError::InvalidScalar`] for
    /// path units outside the Unicode scalar range.
    pub async fn read_from<R>(reader: &mut R) -> Result<Option<Self>, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        let mut len_buf = [0u8; 2];
        // A clean EOF on the very first byte is end-of-stream, not an error.
        if reader.read(&mut len_buf[..1]).await? == 0 {
            return Ok(None);
        }
        reader
            .read_exact(&mut len_buf[1..])
            .await
            .map_err(|e| FrameError::from_read(e, "path length"))?;
        let path_len = u16::from_le_bytes(len_buf) as usize;

        let mut units = vec![0u8; 4 * path_len];
        reader
            .read_exact(&mut units)
            .await
            .map_err(|e| FrameError::from_read(e, "path"))?;
        let mut path = String::with_capacity(path_len);
        for chunk in units.chunks_exact(4) {
            let unit = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let ch = char::from_u32(unit).ok_or(FrameError::InvalidScalar(unit))?;
            path.push(ch);
        }

        let mut tail = [0u8; FIXED_TAIL_LEN];
        reader
            .read_exact(&mut tail)
            .await
            .map_err(|e| FrameError::from_read(e, "sequence and payload length"))?;
        let sequence = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
        let payload_len = u32::from_le_bytes([tail[4], tail[5], tail[6], tail[7]]);

        Ok(Some(Self {
            path,
            sequence,
            payload_len,
        }))
    }
}
