//! Error types for frame encoding and decoding.

use thiserror::Error;

/// Errors that can occur while encoding or decoding wire frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Path has more Unicode scalar values than the 16-bit length prefix
    /// can represent.
    #[error("path too long: {count} scalar values (max {max})")]
    PathTooLong {
        /// Scalar-value count of the offending path.
        count: usize,
        /// Maximum representable count.
        max: usize,
    },

    /// Payload does not fit the 32-bit length field.
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// Buffer decode ran out of bytes mid-structure.
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    TooShort {
        /// Bytes required to decode the structure.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Stream decode hit end-of-stream inside a frame. End-of-stream *at* a
    /// frame boundary is not an error; decoders report it as `Ok(None)`.
    #[error("unexpected end of stream while reading {0}")]
    UnexpectedEof(&'static str),

    /// A 4-byte path unit is not a valid Unicode scalar value.
    #[error("invalid path scalar value: {0:#010x}")]
    InvalidScalar(u32),

    /// Frame terminator bytes were present but non-zero.
    #[error("bad frame terminator: {0:02x?}")]
    BadTerminator([u8; 4]),

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Classify a read error: end-of-file inside a frame is corruption,
    /// everything else is plain I/O.
    pub(crate) fn from_read(err: std::io::Error, field: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof(field)
        } else {
            Self::Io(err)
        }
    }
}
