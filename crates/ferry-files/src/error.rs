//! Error types for splitting and collection.

use ferry_core::FrameError;
use thiserror::Error;

/// Errors that can occur while splitting a source into batches.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Batch size is zero or does not fit the wire payload-length field.
    /// Rejected before any I/O.
    #[error("invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// More batches than the 32-bit sequence field can number.
    #[error("batch sequence overflow")]
    SequenceOverflow,

    /// Frame encoding failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Reading the source or writing the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while collecting frames into a destination file.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Batch size is zero. Rejected before any I/O or file creation.
    #[error("invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// Frame decoding failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Reading the source or writing the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
