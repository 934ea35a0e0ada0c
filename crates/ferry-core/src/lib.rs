//! # Ferry Core
//!
//! Wire protocol for ferry batch transfer.
//!
//! This crate provides:
//! - Metadata codec for the per-batch header (destination path, sequence
//!   number, payload length)
//! - Frame encoding and decoding (header + payload + terminator)
//! - Stream decoders that distinguish clean end-of-stream from corruption

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod frame;
pub mod metadata;

pub use error::FrameError;
pub use frame::{FRAME_TERMINATOR, Frame};
pub use metadata::{MAX_PATH_SCALARS, Metadata};
