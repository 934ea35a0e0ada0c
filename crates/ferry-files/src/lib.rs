//! # Ferry Files
//!
//! Batch splitting and collection for ferry.
//!
//! This crate provides:
//! - Stream splitting into fixed-size batches with two delivery modes
//!   (bounded batch stream, direct framed writes)
//! - Frame-aware and raw-copy collection on the receiving side
//! - Transfer summaries for both directions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collector;
pub mod error;
pub mod splitter;

pub use collector::{CollectOptions, CollectStats, Collector};
pub use error::{CollectError, SplitError};
pub use splitter::{Batch, BatchStream, SplitOptions, SplitStats, Splitter};

/// Default batch size (64 KiB). Large enough to amortize per-frame header
/// overhead, small enough that the collector's copy buffer stays modest.
pub const DEFAULT_BATCH_SIZE: usize = 64 * 1024;
