//! Error types for the connection pool.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur in pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Pool capacity is zero. Rejected synchronously, before any dial.
    #[error("invalid pool capacity: {0}")]
    InvalidCapacity(usize),

    /// A dial during `init` failed. The pool is left with whatever
    /// connections were already established; there is no backfill.
    #[error("dial {addr} failed: {source}")]
    DialFailed {
        /// Target address of the failed dial.
        addr: SocketAddr,
        /// Underlying connect error.
        source: std::io::Error,
    },

    /// A socket write failed. The connection was discarded and a single
    /// redial attempted; the error still reaches the caller.
    #[error("connection write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// The pool has been closed.
    #[error("pool is closed")]
    Closed,
}
