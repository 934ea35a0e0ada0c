//! Bounded pool of pre-dialed TCP connections.
//!
//! The pool dials a fixed number of connections up front and hands them out
//! one at a time for exclusive writes. Checkout is gated by a semaphore
//! whose permit count always equals the number of idle connections, so a
//! `write` call awaits until a connection is free - that wait is the
//! system's only backpressure mechanism.
//!
//! A connection is either in the idle queue or checked out by exactly one
//! writer, never both. A connection whose write failed is discarded and
//! replaced by a single redial; if the redial also fails the slot is
//! retired and the pool shrinks. There is no reconnect, health-check, or
//! timeout logic beyond that.

use crate::error::PoolError;
use crossbeam_queue::ArrayQueue;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Target address for all outbound connections.
    pub addr: SocketAddr,
    /// Number of connections to dial at `init`. Must be at least 1.
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            capacity: 5,
        }
    }
}

/// Bounded pool of pre-dialed outbound TCP connections.
///
/// Thread-safe: share it via `Arc` and call `write` from any number of
/// tasks. At most `capacity` writes proceed concurrently; the rest await a
/// free connection.
pub struct ConnectionPool {
    /// Idle connections. Lock-free; a popped connection is exclusively
    /// owned until pushed back.
    idle: ArrayQueue<TcpStream>,
    /// One permit per idle connection.
    permits: Semaphore,
    capacity: usize,
    addr: SocketAddr,
    closed: AtomicBool,
}

impl ConnectionPool {
    /// Create a pool without dialing anything yet.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidCapacity`] if `capacity` is zero. No I/O
    /// happens here.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        if config.capacity == 0 {
            return Err(PoolError::InvalidCapacity(0));
        }
        Ok(Self {
            idle: ArrayQueue::new(config.capacity),
            permits: Semaphore::new(0),
            capacity: config.capacity,
            addr: config.addr,
            closed: AtomicBool::new(false),
        })
    }

    /// Dial `capacity` connections sequentially.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DialFailed`] on the first failed dial. The pool
    /// keeps the connections established so far; callers must not assume
    /// full capacity after an error, and no later call backfills the gap.
    pub async fn init(&self) -> Result<(), PoolError> {
        for dialed in 0..self.capacity {
            let stream = TcpStream::connect(self.addr).await.map_err(|e| {
                warn!(
                    addr = %self.addr,
                    dialed,
                    error = %e,
                    "dial failed, pool left partially populated"
                );
                PoolError::DialFailed {
                    addr: self.addr,
                    source: e,
                }
            })?;
            let _ = self.idle.push(stream);
            self.permits.add_permits(1);
        }
        debug!(addr = %self.addr, capacity = self.capacity, "pool initialized");
        Ok(())
    }

    /// Write the whole buffer over one pooled connection, returning the
    /// number of bytes written.
    ///
    /// Awaits until a connection is free. On success the connection goes
    /// straight back to the pool. On failure it is discarded and one redial
    /// is attempted to keep the pool at strength; a dead connection is
    /// never handed out again.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] if the pool was closed and
    /// [`PoolError::WriteFailed`] for socket errors.
    pub async fn write(&self, buf: &[u8]) -> Result<usize, PoolError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(PoolError::Closed);
        }

        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PoolError::Closed)?;
        let Some(mut conn) = self.idle.pop() else {
            // Only reachable when close() raced the permit grant.
            permit.forget();
            return Err(PoolError::Closed);
        };

        match conn.write_all(buf).await {
            Ok(()) => {
                // Push before releasing the permit so a waiter never finds
                // the queue empty.
                let _ = self.idle.push(conn);
                drop(permit);
                Ok(buf.len())
            }
            Err(e) => {
                warn!(addr = %self.addr, error = %e, "write failed, discarding connection");
                drop(conn);
                match TcpStream::connect(self.addr).await {
                    Ok(fresh) => {
                        let _ = self.idle.push(fresh);
                        drop(permit);
                        debug!(addr = %self.addr, "redialed replacement connection");
                    }
                    Err(redial) => {
                        warn!(
                            addr = %self.addr,
                            error = %redial,
                            "redial failed, retiring pool slot"
                        );
                        permit.forget();
                    }
                }
                Err(PoolError::WriteFailed(e))
            }
        }
    }

    /// Drain the idle queue and shut every connection down.
    ///
    /// Later `write` calls fail with [`PoolError::Closed`]. Connections
    /// checked out at this moment are not tracked; callers must ensure no
    /// writes are in flight.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
        self.permits.close();
        let mut drained = 0;
        while let Some(mut conn) = self.idle.pop() {
            let _ = conn.shutdown().await;
            drained += 1;
        }
        debug!(addr = %self.addr, drained, "pool closed");
    }

    /// Number of idle connections currently in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.idle.len()
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Target address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("addr", &self.addr)
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .finish()
    }
}
