//! # Ferry Transport
//!
//! Network transport layer for ferry.
//!
//! This crate provides a bounded pool of pre-dialed outbound TCP
//! connections with exclusive per-write checkout. The pool is the only
//! shared mutable resource in the system; its checkout gate is the sole
//! backpressure mechanism bounding concurrent in-flight writes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod pool;

pub use error::PoolError;
pub use pool::{ConnectionPool, PoolConfig};
