#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Reservoir Pool
//!
//! A blocking pool over a fixed set of reusable connections.
//!
//! The pool opens all of its connections up front and never opens or closes
//! one again until it shuts down. Callers check connections out with
//! [`Pool::acquire`], which blocks while every connection is in use, and
//! return them by dropping the [`PooledConnection`] they were given.
//!
//! - Waiters are served in arrival order
//! - A release wakes exactly one waiter
//! - [`Pool::shutdown`] fails every blocked and future acquire
//!
//! ```
//! use std::thread;
//! use reservoir_core::{Connection, OpenError};
//! use reservoir_pool::Pool;
//!
//! struct Session;
//!
//! impl Connection for Session {
//!     fn close(&mut self) {}
//! }
//!
//! let pool = Pool::new(4, || Ok::<_, OpenError>(Session)).unwrap();
//!
//! let workers: Vec<_> = (0..16)
//!     .map(|_| {
//!         let pool = pool.clone();
//!         thread::spawn(move || {
//!             let _conn = pool.acquire().unwrap();
//!             // use the connection
//!         })
//!     })
//!     .collect();
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//! assert_eq!(pool.num_idle(), 4);
//! ```

/// Scoped connection handles
pub mod connection;

/// The pool and its lifecycle
pub mod pool;

/// Usage counters
pub mod stats;

mod wait_list;

// Re-export key types for easier access
pub use connection::PooledConnection;
pub use pool::{Pool, PoolState};
pub use stats::PoolStats;

pub use reservoir_core::{Connection, ConnectionFactory, OpenError, PoolConfig, PoolError};
