//! # Reservoir Core
//!
//! `reservoir_core` provides the building blocks shared by the Reservoir
//! connection pool and its tooling: error types, identifiers, pool
//! configuration and the traits a backing connection has to implement.
//!
//! ## Model
//!
//! A pool owns a fixed number of connections, all opened up front through a
//! [`ConnectionFactory`]. Callers check a connection out, use it exclusively,
//! and hand it back. The pool never looks inside a connection: the only
//! operation it performs on one besides handing it out is [`Connection::close`].
//!
//! ## Crate Structure
//!
//! - **error**: Error types for every Reservoir component
//! - **id**: Pool and connection identifiers
//! - **config**: Pool configuration and TOML loading
//! - **traits**: The connection collaborator interfaces

pub mod config;
pub mod error;
pub mod id;
pub mod traits;

// Re-export key types and traits for convenience
pub use config::PoolConfig;
pub use error::{ConfigError, Error, OpenError, PoolError};
pub use id::{ConnectionId, PoolId};
pub use traits::{Connection, ConnectionFactory};
