//! Interfaces between the pool and the connections it manages.
//!
//! The pool treats a connection as opaque. It needs exactly two things from
//! its collaborators:
//!
//! - `ConnectionFactory`: open one new backing connection per call
//! - `Connection`: close a connection the pool is done with

pub mod connection;

pub use connection::{Connection, ConnectionFactory};
