//! Error types for the Reservoir connection pool.
//!
//! Errors are organized by concern: `OpenError` is what a connection factory
//! reports, `PoolError` is what the pool reports to its callers and
//! `ConfigError` covers loading and validating configuration. The root
//! `Error` type can wrap any of them for uniform handling at the top level.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Root error type for Reservoir.
#[derive(Debug, Error)]
pub enum Error {
    /// Pool operation errors
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection factory errors
    #[error("Connection error: {0}")]
    Open(#[from] OpenError),
}

/// Error reported by a [`ConnectionFactory`](crate::ConnectionFactory) that
/// could not open a backing connection.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct OpenError {
    message: String,

    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl OpenError {
    /// Create an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error that wraps the underlying driver or I/O failure.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The human-readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for OpenError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source("I/O failure while opening connection", err)
    }
}

/// Errors returned by pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The factory failed while the pool was opening its connections.
    ///
    /// Any connection opened before the failure has already been closed.
    #[error("failed to open pool connection: {0}")]
    Construction(#[source] OpenError),

    /// The pool configuration was rejected before any connection was opened.
    #[error("invalid pool configuration: {0}")]
    Config(#[from] ConfigError),

    /// The pool has been shut down
    #[error("connection pool is closed")]
    Closed,

    /// A bounded acquire gave up waiting
    #[error("timed out after {0:?} waiting for a connection")]
    Timeout(Duration),

    /// A non-blocking acquire found no connection available
    #[error("connection pool exhausted")]
    Exhausted,

    /// The caller broke the acquire/release protocol
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl PoolError {
    /// Whether the pool itself is unusable (as opposed to merely busy).
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Errors related to loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has the wrong shape
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but holds an unusable value
    #[error("{0}")]
    Invalid(String),
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_open_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = OpenError::from(io);

        assert_eq!(err.message(), "I/O failure while opening connection");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_construction_error_display() {
        let err = PoolError::Construction(OpenError::new("database unreachable"));
        assert_eq!(
            err.to_string(),
            "failed to open pool connection: database unreachable"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_root_error_wraps_pool_error() {
        let err: Error = PoolError::Closed.into();
        assert!(matches!(err, Error::Pool(PoolError::Closed)));
        assert_eq!(err.to_string(), "Pool error: connection pool is closed");
    }

    #[test]
    fn test_is_closed() {
        assert!(PoolError::Closed.is_closed());
        assert!(!PoolError::Exhausted.is_closed());
        assert!(!PoolError::Timeout(Duration::from_millis(5)).is_closed());
    }
}
