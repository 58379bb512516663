//! Connection collaborator traits.
//!
//! Whatever a connection does for its user (run queries, speak a wire
//! protocol) happens through the user's own type. The pool only opens
//! connections through a [`ConnectionFactory`] when it is built and closes
//! them through [`Connection::close`] when it shuts down.
//!
//! # Examples
//!
//! ```
//! use reservoir_core::error::OpenError;
//! use reservoir_core::traits::{Connection, ConnectionFactory};
//!
//! struct Socket {
//!     open: bool,
//! }
//!
//! impl Connection for Socket {
//!     fn close(&mut self) {
//!         self.open = false;
//!     }
//! }
//!
//! // Any closure returning a connection is a factory.
//! let factory = || Ok::<_, OpenError>(Socket { open: true });
//! let mut socket = factory.open().unwrap();
//! assert!(socket.open);
//! socket.close();
//! assert!(!socket.open);
//! ```

use crate::error::OpenError;

/// A backing connection managed by a pool.
pub trait Connection: Send + 'static {
    /// Release the underlying resources.
    ///
    /// The pool calls this at most once per connection, from whichever
    /// thread performs the shutdown or the final release. Implementations
    /// should not block indefinitely.
    fn close(&mut self);
}

/// Produces the connections a pool is populated with.
pub trait ConnectionFactory: Send + Sync + 'static {
    /// The connection type this factory opens.
    type Connection: Connection;

    /// Open one new backing connection.
    fn open(&self) -> Result<Self::Connection, OpenError>;
}

impl<C, F> ConnectionFactory for F
where
    C: Connection,
    F: Fn() -> Result<C, OpenError> + Send + Sync + 'static,
{
    type Connection = C;

    fn open(&self) -> Result<C, OpenError> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counted {
        closed: Arc<AtomicUsize>,
    }

    impl Connection for Counted {
        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingFactory;

    impl ConnectionFactory for FailingFactory {
        type Connection = Counted;

        fn open(&self) -> Result<Counted, OpenError> {
            Err(OpenError::new("no route to host"))
        }
    }

    #[test]
    fn test_closure_factory() {
        let closed = Arc::new(AtomicUsize::new(0));
        let factory = {
            let closed = Arc::clone(&closed);
            move || {
                Ok::<_, OpenError>(Counted {
                    closed: Arc::clone(&closed),
                })
            }
        };

        let mut conn = factory.open().unwrap();
        conn.close();
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_struct_factory() {
        let err = FailingFactory.open().err().unwrap();
        assert_eq!(err.message(), "no route to host");
    }
}
