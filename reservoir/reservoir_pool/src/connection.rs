//! Scoped handle to a connection checked out of a pool.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reservoir_core::{Connection, ConnectionId, PoolId};

use crate::pool::{SharedPool, Slot};

/// A connection on loan from a [`Pool`](crate::Pool).
///
/// Dereferences to the underlying connection. The connection goes back to
/// the pool when this handle is dropped or [released](Self::release), so
/// it cannot be returned twice or used after it has been returned.
pub struct PooledConnection<C: Connection> {
    /// Present until the connection is returned or detached
    slot: Option<Slot<C>>,

    /// The pool this connection came from
    pub(crate) pool: Arc<SharedPool<C>>,

    acquired_at: Instant,
}

impl<C: Connection> PooledConnection<C> {
    pub(crate) fn new(slot: Slot<C>, pool: Arc<SharedPool<C>>) -> Self {
        Self {
            slot: Some(slot),
            pool,
            acquired_at: Instant::now(),
        }
    }

    fn slot(&self) -> &Slot<C> {
        self.slot.as_ref().expect("connection already returned")
    }

    /// Identifier of the connection within its pool
    pub fn id(&self) -> ConnectionId {
        self.slot().id
    }

    /// Identifier of the pool that owns this connection
    pub fn pool_id(&self) -> PoolId {
        self.pool.id()
    }

    /// How long this handle has been held
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }

    /// Return the connection to its pool now.
    pub fn release(self) {
        drop(self);
    }

    /// Take the connection out of the pool for good.
    ///
    /// The pool stops tracking the connection: its capacity shrinks by one
    /// for the rest of its life and it will not close this connection on
    /// shutdown. Closing it becomes the caller's job.
    pub fn detach(mut self) -> C {
        let slot = self.slot.take().expect("connection already returned");
        self.pool.detach_slot(slot.id);
        slot.conn
    }
}

impl<C: Connection> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.slot().conn
    }
}

impl<C: Connection> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.slot.as_mut().expect("connection already returned").conn
    }
}

impl<C: Connection> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.pool.release_slot(slot);
        }
    }
}

impl<C: Connection + fmt::Debug> fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => f
                .debug_struct("PooledConnection")
                .field("id", &slot.id)
                .field("conn", &slot.conn)
                .finish(),
            None => write!(f, "PooledConnection(returned)"),
        }
    }
}
