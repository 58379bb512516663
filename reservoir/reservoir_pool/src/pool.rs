//! The fixed-capacity connection pool.
//!
//! All connections are opened when the pool is built and live until the
//! pool shuts down. Idle connections sit in a FIFO queue guarded by a single
//! mutex; an idle connection doubles as the permit to take it, so there is
//! no separate counter to keep in step with the queue. Callers that find
//! the queue empty line up in a wait list and are served in arrival order.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use parking_lot::Mutex;
use serde::Serialize;

use reservoir_core::{
    Connection, ConnectionFactory, ConnectionId, PoolConfig, PoolError, PoolId,
};

use crate::connection::PooledConnection;
use crate::stats::{PoolCounters, PoolStats};
use crate::wait_list::WaitList;

/// Lifecycle of a pool. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PoolState {
    /// Accepting acquisitions
    Operating,

    /// Shut down, but connections held by callers have not all come back
    ShuttingDown,

    /// Shut down and every connection the pool still tracks is closed
    Closed,
}

/// A connection together with its pool-assigned identity.
pub(crate) struct Slot<C> {
    pub(crate) id: ConnectionId,
    pub(crate) conn: C,
}

struct PoolInner<C> {
    /// Connections free for use, oldest release first
    idle: VecDeque<Slot<C>>,

    /// Callers blocked in acquire
    waiters: WaitList,

    /// Set once by shutdown, never cleared
    closed: bool,

    /// Connections that are neither closed nor detached (idle + held)
    live: usize,
}

impl<C> PoolInner<C> {
    fn held(&self) -> usize {
        self.live - self.idle.len()
    }
}

/// State shared between a [`Pool`], its clones and every outstanding
/// [`PooledConnection`].
pub(crate) struct SharedPool<C: Connection> {
    id: PoolId,
    config: PoolConfig,
    inner: Mutex<PoolInner<C>>,
    counters: PoolCounters,
}

impl<C: Connection> SharedPool<C> {
    pub(crate) fn id(&self) -> PoolId {
        self.id
    }

    fn acquire_slot(&self, timeout: Option<Duration>) -> Result<Slot<C>, PoolError> {
        let mut inner = self.inner.lock();

        if inner.closed {
            return Err(PoolError::Closed);
        }

        // Nobody is queued, so an idle connection can be taken directly.
        if inner.waiters.is_empty() {
            if let Some(slot) = inner.idle.pop_front() {
                self.counters.record_acquire(inner.held());
                trace!("Acquired {} from pool {}", slot.id, self.id);
                return Ok(slot);
            }
        }

        // A deadline past the end of the clock is the same as no deadline.
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        let (ticket, signal) = inner.waiters.enqueue();
        trace!(
            "Waiting for a connection from pool {} ({} waiting)",
            self.id,
            inner.waiters.len()
        );

        loop {
            if inner.closed {
                inner.waiters.remove(ticket);
                return Err(PoolError::Closed);
            }

            if inner.waiters.is_front(ticket) {
                if let Some(slot) = inner.idle.pop_front() {
                    inner.waiters.remove(ticket);
                    // More than one release may have landed while we slept.
                    if !inner.idle.is_empty() {
                        inner.waiters.wake_front();
                    }
                    self.counters.record_acquire(inner.held());
                    trace!("Acquired {} from pool {} after waiting", slot.id, self.id);
                    return Ok(slot);
                }
            }

            match (deadline, timeout) {
                (Some(deadline), Some(timeout)) => {
                    if Instant::now() >= deadline {
                        let was_front = inner.waiters.remove(ticket);
                        if was_front && !inner.idle.is_empty() {
                            inner.waiters.wake_front();
                        }
                        self.counters.record_timeout();
                        debug!(
                            "Timed out after {:?} waiting on pool {}",
                            timeout, self.id
                        );
                        return Err(PoolError::Timeout(timeout));
                    }
                    signal.wait_until(&mut inner, deadline);
                }
                _ => signal.wait(&mut inner),
            }
        }
    }

    fn try_acquire_slot(&self) -> Result<Slot<C>, PoolError> {
        let mut inner = self.inner.lock();

        if inner.closed {
            return Err(PoolError::Closed);
        }
        if !inner.waiters.is_empty() {
            return Err(PoolError::Exhausted);
        }

        let slot = inner.idle.pop_front().ok_or(PoolError::Exhausted)?;
        self.counters.record_acquire(inner.held());
        trace!("Acquired {} from pool {} without waiting", slot.id, self.id);
        Ok(slot)
    }

    /// Put a connection back, or close it if the pool has shut down.
    pub(crate) fn release_slot(&self, slot: Slot<C>) {
        self.counters.record_release();

        let mut inner = self.inner.lock();
        if !inner.closed {
            trace!("Released {} to pool {}", slot.id, self.id);
            inner.idle.push_back(slot);
            inner.waiters.wake_front();
            return;
        }
        drop(inner);

        let Slot { id, mut conn } = slot;
        conn.close();
        self.counters.record_closed(1);
        debug!("Closed {} returned after shutdown of pool {}", id, self.id);

        let mut inner = self.inner.lock();
        inner.live -= 1;
        if inner.live == 0 {
            info!("Pool {} closed; all connections released", self.id);
        }
    }

    /// Stop tracking a connection that the caller has taken ownership of.
    pub(crate) fn detach_slot(&self, id: ConnectionId) {
        let mut inner = self.inner.lock();
        inner.live -= 1;
        self.counters.record_detach();
        warn!(
            "{} detached from pool {}; capacity reduced to {}",
            id, self.id, inner.live
        );
    }

    fn shutdown(&self) {
        let (idle, held) = {
            let mut inner = self.inner.lock();
            if inner.closed {
                trace!("Pool {} already shut down", self.id);
                return;
            }
            inner.closed = true;
            inner.waiters.wake_all();
            let held = inner.held();
            (std::mem::take(&mut inner.idle), held)
        };

        info!(
            "Shutting down pool {} ({} idle, {} held)",
            self.id,
            idle.len(),
            held
        );

        let count = idle.len();
        for Slot { id, mut conn } in idle {
            trace!("Closing {}", id);
            conn.close();
        }
        self.counters.record_closed(count);

        let mut inner = self.inner.lock();
        inner.live -= count;
        if inner.live == 0 {
            info!("Pool {} closed", self.id);
        } else {
            info!(
                "Pool {} shut down; {} connection(s) will close on release",
                self.id, inner.live
            );
        }
    }

    fn state(&self) -> PoolState {
        let inner = self.inner.lock();
        match (inner.closed, inner.live) {
            (false, _) => PoolState::Operating,
            (true, 0) => PoolState::Closed,
            (true, _) => PoolState::ShuttingDown,
        }
    }
}

impl<C: Connection> Drop for SharedPool<C> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if inner.idle.is_empty() {
            return;
        }

        debug!(
            "Pool {} dropped without shutdown; closing {} idle connection(s)",
            self.id,
            inner.idle.len()
        );
        for mut slot in inner.idle.drain(..) {
            slot.conn.close();
        }
    }
}

/// A fixed-size pool of connections.
///
/// `Pool` is a cheap handle around shared state; clone it to share the pool
/// between threads.
///
/// # Caller obligations
///
/// Every connection taken out of the pool must come back. This happens
/// automatically when the [`PooledConnection`] is dropped. A connection that
/// is [detached](PooledConnection::detach) or leaked with `mem::forget`
/// permanently reduces the pool's effective capacity by one; the pool cannot
/// detect or recover from this.
///
/// # Examples
///
/// ```
/// use reservoir_core::{Connection, OpenError};
/// use reservoir_pool::Pool;
///
/// struct Session;
///
/// impl Connection for Session {
///     fn close(&mut self) {}
/// }
///
/// let pool = Pool::new(2, || Ok::<_, OpenError>(Session)).unwrap();
///
/// let conn = pool.acquire().unwrap();
/// assert_eq!(pool.num_idle(), 1);
/// drop(conn);
/// assert_eq!(pool.num_idle(), 2);
///
/// pool.shutdown();
/// assert!(pool.acquire().is_err());
/// ```
pub struct Pool<C: Connection> {
    shared: Arc<SharedPool<C>>,
}

impl<C: Connection> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Connection> Pool<C> {
    /// Open `max_connections` connections and build a pool around them.
    ///
    /// Acquisition through [`acquire`](Self::acquire) waits indefinitely.
    pub fn new<F>(max_connections: usize, factory: F) -> Result<Self, PoolError>
    where
        F: ConnectionFactory<Connection = C>,
    {
        Self::connect(PoolConfig::new(max_connections), factory)
    }

    /// Open every connection described by `config` and build a pool.
    ///
    /// If the factory fails, the connections opened so far are closed before
    /// the error is returned.
    pub fn connect<F>(config: PoolConfig, factory: F) -> Result<Self, PoolError>
    where
        F: ConnectionFactory<Connection = C>,
    {
        config.validate()?;

        let id = PoolId::new();
        info!(
            "Initializing pool {} with {} connections",
            id, config.max_connections
        );

        let mut idle = VecDeque::with_capacity(config.max_connections);
        for index in 0..config.max_connections {
            match factory.open() {
                Ok(conn) => idle.push_back(Slot {
                    id: ConnectionId::new(index as u64),
                    conn,
                }),
                Err(err) => {
                    warn!(
                        "Failed to open connection {} of {} for pool {}: {}",
                        index + 1,
                        config.max_connections,
                        id,
                        err
                    );
                    for mut slot in idle.drain(..) {
                        slot.conn.close();
                    }
                    return Err(PoolError::Construction(err));
                }
            }
        }

        debug!("Pool {} initialized with {} connections", id, idle.len());

        let live = idle.len();
        Ok(Self {
            shared: Arc::new(SharedPool {
                id,
                config,
                inner: Mutex::new(PoolInner {
                    idle,
                    waiters: WaitList::default(),
                    closed: false,
                    live,
                }),
                counters: PoolCounters::default(),
            }),
        })
    }

    /// Take a connection, waiting until one is free.
    ///
    /// Uses the configured `acquire_timeout` if there is one; otherwise
    /// this is [`acquire_unbounded`](Self::acquire_unbounded).
    ///
    /// Fails with [`PoolError::Closed`] if the pool is or becomes shut down.
    pub fn acquire(&self) -> Result<PooledConnection<C>, PoolError> {
        match self.shared.config.acquire_timeout {
            Some(timeout) => self.acquire_timeout(timeout),
            None => self.acquire_unbounded(),
        }
    }

    /// Take a connection, waiting as long as it takes.
    pub fn acquire_unbounded(&self) -> Result<PooledConnection<C>, PoolError> {
        let slot = self.shared.acquire_slot(None)?;
        Ok(PooledConnection::new(slot, Arc::clone(&self.shared)))
    }

    /// Take a connection, giving up with [`PoolError::Timeout`] after `timeout`.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<PooledConnection<C>, PoolError> {
        let slot = self.shared.acquire_slot(Some(timeout))?;
        Ok(PooledConnection::new(slot, Arc::clone(&self.shared)))
    }

    /// Take a connection only if one is free right now and nobody is queued.
    pub fn try_acquire(&self) -> Result<PooledConnection<C>, PoolError> {
        let slot = self.shared.try_acquire_slot()?;
        Ok(PooledConnection::new(slot, Arc::clone(&self.shared)))
    }

    /// Hand a connection back.
    ///
    /// Equivalent to dropping it, except that a connection belonging to a
    /// different pool is reported as [`PoolError::ProtocolViolation`]. The
    /// connection still goes back to the pool it came from.
    pub fn release(&self, conn: PooledConnection<C>) -> Result<(), PoolError> {
        if !Arc::ptr_eq(&self.shared, &conn.pool) {
            let message = format!(
                "{} belongs to pool {}, not pool {}",
                conn.id(),
                conn.pool.id,
                self.shared.id
            );
            warn!("Rejected release: {}", message);
            return Err(PoolError::ProtocolViolation(message));
        }

        conn.release();
        Ok(())
    }

    /// Close the pool.
    ///
    /// Idle connections are closed before this returns and every blocked
    /// acquire fails with [`PoolError::Closed`]. Connections held by callers
    /// are closed as they are released. Calling this again has no effect.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.inner.lock().closed
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        self.shared.state()
    }

    /// Identifier of this pool
    pub fn id(&self) -> PoolId {
        self.shared.id
    }

    /// The configuration the pool was built with
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Number of connections the pool was built with
    ///
    /// This does not change when connections are detached; see
    /// [`capacity`](Self::capacity) for the number still tracked.
    pub fn size(&self) -> usize {
        self.shared.config.max_connections
    }

    /// Number of connections the pool still tracks, idle or held.
    ///
    /// Starts at [`size`](Self::size), drops by one for every detached
    /// connection and reaches zero once the pool is closed.
    pub fn capacity(&self) -> usize {
        self.shared.inner.lock().live
    }

    /// Number of connections free for use
    pub fn num_idle(&self) -> usize {
        self.shared.inner.lock().idle.len()
    }

    /// Number of connections currently held by callers
    pub fn num_held(&self) -> usize {
        self.shared.inner.lock().held()
    }

    /// Number of callers blocked in acquire
    pub fn num_waiting(&self) -> usize {
        self.shared.inner.lock().waiters.len()
    }

    /// Snapshot of the pool's usage counters
    pub fn stats(&self) -> PoolStats {
        self.shared.counters.snapshot()
    }
}

impl<C: Connection> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("Pool")
            .field("id", &self.shared.id)
            .field("size", &self.shared.config.max_connections)
            .field("capacity", &inner.live)
            .field("idle", &inner.idle.len())
            .field("held", &inner.held())
            .field("waiting", &inner.waiters.len())
            .field("closed", &inner.closed)
            .finish()
    }
}
