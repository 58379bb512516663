//! Simulated backing connections for benchmarking.
//!
//! Opening a simulated connection costs `connect_delay` and executing a
//! statement costs `query_delay`; nothing goes over the network. A shared
//! [`Ledger`] records how many connections were opened and closed and how
//! many were open at the same time.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reservoir_core::{Connection, ConnectionFactory, OpenError};
use tracing::trace;

/// Connection accounting shared by a factory and everything it opened
#[derive(Debug, Default)]
pub struct Ledger {
    opened: AtomicUsize,
    closed: AtomicUsize,
    open_now: AtomicUsize,
    peak_open: AtomicUsize,
    statements: AtomicU64,
}

impl Ledger {
    fn record_open(&self) -> usize {
        let id = self.opened.fetch_add(1, Ordering::SeqCst);
        let open = self.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_open.fetch_max(open, Ordering::SeqCst);
        id
    }

    fn record_close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.open_now.fetch_sub(1, Ordering::SeqCst);
    }

    /// Connections opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Connections closed so far
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Most connections open at once
    pub fn peak_open(&self) -> usize {
        self.peak_open.load(Ordering::SeqCst)
    }

    /// Statements executed across all connections
    pub fn statements(&self) -> u64 {
        self.statements.load(Ordering::SeqCst)
    }
}

/// A connection whose only behaviour is to take time.
#[derive(Debug)]
pub struct SimulatedConnection {
    id: usize,
    query_delay: Duration,
    ledger: Arc<Ledger>,
    open: bool,
}

impl SimulatedConnection {
    /// Run a statement, blocking for the configured query delay.
    pub fn execute(&mut self, statement: &str) {
        debug_assert!(self.open, "statement on closed connection");
        trace!(connection = self.id, statement, "executing");
        thread::sleep(self.query_delay);
        self.ledger.statements.fetch_add(1, Ordering::SeqCst);
    }
}

impl Connection for SimulatedConnection {
    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.ledger.record_close();
        }
    }
}

/// Opens [`SimulatedConnection`]s.
#[derive(Debug, Clone)]
pub struct SimulatedFactory {
    connect_delay: Duration,
    query_delay: Duration,
    ledger: Arc<Ledger>,
}

impl SimulatedFactory {
    /// Factory whose connections take `connect_delay` to open and
    /// `query_delay` per statement.
    pub fn new(connect_delay: Duration, query_delay: Duration) -> Self {
        Self {
            connect_delay,
            query_delay,
            ledger: Arc::new(Ledger::default()),
        }
    }

    /// Accounting for every connection this factory has opened
    pub fn ledger(&self) -> Arc<Ledger> {
        Arc::clone(&self.ledger)
    }
}

impl ConnectionFactory for SimulatedFactory {
    type Connection = SimulatedConnection;

    fn open(&self) -> Result<SimulatedConnection, OpenError> {
        thread::sleep(self.connect_delay);
        let id = self.ledger.record_open();
        trace!(connection = id, "opened");
        Ok(SimulatedConnection {
            id,
            query_delay: self.query_delay,
            ledger: Arc::clone(&self.ledger),
            open: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_tracks_peak() {
        let factory = SimulatedFactory::new(Duration::ZERO, Duration::ZERO);
        let ledger = factory.ledger();

        let mut a = factory.open().unwrap();
        let mut b = factory.open().unwrap();
        a.execute("SELECT 1");
        a.close();
        b.close();
        b.close();

        assert_eq!(ledger.opened(), 2);
        assert_eq!(ledger.closed(), 2);
        assert_eq!(ledger.peak_open(), 2);
        assert_eq!(ledger.statements(), 1);
    }
}
