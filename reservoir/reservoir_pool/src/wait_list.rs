//! FIFO queue of threads blocked in `acquire`.
//!
//! Every waiter takes a ticket and parks on its own condition variable.
//! Only the waiter at the front of the queue may take an idle connection,
//! so a release wakes exactly that one thread and later arrivals cannot
//! overtake it.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Condvar;

/// A waiter's place in line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

struct Waiter {
    ticket: Ticket,
    signal: Arc<Condvar>,
}

/// Must only be touched while holding the pool's state mutex; the
/// condition variables handed out are waited on with that same mutex.
#[derive(Default)]
pub(crate) struct WaitList {
    waiters: VecDeque<Waiter>,
    next_ticket: u64,
}

impl WaitList {
    /// Join the back of the queue.
    pub(crate) fn enqueue(&mut self) -> (Ticket, Arc<Condvar>) {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);

        let signal = Arc::new(Condvar::new());
        self.waiters.push_back(Waiter {
            ticket,
            signal: Arc::clone(&signal),
        });

        (ticket, signal)
    }

    pub(crate) fn is_front(&self, ticket: Ticket) -> bool {
        self.waiters
            .front()
            .map_or(false, |waiter| waiter.ticket == ticket)
    }

    /// Leave the queue. Returns `true` if the ticket was at the front.
    pub(crate) fn remove(&mut self, ticket: Ticket) -> bool {
        match self.waiters.iter().position(|waiter| waiter.ticket == ticket) {
            Some(index) => {
                self.waiters.remove(index);
                index == 0
            }
            None => false,
        }
    }

    /// Wake the waiter at the front, if any. Returns whether one was woken.
    pub(crate) fn wake_front(&self) -> bool {
        match self.waiters.front() {
            Some(waiter) => {
                waiter.signal.notify_one();
                true
            }
            None => false,
        }
    }

    /// Wake every waiter; used when the pool closes.
    pub(crate) fn wake_all(&self) {
        for waiter in &self.waiters {
            waiter.signal.notify_one();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut list = WaitList::default();
        let (first, _) = list.enqueue();
        let (second, _) = list.enqueue();

        assert!(list.is_front(first));
        assert!(!list.is_front(second));

        assert!(list.remove(first));
        assert!(list.is_front(second));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_from_middle() {
        let mut list = WaitList::default();
        let (first, _) = list.enqueue();
        let (second, _) = list.enqueue();
        let (third, _) = list.enqueue();

        assert!(!list.remove(second));
        assert!(list.is_front(first));

        list.remove(first);
        assert!(list.is_front(third));
    }

    #[test]
    fn test_remove_unknown_ticket() {
        let mut list = WaitList::default();
        let (ticket, _) = list.enqueue();
        list.remove(ticket);

        assert!(!list.remove(ticket));
        assert!(list.is_empty());
    }

    #[test]
    fn test_wake_front_on_empty_list() {
        let list = WaitList::default();
        assert!(!list.wake_front());
    }
}
