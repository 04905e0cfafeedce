//! Ordering and staleness control for chat responses.
//!
//! Every outbound request takes a [`Ticket`]. Completions are released in
//! ticket order even when the network resolves them out of order, and any
//! completion from an earlier generation (before a new chat, a history load,
//! or teardown) is dropped.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub seq: u64,
}

#[derive(Debug)]
pub struct RequestSequencer<T> {
    generation: u64,
    next_seq: u64,
    next_release: u64,
    buffered: BTreeMap<u64, T>,
}

impl<T> RequestSequencer<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            next_seq: 0,
            next_release: 0,
            buffered: BTreeMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn issue(&mut self) -> Ticket {
        let ticket = Ticket {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        ticket
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Number of issued tickets whose completion has not been released.
    pub fn outstanding(&self) -> u64 {
        self.next_seq - self.next_release
    }

    /// Record a completion. Returns the values now releasable, in issue order.
    /// Stale tickets yield nothing.
    pub fn complete(&mut self, ticket: Ticket, value: T) -> Vec<T> {
        if !self.is_current(ticket) {
            log::debug!(
                "dropping stale completion seq={} gen={} (current gen={})",
                ticket.seq,
                ticket.generation,
                self.generation
            );
            return Vec::new();
        }
        self.buffered.insert(ticket.seq, value);

        let mut ready = Vec::new();
        while let Some(value) = self.buffered.remove(&self.next_release) {
            ready.push(value);
            self.next_release += 1;
        }
        ready
    }

    /// Forget everything in flight. Outstanding tickets become stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.next_seq = 0;
        self.next_release = 0;
        self.buffered.clear();
    }
}

impl<T> Default for RequestSequencer<T> {
    fn default() -> Self {
        Self::new()
    }
}
