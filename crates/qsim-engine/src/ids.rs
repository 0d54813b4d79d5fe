//! # qsim-engine::ids
//!
//! Provides a generator for unique, monotonic IDs for events and customers.

use crate::prelude::*;

/// A generator for the simulation's monotonic ID counters.
pub struct IdGen {
    event_id: EventId,
    customer_id: CustomerId,
    /// Used for deterministic tie-breaking in the event queue when two
    /// events share the same (time, kind-priority) key.
    insertion_seq: u64,
}

impl IdGen {
    pub fn new() -> Self {
        Self {
            event_id: 0,
            customer_id: 0,
            insertion_seq: 0,
        }
    }

    pub fn next_event_id(&mut self) -> EventId {
        let id = self.event_id;
        self.event_id = self.event_id.checked_add(1).expect("EventId overflow");
        id
    }

    pub fn next_customer_id(&mut self) -> CustomerId {
        let id = self.customer_id;
        self.customer_id = self.customer_id.checked_add(1).expect("CustomerId overflow");
        id
    }

    pub fn next_insertion_seq(&mut self) -> u64 {
        let id = self.insertion_seq;
        self.insertion_seq = self
            .insertion_seq
            .checked_add(1)
            .expect("InsertionSeq overflow");
        id
    }
}

impl Default for IdGen {
    fn default() -> Self {
        Self::new()
    }
}
