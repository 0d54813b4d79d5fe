//! # qsim-engine::customer
//!
//! Defines the `Customer` entity (spec.md §3). A customer's identity
//! persists across stations — routing carries the same id forward — but its
//! per-node timing fields are overwritten on every arrival, since waits and
//! sojourns are measured against the customer's time at its *current*
//! station, not against its first entry into the network.

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub priority: i64,
    /// Time the customer entered its current station. Reset on every
    /// arrival, including a routed re-arrival at a different node.
    pub arrival_time: SimTime,
    /// Time service began at the current station. `None` until a server
    /// picks the customer up.
    pub service_start: Option<SimTime>,
}

impl Customer {
    pub fn new(id: CustomerId, priority: i64, arrival_time: SimTime) -> Self {
        Self {
            id,
            priority,
            arrival_time,
            service_start: None,
        }
    }

    /// Re-homes this customer at a new station, as the Routing handler does
    /// when it schedules a re-arrival (spec.md §4.3 Routing).
    pub fn rehome(&mut self, priority: i64, arrival_time: SimTime) {
        self.priority = priority;
        self.arrival_time = arrival_time;
        self.service_start = None;
    }
}
