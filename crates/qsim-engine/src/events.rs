//! # qsim-engine::events
//!
//! Defines the `Event` enum and the `Queued` wrapper used by the scheduler's
//! `BinaryHeap` (spec.md §2, §4.1). Events carry a typed payload per kind
//! rather than the open-struct attribute bag the reference implementation
//! uses for its events — spec.md §9 calls this out explicitly as the one
//! pattern that needs re-architecting for a systems language.
//!
//! Ordering is lexicographic over `(time, kind_priority, insertion_seq)`.
//! This is the opposite tie-break precedence from the teacher's own
//! `Queued::cmp`, which orders by `(time, insert_seq, discriminant)` — here
//! the event kind must dominate the insertion sequence, because spec.md
//! §4.1 requires departures to free servers before routing is considered,
//! renege resolution before repair, and new arrivals/breakdowns last, for
//! any group of events sharing a timestamp.

use crate::prelude::*;
use std::cmp::Ordering;

/// Which customer identity an Arrival event carries.
#[derive(Debug, Clone, Copy)]
pub enum ArrivalSource {
    /// A brand-new customer entering the network from outside.
    External,
    /// A customer routed in from another station, carrying its id forward.
    Routed(CustomerId),
}

/// All events the scheduler can dispatch (spec.md §4.1: six kinds).
#[derive(Debug, Clone, Copy)]
pub enum Event {
    Departure {
        node: StationId,
        server: ServerId,
        customer_id: CustomerId,
    },
    Routing {
        node: StationId,
        customer_id: CustomerId,
    },
    Renege {
        node: StationId,
        customer_id: CustomerId,
    },
    Repair {
        node: StationId,
        server: ServerId,
    },
    Arrival {
        node: StationId,
        source: ArrivalSource,
    },
    Breakdown {
        node: StationId,
        server: ServerId,
    },
}

impl Event {
    /// The integer 0..5 tie-break priority from spec.md §4.1, in dispatch
    /// order: departure, routing, renege, repair, arrival, breakdown.
    pub fn kind_priority(&self) -> u8 {
        match self {
            Event::Departure { .. } => 0,
            Event::Routing { .. } => 1,
            Event::Renege { .. } => 2,
            Event::Repair { .. } => 3,
            Event::Arrival { .. } => 4,
            Event::Breakdown { .. } => 5,
        }
    }
}

/// An `Event` together with its scheduling key, stored in the scheduler's
/// `BinaryHeap`.
#[derive(Debug, Clone, Copy)]
pub struct Queued<T> {
    pub id: EventId,
    pub time: SimTime,
    pub kind_priority: u8,
    /// Monotonic secondary key breaking ties within identical
    /// `(time, kind_priority)`, per spec.md §5's "insertion order via a
    /// secondary sequence key".
    pub insertion_seq: u64,
    pub payload: T,
}

impl<T> Queued<T> {
    pub fn new(id: EventId, time: SimTime, kind_priority: u8, insertion_seq: u64, payload: T) -> Self {
        Self {
            id,
            time,
            kind_priority,
            insertion_seq,
            payload,
        }
    }
}

impl<T> PartialEq for Queued<T> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
            && self.kind_priority == other.kind_priority
            && self.insertion_seq == other.insertion_seq
    }
}

impl<T> Eq for Queued<T> {}

impl<T> PartialOrd for Queued<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Queued<T> {
    /// `BinaryHeap` is a max-heap; every field comparison is reversed so
    /// the heap behaves as the min-priority queue spec.md §2 requires.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.kind_priority.cmp(&self.kind_priority))
            .then_with(|| other.insertion_seq.cmp(&self.insertion_seq))
    }
}
