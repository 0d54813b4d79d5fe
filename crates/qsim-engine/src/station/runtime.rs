//! # qsim-engine::station::runtime
//!
//! Contains the `Station` struct and its core operations (spec.md §4.2):
//! `enqueue`, `pop_next_customer`, `find_idle_server`, `queue_length`,
//! `update_integrals`, and `reset_at_warmup`.

use crate::prelude::*;
use indexmap::IndexMap;
use qsim_types::config::Dist;
use std::collections::{BTreeMap, VecDeque};

/// Leaks a call-site label once, at construction time. The set of labels a
/// `Station` ever creates is bounded by its own field count and server
/// count, fixed for the lifetime of the replication.
fn leak_site(label: &str) -> &'static str {
    Box::leak(label.to_string().into_boxed_str())
}

/// The operational state of a single server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Busy,
    Down,
}

/// A single server within a station (spec.md §3).
#[derive(Debug, Clone)]
pub struct Server {
    pub state: ServerState,
    /// Set iff `state == Busy` (invariant 1, spec.md §3).
    pub customer_id: Option<CustomerId>,
    pub busy_area: f64,
    pub down_area: f64,
}

impl Server {
    fn new() -> Self {
        Self {
            state: ServerState::Idle,
            customer_id: None,
            busy_area: 0.0,
            down_area: 0.0,
        }
    }
}

/// A station: a named queueing node with a fixed server pool, priority-class
/// queues, and the configuration governing arrivals, service, patience,
/// breakdown, and repair at that node.
pub struct Station {
    pub name: String,
    pub servers: Vec<Server>,
    /// Priority class -> FIFO queue of waiting customer ids. Keyed by a
    /// `BTreeMap` so `pop_next_customer` can scan from the lowest class
    /// number (highest priority) without sorting on every call.
    pub queues: BTreeMap<i64, VecDeque<CustomerId>>,
    /// The declared priority classes in the order spec.md §6 gives them;
    /// `priority_classes[0]` is the node's top (highest-priority) class,
    /// used when creating or rehoming a customer at this station.
    pub priority_classes: Vec<i64>,

    pub arrival_dist: Option<Dist>,
    pub service_dist: Dist,
    pub patience_dist: Option<Dist>,
    pub breakdown_dist: Option<Dist>,
    pub repair_dist: Option<Dist>,
    /// Destination station id -> routing probability, in declaration order
    /// (spec.md §4.3 Routing walks this in iteration order, not sorted).
    pub routing: IndexMap<StationId, f64>,

    /// Random-source call-site labels, one per sampling site this station
    /// owns, computed once at construction rather than per draw — the
    /// teacher's `EngineCtx::rng_u64` leaks a fresh label on every call,
    /// which is fine for its occasional per-message RNG use but would leak
    /// unboundedly here given how often a busy station samples.
    pub arrival_site: Option<&'static str>,
    pub service_site: &'static str,
    pub patience_site: Option<&'static str>,
    pub breakdown_sites: Vec<&'static str>,
    pub repair_sites: Vec<&'static str>,
    pub routing_site: Option<&'static str>,

    last_update: SimTime,
    pub warmup_done: bool,
    pub queue_area: f64,

    pub total_completions: u64,
    pub post_warmup_completions: u64,
    pub post_warmup_reneges: u64,
    pub post_warmup_waits: Vec<f64>,
    pub post_warmup_sojourns: Vec<f64>,
}

impl Station {
    pub fn new(
        name: String,
        num_servers: usize,
        priority_classes: Vec<i64>,
        arrival_dist: Option<Dist>,
        service_dist: Dist,
        patience_dist: Option<Dist>,
        breakdown_dist: Option<Dist>,
        repair_dist: Option<Dist>,
        routing: IndexMap<StationId, f64>,
    ) -> Self {
        let queues = priority_classes.iter().map(|&p| (p, VecDeque::new())).collect();
        let arrival_site = arrival_dist
            .is_some()
            .then(|| leak_site(&format!("arrival.node[{name}]")));
        let service_site = leak_site(&format!("service.node[{name}]"));
        let patience_site = patience_dist
            .is_some()
            .then(|| leak_site(&format!("patience.node[{name}]")));
        let breakdown_sites = if breakdown_dist.is_some() {
            (0..num_servers)
                .map(|i| leak_site(&format!("breakdown.node[{name}].server[{i}]")))
                .collect()
        } else {
            Vec::new()
        };
        let repair_sites = if repair_dist.is_some() {
            (0..num_servers)
                .map(|i| leak_site(&format!("repair.node[{name}].server[{i}]")))
                .collect()
        } else {
            Vec::new()
        };
        let routing_site = (!routing.is_empty()).then(|| leak_site(&format!("routing.node[{name}]")));

        Self {
            name,
            servers: (0..num_servers).map(|_| Server::new()).collect(),
            queues,
            priority_classes,
            arrival_dist,
            service_dist,
            patience_dist,
            breakdown_dist,
            repair_dist,
            routing,
            arrival_site,
            service_site,
            patience_site,
            breakdown_sites,
            repair_sites,
            routing_site,
            last_update: SIM_EPOCH,
            warmup_done: false,
            queue_area: 0.0,
            total_completions: 0,
            post_warmup_completions: 0,
            post_warmup_reneges: 0,
            post_warmup_waits: Vec::new(),
            post_warmup_sojourns: Vec::new(),
        }
    }

    /// Appends `customer_id` to the queue of its priority class. The class
    /// is always one this station declared — customers only ever carry a
    /// priority assigned from this station's own `priority_classes` — so a
    /// missing class reflects an internal invariant violation, not a
    /// reachable runtime condition.
    pub fn enqueue(&mut self, customer_id: CustomerId, priority: i64) {
        self.queues
            .get_mut(&priority)
            .unwrap_or_else(|| panic!("station '{}' has no priority class {}", self.name, priority))
            .push_back(customer_id);
    }

    /// Scans priority classes from lowest class number upward and returns
    /// the head of the first non-empty queue.
    pub fn pop_next_customer(&mut self) -> Option<CustomerId> {
        for class in &self.priority_classes {
            if let Some(q) = self.queues.get_mut(class) {
                if let Some(id) = q.pop_front() {
                    return Some(id);
                }
            }
        }
        None
    }

    /// Removes `customer_id` from whichever priority-class queue it's
    /// waiting in. Used by the Renege handler (spec.md §4.3, §9: linear
    /// search is acceptable since reneges are rare relative to arrivals).
    pub fn remove_from_queue(&mut self, customer_id: CustomerId) -> bool {
        for q in self.queues.values_mut() {
            if let Some(pos) = q.iter().position(|&id| id == customer_id) {
                q.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn find_idle_server(&self) -> Option<ServerId> {
        self.servers.iter().position(|s| s.state == ServerState::Idle)
    }

    pub fn queue_length(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Closes the open time interval since the previous call, accumulating
    /// queue-area and each server's busy/down area. A no-op on the area
    /// totals before the station's warm-up-done flag is set, though
    /// `last_update` still advances so the interval starting at warm-up is
    /// exact (spec.md §4.2).
    pub fn update_integrals(&mut self, now: SimTime) {
        let dt = now - self.last_update;
        if self.warmup_done && dt > 0.0 {
            self.queue_area += self.queue_length() as f64 * dt;
            for server in &mut self.servers {
                match server.state {
                    ServerState::Busy => server.busy_area += dt,
                    ServerState::Down => server.down_area += dt,
                    ServerState::Idle => {}
                }
            }
        }
        self.last_update = now;
    }

    /// Zeros all area counters, re-anchors the last-update timestamp to
    /// `now`, and marks this station as past warm-up.
    pub fn reset_at_warmup(&mut self, now: SimTime) {
        self.queue_area = 0.0;
        for server in &mut self.servers {
            server.busy_area = 0.0;
            server.down_area = 0.0;
        }
        self.last_update = now;
        self.warmup_done = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        Station::new(
            "A".into(),
            2,
            vec![0, 1],
            None,
            Dist::constant(1.0),
            None,
            None,
            None,
            IndexMap::new(),
        )
    }

    #[test]
    fn pop_next_customer_prefers_lower_priority_number() {
        let mut s = station();
        s.enqueue(10, 1);
        s.enqueue(20, 0);
        assert_eq!(s.pop_next_customer(), Some(20));
        assert_eq!(s.pop_next_customer(), Some(10));
        assert_eq!(s.pop_next_customer(), None);
    }

    #[test]
    fn find_idle_server_returns_lowest_index() {
        let mut s = station();
        s.servers[0].state = ServerState::Busy;
        assert_eq!(s.find_idle_server(), Some(1));
    }

    #[test]
    fn integrals_are_not_accumulated_before_warmup_done() {
        let mut s = station();
        s.enqueue(1, 0);
        s.update_integrals(5.0);
        assert_eq!(s.queue_area, 0.0);
    }

    #[test]
    fn integrals_accumulate_after_reset_at_warmup() {
        let mut s = station();
        s.reset_at_warmup(0.0);
        s.enqueue(1, 0);
        s.update_integrals(2.0);
        assert_eq!(s.queue_area, 2.0);
    }

    #[test]
    fn remove_from_queue_finds_customer_in_any_class() {
        let mut s = station();
        s.enqueue(7, 1);
        assert!(s.remove_from_queue(7));
        assert_eq!(s.queue_length(), 0);
        assert!(!s.remove_from_queue(7));
    }
}
