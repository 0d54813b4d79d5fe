//! # qsim-engine::sim
//!
//! Contains the `Scheduler`, the engine's central state machine (spec.md
//! §2, §4.3). It owns the master clock, the event queue, the `World`, the
//! Random Source, the customer table, and the two staleness registries.
//! `step` dispatches exactly one event; `run` drives the dispatch loop to
//! completion. Unlike the teacher's `Simulation`, which reaches for raw
//! pointers to work around borrow conflicts caused by its `dyn Protocol`
//! indirection, this scheduler has no such indirection and is written in
//! fully safe Rust.

use crate::{
    prelude::*,
    rng::{LcgStream, Recorder, RngDiscipline},
    sampling,
};
use fxhash::FxHashMap;
use qsim_types::metrics as met;
use std::collections::BinaryHeap;

/// The final per-replication metrics a single `Scheduler` run produces
/// (spec.md §6 Output, minus the cross-replication throughput CI, which the
/// Replication Driver in `crate::replication` fills in).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Output {
    pub throughput: f64,
    pub throughput_ci: (f64, f64),
    pub mean_queue_length: FxHashMap<String, f64>,
    pub server_utilization: FxHashMap<String, f64>,
    pub service_completions: FxHashMap<String, u64>,
    pub reneging_probability: FxHashMap<String, f64>,
    pub mean_waiting_time: FxHashMap<String, f64>,
    pub mean_system_time: FxHashMap<String, f64>,
}

/// The main simulation controller for a single replication.
pub struct Scheduler {
    clock: SimTime,
    queue: BinaryHeap<Queued<Event>>,
    world: World,
    rng: LcgStream,
    recorder: Recorder,
    id_gen: IdGen,
    customers: FxHashMap<CustomerId, Customer>,
    /// (station, server) -> the `EventId` of the departure currently
    /// expected on that server. Keyed by event id rather than customer id:
    /// a breakdown-interrupted customer can be re-served on the very same
    /// server under a fresh departure event, and the stale-event check must
    /// tell that later departure apart from the one the breakdown
    /// invalidated, even though both carry the same customer id.
    active_departures: FxHashMap<(StationId, ServerId), EventId>,
    /// Customer id -> the `EventId` of its currently armed renege timer.
    /// Keyed by event id rather than bare presence: a customer can be
    /// served, routed, and re-armed with a new renege timer at another
    /// node before its first (now-stale) timer dispatches, and the
    /// stale-event check must not let the old timer validate against the
    /// new one's entry.
    pending_reneges: FxHashMap<CustomerId, EventId>,

    sim_time: SimTime,
    warmup: SimTime,
    warmup_crossed: bool,
    exits_post_warmup: u64,
}

impl Scheduler {
    /// Validates `cfg`, builds the `World`, and schedules the initial event
    /// chains (spec.md §4.3: first external arrival per node, one
    /// breakdown per server).
    pub fn new(cfg: &SimulationConfig, seed: u64) -> Result<Self, EngineError> {
        cfg.validate()?;
        let world = World::from_config(cfg)?;

        let mut scheduler = Self {
            clock: SIM_EPOCH,
            queue: BinaryHeap::new(),
            world,
            rng: LcgStream::new(seed),
            recorder: Recorder::new(seed),
            id_gen: IdGen::new(),
            customers: FxHashMap::default(),
            active_departures: FxHashMap::default(),
            pending_reneges: FxHashMap::default(),
            sim_time: cfg.sim_time,
            warmup: cfg.warmup,
            warmup_crossed: false,
            exits_post_warmup: 0,
        };
        scheduler.init();
        Ok(scheduler)
    }

    fn init(&mut self) {
        let station_count = self.world.stations.len();
        for node in 0..station_count {
            self.maybe_schedule_next_arrival(node);

            let (breakdown_dist, num_servers) = {
                let station = self.world.station(node);
                (station.breakdown_dist, station.servers.len())
            };
            if let Some(dist) = breakdown_dist {
                for server in 0..num_servers {
                    self.schedule_breakdown(node, server, dist, self.clock);
                }
            }
        }
    }

    fn rng_at(&mut self, site: &'static str) -> RngDiscipline<'_> {
        RngDiscipline::new(&mut self.rng, &mut self.recorder, site)
    }

    fn is_post_warmup(&self) -> bool {
        self.clock >= self.warmup
    }

    fn schedule_event(&mut self, time: SimTime, event: Event) -> EventId {
        let id = self.id_gen.next_event_id();
        let seq = self.id_gen.next_insertion_seq();
        let kind_priority = event.kind_priority();
        self.queue.push(Queued::new(id, time, kind_priority, seq, event));
        id
    }

    fn maybe_schedule_next_arrival(&mut self, node: StationId) {
        let (dist, site) = {
            let station = self.world.station(node);
            match (station.arrival_dist, station.arrival_site) {
                (Some(d), Some(s)) => (d, s),
                _ => return,
            }
        };
        let delta = sampling::sample(dist, &mut self.rng_at(site));
        if is_degenerate(delta) {
            return;
        }
        let at = self.clock + delta;
        if at < self.sim_time {
            self.schedule_event(
                at,
                Event::Arrival {
                    node,
                    source: ArrivalSource::External,
                },
            );
        }
    }

    fn schedule_breakdown(&mut self, node: StationId, server: ServerId, dist: Dist, base_time: SimTime) {
        let site = self.world.station(node).breakdown_sites[server];
        let delta = sampling::sample(dist, &mut self.rng_at(site));
        if is_degenerate(delta) {
            return;
        }
        self.schedule_event(base_time + delta, Event::Breakdown { node, server });
    }

    fn schedule_repair(&mut self, node: StationId, server: ServerId, dist: Dist, base_time: SimTime) {
        let site = self.world.station(node).repair_sites[server];
        let delta = sampling::sample(dist, &mut self.rng_at(site));
        if is_degenerate(delta) {
            return;
        }
        self.schedule_event(base_time + delta, Event::Repair { node, server });
    }

    /// Pops the earliest event and dispatches it. Returns `None` once the
    /// queue is exhausted or the earliest remaining event is past
    /// `sim_time` (spec.md §4.3's loop-termination condition).
    pub fn step(&mut self) -> Option<SimTime> {
        let queued = self.queue.peek()?;
        if queued.time > self.sim_time {
            return None;
        }
        let queued = self.queue.pop().expect("peeked event must be poppable");

        assert!(queued.time >= self.clock, "simulation clock moved backward");
        self.clock = queued.time;

        if !self.warmup_crossed && self.clock >= self.warmup {
            for station in &mut self.world.stations {
                station.reset_at_warmup(self.clock);
            }
            self.exits_post_warmup = 0;
            self.warmup_crossed = true;
        }

        tracing::trace!(target: "events", time = self.clock, kind = ?queued.payload, "dispatching event");
        ::metrics::counter!(met::MET_EVENTS_DISPATCHED).increment(1);

        let own_event_id = queued.id;
        match queued.payload {
            Event::Arrival { node, source } => self.handle_arrival(node, source),
            Event::Departure { node, server, customer_id } => {
                self.handle_departure(own_event_id, node, server, customer_id)
            }
            Event::Routing { node, customer_id } => self.handle_routing(node, customer_id),
            Event::Renege { node, customer_id } => {
                self.handle_renege(own_event_id, node, customer_id)
            }
            Event::Breakdown { node, server } => {
                tracing::warn!(target: "events", node, server, "server breakdown");
                self.handle_breakdown(node, server)
            }
            Event::Repair { node, server } => {
                tracing::info!(target: "events", node, server, "server repaired");
                self.handle_repair(node, server)
            }
        }

        Some(self.clock)
    }

    /// Runs the dispatch loop to completion.
    pub fn run(&mut self) {
        tracing::info!(sim_time = self.sim_time, warmup = self.warmup, "simulation started");
        while self.step().is_some() {}
        tracing::info!(clock = self.clock, "simulation finished");
    }

    fn handle_arrival(&mut self, node: StationId, source: ArrivalSource) {
        let top_priority = self.world.station(node).priority_classes[0];

        let customer_id = match source {
            ArrivalSource::External => {
                let id = self.id_gen.next_customer_id();
                self.customers
                    .insert(id, Customer::new(id, top_priority, self.clock));
                let node_label = self.world.station(node).name.clone();
                ::metrics::counter!(met::MET_ARRIVALS, met::LBL_NODE => node_label).increment(1);
                id
            }
            ArrivalSource::Routed(id) => {
                self.customers
                    .get_mut(&id)
                    .expect("routed customer must already exist")
                    .rehome(top_priority, self.clock);
                id
            }
        };

        self.world.station_mut(node).update_integrals(self.clock);

        if let Some(server) = self.world.station(node).find_idle_server() {
            self.start_service(node, server, customer_id);
        } else {
            self.world.station_mut(node).enqueue(customer_id, top_priority);

            let (patience_dist, site) = {
                let station = self.world.station(node);
                match (station.patience_dist, station.patience_site) {
                    (Some(d), Some(s)) => (Some(d), Some(s)),
                    _ => (None, None),
                }
            };
            if let (Some(dist), Some(site)) = (patience_dist, site) {
                let delta = sampling::sample(dist, &mut self.rng_at(site));
                if !is_degenerate(delta) {
                    let renege_id =
                        self.schedule_event(self.clock + delta, Event::Renege { node, customer_id });
                    self.pending_reneges.insert(customer_id, renege_id);
                }
            }
        }

        // Per spec.md §4.3: the next external arrival is (re)scheduled
        // unconditionally, whether this Arrival originated externally or
        // from routing — `maybe_schedule_next_arrival` itself is the guard
        // (a no-op on nodes with no arrival distribution configured).
        self.maybe_schedule_next_arrival(node);
    }

    fn start_service(&mut self, node: StationId, server: ServerId, customer_id: CustomerId) {
        self.world.station_mut(node).update_integrals(self.clock);

        {
            let station = self.world.station_mut(node);
            station.servers[server].state = ServerState::Busy;
            station.servers[server].customer_id = Some(customer_id);
        }
        self.customers
            .get_mut(&customer_id)
            .expect("customer must exist to start service")
            .service_start = Some(self.clock);

        self.pending_reneges.remove(&customer_id);

        let (service_dist, site) = {
            let station = self.world.station(node);
            (station.service_dist, station.service_site)
        };
        let duration = sampling::sample(service_dist, &mut self.rng_at(site));
        if is_degenerate(duration) {
            return;
        }
        let departure_id = self.schedule_event(
            self.clock + duration,
            Event::Departure {
                node,
                server,
                customer_id,
            },
        );
        self.active_departures.insert((node, server), departure_id);
    }

    fn handle_departure(
        &mut self,
        own_event_id: EventId,
        node: StationId,
        server: ServerId,
        customer_id: CustomerId,
    ) {
        if self.active_departures.get(&(node, server)) != Some(&own_event_id) {
            let node_label = self.world.station(node).name.clone();
            ::metrics::counter!(met::MET_STALE_EVENTS, met::LBL_NODE => node_label, met::LBL_KIND => "departure")
                .increment(1);
            return; // stale: a breakdown (or a later re-service) invalidated this departure.
        }

        self.world.station_mut(node).update_integrals(self.clock);

        let post_warmup = self.is_post_warmup();
        {
            let station = self.world.station_mut(node);
            station.total_completions += 1;
        }
        {
            let node_label = self.world.station(node).name.clone();
            ::metrics::counter!(met::MET_COMPLETIONS, met::LBL_NODE => node_label).increment(1);
        }
        if post_warmup {
            let customer = self.customers.get(&customer_id).expect("customer must exist");
            let wait = customer
                .service_start
                .expect("departing customer must have started service")
                - customer.arrival_time;
            let sojourn = self.clock - customer.arrival_time;
            let station = self.world.station_mut(node);
            station.post_warmup_waits.push(wait);
            station.post_warmup_sojourns.push(sojourn);
            station.post_warmup_completions += 1;
        }

        self.active_departures.remove(&(node, server));
        {
            let station = self.world.station_mut(node);
            station.servers[server].state = ServerState::Idle;
            station.servers[server].customer_id = None;
        }
        self.world.station_mut(node).update_integrals(self.clock);

        if let Some(next_customer) = self.world.station_mut(node).pop_next_customer() {
            self.start_service(node, server, next_customer);
        }

        let has_routing = !self.world.station(node).routing.is_empty();
        if has_routing {
            self.schedule_event(self.clock, Event::Routing { node, customer_id });
        } else {
            self.customers.remove(&customer_id);
            let node_label = self.world.station(node).name.clone();
            ::metrics::counter!(met::MET_EXITS, met::LBL_NODE => node_label).increment(1);
            if post_warmup {
                self.exits_post_warmup += 1;
            }
        }
    }

    fn handle_routing(&mut self, node: StationId, customer_id: CustomerId) {
        let site = self
            .world
            .station(node)
            .routing_site
            .expect("routing event dispatched for a node with no routing entries");
        let draw = self.rng_at(site).next_unit();
        {
            let node_label = self.world.station(node).name.clone();
            ::metrics::counter!(met::MET_ROUTINGS, met::LBL_NODE => node_label).increment(1);
        }

        let mut cumulative = 0.0;
        let mut destination = None;
        for (&dest, &prob) in &self.world.station(node).routing {
            cumulative += prob;
            if draw <= cumulative {
                destination = Some(dest);
                break;
            }
        }

        match destination {
            Some(dest) => {
                self.schedule_event(
                    self.clock,
                    Event::Arrival {
                        node: dest,
                        source: ArrivalSource::Routed(customer_id),
                    },
                );
            }
            None => {
                self.customers.remove(&customer_id);
                let node_label = self.world.station(node).name.clone();
                ::metrics::counter!(met::MET_EXITS, met::LBL_NODE => node_label).increment(1);
                if self.is_post_warmup() {
                    self.exits_post_warmup += 1;
                }
            }
        }
    }

    fn handle_renege(&mut self, own_event_id: EventId, node: StationId, customer_id: CustomerId) {
        if self.pending_reneges.get(&customer_id) != Some(&own_event_id) {
            let node_label = self.world.station(node).name.clone();
            ::metrics::counter!(met::MET_STALE_EVENTS, met::LBL_NODE => node_label, met::LBL_KIND => "renege")
                .increment(1);
            // Stale: either the customer already started service, or it has
            // since been re-armed with a newer timer (possibly at another
            // node) whose entry must not be consumed by this older one.
            return;
        }
        self.pending_reneges.remove(&customer_id);
        self.world.station_mut(node).remove_from_queue(customer_id);
        self.world.station_mut(node).update_integrals(self.clock);
        if self.is_post_warmup() {
            self.world.station_mut(node).post_warmup_reneges += 1;
        }
        {
            let node_label = self.world.station(node).name.clone();
            ::metrics::counter!(met::MET_RENEGES, met::LBL_NODE => node_label).increment(1);
        }
        self.customers.remove(&customer_id);
    }

    fn handle_breakdown(&mut self, node: StationId, server: ServerId) {
        self.world.station_mut(node).update_integrals(self.clock);
        {
            let node_label = self.world.station(node).name.clone();
            ::metrics::counter!(met::MET_BREAKDOWNS, met::LBL_NODE => node_label).increment(1);
        }

        let busy_customer = {
            let station = self.world.station(node);
            match station.servers[server].state {
                ServerState::Busy => station.servers[server].customer_id,
                _ => None,
            }
        };

        if let Some(customer_id) = busy_customer {
            let priority = {
                let customer = self
                    .customers
                    .get_mut(&customer_id)
                    .expect("customer served by a breaking-down server must exist");
                customer.service_start = None;
                customer.priority
            };
            self.active_departures.remove(&(node, server));
            self.world.station_mut(node).enqueue(customer_id, priority);
            let station = self.world.station_mut(node);
            station.servers[server].customer_id = None;
        }

        self.world.station_mut(node).servers[server].state = ServerState::Down;
        self.world.station_mut(node).update_integrals(self.clock);

        let repair_dist = self.world.station(node).repair_dist;
        if let Some(dist) = repair_dist {
            self.schedule_repair(node, server, dist, self.clock);
        }
    }

    fn handle_repair(&mut self, node: StationId, server: ServerId) {
        self.world.station_mut(node).update_integrals(self.clock);
        {
            let node_label = self.world.station(node).name.clone();
            ::metrics::counter!(met::MET_REPAIRS, met::LBL_NODE => node_label).increment(1);
        }
        self.world.station_mut(node).servers[server].state = ServerState::Idle;
        self.world.station_mut(node).update_integrals(self.clock);

        if let Some(next_customer) = self.world.station_mut(node).pop_next_customer() {
            self.start_service(node, server, next_customer);
        }

        let breakdown_dist = self.world.station(node).breakdown_dist;
        if let Some(dist) = breakdown_dist {
            self.schedule_breakdown(node, server, dist, self.clock);
        }
    }

    /// Closes out every station's time integrals as of the current clock
    /// and assembles the replication's `Output` (spec.md §6).
    pub fn finish(mut self) -> Output {
        let now = self.clock;
        for station in &mut self.world.stations {
            station.update_integrals(now);
        }

        let effective_time = (self.sim_time - self.warmup).max(0.0);
        let throughput = if effective_time > 0.0 {
            self.exits_post_warmup as f64 / effective_time
        } else {
            0.0
        };

        let mut mean_queue_length = FxHashMap::default();
        let mut server_utilization = FxHashMap::default();
        let mut service_completions = FxHashMap::default();
        let mut reneging_probability = FxHashMap::default();
        let mut mean_waiting_time = FxHashMap::default();
        let mut mean_system_time = FxHashMap::default();

        for station in &self.world.stations {
            let name = station.name.clone();

            mean_queue_length.insert(
                name.clone(),
                if effective_time > 0.0 {
                    station.queue_area / effective_time
                } else {
                    0.0
                },
            );

            let busy_area: f64 = station.servers.iter().map(|s| s.busy_area).sum();
            let down_area: f64 = station.servers.iter().map(|s| s.down_area).sum();
            let denom = station.servers.len() as f64 * effective_time - down_area;
            server_utilization.insert(name.clone(), if denom > 0.0 { busy_area / denom } else { 0.0 });

            service_completions.insert(name.clone(), station.total_completions);

            let renege_denom = station.post_warmup_completions + station.post_warmup_reneges;
            reneging_probability.insert(
                name.clone(),
                if renege_denom > 0 {
                    station.post_warmup_reneges as f64 / renege_denom as f64
                } else {
                    0.0
                },
            );

            mean_waiting_time.insert(
                name.clone(),
                mean(&station.post_warmup_waits),
            );
            mean_system_time.insert(name.clone(), mean(&station.post_warmup_sojourns));
        }

        Output {
            throughput,
            throughput_ci: (throughput, throughput),
            mean_queue_length,
            server_utilization,
            service_completions,
            reneging_probability,
            mean_waiting_time,
            mean_system_time,
        }
    }

    pub fn now(&self) -> SimTime {
        self.clock
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
