//! # qsim-types::metrics
//!
//! Defines constants for ambient instrumentation metric names and labels.
//! Centralizing these constants prevents typos and ensures consistency
//! between the engine (where metrics are emitted) and any external consumer
//! (e.g. a `metrics` exporter wired up by the embedding application). These
//! are purely observational — the actual statistical Output record (spec.md
//! §6) is computed from each Station's own counters, not from these.

// --- Metric Names ---
pub const MET_ARRIVALS: &str = "qsim_arrivals_total";
pub const MET_COMPLETIONS: &str = "qsim_completions_total";
pub const MET_RENEGES: &str = "qsim_reneges_total";
pub const MET_BREAKDOWNS: &str = "qsim_breakdowns_total";
pub const MET_REPAIRS: &str = "qsim_repairs_total";
pub const MET_ROUTINGS: &str = "qsim_routings_total";
pub const MET_EXITS: &str = "qsim_exits_total";
pub const MET_STALE_EVENTS: &str = "qsim_stale_events_total";
pub const MET_EVENTS_DISPATCHED: &str = "qsim_events_dispatched_total";

// --- Label Keys ---
pub const LBL_NODE: &str = "node";
pub const LBL_KIND: &str = "kind";
