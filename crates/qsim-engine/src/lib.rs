//! # qsim-engine
//!
//! The core of the queueing-network simulator: the event scheduler and its
//! dispatch loop, the station state model, the stale-event protocol that
//! keeps preemptive breakdowns correct, and the warm-up-aware time-integrated
//! statistics. See `crate::sim::Scheduler` for the entry point and
//! `crate::replication` for running independent replications.

#![forbid(unsafe_code)]

pub mod customer;
pub mod events;
pub mod ids;
pub mod prelude;
pub mod replication;
pub mod rng;
pub mod sampling;
pub mod sim;
pub mod station;
pub mod world;

pub mod errors;
