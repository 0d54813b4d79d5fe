//! # qsim-engine::station
//!
//! This module contains the station runtime: servers, priority queues, and
//! the time-integrated counters spec.md §3-§4.2 describes.

pub mod runtime;

pub use runtime::{Server, ServerState, Station};
