//! # qsim-engine::prelude
//!
//! A convenience module that re-exports the most commonly used types from
//! the engine and its dependencies, so other modules in this crate (and
//! `qsim-cli`) need a single `use crate::prelude::*;`.

pub use crate::{
    customer::Customer,
    errors::EngineError,
    events::{ArrivalSource, Event, Queued},
    ids::IdGen,
    sim::{Output, Scheduler},
    station::{Server, ServerState, Station},
    world::World,
};

pub use qsim_types::{
    self,
    config::Dist,
    errors::{ConfigError, LoadError},
    id::{CustomerId, EventId, ServerId, StationId},
    scenario::SimulationConfig,
    time::{is_degenerate, SimTime, SIM_EPOCH},
};
