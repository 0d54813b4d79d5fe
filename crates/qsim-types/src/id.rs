//! # qsim-types::id
//!
//! Defines the core identifier types used throughout the simulation.
//! Using distinct type aliases for different kinds of IDs helps prevent
//! bugs where, for example, a `CustomerId` might be accidentally used as
//! an `EventId`.

/// A unique identifier for a customer flowing through the network.
/// Assigned once at external arrival and kept for the customer's entire
/// lifetime in the system, even as it routes between stations.
pub type CustomerId = u64;

/// The index of a station within the configured node list.
pub type StationId = usize;

/// The index of a server within a station's fixed server set.
pub type ServerId = usize;

/// A unique identifier for a scheduled event in the simulation's master queue.
pub type EventId = u64;
