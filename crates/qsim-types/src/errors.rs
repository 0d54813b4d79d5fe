//! # qsim-types::errors
//!
//! Defines the common error types used throughout the `qsim` workspace.
//! Using `thiserror` provides clean, descriptive error handling. Per the
//! engine's error-handling design, stale events and sampling degeneracy are
//! NOT represented here: they are protocol, not faults, and never produce a
//! `Result::Err` anywhere in the engine. Only configuration problems —
//! caught at `Scheduler` construction, before a single event runs — are.

use thiserror::Error;

/// A configuration error, reported at `Scheduler` construction and fatal
/// for that replication. Every variant corresponds to one of the checks
/// enumerated in spec.md's error-handling design.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no nodes configured")]
    NoNodes,
    #[error("node '{0}' has no service distribution configured")]
    MissingServiceDist(String),
    #[error("node '{0}' has a breakdown distribution but no repair distribution")]
    BreakdownWithoutRepair(String),
    #[error("node '{0}' has a non-positive server count: {1}")]
    NonPositiveServerCount(String, i64),
    #[error("node '{0}' has an empty priority class list")]
    EmptyPriorityList(String),
    #[error("sim_time must be positive, got {0}")]
    NonPositiveSimTime(f64),
    #[error("warmup ({warmup}) must be non-negative and less than sim_time ({sim_time})")]
    InvalidWarmup { warmup: f64, sim_time: f64 },
    #[error("batch_count must be positive, got {0}")]
    NonPositiveBatchCount(i64),
    #[error("routing matrix references unknown destination node '{0}'")]
    UnknownRoutingDestination(String),
    #[error("routing matrix references unknown source node '{0}'")]
    UnknownRoutingSource(String),
    #[error("priorities map references unknown node '{0}'")]
    UnknownPriorityNode(String),
    #[error("routing probability for '{from}' -> '{to}' is out of [0,1]: {p}")]
    InvalidRoutingProbability { from: String, to: String, p: f64 },
}

/// An error related to parsing a configuration file from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config file extension (expected .toml, .yaml, or .yml)")]
    UnsupportedExtension,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
