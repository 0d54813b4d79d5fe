//! # qsim-types::scenario
//!
//! Defines the Rust struct that maps directly to a simulation configuration
//! file (YAML or TOML). This is the authoritative schema for defining a
//! queueing network experiment (spec.md §6's Input configuration record).

use crate::{
    config::Dist,
    errors::{ConfigError, LoadError},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

fn default_priorities() -> Vec<i64> {
    vec![0]
}

/// The top-level input configuration for a simulation run.
///
/// Maps are `HashMap` except `routing_matrix`'s inner per-source map, which
/// is an `IndexMap` so that the Routing handler can walk destinations in the
/// exact order they were declared (spec.md §4.3 requires iteration order,
/// not sorted or hashed order, when accumulating routing probabilities).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Ordered list of node (station) names.
    pub nodes: Vec<String>,

    /// Per-node external arrival distribution. Absent entry = no external
    /// arrivals at that node.
    #[serde(default)]
    pub arrival_dists: HashMap<String, Dist>,

    /// Per-node service distribution. Required for every node.
    pub service_dists: HashMap<String, Dist>,

    /// Per-node server count.
    pub servers: HashMap<String, usize>,

    /// Per-node ordered list of priority classes, lowest = highest priority.
    /// Defaults to `[0]` for any node not present in the map.
    #[serde(default)]
    pub priorities: HashMap<String, Vec<i64>>,

    /// Per-node patience (renege timer) distribution, if any.
    #[serde(default)]
    pub patience_dists: HashMap<String, Dist>,

    /// Per-node breakdown distribution, if any.
    #[serde(default)]
    pub breakdown_dists: HashMap<String, Dist>,

    /// Per-node repair distribution. Required if `breakdown_dists` has an
    /// entry for that node.
    #[serde(default)]
    pub repair_dists: HashMap<String, Dist>,

    /// Source node -> (destination node -> probability). Need not sum to 1;
    /// residual probability mass is an exit.
    #[serde(default)]
    pub routing_matrix: HashMap<String, IndexMap<String, f64>>,

    /// Simulation horizon.
    pub sim_time: f64,

    /// Warmup period; statistics collection begins here.
    #[serde(default)]
    pub warmup: f64,

    /// Number of independent replications.
    #[serde(default = "one")]
    pub batch_count: u32,

    /// Base RNG seed.
    #[serde(default)]
    pub seed: u64,
}

fn one() -> u32 {
    1
}

impl SimulationConfig {
    /// Loads a configuration from a TOML or YAML file, dispatching on the
    /// file extension the same way `ftsim-cli`'s `run`/`validate` commands
    /// branch on `opts.scenario.extension()`. Does not validate — callers
    /// run `validate()` separately so `qsim-cli validate` can report parse
    /// and logic errors distinctly.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            _ => Err(LoadError::UnsupportedExtension),
        }
    }

    /// Returns the priority classes configured for a node, defaulting to
    /// `[0]` per spec.md §6.
    pub fn priorities_for(&self, node: &str) -> Vec<i64> {
        self.priorities
            .get(node)
            .cloned()
            .unwrap_or_else(default_priorities)
    }

    /// Validates the configuration for logical consistency, per spec.md's
    /// error-handling design (§7). All problems are reported at once is not
    /// required; the first one found is returned, matching the teacher's
    /// `Scenario::validate` short-circuiting style.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }
        if self.sim_time <= 0.0 {
            return Err(ConfigError::NonPositiveSimTime(self.sim_time));
        }
        if self.warmup < 0.0 || self.warmup >= self.sim_time {
            return Err(ConfigError::InvalidWarmup {
                warmup: self.warmup,
                sim_time: self.sim_time,
            });
        }
        if self.batch_count == 0 {
            return Err(ConfigError::NonPositiveBatchCount(0));
        }

        let known: std::collections::HashSet<&str> =
            self.nodes.iter().map(String::as_str).collect();

        for node in &self.nodes {
            if !self.service_dists.contains_key(node) {
                return Err(ConfigError::MissingServiceDist(node.clone()));
            }
            let count = *self.servers.get(node).unwrap_or(&0);
            if count == 0 {
                return Err(ConfigError::NonPositiveServerCount(
                    node.clone(),
                    count as i64,
                ));
            }
            if self.breakdown_dists.contains_key(node) && !self.repair_dists.contains_key(node) {
                return Err(ConfigError::BreakdownWithoutRepair(node.clone()));
            }
            if let Some(classes) = self.priorities.get(node) {
                if classes.is_empty() {
                    return Err(ConfigError::EmptyPriorityList(node.clone()));
                }
            }
        }

        for node in self.priorities.keys() {
            if !known.contains(node.as_str()) {
                return Err(ConfigError::UnknownPriorityNode(node.clone()));
            }
        }

        for (src, dests) in &self.routing_matrix {
            if !known.contains(src.as_str()) {
                return Err(ConfigError::UnknownRoutingSource(src.clone()));
            }
            for (dst, p) in dests {
                if !known.contains(dst.as_str()) {
                    return Err(ConfigError::UnknownRoutingDestination(dst.clone()));
                }
                if !(0.0..=1.0).contains(p) {
                    return Err(ConfigError::InvalidRoutingProbability {
                        from: src.clone(),
                        to: dst.clone(),
                        p: *p,
                    });
                }
            }
        }

        Ok(())
    }
}
