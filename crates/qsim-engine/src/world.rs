//! # qsim-engine::world
//!
//! Defines the `World` struct, the top-level container for every station in
//! the simulated network, and the translation from the user-facing
//! `SimulationConfig` (names, as declared in a scenario file) into the
//! engine's internal index-based representation.

use crate::prelude::*;
use indexmap::IndexMap;
use qsim_types::{errors::ConfigError, scenario::SimulationConfig};
use std::collections::HashMap;

pub struct World {
    pub stations: Vec<Station>,
    pub name_to_id: HashMap<String, StationId>,
}

impl World {
    /// Builds a `World` from a validated configuration. Callers must run
    /// `SimulationConfig::validate` first; this assumes every reference is
    /// well-formed and returns `ConfigError` only for the routing-matrix
    /// lookups that validation already performed (kept here too since
    /// `World::from_config` is the only place that actually resolves a name
    /// to a `StationId`).
    pub fn from_config(cfg: &SimulationConfig) -> Result<Self, ConfigError> {
        let name_to_id: HashMap<String, StationId> = cfg
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        let mut stations = Vec::with_capacity(cfg.nodes.len());
        for name in &cfg.nodes {
            let num_servers = *cfg.servers.get(name).unwrap_or(&0);
            let priority_classes = cfg.priorities_for(name);
            let service_dist = *cfg
                .service_dists
                .get(name)
                .ok_or_else(|| ConfigError::MissingServiceDist(name.clone()))?;
            let arrival_dist = cfg.arrival_dists.get(name).copied();
            let patience_dist = cfg.patience_dists.get(name).copied();
            let breakdown_dist = cfg.breakdown_dists.get(name).copied();
            let repair_dist = cfg.repair_dists.get(name).copied();

            let mut routing = IndexMap::new();
            if let Some(dests) = cfg.routing_matrix.get(name) {
                for (dest_name, prob) in dests {
                    let dest_id = *name_to_id
                        .get(dest_name)
                        .ok_or_else(|| ConfigError::UnknownRoutingDestination(dest_name.clone()))?;
                    routing.insert(dest_id, *prob);
                }
            }

            stations.push(Station::new(
                name.clone(),
                num_servers,
                priority_classes,
                arrival_dist,
                service_dist,
                patience_dist,
                breakdown_dist,
                repair_dist,
                routing,
            ));
        }

        Ok(Self {
            stations,
            name_to_id,
        })
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id]
    }

    pub fn station_mut(&mut self, id: StationId) -> &mut Station {
        &mut self.stations[id]
    }
}
