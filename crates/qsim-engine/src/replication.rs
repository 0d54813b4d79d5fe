//! # qsim-engine::replication
//!
//! The Replication Driver + Aggregator (spec.md §2, §4.4). Runs `batch_count`
//! independent replications, each with its own `Scheduler` seeded at
//! `seed + 1000*b`, and combines their throughputs into a mean and a
//! confidence interval. Per spec.md §5, replications share no mutable
//! state — each gets its own `Scheduler` and Random Source — so they are
//! dispatched across a `rayon` thread pool exactly like the teacher
//! parallelizes its own independent per-unit work.

use crate::prelude::*;
use rayon::prelude::*;

/// Runs `cfg.batch_count` replications and returns the aggregated `Output`.
pub fn run(cfg: &SimulationConfig) -> Result<Output, EngineError> {
    if cfg.batch_count <= 1 {
        let scheduler = Scheduler::new(cfg, cfg.seed)?;
        return Ok(run_to_completion(scheduler));
    }

    let n = cfg.batch_count as u64;
    tracing::info!(replications = n, "starting replication batch");
    let mut outputs = (0..n)
        .into_par_iter()
        .map(|b| {
            let seed = cfg.seed + 1000 * b;
            let output = Scheduler::new(cfg, seed).map(run_to_completion)?;
            tracing::debug!(replication = b, seed, throughput = output.throughput, "replication finished");
            Ok(output)
        })
        .collect::<Result<Vec<Output>, EngineError>>()?;

    let throughputs: Vec<f64> = outputs.iter().map(|o| o.throughput).collect();
    let mean = throughputs.iter().sum::<f64>() / throughputs.len() as f64;

    let ci = if throughputs.len() >= 2 {
        let variance = throughputs.iter().map(|t| (t - mean).powi(2)).sum::<f64>()
            / (throughputs.len() as f64 - 1.0);
        let standard_error = (variance / throughputs.len() as f64).sqrt();
        let half_width = 2.0 * standard_error;
        (mean - half_width, mean + half_width)
    } else {
        (mean, mean)
    };

    let mut last = outputs
        .pop()
        .expect("batch_count > 1 guarantees at least one replication output");
    last.throughput = mean;
    last.throughput_ci = ci;
    Ok(last)
}

fn run_to_completion(mut scheduler: Scheduler) -> Output {
    scheduler.run();
    scheduler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn single_node_cfg(batch_count: u32, seed: u64) -> SimulationConfig {
        SimulationConfig {
            nodes: vec!["A".into()],
            arrival_dists: HashMap::from([("A".into(), Dist::constant(1.0))]),
            service_dists: HashMap::from([("A".into(), Dist::constant(0.5))]),
            servers: HashMap::from([("A".into(), 1)]),
            priorities: HashMap::new(),
            patience_dists: HashMap::new(),
            breakdown_dists: HashMap::new(),
            repair_dists: HashMap::new(),
            routing_matrix: HashMap::new(),
            sim_time: 10.0,
            warmup: 0.0,
            batch_count,
            seed,
        }
    }

    #[test]
    fn single_replication_returns_degenerate_ci() {
        let cfg = single_node_cfg(1, 1);
        let out = run(&cfg).unwrap();
        assert_eq!(out.throughput_ci, (out.throughput, out.throughput));
    }

    #[test]
    fn multiple_replications_aggregate_throughput() {
        let cfg = single_node_cfg(5, 1);
        let out = run(&cfg).unwrap();
        assert!(out.throughput > 0.0);
        assert!(out.throughput_ci.0 <= out.throughput);
        assert!(out.throughput_ci.1 >= out.throughput);
    }

    #[test]
    fn deterministic_given_same_seed() {
        let cfg = single_node_cfg(1, 42);
        let a = run(&cfg).unwrap();
        let b = run(&cfg).unwrap();
        assert_eq!(a.throughput, b.throughput);
    }
}
