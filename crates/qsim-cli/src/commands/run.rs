//! # qsim-cli::commands::run
//!
//! Implements the `run` subcommand: parse once, validate, apply overrides,
//! run the replication driver, and summarize the result.

use crate::{args::RunOpts, wiring::apply_overrides};
use anyhow::Result;
use qsim_engine::{prelude::*, replication};
use qsim_types::scenario::SimulationConfig;

pub fn exec(opts: RunOpts, json: bool) -> Result<()> {
    let cfg = SimulationConfig::load(&opts.config).map_err(|e| anyhow::anyhow!(e))?;
    let cfg = apply_overrides(cfg, &opts);
    cfg.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!(
        "running '{}' with seed {} across {} replication(s)",
        opts.config.display(),
        cfg.seed,
        cfg.batch_count
    );

    let output = replication::run(&cfg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&output);
    }

    Ok(())
}

fn print_summary(output: &Output) {
    println!(
        "throughput: {:.4} (95% CI [{:.4}, {:.4}])",
        output.throughput, output.throughput_ci.0, output.throughput_ci.1
    );
    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>14} {:>14} {:>14}",
        "node", "mean_q_len", "utilization", "completions", "p(renege)", "mean_wait", "mean_sojourn"
    );
    let mut nodes: Vec<&String> = output.mean_queue_length.keys().collect();
    nodes.sort();
    for node in nodes {
        println!(
            "{:<20} {:>12.4} {:>12.4} {:>12} {:>14.4} {:>14.4} {:>14.4}",
            node,
            output.mean_queue_length[node],
            output.server_utilization[node],
            output.service_completions[node],
            output.reneging_probability[node],
            output.mean_waiting_time[node],
            output.mean_system_time[node],
        );
    }
}
