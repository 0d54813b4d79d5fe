//! # qsim-cli::commands::validate
//!
//! Implements the `validate` subcommand.

use anyhow::Result;
use qsim_types::scenario::SimulationConfig;
use std::path::PathBuf;

pub fn exec(path: PathBuf) -> Result<()> {
    let cfg = SimulationConfig::load(&path).map_err(|e| anyhow::anyhow!(e))?;
    cfg.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!(
        "configuration '{}' is valid: {} node(s), {} replication(s)",
        path.display(),
        cfg.nodes.len(),
        cfg.batch_count
    );
    Ok(())
}
