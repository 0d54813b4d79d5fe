//! # qsim-cli::wiring
//!
//! Applies command-line overrides on top of a loaded `SimulationConfig`
//! before it reaches the engine. Kept as its own module, mirroring the
//! teacher's separation of "turn user input into what the engine needs"
//! from the subcommand handlers themselves — here there is no protocol
//! registry to resolve, since `World::from_config` (in `qsim-engine`)
//! already does the name-to-`StationId` wiring on its own.

use crate::args::RunOpts;
use qsim_types::scenario::SimulationConfig;

/// Applies `--seed`/`--batch-count` overrides from `opts` onto `cfg`,
/// preferring the CLI flag over the value parsed from the file.
pub fn apply_overrides(mut cfg: SimulationConfig, opts: &RunOpts) -> SimulationConfig {
    if let Some(seed) = opts.seed {
        cfg.seed = seed;
    }
    if let Some(batch_count) = opts.batch_count {
        cfg.batch_count = batch_count;
    }
    cfg
}
