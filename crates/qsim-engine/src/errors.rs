//! # qsim-engine::errors
//!
//! Defines internal error types for the engine. The engine itself never
//! produces an error once construction succeeds — stale events and
//! sampling degeneracy are protocol, not faults (spec.md §7) — so this
//! enum only wraps the configuration errors caught at `Scheduler::new`.

use qsim_types::errors::ConfigError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}
