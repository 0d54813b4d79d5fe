//! # qsim-types::config
//!
//! Defines strongly-typed structs for configuration, mirroring the structure
//! of scenario files. These types are used by `serde` to parse TOML/YAML
//! into safe, usable Rust objects.

use serde::{Deserialize, Serialize};

/// A specification for a probability distribution consumed by the engine's
/// Sampler. Every variant, including `Degenerate`, consumes exactly one draw
/// from the shared Random Source per `sample()` call — this is what keeps
/// the RNG stream aligned across configurations (spec.md §5, §9).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dist {
    /// Exponential distribution with the given rate (mean = 1/rate).
    /// A non-positive rate samples as `+inf` — "never occurs" (spec.md §7).
    Exponential { rate: f64 },
    /// Always returns the same fixed value.
    Degenerate { value: f64 },
}

impl Dist {
    pub const fn exponential(rate: f64) -> Self {
        Dist::Exponential { rate }
    }

    pub const fn constant(value: f64) -> Self {
        Dist::Degenerate { value }
    }
}
