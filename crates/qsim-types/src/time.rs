//! # qsim-types::time
//!
//! Defines the representation of time within the simulation. Unlike a
//! discrete-nanosecond clock, this engine models continuous time: customers
//! arrive, wait, and are served for real-valued durations drawn from
//! probability distributions, exactly as the queueing-theory literature (and
//! the reference implementation this spec was distilled from) represents it.

/// The fundamental unit of time in the simulation, in arbitrary consistent
/// units (conventionally "hours" or "minutes" depending on the scenario).
pub type SimTime = f64;

/// The start of simulation time.
pub const SIM_EPOCH: SimTime = 0.0;

/// A sampler's way of saying "this distribution never fires" (spec.md's
/// "Sampling degeneracy": an exponential with a non-positive rate never
/// produces a finite draw). The scheduler treats any event whose proposed
/// time is not finite as "do not schedule" rather than an error.
pub fn is_degenerate(t: SimTime) -> bool {
    !t.is_finite()
}
