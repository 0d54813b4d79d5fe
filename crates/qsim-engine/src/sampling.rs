//! # qsim-engine::sampling
//!
//! The Sampler (spec.md §2, §7, §9): a free function over `qsim_types::config::Dist`
//! rather than a method on it, mirroring the teacher's `net::faults::sample_delay`
//! free-function shape, since `Dist` lives in `qsim-types` and this module is the
//! one place allowed to know about the engine's `RngDiscipline`.
//!
//! Every variant, including `Degenerate`, consumes exactly one draw from the
//! `RngDiscipline` passed in. This is load-bearing: it is what keeps the
//! random stream aligned across configurations that swap one distribution
//! for another at the same call site.

use crate::rng::RngDiscipline;
use qsim_types::{config::Dist, time::SimTime};

/// Draws one value from `dist`, consuming exactly one uniform draw from `rng`
/// regardless of variant.
pub fn sample(dist: Dist, rng: &mut RngDiscipline) -> SimTime {
    let u = rng.next_unit();
    match dist {
        Dist::Exponential { rate } => {
            if rate > 0.0 {
                -(1.0 - u).ln() / rate
            } else {
                f64::INFINITY
            }
        }
        Dist::Degenerate { value } => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{LcgStream, Recorder};

    #[test]
    fn degenerate_consumes_one_draw_and_returns_fixed_value() {
        let mut lcg = LcgStream::new(1);
        let mut recorder = Recorder::new(1);
        let mut disc = RngDiscipline::new(&mut lcg, &mut recorder, "test");
        let v = sample(Dist::constant(3.5), &mut disc);
        assert_eq!(v, 3.5);
        assert_eq!(recorder.draws_at("test"), 1);
    }

    #[test]
    fn non_positive_rate_is_degenerate_infinity() {
        let mut lcg = LcgStream::new(1);
        let mut recorder = Recorder::new(1);
        let mut disc = RngDiscipline::new(&mut lcg, &mut recorder, "test");
        let v = sample(Dist::exponential(0.0), &mut disc);
        assert!(v.is_infinite());
        assert_eq!(recorder.draws_at("test"), 1);
    }

    #[test]
    fn exponential_consumes_exactly_one_draw() {
        let mut lcg = LcgStream::new(99);
        let mut recorder = Recorder::new(99);
        let mut disc = RngDiscipline::new(&mut lcg, &mut recorder, "test");
        let v = sample(Dist::exponential(2.0), &mut disc);
        assert!(v.is_finite() && v >= 0.0);
        assert_eq!(recorder.draws_at("test"), 1);
    }
}
