//! # qsim-engine::rng
//!
//! Defines the Random Source (spec.md §2, §6) and the discipline for using
//! it. `LcgStream` is the exact linear congruential generator the
//! reproducibility contract mandates: `X <- (1664525*X + 1013904223) mod
//! 2^32`, output `X / 2^32 in [0,1)`. `RngDiscipline` wraps it so that every
//! draw is associated with a site label and recorded for auditing, the same
//! discipline `ftsim-engine/src/rng.rs` enforces around its `ChaCha20Rng` —
//! but here the generator itself is hand-rolled because its exact arithmetic
//! is part of the spec's bit-identical-replay contract, not an
//! implementation detail a faster PRNG could stand in for.

use rand::RngCore;
use std::collections::BTreeMap;

/// The deterministic Random Source. A single instance is shared across every
/// sampling site in a replication (spec.md §2: "Single shared stream across
/// all sampling sites").
#[derive(Debug, Clone)]
pub struct LcgStream {
    state: u64,
}

const A: u64 = 1_664_525;
const C: u64 = 1_013_904_223;
const M: u64 = 1 << 32;

impl LcgStream {
    pub fn new(seed: u64) -> Self {
        Self { state: seed % M }
    }

    /// Advances the generator one step and returns the new state.
    fn step(&mut self) -> u32 {
        self.state = (self.state.wrapping_mul(A).wrapping_add(C)) % M;
        self.state as u32
    }

    /// Draws a uniform value in `[0, 1)`. This is the sole primitive every
    /// Sampler variant consumes from — exactly one call per `sample()`.
    pub fn next_unit(&mut self) -> f64 {
        self.step() as f64 / M as f64
    }
}

impl RngCore for LcgStream {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.step() as u64;
        let lo = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut chunks = dest.chunks_mut(4);
        for chunk in &mut chunks {
            let word = self.step().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// A wrapper around the master Random Source that enforces recording of its
/// usage at a named call site.
pub struct RngDiscipline<'a> {
    rng: &'a mut LcgStream,
    recorder: &'a mut Recorder,
    site_label: &'static str,
}

impl<'a> RngDiscipline<'a> {
    pub fn new(rng: &'a mut LcgStream, recorder: &'a mut Recorder, site_label: &'static str) -> Self {
        Self {
            rng,
            recorder,
            site_label,
        }
    }

    /// Draws one uniform value and records the draw against this site.
    /// Every Sampler call site, and nothing else, should call this.
    pub fn next_unit(&mut self) -> f64 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_unit()
    }
}

impl<'a> RngCore for RngDiscipline<'a> {
    fn next_u32(&mut self) -> u32 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.recorder.record_draw(self.site_label);
        self.rng.fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.recorder.record_draw(self.site_label);
        self.rng.try_fill_bytes(dest)
    }
}

/// Records the number of draws made at each named call site during a
/// replication, for auditing the "exactly one draw per sample" invariant.
pub struct Recorder {
    #[allow(dead_code)]
    seed: u64,
    rng_sites: BTreeMap<&'static str, u64>,
}

impl Recorder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng_sites: BTreeMap::new(),
        }
    }

    pub fn record_draw(&mut self, site_label: &'static str) {
        *self.rng_sites.entry(site_label).or_insert(0) += 1;
    }

    pub fn draws_at(&self, site_label: &str) -> u64 {
        self.rng_sites.get(site_label).copied().unwrap_or(0)
    }
}
