//! Deterministic simulation RNG resource.
//!
//! A 31-bit linear-congruential generator owned by the simulation, so that
//! identical seeds produce identical map generation and evolution. Systems
//! that need randomness take `ResMut<SimRng>`; nothing in the core touches a
//! process-wide RNG.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

/// Default seed used when no explicit seed is provided.
const DEFAULT_SEED: u64 = 42;

#[derive(Resource, Debug, Clone, Encode, Decode)]
pub struct SimRng {
    state: u32,
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.seed(seed);
        rng
    }

    /// Fold a 64-bit seed into the 31-bit LCG state.
    pub fn seed(&mut self, seed: u64) {
        self.state = ((seed ^ (seed >> 32)) as u32) & 0x7fff_ffff;
    }

    #[inline]
    fn next(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(1_103_515_245)
            .wrapping_add(12_345)
            & 0x7fff_ffff;
        self.state
    }

    /// Next raw 16-bit value.
    #[inline]
    pub fn rand16(&mut self) -> u16 {
        (self.next() >> 16) as u16
    }

    /// Uniform value in `0..=limit`. Rejects the tail of the 16-bit range so
    /// the modulo is unbiased.
    pub fn range(&mut self, limit: u16) -> u16 {
        let span = limit as u32 + 1;
        let cutoff = (0x1_0000 / span) * span;
        loop {
            let v = self.rand16() as u32;
            if v < cutoff {
                return (v % span) as u16;
            }
        }
    }

    /// Low-biased value in `0..=limit`: the smaller of two draws.
    pub fn erand(&mut self, limit: u16) -> u16 {
        let a = self.range(limit);
        let b = self.range(limit);
        a.min(b)
    }
}
