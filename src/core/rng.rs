//! Deterministic randomness for generation.
//!
//! Every pipeline step and placement decision draws from a `LayerRng`
//! seeded explicitly, so identical seeds give identical worlds.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// Seeds
// ---------------------------------------------------------------------------

/// Hash of an integer triple, used to derive per-tile seeds.
///
/// Wrapping arithmetic over `u32`; never returns 0.
pub fn hash_seed(x: i32, y: i32, seed: u32) -> u32 {
    let h = (x as u32).wrapping_mul(0x6E62_4EB7)
        .wrapping_add((y as u32).wrapping_mul(0x7383_ED49))
        .wrapping_add(seed.wrapping_mul(0xDD49_C23B))
        .wrapping_add(0xEBD0_D005);
    non_zero(h)
}

/// Seed derived from the wall clock, for layers that opt out of fixed seeds
pub fn tick_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(1);
    non_zero((nanos % u32::MAX as u128) as u32)
}

/// Map a zero seed to 1
pub fn non_zero(seed: u32) -> u32 {
    if seed == 0 { 1 } else { seed }
}

// ---------------------------------------------------------------------------
// LayerRng
// ---------------------------------------------------------------------------

/// Seeded RNG handed to modifiers and build layers.
#[derive(Debug, Clone)]
pub struct LayerRng(ChaCha8Rng);

impl LayerRng {
    pub fn new(seed: u32) -> Self {
        Self(ChaCha8Rng::seed_from_u64(non_zero(seed) as u64))
    }

    /// Uniform float in `[min, max)`; returns `min` for an empty range
    pub fn next_float(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.0.gen_range(min..max)
    }

    /// Uniform float in `[0, 1)`
    pub fn next_unit(&mut self) -> f32 {
        self.0.gen_range(0.0..1.0)
    }

    /// Uniform integer in `[min, max)`; returns `min` for an empty range
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.0.gen_range(min..max)
    }

    /// Uniform index in `[0, len)`
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.0.gen_range(0..len)
    }

    pub fn next_bool(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }

    /// Random unit vector in the plane
    pub fn unit_direction2(&mut self) -> Vec2 {
        Vec2::from_angle(self.0.gen_range(0.0..std::f32::consts::TAU))
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }

    /// Access the underlying generator
    pub fn inner_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.0
    }
}
