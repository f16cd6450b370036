//! Injectable sources of uniform random draws.
//!
//! Every resolution pulls its draw from a [`RandomSource`] handed in by the
//! caller, never from a global generator. Two implementations are provided:
//!
//! - [`SeededSource`] - ChaCha8 seeded from a `u64`, for real runs
//! - [`ScriptedSource`] - a fixed list of draws, for tests

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// A provider of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Returns the next draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// The seed this source was built from, if any (for logging).
    fn seed(&self) -> Option<u64> {
        None
    }
}

/// Deterministic source backed by a seeded ChaCha8 generator.
///
/// The same seed always yields the same sequence of draws.
#[derive(Debug, Clone)]
pub struct SeededSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededSource {
    /// Creates a source from a master seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn seed(&self) -> Option<u64> {
        Some(self.seed)
    }
}

/// Replays a fixed sequence of draws.
///
/// Once the script runs out, the last draw repeats (0.0 for an empty
/// script). Values outside `[0, 1)` are clamped into range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<f64>,
    last: f64,
    consumed: usize,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = f64>>(draws: I) -> Self {
        Self {
            draws: draws.into_iter().map(clamp_unit).collect(),
            last: 0.0,
            consumed: 0,
        }
    }

    /// Number of draws handed out so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Draws still queued before the last one starts repeating.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if let Some(draw) = self.draws.pop_front() {
            self.last = draw;
        }
        self.consumed += 1;
        self.last
    }
}

fn clamp_unit(r: f64) -> f64 {
    if r.is_nan() {
        0.0
    } else {
        r.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
