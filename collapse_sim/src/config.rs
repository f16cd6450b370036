//! Run configuration.

use collapse_core::CorrelationPolicy;

/// Configuration for a scenario run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for the random source
    pub seed: u64,

    /// Grid width in cells
    pub width: i32,

    /// Grid height in cells
    pub height: i32,

    /// Number of repeated observer interactions in the planting scenario
    pub observations: usize,

    /// How resolved objects take part in later interactions
    pub policy: CorrelationPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: 10,
            height: 10,
            observations: 3,
            policy: CorrelationPolicy::PointMass,
        }
    }
}

impl SimConfig {
    /// Returns a copy of this configuration with a different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }
}
