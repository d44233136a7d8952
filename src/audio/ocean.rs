use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SAMPLE_RATE;

/// Seconds between wave crests.
const WAVE_PERIOD_SECS: f32 = 8.0;

/// Ocean waves: low-passed noise whose level rises and falls with each wave.
pub struct OceanWaves {
    smoothed: f32,
    wave_phase: f32,
    rng: StdRng,
}

impl OceanWaves {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            smoothed: 0.0,
            wave_phase: 0.0,
            rng,
        }
    }

    /// Wave envelope in 0.1..=1.0; sharp rise, long wash back.
    fn envelope(&self) -> f32 {
        let t = self.wave_phase / std::f32::consts::TAU;
        let shape = if t < 0.3 {
            t / 0.3
        } else {
            1.0 - (t - 0.3) / 0.7
        };
        0.1 + 0.9 * shape * shape
    }
}

impl Default for OceanWaves {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for OceanWaves {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        // one-pole low-pass for the roar of the surf
        self.smoothed += 0.08 * (white - self.smoothed);

        self.wave_phase += std::f32::consts::TAU / (WAVE_PERIOD_SECS * SAMPLE_RATE as f32);
        if self.wave_phase > std::f32::consts::TAU {
            self.wave_phase -= std::f32::consts::TAU;
        }

        Some(self.smoothed * self.envelope() * 0.5)
    }
}
