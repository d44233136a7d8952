use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SAMPLE_RATE;

/// Mountain wind: brown (red) noise, -6 dB per octave, with slow gusts.
pub struct MountainWind {
    last_value: f32,
    gust_phase: f32,
    rng: StdRng,
}

impl MountainWind {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            last_value: 0.0,
            gust_phase: 0.0,
            rng,
        }
    }
}

impl Default for MountainWind {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for MountainWind {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);

        // integrate white noise; decay keeps DC from building up
        self.last_value = (self.last_value + white * 0.02).clamp(-1.0, 1.0) * 0.9999;

        self.gust_phase += 0.08 / SAMPLE_RATE as f32 * std::f32::consts::TAU;
        if self.gust_phase > std::f32::consts::TAU {
            self.gust_phase -= std::f32::consts::TAU;
        }
        let gust = 0.6 + 0.4 * self.gust_phase.sin().abs();

        Some(self.last_value * 0.3 * gust)
    }
}
