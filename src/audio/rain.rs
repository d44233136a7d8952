use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SAMPLE_RATE;

/// Forest rain: brown noise through a bandpass around 3 kHz, with a slow swell.
pub struct ForestRain {
    last_brown: f32,
    // 2nd order bandpass state
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
    rng: StdRng,
    modulation_phase: f32,
}

impl ForestRain {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            last_brown: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            rng,
            modulation_phase: 0.0,
        }
    }

    fn brown_noise_sample(&mut self) -> f32 {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        self.last_brown = (self.last_brown + white * 0.02).clamp(-1.0, 1.0) * 0.9999;
        self.last_brown
    }

    fn bandpass_filter(&mut self, input: f32) -> f32 {
        let (b0, b2) = (0.1, -0.1);
        let (a1, a2) = (-1.8, 0.85);

        let output = b0 * input + b2 * self.x2 - a1 * self.y1 - a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

impl Default for ForestRain {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for ForestRain {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let brown = self.brown_noise_sample();
        let filtered = self.bandpass_filter(brown);

        self.modulation_phase += 0.3 / SAMPLE_RATE as f32;
        if self.modulation_phase > std::f32::consts::TAU {
            self.modulation_phase -= std::f32::consts::TAU;
        }
        let modulation = 0.7 + 0.3 * self.modulation_phase.sin();

        let mix = filtered * 0.8 + brown * 0.2;
        Some((mix * modulation * 0.4).clamp(-1.0, 1.0))
    }
}
