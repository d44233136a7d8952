use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Flat-spectrum noise at a comfortable level.
pub struct WhiteNoise {
    rng: StdRng,
}

impl WhiteNoise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for WhiteNoise {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        Some(white * 0.12)
    }
}
