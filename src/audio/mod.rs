//! Ambient atmospheres for the stress-relief page.
//!
//! Generators are plain `f32` sample iterators (mono, 44.1 kHz). Playback
//! through rodio is only compiled in with the `sound` feature.

pub mod commands;
pub mod ocean;
pub mod rain;
pub mod white_noise;
pub mod wind;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use ocean::OceanWaves;
pub use rain::ForestRain;
pub use white_noise::WhiteNoise;
pub use wind::MountainWind;

pub const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Atmosphere {
    ForestRain,
    OceanWaves,
    MountainWind,
    WhiteNoise,
}

impl Atmosphere {
    pub const ALL: [Atmosphere; 4] = [
        Atmosphere::ForestRain,
        Atmosphere::OceanWaves,
        Atmosphere::MountainWind,
        Atmosphere::WhiteNoise,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Atmosphere::ForestRain => "Forest Rain",
            Atmosphere::OceanWaves => "Ocean Waves",
            Atmosphere::MountainWind => "Mountain Wind",
            Atmosphere::WhiteNoise => "White Noise",
        }
    }

    pub fn generator(&self) -> Box<dyn Iterator<Item = f32> + Send> {
        match self {
            Atmosphere::ForestRain => Box::new(ForestRain::new()),
            Atmosphere::OceanWaves => Box::new(OceanWaves::new()),
            Atmosphere::MountainWind => Box::new(MountainWind::new()),
            Atmosphere::WhiteNoise => Box::new(WhiteNoise::new()),
        }
    }
}

impl FromStr for Atmosphere {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "rain" | "forestrain" => Ok(Atmosphere::ForestRain),
            "ocean" | "waves" | "oceanwaves" => Ok(Atmosphere::OceanWaves),
            "wind" | "mountainwind" | "brownnoise" => Ok(Atmosphere::MountainWind),
            "white" | "whitenoise" | "noise" => Ok(Atmosphere::WhiteNoise),
            _ => Err(format!("Unknown atmosphere '{}'", s)),
        }
    }
}

#[cfg(feature = "sound")]
mod engine;
#[cfg(feature = "sound")]
pub use engine::AudioEngineHandle;

#[cfg(not(feature = "sound"))]
mod silent;
#[cfg(not(feature = "sound"))]
pub use silent::AudioEngineHandle;
