use super::Atmosphere;

const UNAVAILABLE: &str = "Sound output is not available in this build (enable the `sound` feature)";

/// Stand-in engine for builds without the `sound` feature.
#[derive(Default)]
pub struct AudioEngineHandle;

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self
    }

    pub fn play(&self, atmosphere: Atmosphere, _volume: f32) -> Result<(), String> {
        log::warn!("Cannot play {}: sound output disabled", atmosphere.name());
        Err(UNAVAILABLE.to_string())
    }

    pub fn stop(&self) -> Result<(), String> {
        Ok(())
    }

    pub fn set_volume(&self, _volume: f32) -> Result<(), String> {
        Ok(())
    }

    pub fn now_playing(&self) -> Option<Atmosphere> {
        None
    }
}
