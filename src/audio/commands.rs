use serde::Serialize;

use super::Atmosphere;
use crate::{settings::SoundSettings, AppState, Page};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoundStatus {
    pub now_playing: Option<Atmosphere>,
    pub volume: f32,
}

fn sound_status(state: &AppState) -> SoundStatus {
    SoundStatus {
        now_playing: state.audio.now_playing(),
        volume: state.settings.snapshot().sound.volume,
    }
}

pub(crate) fn list_atmospheres() -> Vec<&'static str> {
    Atmosphere::ALL.iter().map(Atmosphere::name).collect()
}

pub(crate) async fn play_atmosphere(state: &AppState, name: &str) -> Result<SoundStatus, String> {
    let atmosphere: Atmosphere = name.parse()?;
    state.navigate(Page::Relief).await;
    let volume = state.settings.snapshot().sound.volume;
    state.audio.play(atmosphere, volume)?;
    Ok(sound_status(state))
}

pub(crate) fn stop_atmosphere(state: &AppState) -> Result<SoundStatus, String> {
    state.audio.stop()?;
    Ok(sound_status(state))
}

/// Sets and remembers the ambient volume, clamped to `0..=1`.
pub(crate) fn set_volume(state: &AppState, volume: f32) -> Result<SoundStatus, String> {
    if !volume.is_finite() {
        return Err(format!("Invalid volume {}", volume));
    }
    let volume = volume.clamp(0.0, 1.0);
    state
        .settings
        .update_sound(SoundSettings { volume })
        .map_err(|e| e.to_string())?;
    state.audio.set_volume(volume)?;
    Ok(sound_status(state))
}
