use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::models::User;

/// Backend base URL baked in at compile time, `http://localhost:5000/api` unless
/// `MINDCARE_API_BASE` was set for the build.
pub const BUILD_API_BASE: &str = match option_env!("MINDCARE_API_BASE") {
    Some(url) => url,
    None => "http://localhost:5000/api",
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
    pub jpeg_quality: u8,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            jpeg_quality: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BreathingSettings {
    pub phase_secs: u32,
}

impl Default for BreathingSettings {
    fn default() -> Self {
        Self { phase_secs: 4 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SoundSettings {
    pub volume: f32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self { volume: 0.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub capture: CaptureSettings,
    pub user: User,
    pub breathing: BreathingSettings,
    pub sound: SoundSettings,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: BUILD_API_BASE.to_string(),
            request_timeout_secs: 30,
            capture: CaptureSettings::default(),
            user: User::default(),
            breathing: BreathingSettings::default(),
            sound: SoundSettings::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<ClientSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring malformed settings at {}: {}",
                    path.display(),
                    err
                );
                ClientSettings::default()
            })
        } else {
            ClientSettings::default()
        };

        if let Ok(url) = env::var("MINDCARE_API_BASE") {
            if !url.trim().is_empty() {
                data.api_base_url = url;
            }
        }

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Opens `settings.json` in the default config directory.
    pub fn open_default() -> Result<Self> {
        let dir = default_config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config dir {}", dir.display()))?;
        Self::new(dir.join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> ClientSettings {
        self.read().clone()
    }

    pub fn user(&self) -> User {
        self.read().user.clone()
    }

    pub fn update_sound(&self, sound: SoundSettings) -> Result<()> {
        self.update(|settings| settings.sound = sound)
    }

    fn update(&self, apply: impl FnOnce(&mut ClientSettings)) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        apply(&mut guard);
        self.persist(&guard)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ClientSettings> {
        self.data
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn persist(&self, data: &ClientSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

fn default_config_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("MINDCARE_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("mindcare"))
        .context("No config directory available on this platform")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let settings = store.snapshot();
        assert_eq!(settings.capture, CaptureSettings::default());
        assert_eq!(settings.breathing.phase_secs, 4);
        assert_eq!(settings.user.name, "Alex Johnson");
    }

    #[test]
    fn partial_file_fills_remaining_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"request_timeout_secs": 5, "capture": {"width": 320, "height": 240, "jpeg_quality": 70}}"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().snapshot();
        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.capture.width, 320);
        assert_eq!(settings.sound, SoundSettings::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let settings = SettingsStore::new(path).unwrap().snapshot();
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn sound_update_keeps_saved_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"user":{"name":"Sam","role":"Therapist"}}"#).unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        store.update_sound(SoundSettings { volume: 0.2 }).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.user().name, "Sam");
        assert_eq!(reloaded.user().role, UserRole::Therapist);
        assert_eq!(reloaded.snapshot().sound.volume, 0.2);
    }
}
