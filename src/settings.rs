//! Audio/UI preferences
//!
//! Persisted in LocalStorage on wasm; plain defaults elsewhere. Round and
//! roster state is deliberately never saved.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute all audio
    pub muted: bool,
    /// Draw the touch joystick overlay while a touch is down
    pub show_joystick: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 1.0,
            muted: false,
            show_joystick: true,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "ball_tag_settings";

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    return settings;
                }
            }
        }
        log::info!("using default settings");
        Self::default()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}

    /// Music volume with the mute flag applied.
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume.clamp(0.0, 1.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mute_zeroes_effective_volume() {
        let mut settings = Settings::default();
        settings.music_volume = 0.8;
        assert_eq!(settings.effective_music_volume(), 0.8);
        settings.muted = true;
        assert_eq!(settings.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_settings_roundtrip_json() {
        let settings = Settings {
            music_volume: 0.5,
            muted: true,
            show_joystick: false,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.music_volume, 0.5);
        assert!(back.muted);
        assert!(!back.show_joystick);
    }
}
