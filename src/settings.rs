//! Game settings
//!
//! Field dimensions, speeds and timer periods. Read-only JSON: a file on
//! native, LocalStorage on the web. Missing keys fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable game parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_start_x: f32,
    /// Horizontal distance per move tick
    pub player_step: f32,

    // === Falling objects ===
    pub object_size: f32,
    /// Vertical distance per move tick
    pub fall_speed: f32,
    pub despawn_y: f32,

    // === Timers ===
    pub move_interval_ms: f64,
    pub spawn_interval_ms: f64,

    // === Assets ===
    pub mask_path: String,
    /// Fixed RNG seed (None = frontend picks one)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_start_x: PLAYER_START_X,
            player_step: PLAYER_STEP,

            object_size: OBJECT_SIZE,
            fall_speed: FALL_SPEED,
            despawn_y: DESPAWN_Y,

            move_interval_ms: MOVE_INTERVAL_MS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,

            mask_path: MASK_PATH.to_string(),
            seed: None,
        }
    }
}

impl Settings {
    /// Rightmost player x
    #[inline]
    pub fn player_max_x(&self) -> f32 {
        (self.field_width - self.player_width).max(0.0)
    }

    /// Rightmost spawn x for an object
    #[inline]
    pub fn spawn_max_x(&self) -> f32 {
        (self.field_width - self.object_size).max(0.0)
    }

    /// Fixed player y (standing on the bottom edge)
    #[inline]
    pub fn player_y(&self) -> f32 {
        self.field_height - self.player_height
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "drop_dodge_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings file {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
