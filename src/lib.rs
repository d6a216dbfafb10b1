//! Drop Dodge - A falling-object dodging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, mask collision, entities, lifecycle)
//! - `session`: Frame-driven session that a frontend pumps with elapsed time
//! - `settings`: Data-driven field dimensions and timings

pub mod session;
pub mod settings;
pub mod sim;

pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Player move / object fall tick period (milliseconds)
    pub const MOVE_INTERVAL_MS: f64 = 45.0;
    /// Object spawn tick period (milliseconds)
    pub const SPAWN_INTERVAL_MS: f64 = 400.0;
    /// Maximum timer firings per advance to prevent spiral of death
    pub const MAX_CATCHUP_TICKS: u32 = 32;

    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 100.0;
    pub const PLAYER_HEIGHT: f32 = 100.0;
    pub const PLAYER_START_X: f32 = 150.0;
    pub const PLAYER_STEP: f32 = 20.0;

    /// Falling object defaults
    pub const OBJECT_SIZE: f32 = 15.0;
    pub const FALL_SPEED: f32 = 8.0;
    /// Objects at or past this y have left the field
    pub const DESPAWN_Y: f32 = 600.0;

    /// Mask grid is always decoded to this square size
    pub const MASK_SIZE: u32 = 100;
    /// Fine scan window edge, matches the rendered object size
    pub const SCAN_WINDOW: i32 = 15;
    /// A mask pixel is solid when alpha is above this
    pub const ALPHA_THRESHOLD: u8 = 128;
    /// A mask pixel is dark when every color channel is below this
    pub const DARK_THRESHOLD: u8 = 128;

    /// Player silhouette asset
    pub const MASK_PATH: &str = "images/character_mask.png";
}
