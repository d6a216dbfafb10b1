//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick intervals only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod mask;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use collision::{BoundsProvider, FieldBounds, check_collision};
pub use geometry::{Rect, overlaps};
pub use mask::{MaskLoadError, MaskSlot, OpacityMask, Pixel};
pub use registry::EntityRegistry;
pub use scheduler::{Scheduler, Timer};
pub use state::{FallingObject, GameEvent, GamePhase, GameState, Player};
pub use tick::{TickInput, move_tick, restart, spawn_tick};
