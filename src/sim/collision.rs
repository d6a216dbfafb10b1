//! Two-tier collision between the player and falling objects
//!
//! A cheap bounding-box rejection runs first. Only overlapping boxes pay for
//! the fine test, which samples the player's silhouette mask under a fixed
//! `SCAN_WINDOW` x `SCAN_WINDOW` window anchored at the object's top-left
//! corner, so the cost per object is bounded.

use glam::Vec2;

use super::geometry::{Rect, overlaps};
use super::mask::OpacityMask;
use super::state::{FallingObject, Player};
use crate::consts::SCAN_WINDOW;
use crate::settings::Settings;

/// Supplies entity rectangles in a shared coordinate space
///
/// Rendering backends report the live layout; headless harnesses compute
/// boxes from positions.
pub trait BoundsProvider {
    fn player_bounds(&self, player: &Player) -> Rect;
    fn object_bounds(&self, object: &FallingObject) -> Rect;
}

/// Bounds computed straight from simulation positions and configured sizes
#[derive(Debug, Clone, Copy)]
pub struct FieldBounds {
    pub player_size: Vec2,
    pub object_size: Vec2,
}

impl FieldBounds {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            player_size: Vec2::new(settings.player_width, settings.player_height),
            object_size: Vec2::splat(settings.object_size),
        }
    }
}

impl BoundsProvider for FieldBounds {
    fn player_bounds(&self, player: &Player) -> Rect {
        Rect::from_origin_size(player.pos, self.player_size)
    }

    fn object_bounds(&self, object: &FallingObject) -> Rect {
        Rect::from_origin_size(object.pos, self.object_size)
    }
}

/// Check whether an object hits the player
///
/// With no mask the coarse result is final.
pub fn check_collision(player: &Rect, object: &Rect, mask: Option<&OpacityMask>) -> bool {
    if !overlaps(player, object) {
        return false;
    }

    let Some(mask) = mask else {
        return true;
    };

    // Object corner in mask space
    let rel_x = (object.left - player.left).floor() as i32;
    let rel_y = (object.top - player.top).floor() as i32;

    for dy in 0..SCAN_WINDOW {
        for dx in 0..SCAN_WINDOW {
            if mask.sample(rel_x + dx, rel_y + dy).is_solid() {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mask::Pixel;
    use proptest::prelude::*;

    const SOLID: Pixel = Pixel::rgba(0, 0, 0, 255);

    fn player_rect() -> Rect {
        Rect::new(150.0, 500.0, 250.0, 600.0)
    }

    fn object_at(x: f32, y: f32) -> Rect {
        Rect::from_origin_size(Vec2::new(x, y), Vec2::splat(15.0))
    }

    /// Solid only inside the given mask-space box
    fn block_mask(x0: u32, y0: u32, x1: u32, y1: u32) -> OpacityMask {
        OpacityMask::from_fn(|x, y| {
            if x >= x0 && x < x1 && y >= y0 && y < y1 {
                SOLID
            } else {
                Pixel::TRANSPARENT
            }
        })
    }

    #[test]
    fn test_miss_without_overlap() {
        let mask = OpacityMask::from_fn(|_, _| SOLID);
        assert!(!check_collision(&player_rect(), &object_at(0.0, 0.0), Some(&mask)));
        assert!(!check_collision(&player_rect(), &object_at(0.0, 0.0), None));
    }

    #[test]
    fn test_coarse_only_without_mask() {
        assert!(check_collision(&player_rect(), &object_at(200.0, 550.0), None));
    }

    #[test]
    fn test_transparent_region_is_not_a_hit() {
        // Solid only on the right half of the sprite
        let mask = block_mask(50, 0, 100, 100);
        assert!(!check_collision(&player_rect(), &object_at(160.0, 520.0), Some(&mask)));
        assert!(check_collision(&player_rect(), &object_at(210.0, 520.0), Some(&mask)));
    }

    #[test]
    fn test_window_edge_reaches_solid_pixel() {
        // Single solid pixel at (64, 30); object corner at rel (50, 16) covers up to (64, 30)
        let mask = block_mask(64, 30, 65, 31);
        assert!(check_collision(&player_rect(), &object_at(200.0, 516.0), Some(&mask)));
        // One pixel further away and the window misses it
        assert!(!check_collision(&player_rect(), &object_at(200.0, 515.0), Some(&mask)));
    }

    #[test]
    fn test_object_partly_left_of_player() {
        // Object corner at rel x = -10, window covers mask x 0..5
        let mask = block_mask(0, 0, 3, 100);
        assert!(check_collision(&player_rect(), &object_at(140.0, 540.0), Some(&mask)));
        let mask = block_mask(5, 0, 100, 100);
        assert!(!check_collision(&player_rect(), &object_at(140.0, 540.0), Some(&mask)));
    }

    #[test]
    fn test_fractional_offset_floors() {
        // rel x = 49.7 floors to 49; window covers 49..64
        let mask = block_mask(49, 0, 50, 100);
        assert!(check_collision(&player_rect(), &object_at(199.7, 520.0), Some(&mask)));
    }

    #[test]
    fn test_field_bounds() {
        let bounds = FieldBounds::from_settings(&Settings::default());
        let player = Player::new(150.0, 500.0);
        assert_eq!(bounds.player_bounds(&player), player_rect());
        let object = FallingObject {
            id: 1,
            pos: Vec2::new(10.0, 20.0),
        };
        assert_eq!(bounds.object_bounds(&object), object_at(10.0, 20.0));
    }

    proptest! {
        #[test]
        fn prop_fine_implies_coarse(
            px in 0.0f32..300.0, ox in -20.0f32..400.0, oy in 380.0f32..620.0, seed in any::<u64>()
        ) {
            let mask = OpacityMask::from_fn(|x, y| {
                let h = (x as u64 * 31 + y as u64 * 17).wrapping_mul(seed | 1);
                if h % 3 == 0 { SOLID } else { Pixel::TRANSPARENT }
            });
            let player = Rect::from_origin_size(Vec2::new(px, 500.0), Vec2::splat(100.0));
            let object = object_at(ox, oy);
            if check_collision(&player, &object, Some(&mask)) {
                prop_assert!(overlaps(&player, &object));
            }
        }

        #[test]
        fn prop_transparent_mask_never_hits(
            px in 0.0f32..300.0, ox in -20.0f32..400.0, oy in 380.0f32..620.0
        ) {
            let mask = OpacityMask::transparent();
            let player = Rect::from_origin_size(Vec2::new(px, 500.0), Vec2::splat(100.0));
            prop_assert!(!check_collision(&player, &object_at(ox, oy), Some(&mask)));
        }
    }
}
