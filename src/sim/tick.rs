//! Lifecycle transitions
//!
//! Two periodic ticks drive a running game: the move tick (player input and
//! object fall, despawn, collision) and the spawn tick. Both are no-ops
//! while the game is over; only `restart` leaves that phase.

use rand::Rng;

use super::collision::{BoundsProvider, check_collision};
use super::mask::OpacityMask;
use super::state::{GameEvent, GamePhase, GameState};

/// Input intents sampled at a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move-left held
    pub left: bool,
    /// Move-right held
    pub right: bool,
    /// Restart requested (honored only when over)
    pub restart: bool,
}

impl TickInput {
    /// Apply a key press (DOM `KeyboardEvent.code`)
    ///
    /// While the game is over only Space (restart) is accepted.
    pub fn key_down(&mut self, code: &str, over: bool) {
        match code {
            "Space" if over => self.restart = true,
            "ArrowLeft" if !over => self.left = true,
            "ArrowRight" if !over => self.right = true,
            _ => {}
        }
    }

    /// Apply a key release
    pub fn key_up(&mut self, code: &str) {
        match code {
            "ArrowLeft" => self.left = false,
            "ArrowRight" => self.right = false,
            _ => {}
        }
    }
}

/// Advance the player and every live object by one move tick
pub fn move_tick(
    state: &mut GameState,
    input: &TickInput,
    bounds: &impl BoundsProvider,
    mask: Option<&OpacityMask>,
) {
    if state.phase == GamePhase::Over {
        return;
    }

    state.time_ticks += 1;

    // Player
    let step = state.settings.player_step;
    let max_x = state.settings.player_max_x();
    let player = &mut state.entities.player;
    if input.left && player.pos.x > 0.0 {
        player.pos.x = (player.pos.x - step).max(0.0);
    }
    if input.right && player.pos.x < max_x {
        player.pos.x = (player.pos.x + step).min(max_x);
    }

    // Objects, in one pass; everything after a hit is left untouched
    let fall = state.settings.fall_speed;
    let despawn_y = state.settings.despawn_y;
    let player_rect = bounds.player_bounds(&state.entities.player);
    let mut despawned = Vec::new();
    let mut hit = None;
    state.entities.retain_objects(|object| {
        if hit.is_some() {
            return true;
        }
        object.pos.y += fall;
        if object.pos.y >= despawn_y {
            despawned.push(object.id);
            return false;
        }
        if check_collision(&player_rect, &bounds.object_bounds(object), mask) {
            hit = Some(object.id);
        }
        true
    });

    for id in despawned {
        state.score += 1;
        log::debug!("Object {} despawned, score {}", id, state.score);
        state.emit(GameEvent::ObjectDespawned { id });
        state.emit(GameEvent::ScoreChanged { score: state.score });
    }

    if let Some(id) = hit {
        log::debug!("Object {} hit the player", id);
        game_over(state);
    }
}

/// Spawn one object at a random x along the top edge
pub fn spawn_tick(state: &mut GameState) {
    if state.phase == GamePhase::Over {
        return;
    }

    let max_x = state.settings.spawn_max_x();
    let x = state.rng.random_range(0.0..=max_x);
    let id = state.entities.spawn(x);
    log::debug!("Spawned object {} at x={:.1}", id, x);
    state.emit(GameEvent::ObjectSpawned { id });
}

/// Start a fresh run; ignored unless the game is over
///
/// Returns whether the restart happened.
pub fn restart(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Over {
        return false;
    }

    clear_objects(state);
    state.score = 0;
    state.final_score = None;
    state.time_ticks = 0;
    state.entities.player.pos.x = state.settings.player_start_x;
    state.phase = GamePhase::Running;

    log::info!("Game restarted");
    state.emit(GameEvent::Restarted);
    state.emit(GameEvent::ScoreChanged { score: 0 });
    true
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::Over;
    state.final_score = Some(state.score);
    clear_objects(state);

    log::info!(
        "Game over after {} ticks (seed {}), final score {}",
        state.time_ticks,
        state.seed,
        state.score
    );
    state.emit(GameEvent::GameOver {
        final_score: state.score,
    });
}

fn clear_objects(state: &mut GameState) {
    for id in state.entities.ids() {
        state.emit(GameEvent::ObjectDespawned { id });
    }
    state.entities.clear();
}
