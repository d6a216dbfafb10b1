//! Game state and core simulation types
//!
//! `GameState` is the single owner of the score, the live objects and the
//! player position. Nothing outside `sim::tick` mutates them.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::registry::EntityRegistry;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Objects fall, player moves
    Running,
    /// Run ended; only restart is accepted
    Over,
}

/// The player's avatar on the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// Top-left corner; y never changes
    pub pos: Vec2,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
}

/// A falling object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingObject {
    pub id: u32,
    /// Top-left corner; x is fixed at spawn
    pub pos: Vec2,
}

/// Lifecycle output for the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ObjectSpawned { id: u32 },
    /// Object left the field (or was cleared)
    ObjectDespawned { id: u32 },
    ScoreChanged { score: u32 },
    GameOver { final_score: u32 },
    Restarted,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Current phase
    pub phase: GamePhase,
    /// Objects dodged this run
    pub score: u32,
    /// Score captured when the run ended
    pub final_score: Option<u32>,
    /// Move ticks processed this run
    pub time_ticks: u64,
    /// Player and live objects
    pub entities: EntityRegistry,
    /// Field dimensions and speeds
    pub settings: Settings,
    pub(crate) rng: Pcg32,
    /// Pending events (drained by the frontend)
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new running game with the given seed
    pub fn new(settings: Settings, seed: u64) -> Self {
        let player = Player::new(settings.player_start_x, settings.player_y());
        Self {
            seed,
            phase: GamePhase::Running,
            score: 0,
            final_score: None,
            time_ticks: 0,
            entities: EntityRegistry::new(player),
            settings,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn player(&self) -> &Player {
        &self.entities.player
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = GameState::new(Settings::default(), 7);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.final_score, None);
        assert_eq!(state.player().pos, Vec2::new(150.0, 500.0));
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(Settings::default(), 7);
        state.emit(GameEvent::Restarted);
        assert_eq!(state.drain_events(), vec![GameEvent::Restarted]);
        assert!(state.drain_events().is_empty());
    }
}
