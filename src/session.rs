//! A playable session
//!
//! Owns the game state, the timer clock and the mask slot. A frontend calls
//! `advance` once per frame with the elapsed time and the current input, then
//! drains the returned events to update its display.

use crate::settings::Settings;
use crate::sim::{
    BoundsProvider, GameEvent, GameState, MaskLoadError, MaskSlot, OpacityMask, Scheduler,
    TickInput, Timer, move_tick, restart, spawn_tick,
};

pub struct Session {
    state: GameState,
    scheduler: Scheduler,
    mask: MaskSlot,
}

impl Session {
    pub fn new(settings: Settings, seed: u64) -> Self {
        let scheduler = Scheduler::new(settings.move_interval_ms, settings.spawn_interval_ms);
        log::info!("New session with seed {}", seed);
        Self {
            state: GameState::new(settings, seed),
            scheduler,
            mask: MaskSlot::Loading,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn mask(&self) -> &MaskSlot {
        &self.mask
    }

    /// Hand over the result of the asynchronous mask load
    ///
    /// A failure is absorbed here: collision stays coarse for the rest of the
    /// session and nothing is reported upward.
    pub fn resolve_mask(&mut self, result: Result<OpacityMask, MaskLoadError>) {
        self.mask.resolve(result);
    }

    /// Run every timer that came due during `elapsed_ms`
    pub fn advance(
        &mut self,
        elapsed_ms: f64,
        input: &TickInput,
        bounds: &impl BoundsProvider,
    ) -> Vec<GameEvent> {
        if input.restart {
            restart(&mut self.state);
        }

        for timer in self.scheduler.advance(elapsed_ms) {
            match timer {
                Timer::Move => move_tick(&mut self.state, input, bounds, self.mask.mask()),
                Timer::Spawn => spawn_tick(&mut self.state),
            }
        }

        self.state.drain_events()
    }

    /// Restart from the game-over screen; no-op while running
    pub fn restart(&mut self) -> Vec<GameEvent> {
        restart(&mut self.state);
        self.state.drain_events()
    }
}
