//! Deterministic timer scheduling
//!
//! Replaces two free-running interval timers with one clock fed by elapsed
//! time. Each advance reports the timers that came due, in the order they
//! would have fired. Equal deadlines fire the move timer first.

use crate::consts::MAX_CATCHUP_TICKS;

/// A periodic timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Player movement and object fall
    Move,
    /// New falling object
    Spawn,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    move_interval_ms: f64,
    spawn_interval_ms: f64,
    /// Clock time (ms since start)
    now_ms: f64,
    next_move_ms: f64,
    next_spawn_ms: f64,
}

impl Scheduler {
    pub fn new(move_interval_ms: f64, spawn_interval_ms: f64) -> Self {
        let move_interval_ms = move_interval_ms.max(1.0);
        let spawn_interval_ms = spawn_interval_ms.max(1.0);
        Self {
            move_interval_ms,
            spawn_interval_ms,
            now_ms: 0.0,
            next_move_ms: move_interval_ms,
            next_spawn_ms: spawn_interval_ms,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Move the clock forward, returning the timers that fired
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<Timer> {
        let mut fired = Vec::new();
        if elapsed_ms <= 0.0 {
            return fired;
        }
        self.now_ms += elapsed_ms;

        while fired.len() < MAX_CATCHUP_TICKS as usize {
            let due = self.next_move_ms.min(self.next_spawn_ms);
            if due > self.now_ms {
                return fired;
            }
            if self.next_move_ms <= self.next_spawn_ms {
                self.next_move_ms += self.move_interval_ms;
                fired.push(Timer::Move);
            } else {
                self.next_spawn_ms += self.spawn_interval_ms;
                fired.push(Timer::Spawn);
            }
        }

        // Too far behind (tab was hidden, debugger pause...): drop the backlog
        if self.next_move_ms.min(self.next_spawn_ms) <= self.now_ms {
            log::warn!(
                "Scheduler fell behind by {:.0}ms, dropping backlog",
                self.now_ms - self.next_move_ms.min(self.next_spawn_ms)
            );
            while self.next_move_ms <= self.now_ms {
                self.next_move_ms += self.move_interval_ms;
            }
            while self.next_spawn_ms <= self.now_ms {
                self.next_spawn_ms += self.spawn_interval_ms;
            }
        }
        fired
    }
}
