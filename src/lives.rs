use tracing::info;

use crate::constants::DEFAULT_LIVES;
use crate::events::{GameEvent, Observer};

/// Remaining lives, decremented on every death.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lives {
    remaining: i32,
    max: i32,
}

impl Lives {
    pub fn new(lives: i32) -> Self {
        Self {
            remaining: lives,
            max: lives,
        }
    }

    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_game_over(&self) -> bool {
        self.remaining <= 0
    }

    pub fn reset(&mut self, lives: i32) {
        self.remaining = lives;
        self.max = lives;
    }
}

impl Default for Lives {
    fn default() -> Self {
        Self::new(DEFAULT_LIVES)
    }
}

impl Observer for Lives {
    fn on_event(&mut self, event: GameEvent) {
        if event == GameEvent::PacmanDied {
            self.remaining -= 1;
            info!(remaining = self.remaining, "Life lost");
        }
    }
}
