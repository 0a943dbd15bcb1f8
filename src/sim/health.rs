//! Player lives
//!
//! Each miss costs a life. After a quiet period without damage lives regrow
//! one at a time; any new damage restarts the quiet period.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub max_lives: u8,
    /// Seconds without damage before regeneration starts
    pub regen_delay: f32,
    /// Seconds between regenerated lives
    pub regen_rate: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_lives: 3,
            regen_delay: 10.0,
            regen_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthTracker {
    config: HealthConfig,
    lives: u8,
    since_damage: f32,
    next_regen_at: f32,
}

impl HealthTracker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            lives: config.max_lives,
            since_damage: 0.0,
            next_regen_at: config.regen_delay,
        }
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn max_lives(&self) -> u8 {
        self.config.max_lives
    }

    pub fn is_depleted(&self) -> bool {
        self.lives == 0
    }

    /// Lose one life. Returns true if this emptied the pool.
    pub fn take_damage(&mut self) -> bool {
        if self.lives == 0 {
            return false;
        }
        self.lives -= 1;
        self.since_damage = 0.0;
        self.next_regen_at = self.config.regen_delay;
        self.lives == 0
    }

    /// Advance regeneration. Returns the number of lives restored.
    pub fn tick(&mut self, dt: f32) -> u8 {
        if self.lives == 0 || self.lives >= self.config.max_lives {
            return 0;
        }

        self.since_damage += dt;
        let mut restored = 0;
        while self.lives < self.config.max_lives && self.since_damage >= self.next_regen_at {
            self.lives += 1;
            restored += 1;
            self.next_regen_at += self.config.regen_rate.max(0.0);
        }
        restored
    }
}
