//! Difficulty-driven spawn scheduling
//!
//! The scheduler runs a perpetual cycle: pick the current interval and
//! travel time from the difficulty ramp, dispatch a single obstacle or a
//! burst (one per column, staggered), then wait out the interval. Waiting is
//! plain state advanced by each tick's delta.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use crate::consts::{CELL_COUNT, GRID_COLS, GRID_ROWS};
use crate::{clamp01, lerp, quad_ramp};

/// Ramp endpoints for spawn pacing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub start_interval: f32,
    pub min_interval: f32,
    pub start_travel_time: f32,
    pub min_travel_time: f32,
    /// Seconds of difficulty time to reach the floor values
    pub ramp_duration: f32,
    pub burst_chance_start: f32,
    pub burst_chance_max: f32,
    /// Delay between consecutive obstacles of a burst
    pub burst_stagger: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            start_interval: 4.0,
            min_interval: 2.0,
            start_travel_time: 8.0,
            min_travel_time: 3.0,
            ramp_duration: 120.0,
            burst_chance_start: 0.0,
            burst_chance_max: 0.35,
            burst_stagger: 0.12,
        }
    }
}

impl DifficultyConfig {
    /// Quadratic ease from `start_interval` down to `min_interval`
    pub fn spawn_interval(&self, elapsed: f32) -> f32 {
        quad_ramp(self.start_interval, self.min_interval, elapsed, self.ramp_duration)
    }

    pub fn travel_time(&self, elapsed: f32) -> f32 {
        quad_ramp(self.start_travel_time, self.min_travel_time, elapsed, self.ramp_duration)
    }

    /// Linear over the same window
    pub fn burst_chance(&self, elapsed: f32) -> f32 {
        let t = if self.ramp_duration > 0.0 {
            clamp01(elapsed / self.ramp_duration)
        } else {
            1.0
        };
        clamp01(lerp(self.burst_chance_start, self.burst_chance_max, t))
    }
}

/// Session-wide speed multiplier ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedRampConfig {
    pub base_speed: f32,
    pub max_speed: f32,
    pub ramp_duration: f32,
}

impl Default for SpeedRampConfig {
    fn default() -> Self {
        Self {
            base_speed: 1.0,
            max_speed: 3.0,
            ramp_duration: 120.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpeedRamp {
    config: SpeedRampConfig,
    elapsed: f32,
    current: f32,
}

impl SpeedRamp {
    pub fn new(config: SpeedRampConfig) -> Self {
        Self {
            config,
            elapsed: 0.0,
            current: config.base_speed,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        self.current = quad_ramp(
            self.config.base_speed,
            self.config.max_speed,
            self.elapsed,
            self.config.ramp_duration,
        );
    }

    /// Raw ramp value
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Divisor applied to pacing, kept within `[1, max_speed]`
    pub fn multiplier(&self) -> f32 {
        self.current.clamp(1.0, self.config.max_speed.max(1.0))
    }
}

/// An obstacle the session should materialize now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub cell: Cell,
    pub travel_time: f32,
    /// Part of a burst
    pub burst: bool,
}

/// Everything a single scheduler tick produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnBatch {
    pub spawns: Vec<SpawnRequest>,
    /// Column order of each burst started this tick
    pub bursts: Vec<[usize; GRID_COLS]>,
}

#[derive(Debug, Clone, Copy)]
struct PendingSpawn {
    due: f64,
    request: SpawnRequest,
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    config: DifficultyConfig,
    /// Difficulty time; advances by each cycle's interval
    elapsed: f32,
    /// Scheduler's own clock
    clock: f64,
    next_cycle_at: f64,
    /// Staggered burst members, sorted by due time
    pending: Vec<PendingSpawn>,
}

impl SpawnScheduler {
    pub fn new(config: DifficultyConfig) -> Self {
        Self {
            config,
            elapsed: 0.0,
            clock: 0.0,
            next_cycle_at: 0.0,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    /// Difficulty time, monotonically non-decreasing
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Interval the next cycle would use, before the speed divisor
    pub fn current_interval(&self) -> f32 {
        self.config.spawn_interval(self.elapsed)
    }

    pub fn current_travel_time(&self) -> f32 {
        self.config.travel_time(self.elapsed)
    }

    /// Seconds until the next cycle fires
    pub fn time_to_next_cycle(&self) -> f32 {
        (self.next_cycle_at - self.clock).max(0.0) as f32
    }

    /// Advance by `dt`. `speed` is the optional global multiplier (>= 1).
    pub fn tick(&mut self, dt: f32, speed: Option<f32>, rng: &mut impl Rng) -> SpawnBatch {
        self.clock += dt.max(0.0) as f64;
        let speed = speed.filter(|s| s.is_finite()).unwrap_or(1.0).max(1.0);

        let mut batch = SpawnBatch::default();
        while self.next_cycle_at <= self.clock {
            let cycle_at = self.next_cycle_at;
            let interval = self.config.spawn_interval(self.elapsed) / speed;
            let travel_time = self.config.travel_time(self.elapsed) / speed;

            if rng.random_bool(self.config.burst_chance(self.elapsed) as f64) {
                let columns = self.queue_burst(cycle_at, travel_time, rng);
                log::debug!("Burst at t={:.2}: columns {:?}", cycle_at, columns);
                batch.bursts.push(columns);
            } else {
                let cell = Cell::new(rng.random_range(0..CELL_COUNT) as i64);
                self.push_pending(cycle_at, SpawnRequest {
                    cell,
                    travel_time,
                    burst: false,
                });
            }

            self.elapsed += interval;
            // Guard against a zero interval spinning forever
            self.next_cycle_at = cycle_at + (interval.max(1e-3) as f64);
        }

        let ready = self.pending.partition_point(|p| p.due <= self.clock);
        batch
            .spawns
            .extend(self.pending.drain(..ready).map(|p| p.request));
        batch
    }

    /// One obstacle per column in shuffled order, random row each
    fn queue_burst(&mut self, at: f64, travel_time: f32, rng: &mut impl Rng) -> [usize; GRID_COLS] {
        let mut columns: [usize; GRID_COLS] = std::array::from_fn(|c| c);
        columns.shuffle(rng);

        for (i, &col) in columns.iter().enumerate() {
            let row = rng.random_range(0..GRID_ROWS);
            let due = at + (i as f32 * self.config.burst_stagger.max(0.0)) as f64;
            self.push_pending(due, SpawnRequest {
                cell: Cell::from_row_col(row as i64, col as i64),
                travel_time,
                burst: true,
            });
        }
        columns
    }

    fn push_pending(&mut self, due: f64, request: SpawnRequest) {
        // Stable: equal due times keep insertion order
        let pos = self.pending.partition_point(|p| p.due <= due);
        self.pending.insert(pos, PendingSpawn { due, request });
    }

    /// Number of burst members still waiting on their stagger
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
