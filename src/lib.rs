//! Rhythm Grid - timing core of a 3x3 rhythm-shooting minigame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, spawning, obstacles, grading, score)
//! - `settings`: Data-driven tuning for every component

pub mod settings;
pub mod sim;

pub use settings::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Reference frame step (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest delta accepted by a single tick (hitches are clamped to this)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Outbox capacity between `drain_events` calls
    pub const MAX_QUEUED_EVENTS: usize = 4096;

    /// Grid dimensions (row-major, row 0 = top)
    pub const GRID_ROWS: usize = 3;
    pub const GRID_COLS: usize = 3;
    pub const CELL_COUNT: usize = GRID_ROWS * GRID_COLS;

    /// Grid depths from the camera
    pub const ARRIVAL_DEPTH: f32 = 2.0; // impact plane, close to the player
    pub const SPAWN_DEPTH: f32 = 50.0; // far enough to hide pop-in
    /// Spawn jitter as a fraction of half a cell (viewport space)
    pub const VIEWPORT_JITTER: f32 = 0.2;

    /// Hit window around arrival (seconds)
    pub const EARLY_WINDOW: f32 = 0.8;
    pub const LATE_WINDOW: f32 = 0.2;

    /// Grade bands on |time until arrival|
    pub const PERFECT_BAND: f32 = 0.05;
    pub const GREAT_BAND: f32 = 0.10;
    pub const GOOD_BAND: f32 = 0.20;

    /// Missed obstacles linger this long before removal (visual settle only)
    pub const MISS_DESPAWN_DELAY: f32 = 0.4;

    /// Analog aim
    pub const STICK_DEADZONE: f32 = 0.2;
    pub const STICK_THRESHOLD: f32 = 0.33;
    /// Two-button center combo coincidence window (seconds)
    pub const COMBO_WINDOW: f32 = 0.15;
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Linear interpolation, unclamped
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quadratic ease-in: slow start, accelerating toward the end
#[inline]
pub fn ease_in_quad(t: f32) -> f32 {
    let t = clamp01(t);
    t * t
}

/// Ramp from `start` to `end` over `duration` seconds with a quadratic ease
#[inline]
pub fn quad_ramp(start: f32, end: f32, elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return end;
    }
    lerp(start, end, ease_in_quad(elapsed / duration))
}
