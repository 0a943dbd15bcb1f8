//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `Session::tick(dt)`
//! - Seeded RNG only
//! - Stable iteration order (by obstacle ID)
//! - No rendering, audio or device dependencies

pub mod camera;
pub mod cell;
pub mod grid;
pub mod health;
pub mod hit;
pub mod input;
pub mod obstacle;
pub mod registry;
pub mod scheduler;
pub mod score;
pub mod session;

pub use camera::{PerspectiveCamera, ViewportProjector};
pub use cell::Cell;
pub use grid::{GridConfig, GridCoordinateSystem, GridError, cell_viewport_center};
pub use health::{HealthConfig, HealthTracker};
pub use hit::{HitGrade, HitWindow};
pub use input::{Button, FrameInput, InputCellEvent, InputConfig, InputMapper, aim_cell, stick_toward};
pub use obstacle::{Obstacle, ObstacleState, Resolution};
pub use registry::{ObstacleId, SubscriberRegistry};
pub use scheduler::{
    DifficultyConfig, SpawnBatch, SpawnRequest, SpawnScheduler, SpeedRamp, SpeedRampConfig,
};
pub use score::{GradeCounts, ScoreConfig, ScoreSnapshot, ScoreTracker};
pub use session::{GameEvent, Session, SessionError, SessionPhase};
