//! Camera-relative 3x3 grid of arrival and spawn points
//!
//! Points are baked from viewport space at two depths: the arrival plane
//! close to the camera and the spawn plane far out. Once gameplay starts the
//! grid is locked, so moving the camera afterwards never displaces the
//! targets of obstacles already in flight.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::camera::ViewportProjector;
use super::cell::Cell;
use crate::consts::*;

/// Grid placement parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Distance along camera forward of the impact plane
    pub arrival_depth: f32,
    /// Distance along camera forward of the spawn plane
    pub spawn_depth: f32,
    /// Spawn jitter in [0, 1], as a fraction of half a cell
    pub viewport_jitter: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            arrival_depth: ARRIVAL_DEPTH,
            spawn_depth: SPAWN_DEPTH,
            viewport_jitter: VIEWPORT_JITTER,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid depths must be finite and positive (arrival {arrival}, spawn {spawn})")]
    InvalidDepth { arrival: f32, spawn: f32 },
    #[error("viewport jitter {0} is outside [0, 1]")]
    InvalidJitter(f32),
    #[error("projection source is missing or degenerate")]
    DegenerateProjection,
    #[error("projection produced a non-finite point for {0}")]
    NonFinitePoint(Cell),
}

/// Viewport-space center of a cell
pub fn cell_viewport_center(cell: Cell) -> Vec2 {
    let cell_w = 1.0 / GRID_COLS as f32;
    let cell_h = 1.0 / GRID_ROWS as f32;
    // Viewport y grows upward, rows grow downward
    Vec2::new(
        (cell.col() as f32 + 0.5) * cell_w,
        1.0 - (cell.row() as f32 + 0.5) * cell_h,
    )
}

pub struct GridCoordinateSystem {
    config: GridConfig,
    projector: Box<dyn ViewportProjector>,
    arrival: [Vec3; CELL_COUNT],
    spawn: [Vec3; CELL_COUNT],
    locked: bool,
}

impl std::fmt::Debug for GridCoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridCoordinateSystem")
            .field("config", &self.config)
            .field("arrival", &self.arrival)
            .field("spawn", &self.spawn)
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}

impl GridCoordinateSystem {
    /// Bind a projection source and bake the grid.
    ///
    /// A missing or degenerate projector is the one unrecoverable startup
    /// failure of the core.
    pub fn new(config: GridConfig, projector: Box<dyn ViewportProjector>) -> Result<Self, GridError> {
        validate_config(&config)?;
        let mut grid = Self {
            config,
            projector,
            arrival: [Vec3::ZERO; CELL_COUNT],
            spawn: [Vec3::ZERO; CELL_COUNT],
            locked: false,
        };
        grid.bake()?;
        Ok(grid)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freeze the baked points for the rest of the session
    pub fn lock(&mut self) {
        if !self.locked {
            log::info!("Grid locked");
            self.locked = true;
        }
    }

    /// Re-bake from the current projector. No-op once locked.
    pub fn recompute(&mut self) -> Result<(), GridError> {
        if self.locked {
            return Ok(());
        }
        self.bake()
    }

    /// Swap the projection source and re-bake. Ignored once locked.
    pub fn rebind(&mut self, projector: Box<dyn ViewportProjector>) -> Result<(), GridError> {
        if self.locked {
            log::warn!("Ignoring projector rebind on a locked grid");
            return Ok(());
        }
        if !projector.is_valid() {
            return Err(GridError::DegenerateProjection);
        }
        self.projector = projector;
        self.bake()
    }

    fn bake(&mut self) -> Result<(), GridError> {
        if !self.projector.is_valid() {
            return Err(GridError::DegenerateProjection);
        }

        let mut arrival = [Vec3::ZERO; CELL_COUNT];
        let mut spawn = [Vec3::ZERO; CELL_COUNT];
        for cell in Cell::all() {
            let center = cell_viewport_center(cell);
            let a = self.projector.viewport_to_world(center, self.config.arrival_depth);
            let s = self.projector.viewport_to_world(center, self.config.spawn_depth);
            if !a.is_finite() || !s.is_finite() {
                return Err(GridError::NonFinitePoint(cell));
            }
            arrival[cell.index()] = a;
            spawn[cell.index()] = s;
        }

        // Only commit a fully valid bake
        self.arrival = arrival;
        self.spawn = spawn;
        Ok(())
    }

    /// Exact impact point for a cell (never jittered)
    #[inline]
    pub fn arrival_position_for(&self, cell: Cell) -> Vec3 {
        self.arrival[cell.index()]
    }

    /// Baked spawn point at the cell center
    #[inline]
    pub fn spawn_center_for(&self, cell: Cell) -> Vec3 {
        self.spawn[cell.index()]
    }

    /// Spawn point with jitter applied in viewport space before projection
    pub fn spawn_position_for(&self, cell: Cell, rng: &mut impl Rng) -> Vec3 {
        let jitter = self.config.viewport_jitter;
        if jitter <= 0.0 {
            return self.spawn_center_for(cell);
        }

        let half_w = 0.5 / GRID_COLS as f32;
        let half_h = 0.5 / GRID_ROWS as f32;
        let offset = Vec2::new(
            rng.random_range(-1.0f32..=1.0) * jitter * half_w,
            rng.random_range(-1.0f32..=1.0) * jitter * half_h,
        );

        let p = self
            .projector
            .viewport_to_world(cell_viewport_center(cell) + offset, self.config.spawn_depth);
        if p.is_finite() {
            p
        } else {
            self.spawn_center_for(cell)
        }
    }

    /// Arrival point addressed by (row, col), clamped
    pub fn arrival_point(&self, row: usize, col: usize) -> Vec3 {
        self.arrival_position_for(Cell::from_row_col(row as i64, col as i64))
    }

    pub fn arrival_points(&self) -> &[Vec3; CELL_COUNT] {
        &self.arrival
    }

    pub fn spawn_points(&self) -> &[Vec3; CELL_COUNT] {
        &self.spawn
    }
}

fn validate_config(config: &GridConfig) -> Result<(), GridError> {
    let depths_ok = config.arrival_depth.is_finite()
        && config.spawn_depth.is_finite()
        && config.arrival_depth > 0.0
        && config.spawn_depth > 0.0;
    if !depths_ok {
        return Err(GridError::InvalidDepth {
            arrival: config.arrival_depth,
            spawn: config.spawn_depth,
        });
    }
    if !(0.0..=1.0).contains(&config.viewport_jitter) {
        return Err(GridError::InvalidJitter(config.viewport_jitter));
    }
    Ok(())
}
