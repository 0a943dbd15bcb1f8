//! Session: the single owner of all gameplay state
//!
//! One `tick` per frame, in a fixed order:
//! 1. Sample input (aim + press edges)
//! 2. Scheduler dispatches due spawns
//! 3. Obstacles advance travel and hittability
//! 4. Presses are broadcast synchronously to subscribed obstacles
//! 5. Resolutions feed score and health
//! 6. Settled obstacles are removed together with their subscription
//!
//! Outward notifications are queued as `GameEvent`s and drained by the
//! caller; nothing here waits on a consumer. The queue is bounded: a host
//! that never drains it loses the oldest events, not memory.

use std::collections::VecDeque;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::camera::ViewportProjector;
use super::cell::Cell;
use super::grid::{GridCoordinateSystem, GridError};
use super::health::HealthTracker;
use super::hit::HitGrade;
use super::input::{FrameInput, InputCellEvent, InputMapper};
use super::obstacle::{Obstacle, Resolution};
use super::registry::{ObstacleId, SubscriberRegistry};
use super::scheduler::{SpawnRequest, SpawnScheduler, SpeedRamp};
use super::score::ScoreTracker;
use crate::consts::{GRID_COLS, MAX_FRAME_DT, MAX_QUEUED_EVENTS};
use crate::{Tuning, TuningError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Tuning(#[from] TuningError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Playing,
    /// Lives ran out; ticks are ignored until `restart`
    GameOver,
}

/// Notifications for visual, audio, haptic and UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ObstacleSpawned {
        id: ObstacleId,
        cell: Cell,
        spawn_pos: Vec3,
        arrival_pos: Vec3,
        travel_time: f32,
    },
    BurstStarted {
        columns: [usize; GRID_COLS],
    },
    CellInput(InputCellEvent),
    /// Every resolution, hit or miss
    ObstacleResolved {
        id: ObstacleId,
        cell: Cell,
        grade: HitGrade,
        position: Vec3,
    },
    /// Raised once per miss
    PlayerMissed {
        id: ObstacleId,
    },
    LifeRestored {
        lives: u8,
    },
    GameOver {
        score: u64,
        best_streak: u32,
    },
}

pub struct Session {
    tuning: Tuning,
    seed: u64,
    rng: Pcg32,
    phase: SessionPhase,
    /// Session clock (seconds)
    clock: f64,
    frame: u64,
    grid: GridCoordinateSystem,
    scheduler: SpawnScheduler,
    speed: Option<SpeedRamp>,
    input: InputMapper,
    /// Sorted by id
    obstacles: Vec<Obstacle>,
    listeners: SubscriberRegistry,
    score: ScoreTracker,
    health: HealthTracker,
    events: VecDeque<GameEvent>,
    /// Set once the outbox starts dropping; cleared by `drain_events`
    events_overflowed: bool,
    next_id: u32,
}

impl Session {
    /// Build a session. The tuning must validate and the projector is
    /// required; without a usable one the grid cannot exist and the session
    /// is not created.
    pub fn new(
        tuning: Tuning,
        seed: u64,
        projector: Box<dyn ViewportProjector>,
    ) -> Result<Self, SessionError> {
        tuning.validate()?;
        let grid = GridCoordinateSystem::new(tuning.grid, projector)?;
        log::info!("Session starting (seed {})", seed);
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            phase: SessionPhase::Playing,
            clock: 0.0,
            frame: 0,
            grid,
            scheduler: SpawnScheduler::new(tuning.difficulty),
            speed: tuning.speed.map(SpeedRamp::new),
            input: InputMapper::new(tuning.input),
            obstacles: Vec::new(),
            listeners: SubscriberRegistry::new(),
            score: ScoreTracker::new(tuning.score),
            health: HealthTracker::new(tuning.health),
            events: VecDeque::new(),
            events_overflowed: false,
            next_id: 1,
            tuning,
            seed,
        })
    }

    /// Start over with the next seed. The locked grid is kept.
    pub fn restart(&mut self) {
        self.seed = self.seed.wrapping_add(1);
        log::info!("Session restarting (seed {})", self.seed);
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.phase = SessionPhase::Playing;
        self.clock = 0.0;
        self.frame = 0;
        self.scheduler = SpawnScheduler::new(self.tuning.difficulty);
        self.speed = self.tuning.speed.map(SpeedRamp::new);
        self.input.reset();
        self.obstacles.clear();
        self.listeners.clear();
        self.score.reset();
        self.health = HealthTracker::new(self.tuning.health);
        self.events.clear();
        self.events_overflowed = false;
        self.next_id = 1;
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &FrameInput, dt: f32) {
        if self.phase == SessionPhase::GameOver {
            return;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        // First gameplay frame freezes the grid
        self.grid.lock();
        self.clock += dt as f64;
        self.frame += 1;
        if let Some(speed) = &mut self.speed {
            speed.tick(dt);
        }

        let presses = self.input.sample(input, self.clock);

        let multiplier = self.speed.as_ref().map(SpeedRamp::multiplier);
        let batch = self.scheduler.tick(dt, multiplier, &mut self.rng);
        for columns in batch.bursts {
            self.push_event(GameEvent::BurstStarted { columns });
        }
        for request in batch.spawns {
            self.spawn_obstacle(request);
        }

        let window = self.tuning.hit_window;
        let mut resolutions: Vec<Resolution> = Vec::new();
        for obstacle in &mut self.obstacles {
            resolutions.extend(obstacle.advance(self.clock, dt, &window));
        }

        let require_aim = self.tuning.input.require_aim;
        for press in presses {
            self.push_event(GameEvent::CellInput(press));
            for &id in self.listeners.ids() {
                let Ok(i) = self.obstacles.binary_search_by_key(&id, |o| o.id) else {
                    continue;
                };
                resolutions.extend(self.obstacles[i].handle_input(&press, &window, require_aim));
            }
        }

        for resolution in resolutions {
            // Nothing scores after the final life is gone
            if self.phase == SessionPhase::GameOver {
                break;
            }
            self.apply_resolution(resolution);
        }

        let listeners = &mut self.listeners;
        self.obstacles.retain(|o| {
            let keep = !o.should_despawn();
            if !keep {
                listeners.unsubscribe(o.id);
            }
            keep
        });

        if self.phase == SessionPhase::Playing {
            let restored = self.health.tick(dt);
            if restored > 0 {
                self.push_event(GameEvent::LifeRestored {
                    lives: self.health.lives(),
                });
            }
        }
    }

    fn spawn_obstacle(&mut self, request: SpawnRequest) {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;

        let cell = request.cell;
        let spawn_pos = self.grid.spawn_position_for(cell, &mut self.rng);
        let arrival_pos = self.grid.arrival_position_for(cell);
        let obstacle = Obstacle::new(
            id,
            cell,
            spawn_pos,
            arrival_pos,
            request.travel_time,
            self.clock,
            self.tuning.miss_despawn_delay,
        );

        log::debug!(
            "Spawn {} at {} (travel {:.2}s{})",
            id,
            cell,
            request.travel_time,
            if request.burst { ", burst" } else { "" }
        );
        // Ids only grow, so pushing keeps the list sorted
        self.obstacles.push(obstacle);
        self.listeners.subscribe(id);
        self.push_event(GameEvent::ObstacleSpawned {
            id,
            cell,
            spawn_pos,
            arrival_pos,
            travel_time: request.travel_time,
        });
    }

    fn apply_resolution(&mut self, resolution: Resolution) {
        let Resolution {
            id,
            cell,
            grade,
            position,
        } = resolution;

        // Resolved obstacles stop listening right away
        self.listeners.unsubscribe(id);
        self.score.record(grade);
        log::debug!(
            "{} {} -> {} (streak {}, score {})",
            id,
            cell,
            grade,
            self.score.streak(),
            self.score.total_score()
        );
        self.push_event(GameEvent::ObstacleResolved {
            id,
            cell,
            grade,
            position,
        });

        if grade.is_miss() {
            self.push_event(GameEvent::PlayerMissed { id });
            if self.health.take_damage() && self.phase == SessionPhase::Playing {
                self.phase = SessionPhase::GameOver;
                log::info!(
                    "Game over: score {}, best streak {}",
                    self.score.total_score(),
                    self.score.best_streak()
                );
                self.push_event(GameEvent::GameOver {
                    score: self.score.total_score(),
                    best_streak: self.score.best_streak(),
                });
            }
        }
    }

    fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            if !self.events_overflowed {
                log::warn!(
                    "Event queue full ({} events), dropping oldest; call drain_events every frame",
                    MAX_QUEUED_EVENTS
                );
                self.events_overflowed = true;
            }
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Take all queued events, oldest first. Hosts should call this every
    /// frame; past `MAX_QUEUED_EVENTS` the oldest events are discarded.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events_overflowed = false;
        self.events.drain(..).collect()
    }

    /// Events waiting to be drained
    pub fn queued_events(&self) -> usize {
        self.events.len()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn grid(&self) -> &GridCoordinateSystem {
        &self.grid
    }

    /// Rebinding only has an effect before the first tick
    pub fn grid_mut(&mut self) -> &mut GridCoordinateSystem {
        &mut self.grid
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    /// Current global speed divisor (1.0 when the ramp is off)
    pub fn speed_multiplier(&self) -> f32 {
        self.speed.as_ref().map_or(1.0, SpeedRamp::multiplier)
    }

    /// Live obstacles (including misses still settling), in id order
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(|i| &self.obstacles[i])
    }

    pub fn is_listening(&self, id: ObstacleId) -> bool {
        self.listeners.contains(id)
    }

    pub fn aim(&self) -> Cell {
        self.input.aim()
    }

    pub fn score(&self) -> &ScoreTracker {
        &self.score
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }
}
