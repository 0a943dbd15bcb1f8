//! Per-obstacle travel and hit state machine
//!
//! `Traveling -> Hittable -> Resolved(grade)`. Both resolved outcomes are
//! terminal, and only the first resolution is ever reported.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::hit::{HitGrade, HitWindow};
use super::input::InputCellEvent;
use super::registry::ObstacleId;
use crate::clamp01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleState {
    /// In flight, press window not open yet
    Traveling,
    /// Inside the press window
    Hittable,
    /// Terminal. `linger` counts down the cosmetic settle time of a miss.
    Resolved { grade: HitGrade, linger: f32 },
}

/// Reported once per obstacle, on its first resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub id: ObstacleId,
    pub cell: Cell,
    pub grade: HitGrade,
    pub position: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub cell: Cell,
    pub spawn_pos: Vec3,
    pub arrival_pos: Vec3,
    /// Seconds from spawn to arrival
    pub travel_time: f32,
    /// Session clock at spawn
    pub spawn_time: f64,
    /// `spawn_time + travel_time`
    pub arrival_time: f64,
    /// Current interpolated position
    pub pos: Vec3,
    pub state: ObstacleState,
    /// Linger applied when this obstacle is missed
    miss_despawn_delay: f32,
}

impl Obstacle {
    pub fn new(
        id: ObstacleId,
        cell: Cell,
        spawn_pos: Vec3,
        arrival_pos: Vec3,
        travel_time: f32,
        now: f64,
        miss_despawn_delay: f32,
    ) -> Self {
        let travel_time = travel_time.max(0.0);
        Self {
            id,
            cell,
            spawn_pos,
            arrival_pos,
            travel_time,
            spawn_time: now,
            arrival_time: now + travel_time as f64,
            pos: spawn_pos,
            state: ObstacleState::Traveling,
            miss_despawn_delay: miss_despawn_delay.max(0.0),
        }
    }

    /// Position after `elapsed` seconds of travel.
    ///
    /// Exactly `spawn_pos` at 0 and exactly `arrival_pos` from `travel_time` on.
    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        if self.travel_time <= 0.0 {
            return self.arrival_pos;
        }
        let t = clamp01(elapsed / self.travel_time);
        if t <= 0.0 {
            self.spawn_pos
        } else if t >= 1.0 {
            self.arrival_pos
        } else {
            self.spawn_pos.lerp(self.arrival_pos, t)
        }
    }

    #[inline]
    pub fn elapsed(&self, now: f64) -> f32 {
        (now - self.spawn_time) as f32
    }

    /// Positive while still on the way
    #[inline]
    pub fn time_until_arrival(&self, now: f64) -> f32 {
        (self.arrival_time - now) as f32
    }

    #[inline]
    pub fn is_hittable(&self) -> bool {
        self.state == ObstacleState::Hittable
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, ObstacleState::Resolved { .. })
    }

    /// Outcome, once resolved
    pub fn grade(&self) -> Option<HitGrade> {
        match self.state {
            ObstacleState::Resolved { grade, .. } => Some(grade),
            _ => None,
        }
    }

    /// Ready for removal: immediately after a hit, after the linger on a miss
    pub fn should_despawn(&self) -> bool {
        match self.state {
            ObstacleState::Resolved { grade, linger } => !grade.is_miss() || linger <= 0.0,
            _ => false,
        }
    }

    /// Advance one frame. Returns the resolution if the window ran out.
    pub fn advance(&mut self, now: f64, dt: f32, window: &HitWindow) -> Option<Resolution> {
        self.pos = self.position_at(self.elapsed(now));

        if let ObstacleState::Resolved { ref mut linger, .. } = self.state {
            *linger = (*linger - dt).max(0.0);
            return None;
        }

        let t = self.time_until_arrival(now);
        // Also catches a frame hitch that jumps past the whole window
        if window.has_expired(t) {
            return self.resolve(HitGrade::Miss);
        }
        if self.state == ObstacleState::Traveling && window.is_within_window(t) {
            self.state = ObstacleState::Hittable;
        }
        None
    }

    /// React to a broadcast press. Non-matching or early presses are ignored.
    pub fn handle_input(
        &mut self,
        event: &InputCellEvent,
        window: &HitWindow,
        require_aim: bool,
    ) -> Option<Resolution> {
        if !self.is_hittable() || event.input_cell != self.cell {
            return None;
        }
        if require_aim && event.aim_cell != self.cell {
            return None;
        }

        let grade = window.evaluate(self.time_until_arrival(event.timestamp));
        if grade.is_miss() {
            return None;
        }
        self.resolve(grade)
    }

    /// Settle the obstacle. Only the first call has any effect.
    pub fn resolve(&mut self, grade: HitGrade) -> Option<Resolution> {
        if self.is_resolved() {
            return None;
        }
        let linger = if grade.is_miss() {
            self.miss_despawn_delay
        } else {
            0.0
        };
        self.state = ObstacleState::Resolved { grade, linger };
        Some(Resolution {
            id: self.id,
            cell: self.cell,
            grade,
            position: self.pos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MISS_DESPAWN_DELAY;
    use proptest::prelude::*;

    const TRAVEL: f32 = 2.0;

    fn obstacle(cell: usize) -> Obstacle {
        Obstacle::new(
            ObstacleId(1),
            Cell::new(cell as i64),
            Vec3::new(1.0, 2.0, 50.0),
            Vec3::new(0.5, 0.25, 2.0),
            TRAVEL,
            10.0,
            MISS_DESPAWN_DELAY,
        )
    }

    fn press(cell: usize, aim: usize, timestamp: f64) -> InputCellEvent {
        InputCellEvent {
            input_cell: Cell::new(cell as i64),
            aim_cell: Cell::new(aim as i64),
            timestamp,
        }
    }

    /// Step an obstacle to `until` at 60 Hz, collecting resolutions
    fn run(o: &mut Obstacle, from: f64, until: f64, w: &HitWindow) -> Vec<Resolution> {
        let dt = 1.0 / 60.0;
        let mut now = from;
        let mut out = Vec::new();
        while now < until {
            now += dt as f64;
            out.extend(o.advance(now, dt, w));
        }
        out
    }

    #[test]
    fn test_position_endpoints_are_exact() {
        let o = obstacle(3);
        assert_eq!(o.position_at(0.0), o.spawn_pos);
        assert_eq!(o.position_at(TRAVEL), o.arrival_pos);
        assert_eq!(o.position_at(TRAVEL * 3.0), o.arrival_pos);
        assert_eq!(o.position_at(-1.0), o.spawn_pos);
    }

    #[test]
    fn test_zero_travel_sits_on_arrival() {
        let o = Obstacle::new(ObstacleId(2), Cell::CENTER, Vec3::ONE, Vec3::ZERO, 0.0, 0.0, 0.4);
        assert_eq!(o.position_at(0.0), Vec3::ZERO);
        assert_eq!(o.arrival_time, 0.0);
    }

    #[test]
    fn test_becomes_hittable_inside_window() {
        let w = HitWindow::default();
        let mut o = obstacle(1);
        // Just before the window opens (late = 0.2 before arrival)
        assert!(o.advance(10.0 + 1.7, 0.0, &w).is_none());
        assert_eq!(o.state, ObstacleState::Traveling);
        assert!(o.advance(10.0 + 1.85, 0.0, &w).is_none());
        assert!(o.is_hittable());
    }

    #[test]
    fn test_expires_as_miss_once() {
        let w = HitWindow::default();
        let mut o = obstacle(1);
        let resolutions = run(&mut o, 10.0, 10.0 + 4.0, &w);
        assert_eq!(resolutions.len(), 1);
        assert_eq!(resolutions[0].grade, HitGrade::Miss);
        assert_eq!(resolutions[0].position, o.arrival_pos);
        assert!(o.is_resolved());
        assert!(o.should_despawn());
    }

    #[test]
    fn test_hitch_past_window_still_misses() {
        let w = HitWindow::default();
        let mut o = obstacle(1);
        // One huge frame from Traveling straight past the close of the window
        let r = o.advance(10.0 + 5.0, 5.0, &w).unwrap();
        assert_eq!(r.grade, HitGrade::Miss);
    }

    #[test]
    fn test_miss_lingers_before_despawn() {
        let w = HitWindow::default();
        let mut o = obstacle(1);
        let now = 10.0 + 3.0;
        o.advance(now, 0.0, &w).unwrap();
        assert!(!o.should_despawn());
        o.advance(now + 0.2, 0.2, &w);
        assert!(!o.should_despawn());
        o.advance(now + 0.45, 0.25, &w);
        assert!(o.should_despawn());
    }

    #[test]
    fn test_matching_press_hits_and_despawns_immediately() {
        let w = HitWindow::default();
        let mut o = obstacle(5);
        let at = 10.0 + TRAVEL as f64;
        o.advance(at, 0.0, &w);
        let r = o.handle_input(&press(5, 5, at), &w, true).unwrap();
        assert_eq!(r.grade, HitGrade::Perfect);
        assert!(o.should_despawn());
        // Timeout path after the hit is swallowed
        assert!(o.advance(at + 2.0, 2.0, &w).is_none());
        assert_eq!(o.grade(), Some(HitGrade::Perfect));
    }

    #[test]
    fn test_wrong_cell_never_resolves() {
        let w = HitWindow::default();
        let mut o = obstacle(5);
        let at = 10.0 + TRAVEL as f64;
        o.advance(at, 0.0, &w);
        for cell in (0..9).filter(|&c| c != 5) {
            assert!(o.handle_input(&press(cell, cell, at), &w, true).is_none());
            assert!(o.handle_input(&press(cell, 5, at), &w, false).is_none());
        }
        assert!(o.is_hittable());
    }

    #[test]
    fn test_aim_requirement() {
        let w = HitWindow::default();
        let at = 10.0 + TRAVEL as f64;

        let mut o = obstacle(2);
        o.advance(at, 0.0, &w);
        assert!(o.handle_input(&press(2, 4, at), &w, true).is_none());
        assert!(o.handle_input(&press(2, 4, at), &w, false).is_some());
    }

    #[test]
    fn test_press_before_window_is_ignored() {
        let w = HitWindow::default();
        let mut o = obstacle(0);
        o.advance(10.5, 0.5, &w);
        assert!(o.handle_input(&press(0, 0, 10.5), &w, true).is_none());
        assert!(!o.is_resolved());
    }

    #[test]
    fn test_resolve_is_first_wins() {
        let mut o = obstacle(0);
        assert!(o.resolve(HitGrade::Good).is_some());
        assert!(o.resolve(HitGrade::Miss).is_none());
        assert_eq!(o.grade(), Some(HitGrade::Good));
    }

    proptest! {
        #[test]
        fn position_is_linear_in_between(t in 0.001f32..0.999) {
            let o = obstacle(4);
            let expected = o.spawn_pos + (o.arrival_pos - o.spawn_pos) * t;
            let got = o.position_at(t * TRAVEL);
            prop_assert!((got - expected).length() < 1e-3);
        }
    }
}
