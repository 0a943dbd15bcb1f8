//! Gamepad input mapping
//!
//! Two independent jobs, both run once per frame:
//! - Aim: the analog stick picks a cell, recomputed from scratch every frame
//! - Buttons: press edges map to cells and are broadcast as `InputCellEvent`s
//!
//! The center cell has no button of its own; it fires when both stick
//! clicks land within a short coincidence window.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use crate::consts::*;

/// Physical buttons the core listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    L1,
    L2,
    R1,
    R2,
    Triangle,
    Square,
    Circle,
    Cross,
    /// Left stick click (combo half)
    L3,
    /// Right stick click (combo half)
    R3,
}

impl Button {
    pub const ALL: [Button; 10] = [
        Button::L1,
        Button::L2,
        Button::R1,
        Button::R2,
        Button::Triangle,
        Button::Square,
        Button::Circle,
        Button::Cross,
        Button::L3,
        Button::R3,
    ];

    /// Cell fired by a single press, `None` for combo halves
    pub fn direct_cell(self) -> Option<Cell> {
        let index = match self {
            Button::L2 => 0,
            Button::Triangle => 1,
            Button::R2 => 2,
            Button::Square => 3,
            Button::Circle => 5,
            Button::L1 => 6,
            Button::Cross => 7,
            Button::R1 => 8,
            Button::L3 | Button::R3 => return None,
        };
        Some(Cell::new(index))
    }

    /// Buttons that fire `cell`, as shown on an indicator
    pub fn for_cell(cell: Cell) -> &'static [Button] {
        match cell.index() {
            0 => &[Button::L2],
            1 => &[Button::Triangle],
            2 => &[Button::R2],
            3 => &[Button::Square],
            4 => &[Button::L3, Button::R3],
            5 => &[Button::Circle],
            6 => &[Button::L1],
            7 => &[Button::Cross],
            _ => &[Button::R1],
        }
    }
}

/// Raw input for one frame (already debounced upstream)
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Left stick, each axis in [-1, 1], +y up
    pub stick: Vec2,
    /// Buttons whose press edge happened this frame, in arrival order
    pub pressed: Vec<Button>,
}

impl FrameInput {
    pub fn stick(stick: Vec2) -> Self {
        Self {
            stick,
            pressed: Vec::new(),
        }
    }

    pub fn press(mut self, button: Button) -> Self {
        self.pressed.push(button);
        self
    }
}

/// One qualifying press, delivered synchronously to live obstacles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputCellEvent {
    pub input_cell: Cell,
    pub aim_cell: Cell,
    /// Session clock (seconds)
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Stick magnitudes below this recenter the aim
    pub deadzone: f32,
    /// Per-axis threshold for leaving the center column/row
    pub axis_threshold: f32,
    /// Max gap between the two combo halves (seconds)
    pub combo_window: f32,
    /// Obstacles also require the stick to aim at their cell
    pub require_aim: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            deadzone: STICK_DEADZONE,
            axis_threshold: STICK_THRESHOLD,
            combo_window: COMBO_WINDOW,
            require_aim: true,
        }
    }
}

/// Classify a stick vector into a cell. Pure; no smoothing or latching.
pub fn aim_cell(stick: Vec2, deadzone: f32, threshold: f32) -> Cell {
    if !stick.is_finite() || stick.length() < deadzone {
        return Cell::CENTER;
    }

    let col = if stick.x < -threshold {
        0
    } else if stick.x > threshold {
        2
    } else {
        1
    };
    // Stick up selects the top row
    let row = if stick.y > threshold {
        0
    } else if stick.y < -threshold {
        2
    } else {
        1
    };
    Cell::from_row_col(row, col)
}

/// Full-deflection stick vector that aims at `cell`
pub fn stick_toward(cell: Cell) -> Vec2 {
    Vec2::new(cell.col() as f32 - 1.0, 1.0 - cell.row() as f32)
}

#[derive(Debug, Clone)]
pub struct InputMapper {
    config: InputConfig,
    aim: Cell,
    last_l3: Option<f64>,
    last_r3: Option<f64>,
}

impl InputMapper {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            aim: Cell::CENTER,
            last_l3: None,
            last_r3: None,
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Aim from the most recent sample
    pub fn aim(&self) -> Cell {
        self.aim
    }

    /// Sample one frame: update aim, then turn press edges into events.
    ///
    /// Every event of the frame carries the same aim cell.
    pub fn sample(&mut self, input: &FrameInput, now: f64) -> Vec<InputCellEvent> {
        self.aim = aim_cell(input.stick, self.config.deadzone, self.config.axis_threshold);

        let mut events = Vec::new();
        for &button in &input.pressed {
            if let Some(input_cell) = self.map_press(button, now) {
                log::debug!("{:?} -> {} (aim {})", button, input_cell, self.aim);
                events.push(InputCellEvent {
                    input_cell,
                    aim_cell: self.aim,
                    timestamp: now,
                });
            }
        }
        events
    }

    fn map_press(&mut self, button: Button, now: f64) -> Option<Cell> {
        match button {
            Button::L3 => self.combo_half(now, true),
            Button::R3 => self.combo_half(now, false),
            other => other.direct_cell(),
        }
    }

    /// Record one half of the center combo; fires when the partner is recent
    fn combo_half(&mut self, now: f64, left: bool) -> Option<Cell> {
        let window = self.config.combo_window as f64;
        let partner = if left { self.last_r3 } else { self.last_l3 };

        if partner.is_some_and(|t| now - t < window) {
            // Consume both halves so a third tap can't reuse the partner
            self.last_l3 = None;
            self.last_r3 = None;
            return Some(Cell::CENTER);
        }

        if left {
            self.last_l3 = Some(now);
        } else {
            self.last_r3 = Some(now);
        }
        None
    }

    /// Forget pending combo halves and recenter
    pub fn reset(&mut self) {
        self.aim = Cell::CENTER;
        self.last_l3 = None;
        self.last_r3 = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn mapper() -> InputMapper {
        InputMapper::new(InputConfig::default())
    }

    #[test]
    fn test_deadzone_recenters() {
        assert_eq!(aim_cell(Vec2::new(0.15, 0.1), 0.2, 0.33), Cell::CENTER);
        assert_eq!(aim_cell(Vec2::ZERO, 0.2, 0.33), Cell::CENTER);
        assert_eq!(aim_cell(Vec2::NAN, 0.2, 0.33), Cell::CENTER);
    }

    #[test]
    fn test_stick_directions() {
        let cases = [
            (Vec2::new(-1.0, 1.0), 0),
            (Vec2::new(0.0, 1.0), 1),
            (Vec2::new(1.0, 1.0), 2),
            (Vec2::new(-1.0, 0.0), 3),
            (Vec2::new(1.0, 0.0), 5),
            (Vec2::new(-1.0, -1.0), 6),
            (Vec2::new(0.0, -1.0), 7),
            (Vec2::new(1.0, -1.0), 8),
        ];
        for (stick, expected) in cases {
            assert_eq!(aim_cell(stick, 0.2, 0.33).index(), expected, "stick {stick}");
        }
    }

    #[test]
    fn test_stick_toward_round_trips() {
        for cell in Cell::all() {
            assert_eq!(aim_cell(stick_toward(cell), 0.2, 0.33), cell);
        }
    }

    #[test]
    fn test_outside_deadzone_but_under_threshold_is_center() {
        // Magnitude 0.42 clears the deadzone, neither axis clears 0.33
        assert_eq!(aim_cell(Vec2::new(0.3, 0.3), 0.2, 0.33), Cell::CENTER);
    }

    #[test]
    fn test_aim_has_no_memory() {
        let mut m = mapper();
        m.sample(&FrameInput::stick(Vec2::new(1.0, 1.0)), 0.0);
        assert_eq!(m.aim().index(), 2);
        m.sample(&FrameInput::default(), 0.016);
        assert_eq!(m.aim(), Cell::CENTER);
    }

    #[test]
    fn test_buttons_form_a_bijection() {
        let direct: HashSet<usize> = Button::ALL
            .iter()
            .filter_map(|b| b.direct_cell())
            .map(Cell::index)
            .collect();
        assert_eq!(direct.len(), 8);
        assert!(!direct.contains(&Cell::CENTER.index()));
        for cell in Cell::all() {
            for &button in Button::for_cell(cell) {
                if let Some(direct) = button.direct_cell() {
                    assert_eq!(direct, cell);
                }
            }
        }
    }

    #[test]
    fn test_press_event_carries_current_aim() {
        let mut m = mapper();
        let input = FrameInput::stick(Vec2::new(-1.0, 1.0)).press(Button::R1);
        let events = m.sample(&input, 1.5);
        assert_eq!(
            events,
            vec![InputCellEvent {
                input_cell: Cell::new(8),
                aim_cell: Cell::new(0),
                timestamp: 1.5,
            }]
        );
    }

    #[test]
    fn test_single_combo_half_does_nothing() {
        let mut m = mapper();
        assert!(m.sample(&FrameInput::default().press(Button::L3), 0.0).is_empty());
        assert!(m.sample(&FrameInput::default().press(Button::L3), 1.0).is_empty());
    }

    #[test]
    fn test_combo_within_window_fires_center() {
        let mut m = mapper();
        assert!(m.sample(&FrameInput::default().press(Button::L3), 2.0).is_empty());
        let events = m.sample(&FrameInput::default().press(Button::R3), 2.1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].input_cell, Cell::CENTER);
    }

    #[test]
    fn test_combo_same_frame_fires_once() {
        let mut m = mapper();
        let input = FrameInput::default().press(Button::R3).press(Button::L3);
        let events = m.sample(&input, 0.5);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].input_cell, Cell::CENTER);
    }

    #[test]
    fn test_combo_outside_window_does_not_fire() {
        let mut m = mapper();
        m.sample(&FrameInput::default().press(Button::L3), 0.0);
        assert!(m.sample(&FrameInput::default().press(Button::R3), 0.2).is_empty());
    }

    #[test]
    fn test_combo_is_consumed() {
        let mut m = mapper();
        m.sample(&FrameInput::default().press(Button::L3), 0.0);
        assert_eq!(m.sample(&FrameInput::default().press(Button::R3), 0.05).len(), 1);
        // Third tap inside the window finds no partner
        assert!(m.sample(&FrameInput::default().press(Button::L3), 0.1).is_empty());
    }
}
