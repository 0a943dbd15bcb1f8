//! Timing-window grading
//!
//! Pure functions of `time_until_arrival` (seconds, positive while the
//! obstacle is still on its way).

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Quality of a press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitGrade {
    Perfect,
    Great,
    Good,
    Bad,
    /// Never scores, always breaks the streak
    Miss,
}

impl HitGrade {
    pub const ALL: [HitGrade; 5] = [
        HitGrade::Perfect,
        HitGrade::Great,
        HitGrade::Good,
        HitGrade::Bad,
        HitGrade::Miss,
    ];

    #[inline]
    pub fn is_miss(self) -> bool {
        self == HitGrade::Miss
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HitGrade::Perfect => "Perfect",
            HitGrade::Great => "Great",
            HitGrade::Good => "Good",
            HitGrade::Bad => "Bad",
            HitGrade::Miss => "Miss",
        }
    }
}

impl std::fmt::Display for HitGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Press window around arrival.
///
/// A press registers while `-early <= time_until_arrival <= late`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitWindow {
    pub early: f32,
    pub late: f32,
}

impl Default for HitWindow {
    fn default() -> Self {
        Self {
            early: EARLY_WINDOW,
            late: LATE_WINDOW,
        }
    }
}

impl HitWindow {
    pub fn new(early: f32, late: f32) -> Self {
        Self { early, late }
    }

    /// Same bound check used for hittability, independent of grade
    #[inline]
    pub fn is_within_window(&self, time_until_arrival: f32) -> bool {
        !(time_until_arrival < -self.early || time_until_arrival > self.late)
    }

    /// True once the window has closed for good
    #[inline]
    pub fn has_expired(&self, time_until_arrival: f32) -> bool {
        time_until_arrival < -self.early
    }

    pub fn evaluate(&self, time_until_arrival: f32) -> HitGrade {
        if !self.is_within_window(time_until_arrival) {
            return HitGrade::Miss;
        }

        // Only the Perfect edge is inclusive; Great and Good stop short
        let abs_time = time_until_arrival.abs();
        if abs_time <= PERFECT_BAND {
            HitGrade::Perfect
        } else if abs_time < GREAT_BAND {
            HitGrade::Great
        } else if abs_time < GOOD_BAND {
            HitGrade::Good
        } else {
            HitGrade::Bad
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_grades() {
        let w = HitWindow::default();
        assert_eq!(w.evaluate(-0.05), HitGrade::Perfect);
        assert_eq!(w.evaluate(0.0), HitGrade::Perfect);
        assert_eq!(w.evaluate(-0.04), HitGrade::Perfect);
        assert_eq!(w.evaluate(0.07), HitGrade::Great);
        assert_eq!(w.evaluate(0.15), HitGrade::Good);
        assert_eq!(w.evaluate(-0.5), HitGrade::Bad);
        assert_eq!(w.evaluate(-0.21), HitGrade::Bad);
        assert_eq!(w.evaluate(-0.9), HitGrade::Miss);
        assert_eq!(w.evaluate(0.25), HitGrade::Miss);
    }

    #[test]
    fn test_band_edges() {
        let w = HitWindow::default();
        assert_eq!(w.evaluate(PERFECT_BAND), HitGrade::Perfect);
        assert_eq!(w.evaluate(-PERFECT_BAND), HitGrade::Perfect);
        assert_eq!(w.evaluate(GREAT_BAND), HitGrade::Good);
        assert_eq!(w.evaluate(-GREAT_BAND), HitGrade::Good);
        assert_eq!(w.evaluate(GOOD_BAND), HitGrade::Bad);
        assert_eq!(w.evaluate(-GOOD_BAND), HitGrade::Bad);
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let w = HitWindow::default();
        assert!(w.is_within_window(-EARLY_WINDOW));
        assert!(w.is_within_window(LATE_WINDOW));
        assert!(!w.is_within_window(LATE_WINDOW + 0.001));
        assert!(w.has_expired(-EARLY_WINDOW - 0.001));
        assert!(!w.has_expired(LATE_WINDOW + 1.0));
    }

    proptest! {
        #[test]
        fn window_matches_grading(t in -5.0f32..5.0) {
            let w = HitWindow::default();
            prop_assert_eq!(w.is_within_window(t), w.evaluate(t) != HitGrade::Miss);
        }

        #[test]
        fn custom_windows_stay_consistent(early in 0.0f32..2.0, late in 0.0f32..2.0, t in -3.0f32..3.0) {
            let w = HitWindow::new(early, late);
            prop_assert_eq!(w.is_within_window(t), !w.evaluate(t).is_miss());
        }
    }
}
