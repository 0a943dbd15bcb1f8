//! Combo streak and score accumulation

use serde::{Deserialize, Serialize};

use super::hit::HitGrade;

/// Point values. Base points must be strictly ordered Perfect > Great > Good > Bad > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub perfect_points: u64,
    pub great_points: u64,
    pub good_points: u64,
    pub bad_points: u64,
    /// Added per streak step on every scoring hit
    pub combo_bonus: u64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            perfect_points: 250,
            great_points: 150,
            good_points: 100,
            bad_points: 50,
            combo_bonus: 20,
        }
    }
}

impl ScoreConfig {
    pub fn base_points(&self, grade: HitGrade) -> u64 {
        match grade {
            HitGrade::Perfect => self.perfect_points,
            HitGrade::Great => self.great_points,
            HitGrade::Good => self.good_points,
            HitGrade::Bad => self.bad_points,
            HitGrade::Miss => 0,
        }
    }

    pub fn is_strictly_ordered(&self) -> bool {
        self.perfect_points > self.great_points
            && self.great_points > self.good_points
            && self.good_points > self.bad_points
            && self.bad_points > 0
    }
}

/// Tally of each grade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub bad: u32,
    pub miss: u32,
}

impl GradeCounts {
    fn bump(&mut self, grade: HitGrade) {
        let slot = match grade {
            HitGrade::Perfect => &mut self.perfect,
            HitGrade::Great => &mut self.great,
            HitGrade::Good => &mut self.good,
            HitGrade::Bad => &mut self.bad,
            HitGrade::Miss => &mut self.miss,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn get(&self, grade: HitGrade) -> u32 {
        match grade {
            HitGrade::Perfect => self.perfect,
            HitGrade::Great => self.great,
            HitGrade::Good => self.good,
            HitGrade::Bad => self.bad,
            HitGrade::Miss => self.miss,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.good + self.bad + self.miss
    }
}

/// Read-only view handed to the score UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub streak: u32,
    pub best_streak: u32,
    pub total_score: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    config: ScoreConfig,
    streak: u32,
    best_streak: u32,
    total_score: u64,
    counts: GradeCounts,
}

impl ScoreTracker {
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Apply one grade. Returns the points awarded (0 on a miss).
    pub fn record(&mut self, grade: HitGrade) -> u64 {
        self.counts.bump(grade);

        if grade.is_miss() {
            if self.streak > 0 {
                log::debug!("Streak of {} broken", self.streak);
            }
            self.streak = 0;
            return 0;
        }

        self.streak = self.streak.saturating_add(1);
        self.best_streak = self.best_streak.max(self.streak);
        let points = self
            .config
            .base_points(grade)
            .saturating_add((self.streak as u64).saturating_mul(self.config.combo_bonus));
        self.total_score = self.total_score.saturating_add(points);
        points
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn counts(&self) -> &GradeCounts {
        &self.counts
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            streak: self.streak,
            best_streak: self.best_streak,
            total_score: self.total_score,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_sequence() {
        let mut s = ScoreTracker::new(ScoreConfig::default());
        let mut streaks = Vec::new();
        let mut scores = vec![s.total_score()];
        for grade in [HitGrade::Good, HitGrade::Great, HitGrade::Miss, HitGrade::Perfect] {
            s.record(grade);
            streaks.push(s.streak());
            scores.push(s.total_score());
        }
        assert_eq!(streaks, vec![1, 2, 0, 1]);
        assert!(scores[1] > scores[0]);
        assert!(scores[2] > scores[1]);
        assert_eq!(scores[3], scores[2]);
        assert!(scores[4] > scores[3]);
    }

    #[test]
    fn test_points_include_combo_bonus() {
        let mut s = ScoreTracker::new(ScoreConfig::default());
        assert_eq!(s.record(HitGrade::Perfect), 250 + 20);
        assert_eq!(s.record(HitGrade::Bad), 50 + 40);
        assert_eq!(s.record(HitGrade::Miss), 0);
        assert_eq!(s.record(HitGrade::Good), 100 + 20);
        assert_eq!(s.total_score(), 270 + 90 + 120);
    }

    #[test]
    fn test_best_streak_and_counts() {
        let mut s = ScoreTracker::new(ScoreConfig::default());
        for grade in [
            HitGrade::Perfect,
            HitGrade::Perfect,
            HitGrade::Great,
            HitGrade::Miss,
            HitGrade::Bad,
        ] {
            s.record(grade);
        }
        assert_eq!(s.best_streak(), 3);
        assert_eq!(s.streak(), 1);
        assert_eq!(s.counts().get(HitGrade::Perfect), 2);
        assert_eq!(s.counts().miss, 1);
        assert_eq!(s.counts().total(), 5);
    }

    #[test]
    fn test_reset_keeps_config() {
        let config = ScoreConfig {
            combo_bonus: 0,
            ..Default::default()
        };
        let mut s = ScoreTracker::new(config);
        s.record(HitGrade::Great);
        s.reset();
        assert_eq!(s.snapshot(), ScoreSnapshot::default());
        assert_eq!(s.record(HitGrade::Great), 150);
    }

    #[test]
    fn test_huge_combo_bonus_saturates() {
        let config = ScoreConfig {
            combo_bonus: u64::MAX,
            ..Default::default()
        };
        let mut s = ScoreTracker::new(config);
        assert_eq!(s.record(HitGrade::Good), u64::MAX);
        assert_eq!(s.record(HitGrade::Good), u64::MAX);
        assert_eq!(s.total_score(), u64::MAX);
        assert_eq!(s.streak(), 2);
    }

    #[test]
    fn test_default_points_are_ordered() {
        assert!(ScoreConfig::default().is_strictly_ordered());
        let flat = ScoreConfig {
            great_points: 250,
            ..Default::default()
        };
        assert!(!flat.is_strictly_ordered());
    }
}
