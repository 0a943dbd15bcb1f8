//! Data-driven game tuning
//!
//! Every balance knob of the core in one serde struct. Missing fields fall
//! back to the reference values, so a tuning file only needs the overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MISS_DESPAWN_DELAY;
use crate::sim::{
    DifficultyConfig, GridConfig, HealthConfig, HitWindow, InputConfig, ScoreConfig,
    SpeedRampConfig,
};

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Complete tuning for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub grid: GridConfig,
    pub hit_window: HitWindow,
    pub difficulty: DifficultyConfig,
    /// Global speed multiplier ramp (absent = constant 1.0)
    pub speed: Option<SpeedRampConfig>,
    pub input: InputConfig,
    pub score: ScoreConfig,
    pub health: HealthConfig,
    /// Seconds a missed obstacle stays visible before removal
    pub miss_despawn_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            hit_window: HitWindow::default(),
            difficulty: DifficultyConfig::default(),
            speed: None,
            input: InputConfig::default(),
            score: ScoreConfig::default(),
            health: HealthConfig::default(),
            miss_despawn_delay: MISS_DESPAWN_DELAY,
        }
    }
}

impl Tuning {
    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reference tuning with the speed ramp switched on
    pub fn with_speed_ramp(mut self) -> Self {
        self.speed = Some(SpeedRampConfig::default());
        self
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let d = &self.difficulty;
        positive("difficulty.start_interval", d.start_interval)?;
        positive("difficulty.min_interval", d.min_interval)?;
        positive("difficulty.start_travel_time", d.start_travel_time)?;
        positive("difficulty.min_travel_time", d.min_travel_time)?;
        non_negative("difficulty.ramp_duration", d.ramp_duration)?;
        non_negative("difficulty.burst_stagger", d.burst_stagger)?;
        if d.min_interval > d.start_interval {
            return Err(invalid("difficulty.min_interval", "exceeds start_interval"));
        }
        if d.min_travel_time > d.start_travel_time {
            return Err(invalid("difficulty.min_travel_time", "exceeds start_travel_time"));
        }
        probability("difficulty.burst_chance_start", d.burst_chance_start)?;
        probability("difficulty.burst_chance_max", d.burst_chance_max)?;

        if let Some(speed) = &self.speed {
            if !(speed.base_speed.is_finite() && speed.base_speed >= 1.0) {
                return Err(invalid("speed.base_speed", "must be >= 1"));
            }
            if !(speed.max_speed.is_finite() && speed.max_speed >= speed.base_speed) {
                return Err(invalid("speed.max_speed", "must be >= base_speed"));
            }
            non_negative("speed.ramp_duration", speed.ramp_duration)?;
        }

        non_negative("hit_window.early", self.hit_window.early)?;
        non_negative("hit_window.late", self.hit_window.late)?;

        let i = &self.input;
        non_negative("input.deadzone", i.deadzone)?;
        non_negative("input.axis_threshold", i.axis_threshold)?;
        non_negative("input.combo_window", i.combo_window)?;

        if !self.score.is_strictly_ordered() {
            return Err(invalid(
                "score",
                "base points must satisfy perfect > great > good > bad > 0",
            ));
        }

        if self.health.max_lives == 0 {
            return Err(invalid("health.max_lives", "must be at least 1"));
        }
        non_negative("health.regen_delay", self.health.regen_delay)?;
        non_negative("health.regen_rate", self.health.regen_rate)?;

        let g = &self.grid;
        positive("grid.arrival_depth", g.arrival_depth)?;
        positive("grid.spawn_depth", g.spawn_depth)?;
        probability("grid.viewport_jitter", g.viewport_jitter)?;

        non_negative("miss_despawn_delay", self.miss_despawn_delay)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not a positive number")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is negative or not finite")))
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is outside [0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Tuning::default().validate().unwrap();
        Tuning::default().with_speed_ramp().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "hit_window": { "late": 0.3 }, "score": { "combo_bonus": 5 } }"#)
            .unwrap();
        assert_eq!(t.hit_window.late, 0.3);
        assert_eq!(t.hit_window.early, 0.8);
        assert_eq!(t.score.combo_bonus, 5);
        assert_eq!(t.score.perfect_points, 250);
        assert_eq!(t.difficulty, DifficultyConfig::default());
        assert!(t.speed.is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let t = Tuning::default().with_speed_ramp();
        let back = Tuning::from_json(&t.to_json().unwrap()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_rejects_inverted_ramp() {
        let err = Tuning::from_json(r#"{ "difficulty": { "min_interval": 9.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "difficulty.min_interval",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_bad_probability_and_points() {
        assert!(Tuning::from_json(r#"{ "difficulty": { "burst_chance_max": 1.5 } }"#).is_err());
        assert!(Tuning::from_json(r#"{ "score": { "bad_points": 0 } }"#).is_err());
        assert!(Tuning::from_json(r#"{ "health": { "max_lives": 0 } }"#).is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }
}
