//! Engine configuration.
//!
//! Every tunable of the scheduler is a named field with a default. A
//! configuration is usually loaded from JSON where any subset of fields
//! may be given; unknown keys are ignored. Ranges are checked once, when
//! the scheduler is constructed.
//!
//! # Example
//! ```
//! use coach_roster::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{"weekday_daily_limit": 4, "unknown": 1}"#).unwrap();
//! assert_eq!(config.weekday_daily_limit, 4);
//! assert_eq!(config.weekend_daily_limit, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{CoachStatus, WorkloadLimits};

/// Scheduler tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Max classes per coach on a weekend day.
    pub weekend_daily_limit: u32,
    /// Max classes per coach on a weekday.
    pub weekday_daily_limit: u32,
    /// Max teaching minutes per coach on a weekend day.
    #[serde(alias = "weekend_daily_hours")]
    pub weekend_daily_minutes: u32,
    /// Max teaching minutes per coach on a weekday.
    #[serde(alias = "weekday_daily_hours")]
    pub weekday_daily_minutes: u32,
    pub full_time_weekly_max: u32,
    pub part_time_weekly_max: u32,
    pub manager_weekly_max: u32,
    /// Longest allowed run of classes separated by less than `min_break_minutes`.
    pub consecutive_limit: u32,
    pub min_break_minutes: u32,
    /// Max hierarchy distance between levels sharing a class.
    pub level_merge_distance: u32,
    /// Smallest combined gap worth a new multi-level class.
    pub min_merge_size: u32,
    pub max_iterations: u32,
    /// Reshuffle pool and coach order every this many iterations.
    pub shuffle_interval: u32,
    /// Candidate picks per requirement in the systematic phase.
    pub max_assignment_attempts: u32,
    pub weekend_bias: u32,
    pub weekday_bias: u32,
    pub underutilized_coach_bonus: u32,
    /// Full-time coaches below this weekly count get the underutilized bonus.
    pub underutilized_threshold: u32,
    pub no_turnaround_bonus: u32,
    pub diverse_class_bonus: u32,
    #[serde(alias = "same_program_back_to_back_penalty")]
    pub same_program_penalty: u32,
    pub peak_hours_bonus: u32,
    pub good_hours_bonus: u32,
    pub scarcity_weight: u32,
    pub complexity_weight: u32,
    pub size_weight: u32,
    /// Restrict the pool to popular candidates when any exist.
    pub popular_only: bool,
    /// Seed for the reshuffle generator.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weekend_daily_limit: 5,
            weekday_daily_limit: 3,
            weekend_daily_minutes: 480,
            weekday_daily_minutes: 240,
            full_time_weekly_max: 25,
            part_time_weekly_max: 15,
            manager_weekly_max: 3,
            consecutive_limit: 3,
            min_break_minutes: 60,
            level_merge_distance: 1,
            min_merge_size: 3,
            max_iterations: 60,
            shuffle_interval: 5,
            max_assignment_attempts: 20,
            weekend_bias: 5,
            weekday_bias: 0,
            underutilized_coach_bonus: 7,
            underutilized_threshold: 5,
            no_turnaround_bonus: 5,
            diverse_class_bonus: 3,
            same_program_penalty: 6,
            peak_hours_bonus: 8,
            good_hours_bonus: 6,
            scarcity_weight: 5,
            complexity_weight: 3,
            size_weight: 2,
            popular_only: true,
            seed: 42,
        }
    }
}

/// Normalized requirement-priority weights (sum to 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityWeights {
    pub scarcity: f64,
    pub complexity: f64,
    pub size: f64,
}

impl EngineConfig {
    /// Parses a JSON object of overrides on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the reshuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Checks every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = 0..=10;
        let checks: [(&'static str, u64, std::ops::RangeInclusive<u64>); 26] = [
            ("weekend_daily_limit", self.weekend_daily_limit.into(), 1..=20),
            ("weekday_daily_limit", self.weekday_daily_limit.into(), 1..=20),
            ("weekend_daily_minutes", self.weekend_daily_minutes.into(), 1..=1440),
            ("weekday_daily_minutes", self.weekday_daily_minutes.into(), 1..=1440),
            ("full_time_weekly_max", self.full_time_weekly_max.into(), 0..=100),
            ("part_time_weekly_max", self.part_time_weekly_max.into(), 0..=100),
            ("manager_weekly_max", self.manager_weekly_max.into(), 0..=100),
            ("consecutive_limit", self.consecutive_limit.into(), 1..=20),
            ("min_break_minutes", self.min_break_minutes.into(), 0..=240),
            ("level_merge_distance", self.level_merge_distance.into(), 0..=10),
            ("min_merge_size", self.min_merge_size.into(), 1..=100),
            ("max_iterations", self.max_iterations.into(), 1..=10_000),
            ("shuffle_interval", self.shuffle_interval.into(), 1..=10_000),
            ("max_assignment_attempts", self.max_assignment_attempts.into(), 1..=1000),
            ("weekend_bias", self.weekend_bias.into(), scale.clone()),
            ("weekday_bias", self.weekday_bias.into(), scale.clone()),
            ("underutilized_coach_bonus", self.underutilized_coach_bonus.into(), scale.clone()),
            ("underutilized_threshold", self.underutilized_threshold.into(), 0..=100),
            ("no_turnaround_bonus", self.no_turnaround_bonus.into(), scale.clone()),
            ("diverse_class_bonus", self.diverse_class_bonus.into(), scale.clone()),
            ("same_program_penalty", self.same_program_penalty.into(), scale.clone()),
            ("peak_hours_bonus", self.peak_hours_bonus.into(), scale.clone()),
            ("good_hours_bonus", self.good_hours_bonus.into(), scale.clone()),
            ("scarcity_weight", self.scarcity_weight.into(), scale.clone()),
            ("complexity_weight", self.complexity_weight.into(), scale.clone()),
            ("size_weight", self.size_weight.into(), scale),
        ];
        for (field, value, range) in checks {
            if !range.contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }

    /// Weekly class cap for a status.
    pub fn weekly_limit(&self, status: CoachStatus) -> u32 {
        match status {
            CoachStatus::FullTime => self.full_time_weekly_max,
            CoachStatus::PartTime => self.part_time_weekly_max,
            CoachStatus::BranchManager => self.manager_weekly_max,
        }
    }

    /// Effective workload limits for a status.
    pub fn limits_for(&self, status: CoachStatus) -> WorkloadLimits {
        WorkloadLimits {
            weekday_classes: self.weekday_daily_limit,
            weekend_classes: self.weekend_daily_limit,
            weekday_minutes: self.weekday_daily_minutes,
            weekend_minutes: self.weekend_daily_minutes,
            weekly_classes: self.weekly_limit(status),
            consecutive_classes: self.consecutive_limit,
            min_break_minutes: self.min_break_minutes,
        }
    }

    /// Priority weights normalized to sum to 1; equal thirds when all are zero.
    pub fn priority_weights(&self) -> PriorityWeights {
        let total = self.scarcity_weight + self.complexity_weight + self.size_weight;
        if total == 0 {
            let third = 1.0 / 3.0;
            return PriorityWeights {
                scarcity: third,
                complexity: third,
                size: third,
            };
        }
        let total = f64::from(total);
        PriorityWeights {
            scarcity: f64::from(self.scarcity_weight) / total,
            complexity: f64::from(self.complexity_weight) / total,
            size: f64::from(self.size_weight) / total,
        }
    }
}
