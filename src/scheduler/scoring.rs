//! Candidate scoring.
//!
//! Scores are additive; higher is better. Used to rank admissible
//! candidates in the systematic and gap-filling phases.
//!
//! | Term | Condition |
//! |------|-----------|
//! | peak / good hours | start hour in 10-15 / 9-17 |
//! | day-type bias | weekend or weekday |
//! | underutilized | full-time coach below the weekly threshold |
//! | no turnaround | touches another class of the coach within 5 min |
//! | same program | weekday morning next to a same-family class (penalty) |
//! | diverse | level new to a coach who already teaches |
//! | capacity | seats x 2 |

use std::ops::RangeInclusive;

use super::state::{MorningClass, SchedulingState};
use crate::config::EngineConfig;
use crate::facts::BusinessFacts;
use crate::models::{CandidateAssignment, CoachStatus};

const CAPACITY_MULTIPLIER: f64 = 2.0;
/// Minutes between classes still counted as back to back.
const TURNAROUND_TOLERANCE: i32 = 5;
const PEAK_HOURS: RangeInclusive<u16> = 10..=15;
const GOOD_HOURS: RangeInclusive<u16> = 9..=17;
pub(super) const MORNING_HOURS: RangeInclusive<u16> = 9..=11;

/// Scores candidates against the current state.
#[derive(Debug, Clone, Copy)]
pub struct CandidateScorer<'a> {
    facts: &'a BusinessFacts,
    config: &'a EngineConfig,
}

impl<'a> CandidateScorer<'a> {
    pub fn new(facts: &'a BusinessFacts, config: &'a EngineConfig) -> Self {
        Self { facts, config }
    }

    /// Score of adding `candidate` to `state`.
    pub fn score(&self, candidate: &CandidateAssignment, state: &SchedulingState) -> f64 {
        let config = self.config;
        let mut score = 0.0;

        let hour = candidate.start.hour();
        if PEAK_HOURS.contains(&hour) {
            score += f64::from(config.peak_hours_bonus);
        } else if GOOD_HOURS.contains(&hour) {
            score += f64::from(config.good_hours_bonus);
        }

        score += f64::from(if self.facts.is_weekend(candidate.day) {
            config.weekend_bias
        } else {
            config.weekday_bias
        });

        if candidate.coach_status == CoachStatus::FullTime
            && state.weekly_classes(candidate.coach_id) < config.underutilized_threshold
        {
            score += f64::from(config.underutilized_coach_bonus);
        }

        if self.is_back_to_back(candidate, state) {
            score += f64::from(config.no_turnaround_bonus);
        }

        if self.repeats_program(candidate, state) {
            score -= f64::from(config.same_program_penalty);
        }

        if state
            .levels_taught(candidate.coach_id)
            .is_some_and(|levels| !levels.contains(&candidate.level))
        {
            score += f64::from(config.diverse_class_bonus);
        }

        score + f64::from(candidate.capacity) * CAPACITY_MULTIPLIER
    }

    /// Whether the candidate starts or ends within the tolerance of
    /// another class of the coach that day.
    pub fn is_back_to_back(&self, candidate: &CandidateAssignment, state: &SchedulingState) -> bool {
        state
            .windows(candidate.coach_id, candidate.day)
            .iter()
            .any(|w| {
                w.end.minutes_until(candidate.start).abs() <= TURNAROUND_TOLERANCE
                    || candidate.end.minutes_until(w.start).abs() <= TURNAROUND_TOLERANCE
            })
    }

    /// Whether a weekday-morning candidate sits within an hour of a
    /// same-program morning class of the coach at the branch.
    pub fn repeats_program(&self, candidate: &CandidateAssignment, state: &SchedulingState) -> bool {
        let hour = candidate.start.hour();
        if !self.facts.is_weekday(candidate.day) || !MORNING_HOURS.contains(&hour) {
            return false;
        }
        let program = self.facts.program_of(&candidate.level);
        state
            .morning_classes(candidate.coach_id, candidate.day, &candidate.branch)
            .any(|m| m.program == program && m.hour.abs_diff(hour) <= 1)
    }

    /// Morning record to keep for a newly booked candidate.
    pub fn morning_class(&self, candidate: &CandidateAssignment) -> Option<MorningClass> {
        let hour = candidate.start.hour();
        (self.facts.is_weekday(candidate.day) && MORNING_HOURS.contains(&hour)).then(|| {
            MorningClass {
                branch: candidate.branch.clone(),
                program: self.facts.program_of(&candidate.level).to_string(),
                hour,
            }
        })
    }
}
