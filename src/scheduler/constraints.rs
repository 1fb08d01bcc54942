//! Hard-constraint checks for adding one class.
//!
//! Every check is a pure function of the proposed candidate and the
//! current state; nothing is written until the caller accepts.
//!
//! # Checks (in order)
//! 1. Seats within the level's class capacity
//! 2. Coach available for the day and half-day
//! 3. No overlap with the coach's classes that day
//! 4. Same branch as the coach's other classes that day
//! 5. Daily class cap
//! 6. Daily minute cap
//! 7. Weekly class cap
//! 8. Consecutive-run limit
//! 9. Branch concurrency in every 30-minute slot the class touches

use std::collections::HashMap;
use std::fmt;

use super::state::SchedulingState;
use crate::config::EngineConfig;
use crate::facts::BusinessFacts;
use crate::models::{CandidateAssignment, Coach, CoachId, TimeWindow};

/// Why a candidate cannot be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    UnknownCoach,
    OverCapacity,
    Unavailable,
    TimeOverlap,
    BranchLocked,
    DailyClassLimit,
    DailyMinuteLimit,
    WeeklyClassLimit,
    ConsecutiveLimit,
    BranchSlotFull,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::UnknownCoach => "unknown coach",
            Rejection::OverCapacity => "over class capacity",
            Rejection::Unavailable => "coach unavailable",
            Rejection::TimeOverlap => "time overlap",
            Rejection::BranchLocked => "coach locked to another branch",
            Rejection::DailyClassLimit => "daily class limit",
            Rejection::DailyMinuteLimit => "daily minute limit",
            Rejection::WeeklyClassLimit => "weekly class limit",
            Rejection::ConsecutiveLimit => "consecutive class limit",
            Rejection::BranchSlotFull => "branch slot full",
        };
        f.write_str(text)
    }
}

/// Length of the longest run of classes separated by less than
/// `min_break` minutes.
pub fn longest_run(windows: &[TimeWindow], min_break: u32) -> u32 {
    let mut sorted = windows.to_vec();
    sorted.sort_by_key(|w| w.start);
    let mut longest = u32::from(!sorted.is_empty());
    let mut run = 1;
    for pair in sorted.windows(2) {
        let gap = pair[0].end.minutes_until(pair[1].start);
        if gap < min_break as i32 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}

/// Validates candidate adds against the hard constraints.
#[derive(Debug)]
pub struct ConstraintChecker<'a> {
    facts: &'a BusinessFacts,
    config: &'a EngineConfig,
    coaches: HashMap<CoachId, &'a Coach>,
}

impl<'a> ConstraintChecker<'a> {
    pub fn new(facts: &'a BusinessFacts, config: &'a EngineConfig, coaches: &'a [Coach]) -> Self {
        Self {
            facts,
            config,
            coaches: coaches.iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Checks the slot itself: everything except class size.
    pub fn check_slot(
        &self,
        candidate: &CandidateAssignment,
        state: &SchedulingState,
    ) -> Result<(), Rejection> {
        let coach = self
            .coaches
            .get(&candidate.coach_id)
            .ok_or(Rejection::UnknownCoach)?;
        let (id, day) = (candidate.coach_id, candidate.day);

        if !coach.availability.is_available(day, candidate.period) {
            return Err(Rejection::Unavailable);
        }

        let window = candidate.window();
        let booked = state.windows(id, day);
        if booked.iter().any(|w| w.overlaps(&window)) {
            return Err(Rejection::TimeOverlap);
        }

        if state
            .branch_lock(id, day)
            .is_some_and(|b| b != candidate.branch)
        {
            return Err(Rejection::BranchLocked);
        }

        let limits = self.config.limits_for(coach.status);
        let weekend = self.facts.is_weekend(day);
        if state.daily_classes(id, day) >= limits.daily_classes(weekend) {
            return Err(Rejection::DailyClassLimit);
        }
        if state.daily_minutes(id, day) + candidate.duration > limits.daily_minutes(weekend) {
            return Err(Rejection::DailyMinuteLimit);
        }
        if state.weekly_classes(id) >= limits.weekly_classes {
            return Err(Rejection::WeeklyClassLimit);
        }

        let mut windows = booked.to_vec();
        windows.push(window);
        if longest_run(&windows, limits.min_break_minutes) > limits.consecutive_classes {
            return Err(Rejection::ConsecutiveLimit);
        }

        let branch_limit = self.facts.branch_limit(&candidate.branch);
        if window
            .slots()
            .any(|slot| state.slot_usage(&candidate.branch, day, slot) >= branch_limit)
        {
            return Err(Rejection::BranchSlotFull);
        }

        Ok(())
    }

    /// Checks a class of `students` in the candidate slot.
    pub fn check(
        &self,
        candidate: &CandidateAssignment,
        students: u32,
        state: &SchedulingState,
    ) -> Result<(), Rejection> {
        if students > self.facts.capacity_of(&candidate.level) {
            return Err(Rejection::OverCapacity);
        }
        self.check_slot(candidate, state)
    }

    /// Whether the slot is usable at all.
    pub fn admits(&self, candidate: &CandidateAssignment, state: &SchedulingState) -> bool {
        self.check_slot(candidate, state).is_ok()
    }

    /// Whether the coach has reached their weekly cap.
    pub fn at_weekly_limit(&self, coach: &Coach, state: &SchedulingState) -> bool {
        state.weekly_classes(coach.id) >= self.config.weekly_limit(coach.status)
    }
}
