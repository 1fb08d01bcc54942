//! Feasible slot and candidate generation.
//!
//! Expands operating hours into aligned timeslots per level and day, tags
//! the high-demand ones, and crosses them with qualified, available
//! coaches. No conflict or workload checking happens here: whether a slot
//! can be used depends on what else is selected, which is the scheduler's
//! concern.
//!
//! # Algorithm
//!
//! 1. For each level, day, and open period, emit start times every
//!    30 minutes while `start + duration <= period end`.
//! 2. Drop weekday slots overlapping the lunch closure.
//! 3. Tag a slot popular if a popular range for its level and day
//!    encloses it.
//! 4. For each requirement, each qualified coach assigned to the branch,
//!    and each slot of matching level and duration, emit a candidate if
//!    the coach is available for that half-day.

use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::facts::{BusinessFacts, PopularRange};
use crate::models::{
    CandidateAssignment, Coach, Day, HalfDay, Requirement, RequirementKey, TimeWindow,
    SLOT_MINUTES,
};

/// A generated class slot for one level on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeslot {
    pub level: String,
    pub day: Day,
    pub window: TimeWindow,
    /// Minutes.
    pub duration: u32,
    pub period: HalfDay,
    pub is_popular: bool,
}

/// Whether `window` is a popular slot for `level` on `day`.
pub fn is_popular(level: &str, day: Day, window: &TimeWindow, popular: &[PopularRange]) -> bool {
    popular
        .iter()
        .any(|p| p.level == level && p.day == day && p.window.encloses(window))
}

/// Generates every aligned slot for every level and operating day.
pub fn generate_timeslots(facts: &BusinessFacts, popular: &[PopularRange]) -> Vec<Timeslot> {
    let mut slots = Vec::new();
    for level in &facts.levels {
        let duration = facts.duration_of(level);
        let Ok(minutes) = u16::try_from(duration) else {
            continue;
        };
        for &day in &facts.days {
            let Some(periods) = facts.operating_hours.get(&day) else {
                continue;
            };
            let weekday = facts.is_weekday(day);
            for period in periods {
                let mut start = period.start;
                while let Some(end) = start
                    .checked_plus_minutes(minutes)
                    .filter(|end| *end <= period.end)
                {
                    let window = TimeWindow::new(start, end);
                    if !(weekday && window.overlaps(&facts.lunch_break)) {
                        slots.push(Timeslot {
                            level: level.clone(),
                            day,
                            window,
                            duration,
                            period: HalfDay::of(start),
                            is_popular: is_popular(level, day, &window, popular),
                        });
                    }
                    match start.checked_plus_minutes(SLOT_MINUTES) {
                        Some(next) => start = next,
                        None => break,
                    }
                }
            }
        }
    }
    debug!(
        "generated {} timeslots ({} popular)",
        slots.len(),
        slots.iter().filter(|s| s.is_popular).count()
    );
    slots
}

/// Crosses requirements, qualified coaches, and slots into candidates.
///
/// Candidate ids are positions in the returned vector.
pub fn generate_candidates(
    facts: &BusinessFacts,
    coaches: &[Coach],
    requirements: &[Requirement],
    timeslots: &[Timeslot],
) -> Vec<CandidateAssignment> {
    let by_level: HashMap<&str, Vec<&Timeslot>> = timeslots
        .iter()
        .map(|t| (t.level.as_str(), t))
        .into_group_map();

    let mut candidates = Vec::new();
    for req in requirements {
        let Some(slots) = by_level.get(req.level.as_str()) else {
            continue;
        };
        let capacity = facts.capacity_of(&req.level);
        for coach in coaches.iter().filter(|c| c.can_teach(&req.branch, &req.level)) {
            for slot in slots.iter().filter(|s| s.duration == req.duration) {
                if !coach.availability.is_available(slot.day, slot.period) {
                    continue;
                }
                candidates.push(CandidateAssignment {
                    id: candidates.len(),
                    coach_id: coach.id,
                    coach_name: coach.name.clone(),
                    coach_status: coach.status,
                    branch: req.branch.clone(),
                    level: req.level.clone(),
                    day: slot.day,
                    start: slot.window.start,
                    end: slot.window.end,
                    duration: slot.duration,
                    period: slot.period,
                    is_popular: slot.is_popular,
                    capacity,
                });
            }
        }
    }
    debug!("generated {} candidate assignments", candidates.len());
    candidates
}

/// How much of one requirement popular candidates could seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCoverage {
    pub key: RequirementKey,
    pub demand: u32,
    pub popular_candidates: usize,
    /// Seats over all popular candidates, ignoring conflicts.
    pub popular_capacity: u32,
}

impl RequirementCoverage {
    /// Whether popular candidates alone could seat the demand.
    pub fn coverable(&self) -> bool {
        self.popular_capacity >= self.demand
    }
}

/// Upper-bound coverage potential of the popular pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageAnalysis {
    pub requirements: Vec<RequirementCoverage>,
    pub total_demand: u32,
    pub total_popular_capacity: u32,
}

impl CoverageAnalysis {
    /// Requirements the popular pool cannot fully seat.
    pub fn uncoverable(&self) -> Vec<&RequirementCoverage> {
        self.requirements.iter().filter(|r| !r.coverable()).collect()
    }
}

/// Compares demand with the seats reachable through popular candidates.
pub fn analyze_coverage(
    requirements: &[Requirement],
    candidates: &[CandidateAssignment],
) -> CoverageAnalysis {
    let popular: HashMap<RequirementKey, Vec<&CandidateAssignment>> = candidates
        .iter()
        .filter(|c| c.is_popular)
        .map(|c| (c.key(), c))
        .into_group_map();

    let rows: Vec<RequirementCoverage> = requirements
        .iter()
        .map(|req| {
            let key = req.key();
            let found = popular.get(&key).map_or(&[][..], Vec::as_slice);
            RequirementCoverage {
                demand: req.students,
                popular_candidates: found.len(),
                popular_capacity: found.iter().map(|c| c.capacity).sum(),
                key,
            }
        })
        .collect();

    let analysis = CoverageAnalysis {
        total_demand: rows.iter().map(|r| r.demand).sum(),
        total_popular_capacity: rows.iter().map(|r| r.popular_capacity).sum(),
        requirements: rows,
    };
    for row in analysis.uncoverable() {
        warn!(
            "{}: popular slots seat at most {} of {} students",
            row.key, row.popular_capacity, row.demand
        );
    }
    analysis
}
