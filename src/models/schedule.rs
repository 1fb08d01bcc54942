//! Schedule (solution) model.
//!
//! A schedule is the set of selected candidate assignments, each annotated
//! with the students actually seated in it. It may carry constraint
//! violations when it was produced outside the checked add path.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::candidate::CandidateAssignment;
use super::coach::{CoachId, CoachStatus};
use super::requirement::RequirementKey;
use super::time::{ClockTime, Day, HalfDay, TimeWindow};

/// A complete timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Selected classes.
    pub entries: Vec<ScheduledEntry>,
    /// Constraint violations detected in this schedule.
    pub violations: Vec<Violation>,
}

/// A selected class.
///
/// Seats are tracked per level in `allocations` so a merged class counts
/// each student against the requirement they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    /// Source candidate id.
    pub candidate_id: usize,
    pub coach_id: CoachId,
    pub coach_name: String,
    pub coach_status: CoachStatus,
    pub branch: String,
    /// Level the class is booked under.
    pub level: String,
    pub day: Day,
    pub start: ClockTime,
    pub end: ClockTime,
    /// Class length (minutes).
    pub duration: u32,
    pub period: HalfDay,
    pub is_popular: bool,
    pub capacity: u32,
    /// Students seated, all levels together.
    pub actual_students: u32,
    /// Seats per originating level.
    pub allocations: BTreeMap<String, u32>,
    /// Levels folded into this class. Empty unless merged.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub merged_levels: BTreeSet<String>,
}

/// A constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (coach id, branch, or requirement).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationType {
    /// More students than the level's class capacity.
    CapacityExceeded,
    /// Two classes of one coach overlap in time.
    TimeOverlap,
    /// A coach teaches at more than one branch on a day.
    MultipleBranchesPerDay,
    /// Daily class count cap exceeded.
    DailyClassLimit,
    /// Daily teaching minutes cap exceeded.
    DailyMinuteLimit,
    /// Weekly class count cap exceeded.
    WeeklyClassLimit,
    /// Too many classes in a row without a full break.
    ConsecutiveLimit,
    /// Too many concurrent classes at a branch.
    BranchSlotCapacity,
    /// More students seated than enrolled for a requirement.
    DemandExceeded,
}

impl ViolationType {
    /// Whether this is a per-coach workload cap.
    pub fn is_workload(self) -> bool {
        matches!(
            self,
            ViolationType::DailyClassLimit
                | ViolationType::DailyMinuteLimit
                | ViolationType::WeeklyClassLimit
        )
    }
}

impl ScheduledEntry {
    /// Books `students` of the candidate's own level into it.
    pub fn from_candidate(candidate: &CandidateAssignment, students: u32) -> Self {
        Self {
            candidate_id: candidate.id,
            coach_id: candidate.coach_id,
            coach_name: candidate.coach_name.clone(),
            coach_status: candidate.coach_status,
            branch: candidate.branch.clone(),
            level: candidate.level.clone(),
            day: candidate.day,
            start: candidate.start,
            end: candidate.end,
            duration: candidate.duration,
            period: candidate.period,
            is_popular: candidate.is_popular,
            capacity: candidate.capacity,
            actual_students: students,
            allocations: BTreeMap::from([(candidate.level.clone(), students)]),
            merged_levels: BTreeSet::new(),
        }
    }

    /// The class time window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// Tops up the class with `seats` students of `level`.
    pub fn absorb(&mut self, level: &str, seats: u32) {
        *self.allocations.entry(level.to_string()).or_insert(0) += seats;
        self.actual_students += seats;
        if level != self.level {
            self.merged_levels.insert(self.level.clone());
            self.merged_levels.insert(level.to_string());
        }
    }

    /// Replaces the seat split with a multi-level allocation.
    pub fn set_multi_level(&mut self, shares: &[(&str, u32)]) {
        self.allocations = shares
            .iter()
            .filter(|(_, seats)| *seats > 0)
            .map(|(level, seats)| (level.to_string(), *seats))
            .collect();
        self.merged_levels = shares.iter().map(|(level, _)| level.to_string()).collect();
        self.actual_students = shares.iter().map(|(_, seats)| seats).sum();
    }

    /// Whether more than one level shares this class.
    pub fn is_merged(&self) -> bool {
        self.merged_levels.len() > 1
    }

    /// Merged levels joined with `+` (`"L1+L2"`), if merged.
    pub fn merged_with(&self) -> Option<String> {
        self.is_merged()
            .then(|| self.merged_levels.iter().cloned().collect::<Vec<_>>().join("+"))
    }

    /// Seats held for `level`.
    pub fn students_for(&self, level: &str) -> u32 {
        self.allocations.get(level).copied().unwrap_or(0)
    }

    /// Unused seats.
    pub fn spare_seats(&self, capacity: u32) -> u32 {
        capacity.saturating_sub(self.actual_students)
    }
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }

    /// Creates a capacity exceeded violation.
    pub fn capacity_exceeded(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::CapacityExceeded, entity_id, message, 90)
    }

    /// Creates a time overlap violation.
    pub fn time_overlap(coach_id: CoachId, message: impl Into<String>) -> Self {
        Self::new(ViolationType::TimeOverlap, coach_id.to_string(), message, 100)
    }

    /// Creates a multiple-branches-per-day violation.
    pub fn multiple_branches(coach_id: CoachId, message: impl Into<String>) -> Self {
        Self::new(
            ViolationType::MultipleBranchesPerDay,
            coach_id.to_string(),
            message,
            80,
        )
    }

    /// Creates a workload cap violation.
    pub fn workload(
        violation_type: ViolationType,
        coach_id: CoachId,
        message: impl Into<String>,
    ) -> Self {
        Self::new(violation_type, coach_id.to_string(), message, 70)
    }

    /// Creates a consecutive-run violation.
    pub fn consecutive(coach_id: CoachId, message: impl Into<String>) -> Self {
        Self::new(
            ViolationType::ConsecutiveLimit,
            coach_id.to_string(),
            message,
            60,
        )
    }

    /// Creates a branch slot capacity violation.
    pub fn branch_slot(branch: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::BranchSlotCapacity, branch, message, 85)
    }

    /// Creates a demand exceeded violation.
    pub fn demand_exceeded(key: &RequirementKey, message: impl Into<String>) -> Self {
        Self::new(ViolationType::DemandExceeded, key.to_string(), message, 50)
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: ScheduledEntry) {
        self.entries.push(entry);
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether the schedule has no violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.entries.len()
    }

    /// Students seated across all classes.
    pub fn total_students(&self) -> u32 {
        self.entries.iter().map(|e| e.actual_students).sum()
    }

    /// Seats per requirement, counting merged seats against their own level.
    pub fn students_by_requirement(&self) -> BTreeMap<RequirementKey, u32> {
        let mut totals = BTreeMap::new();
        for entry in &self.entries {
            for (level, seats) in &entry.allocations {
                *totals
                    .entry(RequirementKey::new(&entry.branch, level))
                    .or_insert(0) += seats;
            }
        }
        totals
    }

    /// Sorts entries by day, then start time, then branch.
    pub fn sort_chronologically(&mut self) {
        self.entries.sort_by(|a, b| {
            (a.day, a.start, &a.branch).cmp(&(b.day, b.start, &b.branch))
        });
    }
}
