//! Input and schedule validation.
//!
//! [`validate_input`] checks the structural integrity of a scheduling
//! input before any iteration runs. Detects:
//! - Duplicate coach IDs
//! - Requirements with no students
//! - Candidates referencing unknown coaches
//! - Candidates whose coach is not qualified or assigned for them
//! - Candidates with an empty or inverted time window
//!
//! [`validate_schedule`] re-checks a finished schedule against every hard
//! constraint and lists the violations. It is a pure function of its
//! arguments, so running it twice yields the same list.

use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;

use crate::config::EngineConfig;
use crate::models::{
    ClockTime, CoachId, CoachStatus, Day, RequirementKey, ScheduledEntry, TimeWindow, Violation,
    ViolationType,
};
use crate::scheduler::{longest_run, SchedulingInput};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two coaches share the same ID.
    DuplicateId,
    /// A requirement has no students.
    ZeroDemand,
    /// A candidate references a coach that doesn't exist.
    InvalidCoachReference,
    /// A candidate's coach cannot teach its level at its branch.
    UnqualifiedCandidate,
    /// A candidate ends at or before its start.
    InvalidTimeWindow,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a scheduling input.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &SchedulingInput) -> ValidationResult {
    let mut errors = Vec::new();

    let mut coaches = HashMap::new();
    for coach in &input.coaches {
        if coaches.insert(coach.id, coach).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate coach ID: {}", coach.id),
            ));
        }
    }

    for req in &input.requirements {
        if req.students == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDemand,
                format!("Requirement '{}' has no students", req.key()),
            ));
        }
    }

    for cand in &input.candidates {
        match coaches.get(&cand.coach_id) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCoachReference,
                format!(
                    "Candidate #{} references unknown coach {}",
                    cand.id, cand.coach_id
                ),
            )),
            Some(coach) if !coach.can_teach(&cand.branch, &cand.level) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnqualifiedCandidate,
                    format!(
                        "Candidate #{}: coach {} cannot teach {} at {}",
                        cand.id, cand.coach_id, cand.level, cand.branch
                    ),
                ))
            }
            Some(_) => {}
        }
        if cand.end <= cand.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeWindow,
                format!(
                    "Candidate #{} ends at {} before it starts at {}",
                    cand.id, cand.end, cand.start
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a schedule against every hard constraint.
///
/// Checks, in order:
/// 1. Class size within the level's capacity
/// 2. Per coach and day: overlaps, branches, class count, minutes,
///    consecutive runs
/// 3. Per coach: weekly class count
/// 4. Per branch, day and 30-minute slot: concurrent classes
/// 5. Per requirement: seats within demand
pub fn validate_schedule(
    entries: &[ScheduledEntry],
    input: &SchedulingInput,
    config: &EngineConfig,
) -> Vec<Violation> {
    let facts = &input.facts;
    let statuses: HashMap<CoachId, CoachStatus> =
        input.coaches.iter().map(|c| (c.id, c.status)).collect();
    let status_of = |entry: &ScheduledEntry| {
        statuses
            .get(&entry.coach_id)
            .copied()
            .unwrap_or(entry.coach_status)
    };
    let mut violations = Vec::new();

    for entry in entries {
        let capacity = facts.capacity_of(&entry.level);
        if entry.actual_students > capacity {
            violations.push(Violation::capacity_exceeded(
                format!("{} {} {}", entry.branch, entry.level, entry.day),
                format!(
                    "{} students in a {} class of capacity {}",
                    entry.actual_students, entry.level, capacity
                ),
            ));
        }
    }

    let mut by_coach_day: BTreeMap<(CoachId, Day), Vec<&ScheduledEntry>> = BTreeMap::new();
    for entry in entries {
        by_coach_day
            .entry((entry.coach_id, entry.day))
            .or_default()
            .push(entry);
    }

    for ((coach, day), day_entries) in &by_coach_day {
        let (coach, day) = (*coach, *day);
        let limits = config.limits_for(status_of(day_entries[0]));
        let weekend = facts.is_weekend(day);

        for (a, b) in day_entries.iter().tuple_combinations() {
            if a.window().overlaps(&b.window()) {
                violations.push(Violation::time_overlap(
                    coach,
                    format!("{} {} overlaps {}", day, a.window(), b.window()),
                ));
            }
        }

        let branches: Vec<&str> = day_entries
            .iter()
            .map(|e| e.branch.as_str())
            .unique()
            .collect();
        if branches.len() > 1 {
            violations.push(Violation::multiple_branches(
                coach,
                format!("{}: {}", day, branches.join(", ")),
            ));
        }

        let classes = day_entries.len() as u32;
        if classes > limits.daily_classes(weekend) {
            violations.push(Violation::workload(
                ViolationType::DailyClassLimit,
                coach,
                format!(
                    "{}: {} classes, limit {}",
                    day,
                    classes,
                    limits.daily_classes(weekend)
                ),
            ));
        }

        let minutes: u32 = day_entries.iter().map(|e| e.duration).sum();
        if minutes > limits.daily_minutes(weekend) {
            violations.push(Violation::workload(
                ViolationType::DailyMinuteLimit,
                coach,
                format!(
                    "{}: {} minutes, limit {}",
                    day,
                    minutes,
                    limits.daily_minutes(weekend)
                ),
            ));
        }

        let windows: Vec<TimeWindow> = day_entries.iter().map(|e| e.window()).collect();
        let run = longest_run(&windows, limits.min_break_minutes);
        if run > limits.consecutive_classes {
            violations.push(Violation::consecutive(
                coach,
                format!(
                    "{}: {} classes in a row, limit {}",
                    day, run, limits.consecutive_classes
                ),
            ));
        }
    }

    let mut weekly: BTreeMap<CoachId, (u32, &ScheduledEntry)> = BTreeMap::new();
    for entry in entries {
        weekly.entry(entry.coach_id).or_insert((0, entry)).0 += 1;
    }
    for (coach, (count, entry)) in weekly {
        let limit = config.weekly_limit(status_of(entry));
        if count > limit {
            violations.push(Violation::workload(
                ViolationType::WeeklyClassLimit,
                coach,
                format!("{} classes this week, limit {}", count, limit),
            ));
        }
    }

    let mut usage: BTreeMap<(&str, Day, ClockTime), u32> = BTreeMap::new();
    for entry in entries {
        for slot in entry.window().slots() {
            *usage.entry((entry.branch.as_str(), entry.day, slot)).or_insert(0) += 1;
        }
    }
    for ((branch, day, slot), count) in usage {
        let limit = facts.branch_limit(branch);
        if count > limit {
            violations.push(Violation::branch_slot(
                branch,
                format!("{} {}: {} classes, limit {}", day, slot, count, limit),
            ));
        }
    }

    let enrollment = input.enrollment();
    let mut seated: BTreeMap<RequirementKey, u32> = BTreeMap::new();
    for entry in entries {
        for (level, seats) in &entry.allocations {
            *seated
                .entry(RequirementKey::new(&entry.branch, level))
                .or_insert(0) += seats;
        }
    }
    for (key, students) in seated {
        let demand = enrollment.get(&key).copied().unwrap_or(0);
        if students > demand {
            violations.push(Violation::demand_exceeded(
                &key,
                format!("{} students seated, {} enrolled", students, demand),
            ));
        }
    }

    violations
}

/// Violation counts by type.
pub fn count_by_type(violations: &[Violation]) -> BTreeMap<ViolationType, usize> {
    violations.iter().map(|v| v.violation_type).counts().into_iter().collect()
}

/// Coaches with at least one violation.
pub fn violating_coaches(violations: &[Violation]) -> HashSet<CoachId> {
    violations
        .iter()
        .filter(|v| {
            !matches!(
                v.violation_type,
                ViolationType::CapacityExceeded
                    | ViolationType::BranchSlotCapacity
                    | ViolationType::DemandExceeded
            )
        })
        .filter_map(|v| v.entity_id.parse().ok())
        .collect()
}

/// Totals reported for one batch of violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationSummary {
    pub total: usize,
    /// Daily class, daily minute and weekly class caps.
    pub workload: usize,
    pub coaches: usize,
    pub by_type: BTreeMap<ViolationType, usize>,
}

impl ViolationSummary {
    pub fn of(violations: &[Violation]) -> Self {
        let by_type = count_by_type(violations);
        let workload = by_type
            .iter()
            .filter(|(kind, _)| kind.is_workload())
            .map(|(_, n)| n)
            .sum();
        Self {
            total: violations.len(),
            workload,
            coaches: violating_coaches(violations).len(),
            by_type,
        }
    }
}
