//! Human-readable breakdown of a finished schedule.
//!
//! Complements [`ScheduleStatistics`](super::ScheduleStatistics) with the
//! distributions an operator looks at after a run: classes per branch,
//! level, day and time of day, the load on each coach, weekday mornings
//! where a coach repeats one program, and demand left unplaced.

use std::collections::BTreeMap;
use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use super::input::SchedulingInput;
use super::scoring::MORNING_HOURS;
use crate::models::{ClockTime, CoachId, CoachStatus, Day, RequirementKey, Schedule};

/// Afternoon starts at noon; evening at 17:00.
const EVENING: ClockTime = ClockTime::new(17, 0);

/// Classes and students in one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub classes: usize,
    pub students: u32,
}

impl Tally {
    fn add(&mut self, students: u32) {
        self.classes += 1;
        self.students += students;
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} classes, {} students", self.classes, self.students)
    }
}

/// Part of the day a class starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn of(start: ClockTime) -> Self {
        if start < ClockTime::NOON {
            TimeOfDay::Morning
        } else if start < EVENING {
            TimeOfDay::Afternoon
        } else {
            TimeOfDay::Evening
        }
    }
}

/// Load carried by one coach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachLoad {
    pub coach_id: CoachId,
    pub name: String,
    pub classes: usize,
    pub students: u32,
}

/// A weekday morning where a coach teaches one program more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRepeat {
    pub branch: String,
    pub day: Day,
    pub coach_id: CoachId,
    pub program: String,
    pub classes: usize,
}

/// Breakdown of a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSummary {
    pub total: Tally,
    pub students_required: u32,
    pub by_branch: BTreeMap<String, Tally>,
    /// Keyed by position in the level hierarchy; unknown levels sort last.
    pub by_level: Vec<(String, Tally)>,
    pub by_day: BTreeMap<Day, Tally>,
    pub by_time_of_day: BTreeMap<TimeOfDay, Tally>,
    /// Per status, busiest coach first.
    pub coach_load: BTreeMap<CoachStatus, Vec<CoachLoad>>,
    pub program_repeats: Vec<ProgramRepeat>,
    /// Requirements with students left over.
    pub remaining: BTreeMap<RequirementKey, u32>,
}

impl ScheduleSummary {
    /// Builds the breakdown of `schedule` against the demand in `input`.
    pub fn build(schedule: &Schedule, input: &SchedulingInput) -> Self {
        let facts = &input.facts;
        let mut total = Tally::default();
        let mut by_branch: BTreeMap<String, Tally> = BTreeMap::new();
        let mut levels: BTreeMap<String, Tally> = BTreeMap::new();
        let mut by_day: BTreeMap<Day, Tally> = BTreeMap::new();
        let mut by_time_of_day: BTreeMap<TimeOfDay, Tally> = BTreeMap::new();
        let mut loads: BTreeMap<CoachId, CoachLoad> = BTreeMap::new();
        let mut mornings: BTreeMap<(String, Day, CoachId, String), usize> = BTreeMap::new();

        for entry in &schedule.entries {
            let students = entry.actual_students;
            total.add(students);
            by_branch.entry(entry.branch.clone()).or_default().add(students);
            levels.entry(entry.level.clone()).or_default().add(students);
            by_day.entry(entry.day).or_default().add(students);
            by_time_of_day
                .entry(TimeOfDay::of(entry.start))
                .or_default()
                .add(students);

            let load = loads.entry(entry.coach_id).or_insert_with(|| CoachLoad {
                coach_id: entry.coach_id,
                name: entry.coach_name.clone(),
                classes: 0,
                students: 0,
            });
            load.classes += 1;
            load.students += students;

            if facts.is_weekday(entry.day) && MORNING_HOURS.contains(&entry.start.hour()) {
                let program = facts.program_of(&entry.level).to_string();
                *mornings
                    .entry((entry.branch.clone(), entry.day, entry.coach_id, program))
                    .or_insert(0) += 1;
            }
        }

        let mut by_level: Vec<(String, Tally)> = levels.into_iter().collect();
        by_level.sort_by_key(|(level, _)| facts.hierarchy_index(level).unwrap_or(usize::MAX));

        let mut coach_load: BTreeMap<CoachStatus, Vec<CoachLoad>> = BTreeMap::new();
        for load in loads.into_values() {
            let status = input
                .coach(load.coach_id)
                .map(|c| c.status)
                .or_else(|| {
                    schedule
                        .entries
                        .iter()
                        .find(|e| e.coach_id == load.coach_id)
                        .map(|e| e.coach_status)
                })
                .unwrap_or(CoachStatus::PartTime);
            coach_load.entry(status).or_default().push(load);
        }
        for group in coach_load.values_mut() {
            // stable: ties keep coach id order
            group.sort_by(|a, b| b.classes.cmp(&a.classes));
        }

        let program_repeats = mornings
            .into_iter()
            .filter(|(_, classes)| *classes >= 2)
            .map(|((branch, day, coach_id, program), classes)| ProgramRepeat {
                branch,
                day,
                coach_id,
                program,
                classes,
            })
            .collect();

        let placed = schedule.students_by_requirement();
        let remaining = input
            .enrollment()
            .into_iter()
            .filter_map(|(key, students)| {
                let left = students.saturating_sub(placed.get(&key).copied().unwrap_or(0));
                (left > 0).then_some((key, left))
            })
            .collect();

        Self {
            total,
            students_required: input.total_demand(),
            by_branch,
            by_level,
            by_day,
            by_time_of_day,
            coach_load,
            program_repeats,
            remaining,
        }
    }

    /// Writes the breakdown to the `info` log.
    pub fn log(&self) {
        info!(
            "scheduled {} of {} students in {} classes",
            self.total.students, self.students_required, self.total.classes
        );
        for (branch, tally) in &self.by_branch {
            info!("  branch {branch}: {tally}");
        }
        for (level, tally) in &self.by_level {
            info!("  level {level}: {tally}");
        }
        for (day, tally) in &self.by_day {
            info!("  {day}: {tally}");
        }
        for (part, tally) in &self.by_time_of_day {
            info!("  {part:?}: {tally}");
        }
        for (status, loads) in &self.coach_load {
            info!("  {status} coaches:");
            for load in loads {
                info!(
                    "    {} (ID {}): {} classes, {} students",
                    load.name, load.coach_id, load.classes, load.students
                );
            }
        }
        for repeat in &self.program_repeats {
            info!(
                "  coach {} repeats {} {}x on {} morning at {}",
                repeat.coach_id, repeat.program, repeat.classes, repeat.day, repeat.branch
            );
        }
        for (key, left) in &self.remaining {
            info!("  {key}: {left} students unplaced");
        }
    }
}
