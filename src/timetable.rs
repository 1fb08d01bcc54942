//! Per-branch timetable view.
//!
//! Pivots a flat list of [`ScheduledEntry`] into the nested shape used by
//! calendar renderers:
//!
//! ```text
//! branch -> { coaches: [sorted names],
//!             schedule: day -> coach -> [{ name, start_time, duration }] }
//! ```
//!
//! `start_time` is compact `HHMM` and `duration` counts 30-minute blocks.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{Day, ScheduledEntry, SLOT_MINUTES};

/// One class cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableClass {
    /// Level taught.
    pub name: String,
    /// `HHMM`.
    pub start_time: String,
    /// Length in 30-minute blocks.
    pub duration: u32,
}

/// Timetable of one branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTimetable {
    pub coaches: Vec<String>,
    pub schedule: BTreeMap<Day, BTreeMap<String, Vec<TimetableClass>>>,
}

impl BranchTimetable {
    /// Classes of a coach on a day, earliest first.
    pub fn classes(&self, day: Day, coach: &str) -> &[TimetableClass] {
        self.schedule
            .get(&day)
            .and_then(|by_coach| by_coach.get(coach))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Timetable of every branch that has a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    pub branches: BTreeMap<String, BranchTimetable>,
}

impl Timetable {
    /// Builds the view. Entries without a branch or coach name are skipped.
    pub fn from_entries(entries: &[ScheduledEntry]) -> Self {
        let mut sorted: Vec<&ScheduledEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| (e.day, e.start));

        let mut coaches: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut branches: BTreeMap<String, BranchTimetable> = BTreeMap::new();
        let mut skipped = 0usize;

        for entry in sorted {
            if entry.branch.is_empty() || entry.coach_name.is_empty() {
                skipped += 1;
                continue;
            }
            coaches
                .entry(&entry.branch)
                .or_default()
                .insert(&entry.coach_name);
            branches
                .entry(entry.branch.clone())
                .or_default()
                .schedule
                .entry(entry.day)
                .or_default()
                .entry(entry.coach_name.clone())
                .or_default()
                .push(TimetableClass {
                    name: entry.level.clone(),
                    start_time: entry.start.compact(),
                    duration: entry.duration / u32::from(SLOT_MINUTES),
                });
        }

        for (branch, names) in coaches {
            if let Some(table) = branches.get_mut(branch) {
                table.coaches = names.into_iter().map(str::to_string).collect();
            }
        }

        if skipped > 0 {
            debug!("timetable skipped {skipped} entries without branch or coach");
        }
        Self { branches }
    }

    /// The view of one branch.
    pub fn branch(&self, branch: &str) -> Option<&BranchTimetable> {
        self.branches.get(branch)
    }

    /// Number of class cells across all branches.
    pub fn class_count(&self) -> usize {
        self.branches
            .values()
            .flat_map(|b| b.schedule.values())
            .flat_map(|by_coach| by_coach.values())
            .map(Vec::len)
            .sum()
    }
}
