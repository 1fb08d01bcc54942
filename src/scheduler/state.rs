//! Per-iteration scheduling state.
//!
//! Every tracker is a typed map keyed by its composite key. Reads of a key
//! that was never written return the "nothing scheduled yet" default and
//! never insert.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{ClockTime, CoachId, Day, RequirementKey, ScheduledEntry, TimeWindow};

/// One coach's bookings on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoachDay {
    /// Booked windows, in booking order.
    pub windows: Vec<TimeWindow>,
    pub minutes: u32,
    /// The branch the coach is locked to for the day.
    pub branch: Option<String>,
}

/// A weekday-morning class, tracked for program-adjacency scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorningClass {
    pub branch: String,
    pub program: String,
    pub hour: u16,
}

/// Mutable state of one iteration.
#[derive(Debug, Clone, Default)]
pub struct SchedulingState {
    entries: Vec<ScheduledEntry>,
    coach_days: HashMap<(CoachId, Day), CoachDay>,
    branch_usage: HashMap<String, HashMap<(Day, ClockTime), u32>>,
    unmet: BTreeMap<RequirementKey, u32>,
    weekly_classes: HashMap<CoachId, u32>,
    levels_taught: HashMap<CoachId, BTreeSet<String>>,
    morning_classes: HashMap<(CoachId, Day), Vec<MorningClass>>,
}

impl SchedulingState {
    /// Fresh state with the full demand unmet.
    pub fn new(enrollment: &BTreeMap<RequirementKey, u32>) -> Self {
        Self {
            unmet: enrollment.clone(),
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &[ScheduledEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ScheduledEntry> {
        self.entries
    }

    /// Bookings of a coach on a day, if any.
    pub fn coach_day(&self, coach: CoachId, day: Day) -> Option<&CoachDay> {
        self.coach_days.get(&(coach, day))
    }

    pub fn daily_classes(&self, coach: CoachId, day: Day) -> u32 {
        self.coach_day(coach, day)
            .map_or(0, |d| d.windows.len() as u32)
    }

    pub fn daily_minutes(&self, coach: CoachId, day: Day) -> u32 {
        self.coach_day(coach, day).map_or(0, |d| d.minutes)
    }

    pub fn branch_lock(&self, coach: CoachId, day: Day) -> Option<&str> {
        self.coach_day(coach, day).and_then(|d| d.branch.as_deref())
    }

    pub fn windows(&self, coach: CoachId, day: Day) -> &[TimeWindow] {
        self.coach_day(coach, day)
            .map_or(&[][..], |d| d.windows.as_slice())
    }

    /// Classes running at a branch in the 30-minute slot starting at `slot`.
    pub fn slot_usage(&self, branch: &str, day: Day, slot: ClockTime) -> u32 {
        self.branch_usage
            .get(branch)
            .and_then(|slots| slots.get(&(day, slot)))
            .copied()
            .unwrap_or(0)
    }

    pub fn weekly_classes(&self, coach: CoachId) -> u32 {
        self.weekly_classes.get(&coach).copied().unwrap_or(0)
    }

    /// Levels a coach already teaches; `None` before their first class.
    pub fn levels_taught(&self, coach: CoachId) -> Option<&BTreeSet<String>> {
        self.levels_taught.get(&coach)
    }

    /// Weekday-morning classes of a coach on a day at a branch.
    pub fn morning_classes<'a>(
        &'a self,
        coach: CoachId,
        day: Day,
        branch: &'a str,
    ) -> impl Iterator<Item = &'a MorningClass> + 'a {
        self.morning_classes
            .get(&(coach, day))
            .into_iter()
            .flatten()
            .filter(move |m| m.branch == branch)
    }

    /// Students still unplaced for a requirement.
    pub fn unmet(&self, key: &RequirementKey) -> u32 {
        self.unmet.get(key).copied().unwrap_or(0)
    }

    /// Requirements with unplaced students, in key order.
    pub fn gaps(&self) -> Vec<(RequirementKey, u32)> {
        self.unmet
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(k, n)| (k.clone(), *n))
            .collect()
    }

    /// Unplaced students over all requirements.
    pub fn total_unmet(&self) -> u32 {
        self.unmet.values().sum()
    }

    /// Students placed so far.
    pub fn total_students(&self) -> u32 {
        self.entries.iter().map(|e| e.actual_students).sum()
    }

    /// Marks `students` of a requirement as placed.
    pub fn reduce_unmet(&mut self, key: &RequirementKey, students: u32) {
        if let Some(n) = self.unmet.get_mut(key) {
            *n = n.saturating_sub(students);
        }
    }

    /// Books a new class and updates every tracker.
    pub fn record(&mut self, entry: ScheduledEntry, morning: Option<MorningClass>) {
        let coach = entry.coach_id;
        let window = entry.window();

        let day = self.coach_days.entry((coach, entry.day)).or_default();
        day.windows.push(window);
        day.minutes += entry.duration;
        day.branch.get_or_insert_with(|| entry.branch.clone());

        let usage = self.branch_usage.entry(entry.branch.clone()).or_default();
        for slot in window.slots() {
            *usage.entry((entry.day, slot)).or_insert(0) += 1;
        }

        *self.weekly_classes.entry(coach).or_insert(0) += 1;
        self.levels_taught
            .entry(coach)
            .or_default()
            .insert(entry.level.clone());
        if let Some(m) = morning {
            self.morning_classes
                .entry((coach, entry.day))
                .or_default()
                .push(m);
        }
        self.entries.push(entry);
    }

    /// Tops up an existing class with students of `level`.
    ///
    /// Does not touch unmet demand; callers reduce it separately.
    pub fn absorb(&mut self, index: usize, level: &str, seats: u32) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.absorb(level, seats);
        }
    }

    /// Replaces the seat split of an existing class.
    pub fn set_multi_level(&mut self, index: usize, shares: &[(&str, u32)]) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.set_multi_level(shares);
        }
    }
}
