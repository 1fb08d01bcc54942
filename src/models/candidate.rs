//! Candidate assignment model.

use serde::{Deserialize, Serialize};

use super::coach::{CoachId, CoachStatus};
use super::requirement::RequirementKey;
use super::time::{ClockTime, Day, HalfDay, TimeWindow};

/// A feasible (coach, branch, level, day, slot) tuple.
///
/// "This coach could teach this class at this time." Feasible in
/// isolation only; conflicts with other selected classes are checked by
/// the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAssignment {
    /// Position in the generated pool.
    pub id: usize,
    pub coach_id: CoachId,
    pub coach_name: String,
    pub coach_status: CoachStatus,
    pub branch: String,
    pub level: String,
    pub day: Day,
    pub start: ClockTime,
    pub end: ClockTime,
    /// Class length (minutes).
    pub duration: u32,
    pub period: HalfDay,
    /// Slot is flagged as high-demand for this level and day.
    pub is_popular: bool,
    /// Max students for this level.
    pub capacity: u32,
}

impl CandidateAssignment {
    /// The class time window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// The (branch, level) this candidate serves.
    pub fn key(&self) -> RequirementKey {
        RequirementKey::new(&self.branch, &self.level)
    }
}
