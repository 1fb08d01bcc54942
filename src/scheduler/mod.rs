//! Phased greedy scheduler and schedule evaluation.
//!
//! Assigns classes to coaches from the feasible candidate pool in six
//! phases, each only adding to the state left by the previous one:
//!
//! | Phase | Goal |
//! |-------|------|
//! | Systematic | Book every requirement up to its demand, priority order |
//! | Fill gaps | Revisit requirements smallest gap first |
//! | Merge into existing | Seat leftovers in spare seats of adjacent levels |
//! | Merge levels | Open one class for two small adjacent-level gaps |
//! | Exhaustive | One more class per coach and day where demand remains |
//! | Maximize | Keep adding until nothing fits |
//!
//! The whole pass is restarted with a seeded shuffle of the pool and
//! coach order; the best valid result wins. When no valid result
//! exists, a conservative one-class-per-requirement fallback is used.
//!
//! # Algorithm
//!
//! Every phase is greedy: for a requirement it scores each admissible
//! candidate with [`CandidateScorer`] and books the best. Admission is
//! decided by [`ConstraintChecker`], which applies the same limits the
//! post-run validator checks.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 14
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod constraints;
mod input;
mod kpi;
mod phased;
mod phases;
mod scoring;
mod state;
mod summary;

pub use constraints::{longest_run, ConstraintChecker, Rejection};
pub use input::SchedulingInput;
pub use kpi::{ScheduleStatistics, StatusUtilization};
pub use phased::{PhasedScheduler, RequirementAnalysis, ScheduleResult};
pub use phases::{distribute_seats, Phase, PhaseReport, PhaseRunner};
pub use scoring::CandidateScorer;
pub use state::{CoachDay, MorningClass, SchedulingState};
pub use summary::{CoachLoad, ProgramRepeat, ScheduleSummary, Tally, TimeOfDay};
