//! Timetabling domain models.
//!
//! Provides the data types shared by fact extraction, slot generation,
//! and the scheduler.
//!
//! # Domain Mappings
//!
//! | coach-roster | Scheduling theory |
//! |--------------|-------------------|
//! | Coach | Renewable resource with skills and calendar |
//! | Requirement | Demand to be covered by one or more jobs |
//! | CandidateAssignment | Feasible resource × time-slot pairing |
//! | ScheduledEntry | Selected job with its load |
//! | Schedule | Solution |

mod candidate;
mod coach;
mod requirement;
mod schedule;
mod time;

pub use candidate::CandidateAssignment;
pub use coach::{Availability, Coach, CoachId, CoachStatus, DayAvailability, WorkloadLimits};
pub use requirement::{Requirement, RequirementKey};
pub use schedule::{Schedule, ScheduledEntry, Violation, ViolationType};
pub use time::{ClockTime, Day, HalfDay, TimeParseError, TimeWindow, MINUTES_PER_DAY, SLOT_MINUTES};
