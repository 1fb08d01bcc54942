//! Coach-to-timeslot roster engine for multi-branch class programs.
//!
//! Turns raw enrollment, roster, off-day and popular-slot records into a
//! weekly class schedule that assigns qualified coaches to time slots at
//! their branches without breaking workload or branch limits.
//!
//! # Modules
//!
//! - **`facts`**: Fact Extractor; raw records to business facts, coaches
//!   and requirements
//! - **`feasibility`**: Feasibility Generator; 30-minute timeslots and
//!   feasible (coach, branch, level, slot) candidates
//! - **`dispatching`**: Requirement priority rules and a weighted rule engine
//! - **`scheduler`**: Six-phase greedy engine with seeded restarts, KPIs
//!   and a run summary
//! - **`validation`**: Input integrity and post-hoc schedule validation
//! - **`timetable`**: Per-branch/day/coach pivot of a schedule
//! - **`models`**: Domain types: `Coach`, `Requirement`,
//!   `CandidateAssignment`, `ScheduledEntry`, `Schedule`, time primitives
//! - **`config`**, **`error`**: Engine tunables and error types
//!
//! # Pipeline
//!
//! ```text
//! RawData -> facts::extract -> feasibility::generate_* -> PhasedScheduler::run
//!         -> ScheduleResult { schedule, statistics } -> Timetable
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod facts;
pub mod feasibility;
pub mod models;
pub mod scheduler;
pub mod timetable;
pub mod validation;
