//! Requirement priority rules and a weighted rule engine.
//!
//! Decides the order in which requirements are served by the systematic
//! phase. Each rule scores a requirement on a 0-10 scale; the engine
//! combines rule scores with normalized weights.
//!
//! # Usage
//!
//! ```
//! use coach_roster::config::EngineConfig;
//! use coach_roster::dispatching::{PriorityContext, RuleEngine};
//! use coach_roster::models::Requirement;
//!
//! let engine = RuleEngine::from_weights(EngineConfig::default().priority_weights());
//! let context = PriorityContext::default();
//! let reqs = vec![
//!     Requirement::new("BB", "L1", 4, 8, 90),
//!     Requirement::new("BB", "L2", 30, 9, 90),
//! ];
//! let order = engine.sort_indices(&reqs, &context);
//! assert_eq!(order[0], 1); // larger enrollment first, all else equal
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::PriorityContext;
pub use engine::RuleEngine;

use crate::models::Requirement;
use std::fmt::Debug;

/// Score returned by a priority rule, on a 0-10 scale.
///
/// Higher scores = higher priority (served first).
pub type RuleScore = f64;

/// A rule that rates how urgently a requirement should be served.
///
/// # Score Convention
/// **Higher score = higher priority.** Rules return values in `0.0..=10.0`.
pub trait PriorityRule: Send + Sync + Debug {
    /// Rule name (e.g., "SCARCITY").
    fn name(&self) -> &'static str;

    /// Rates a requirement given the priority context.
    fn evaluate(&self, requirement: &Requirement, context: &PriorityContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
