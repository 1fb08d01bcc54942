//! Built-in priority rules.
//!
//! | Rule | Measures |
//! |------|----------|
//! | `Scarcity` | few qualified coaches or few slots |
//! | `Complexity` | position in the level hierarchy |
//! | `EnrollmentSize` | number of students waiting |
//!
//! # Score Convention
//! All rules return 0-10, higher for requirements that should go first.

use super::{PriorityContext, PriorityRule, RuleScore};
use crate::models::Requirement;

/// Enrollment at which the size score saturates.
const SIZE_SATURATION: f64 = 20.0;

/// Supply scarcity.
///
/// `min(10, 50 / max(1, coaches) + 30 / max(1, slots))`: a requirement
/// only one coach can teach, or with a single slot, goes before one with
/// many options.
#[derive(Debug, Clone, Copy)]
pub struct Scarcity;

impl PriorityRule for Scarcity {
    fn name(&self) -> &'static str {
        "SCARCITY"
    }

    fn evaluate(&self, requirement: &Requirement, context: &PriorityContext) -> RuleScore {
        let key = requirement.key();
        let coaches = context.qualified_coaches_for(&key).max(1) as f64;
        let slots = context.popular_slots_for(&key).max(1) as f64;
        (50.0 / coaches + 30.0 / slots).min(10.0)
    }

    fn description(&self) -> &'static str {
        "Coach and slot scarcity"
    }
}

/// Level complexity.
///
/// `index / len * 10` along the hierarchy; 5 for levels outside it.
#[derive(Debug, Clone, Copy)]
pub struct Complexity;

impl PriorityRule for Complexity {
    fn name(&self) -> &'static str {
        "COMPLEXITY"
    }

    fn evaluate(&self, requirement: &Requirement, context: &PriorityContext) -> RuleScore {
        let hierarchy = &context.level_hierarchy;
        match hierarchy.iter().position(|l| *l == requirement.level) {
            Some(index) => index as f64 / hierarchy.len() as f64 * 10.0,
            None => 5.0,
        }
    }

    fn description(&self) -> &'static str {
        "Level complexity"
    }
}

/// Enrollment size, saturating at 20 students.
#[derive(Debug, Clone, Copy)]
pub struct EnrollmentSize;

impl PriorityRule for EnrollmentSize {
    fn name(&self) -> &'static str {
        "SIZE"
    }

    fn evaluate(&self, requirement: &Requirement, _context: &PriorityContext) -> RuleScore {
        (f64::from(requirement.students) / SIZE_SATURATION).min(1.0) * 10.0
    }

    fn description(&self) -> &'static str {
        "Enrollment size"
    }
}
