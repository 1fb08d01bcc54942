//! Context for requirement priority rules.

use std::collections::HashMap;

use crate::models::{CandidateAssignment, Coach, Requirement, RequirementKey};

/// Supply-side facts the priority rules look at.
///
/// Missing keys count as zero.
#[derive(Debug, Clone, Default)]
pub struct PriorityContext {
    /// Coaches able to teach each requirement.
    pub qualified_coaches: HashMap<RequirementKey, usize>,
    /// Pool candidates available to each requirement.
    pub popular_slots: HashMap<RequirementKey, usize>,
    /// Level progression, easiest first.
    pub level_hierarchy: Vec<String>,
}

impl PriorityContext {
    /// Creates a context for a level hierarchy.
    pub fn new(level_hierarchy: Vec<String>) -> Self {
        Self {
            level_hierarchy,
            ..Default::default()
        }
    }

    /// Counts qualified coaches and pool candidates per requirement.
    pub fn build<'a>(
        requirements: &[Requirement],
        coaches: &[Coach],
        pool: impl IntoIterator<Item = &'a CandidateAssignment>,
        level_hierarchy: Vec<String>,
    ) -> Self {
        let mut context = Self::new(level_hierarchy);
        for req in requirements {
            let qualified = coaches
                .iter()
                .filter(|c| c.can_teach(&req.branch, &req.level))
                .count();
            context.qualified_coaches.insert(req.key(), qualified);
        }
        for candidate in pool {
            *context.popular_slots.entry(candidate.key()).or_insert(0) += 1;
        }
        context
    }

    /// Sets the qualified coach count for a requirement.
    pub fn with_qualified_coaches(mut self, key: RequirementKey, count: usize) -> Self {
        self.qualified_coaches.insert(key, count);
        self
    }

    /// Sets the slot count for a requirement.
    pub fn with_popular_slots(mut self, key: RequirementKey, count: usize) -> Self {
        self.popular_slots.insert(key, count);
        self
    }

    pub fn qualified_coaches_for(&self, key: &RequirementKey) -> usize {
        self.qualified_coaches.get(key).copied().unwrap_or(0)
    }

    pub fn popular_slots_for(&self, key: &RequirementKey) -> usize {
        self.popular_slots.get(key).copied().unwrap_or(0)
    }
}
