//! Weighted rule engine for requirement ordering.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::rules::{Complexity, EnrollmentSize, Scarcity};
use super::{PriorityContext, PriorityRule, RuleScore};
use crate::config::PriorityWeights;
use crate::models::Requirement;

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn PriorityRule>,
    weight: f64,
}

/// Combines priority rules into one weighted score.
///
/// Weights are normalized to sum to 1 when scoring; if every weight is
/// zero, rules count equally. Ties are broken by (branch, level).
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The standard scarcity / complexity / size combination.
    pub fn from_weights(weights: PriorityWeights) -> Self {
        Self::new()
            .with_weighted_rule(Scarcity, weights.scarcity)
            .with_weighted_rule(Complexity, weights.complexity)
            .with_weighted_rule(EnrollmentSize, weights.size)
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: PriorityRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: weight.max(0.0),
        });
        self
    }

    fn normalized_weights(&self) -> Vec<f64> {
        let total: f64 = self.rules.iter().map(|r| r.weight).sum();
        if total <= 0.0 {
            let equal = 1.0 / self.rules.len().max(1) as f64;
            return vec![equal; self.rules.len()];
        }
        self.rules.iter().map(|r| r.weight / total).collect()
    }

    /// Weighted contribution of each rule.
    pub fn evaluate(&self, requirement: &Requirement, context: &PriorityContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .zip(self.normalized_weights())
            .map(|(wr, w)| wr.rule.evaluate(requirement, context) * w)
            .collect()
    }

    /// Combined priority score.
    pub fn score(&self, requirement: &Requirement, context: &PriorityContext) -> RuleScore {
        self.evaluate(requirement, context).iter().sum()
    }

    /// Sorts requirements by priority (highest first).
    ///
    /// Returns indices into `requirements`.
    pub fn sort_indices(&self, requirements: &[Requirement], context: &PriorityContext) -> Vec<usize> {
        let scores: Vec<f64> = requirements.iter().map(|r| self.score(r, context)).collect();
        let mut indices: Vec<usize> = (0..requirements.len()).collect();
        indices.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    (&requirements[a].branch, &requirements[a].level)
                        .cmp(&(&requirements[b].branch, &requirements[b].level))
                })
        });
        indices
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
