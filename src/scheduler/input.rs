//! Scheduler input bundle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::facts::{self, BusinessFacts, RawData};
use crate::feasibility::{self, CoverageAnalysis};
use crate::models::{CandidateAssignment, Coach, CoachId, Requirement, RequirementKey};

/// Everything one scheduling run reads.
///
/// Treated as immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingInput {
    pub facts: BusinessFacts,
    pub coaches: Vec<Coach>,
    pub requirements: Vec<Requirement>,
    pub candidates: Vec<CandidateAssignment>,
}

impl SchedulingInput {
    /// Creates an input bundle.
    pub fn new(
        facts: BusinessFacts,
        coaches: Vec<Coach>,
        requirements: Vec<Requirement>,
        candidates: Vec<CandidateAssignment>,
    ) -> Self {
        Self {
            facts,
            coaches,
            requirements,
            candidates,
        }
    }

    /// Runs fact extraction and candidate generation over raw records.
    pub fn from_raw(raw: &RawData) -> Self {
        let extracted = facts::extract(raw);
        let timeslots =
            feasibility::generate_timeslots(&extracted.facts, &extracted.popular_ranges);
        let candidates = feasibility::generate_candidates(
            &extracted.facts,
            &extracted.coaches,
            &extracted.requirements,
            &timeslots,
        );
        Self::new(
            extracted.facts,
            extracted.coaches,
            extracted.requirements,
            candidates,
        )
    }

    /// Demand per (branch, level).
    pub fn enrollment(&self) -> BTreeMap<RequirementKey, u32> {
        let mut demand = BTreeMap::new();
        for req in &self.requirements {
            *demand.entry(req.key()).or_insert(0) += req.students;
        }
        demand
    }

    /// Students to place in total.
    pub fn total_demand(&self) -> u32 {
        self.requirements.iter().map(|r| r.students).sum()
    }

    /// Looks up a coach by id.
    pub fn coach(&self, id: CoachId) -> Option<&Coach> {
        self.coaches.iter().find(|c| c.id == id)
    }

    /// Seats reachable through popular candidates, per requirement.
    pub fn coverage_analysis(&self) -> CoverageAnalysis {
        feasibility::analyze_coverage(&self.requirements, &self.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{CoachRecord, EnrollmentRecord, PopularSlotRecord};
    use crate::models::Day;

    fn raw() -> RawData {
        RawData {
            enrollments: vec![
                EnrollmentRecord {
                    branch: "BB".into(),
                    level: "L1".into(),
                    count: 10,
                },
                EnrollmentRecord {
                    branch: "BB".into(),
                    level: "L1".into(),
                    count: 2,
                },
            ],
            coaches: vec![CoachRecord {
                id: 5,
                name: "Ann".into(),
                position: "Coach".into(),
                status: "Full time".into(),
                branches: vec!["BB".into()],
                qualifications: vec!["L1".into()],
            }],
            popular_slots: vec![PopularSlotRecord {
                level: "L1".into(),
                day: "SAT".into(),
                time_slot: "09:00-12:00".into(),
            }],
            ..RawData::default()
        }
    }

    #[test]
    fn test_from_raw_pipeline() {
        let input = SchedulingInput::from_raw(&raw());
        assert_eq!(input.coaches.len(), 1);
        assert_eq!(input.total_demand(), 12);
        assert_eq!(input.enrollment()[&RequirementKey::new("BB", "L1")], 12);
        assert!(!input.candidates.is_empty());
        assert!(input.candidates.iter().all(|c| c.coach_id == 5));
        // 09:00-10:30, 09:30-11:00, 10:00-11:30, 10:30-12:00
        let popular: Vec<_> = input.candidates.iter().filter(|c| c.is_popular).collect();
        assert_eq!(popular.len(), 4);
        assert!(popular.iter().all(|c| c.day == Day::Sat));
        assert!(input.coach(5).is_some());
        assert!(input.coach(6).is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let input = SchedulingInput::from_raw(&raw());
        let json = serde_json::to_string(&input).unwrap();
        let back: SchedulingInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.candidates, input.candidates);
        assert_eq!(back.facts, input.facts);
    }

    #[test]
    fn test_coverage_analysis() {
        let input = SchedulingInput::from_raw(&raw());
        let analysis = input.coverage_analysis();
        assert_eq!(analysis.total_demand, 12);
        assert_eq!(analysis.total_popular_capacity, 32);
        assert!(analysis.uncoverable().is_empty());
    }
}
