//! Schedule statistics.
//!
//! Computes the summary figures reported with every schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Coverage | students scheduled / students required x 100 |
//! | Coaches used | coaches with at least one class, per status |
//! | Avg classes | classes / coaches of that status |
//! | Utilization rate | coaches used / coaches of that status x 100 |
//! | Popular ratio | classes in popular slots / classes |
//! | Merged classes | classes holding more than one level |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::models::{Coach, CoachStatus, Schedule};

/// Utilization of one coach status group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUtilization {
    pub total_coaches: usize,
    pub coaches_used: usize,
    pub total_classes: usize,
    pub avg_classes_per_coach: f64,
    /// Percentage of coaches with at least one class.
    pub utilization_rate: f64,
}

/// Schedule statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStatistics {
    pub total_classes: usize,
    pub total_students_scheduled: u32,
    pub total_students_required: u32,
    /// 0-100; 0 when nothing is required.
    pub coverage_percentage: f64,
    pub perfect_coverage: bool,
    pub coach_utilization: BTreeMap<CoachStatus, StatusUtilization>,
    pub popular_slots_used: usize,
    /// Fraction of classes in popular slots (0.0..1.0).
    pub popular_slot_ratio: f64,
    pub merged_classes: usize,
}

impl ScheduleStatistics {
    /// Computes statistics for a schedule.
    ///
    /// # Arguments
    /// * `schedule` - The schedule to measure.
    /// * `coaches` - Every coach of the run, used or not.
    /// * `students_required` - Total demand.
    pub fn calculate(schedule: &Schedule, coaches: &[Coach], students_required: u32) -> Self {
        let total_classes = schedule.class_count();
        let total_students_scheduled = schedule.total_students();
        let coverage_percentage = if students_required > 0 {
            f64::from(total_students_scheduled) / f64::from(students_required) * 100.0
        } else {
            0.0
        };

        let mut classes_by_coach: HashMap<_, usize> = HashMap::new();
        for entry in &schedule.entries {
            *classes_by_coach.entry(entry.coach_id).or_insert(0) += 1;
        }

        let coach_utilization = CoachStatus::ALL
            .into_iter()
            .map(|status| {
                let group: Vec<&Coach> = coaches.iter().filter(|c| c.status == status).collect();
                let total_coaches = group.len();
                let counts: Vec<usize> = group
                    .iter()
                    .map(|c| classes_by_coach.get(&c.id).copied().unwrap_or(0))
                    .collect();
                let total_classes: usize = counts.iter().sum();
                let coaches_used = counts.iter().filter(|n| **n > 0).count();
                let (avg_classes_per_coach, utilization_rate) = if total_coaches > 0 {
                    (
                        total_classes as f64 / total_coaches as f64,
                        coaches_used as f64 / total_coaches as f64 * 100.0,
                    )
                } else {
                    (0.0, 0.0)
                };
                (
                    status,
                    StatusUtilization {
                        total_coaches,
                        coaches_used,
                        total_classes,
                        avg_classes_per_coach,
                        utilization_rate,
                    },
                )
            })
            .collect();

        let popular_slots_used = schedule.entries.iter().filter(|e| e.is_popular).count();
        let popular_slot_ratio = if total_classes > 0 {
            popular_slots_used as f64 / total_classes as f64
        } else {
            0.0
        };

        Self {
            total_classes,
            total_students_scheduled,
            total_students_required: students_required,
            coverage_percentage,
            perfect_coverage: coverage_percentage >= 100.0,
            coach_utilization,
            popular_slots_used,
            popular_slot_ratio,
            merged_classes: schedule.entries.iter().filter(|e| e.is_merged()).count(),
        }
    }

    /// Students still unplaced.
    pub fn students_unplaced(&self) -> u32 {
        self.total_students_required
            .saturating_sub(self.total_students_scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateAssignment, ClockTime, CoachId, Day, HalfDay, ScheduledEntry};

    fn entry(coach_id: CoachId, students: u32, popular: bool) -> ScheduledEntry {
        let start = ClockTime::new(9, 0);
        let c = CandidateAssignment {
            id: 0,
            coach_id,
            coach_name: format!("Coach {coach_id}"),
            coach_status: CoachStatus::FullTime,
            branch: "BB".into(),
            level: "L1".into(),
            day: Day::Sat,
            start,
            end: start.plus_minutes(90),
            duration: 90,
            period: HalfDay::Am,
            is_popular: popular,
            capacity: 8,
        };
        ScheduledEntry::from_candidate(&c, students)
    }

    fn coaches() -> Vec<Coach> {
        vec![
            Coach::new(1, "Ann", CoachStatus::FullTime),
            Coach::new(2, "Ben", CoachStatus::FullTime),
            Coach::new(3, "Cat", CoachStatus::PartTime),
        ]
    }

    #[test]
    fn test_statistics() {
        let mut schedule = Schedule::new();
        schedule.add_entry(entry(1, 8, true));
        schedule.add_entry(entry(1, 6, true));
        let mut merged = entry(3, 4, false);
        merged.absorb("L2", 2);
        schedule.add_entry(merged);

        let stats = ScheduleStatistics::calculate(&schedule, &coaches(), 25);
        assert_eq!(stats.total_classes, 3);
        assert_eq!(stats.total_students_scheduled, 20);
        assert!((stats.coverage_percentage - 80.0).abs() < 1e-10);
        assert!(!stats.perfect_coverage);
        assert_eq!(stats.students_unplaced(), 5);
        assert_eq!(stats.popular_slots_used, 2);
        assert!((stats.popular_slot_ratio - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(stats.merged_classes, 1);

        let ft = &stats.coach_utilization[&CoachStatus::FullTime];
        assert_eq!(ft.total_coaches, 2);
        assert_eq!(ft.coaches_used, 1);
        assert_eq!(ft.total_classes, 2);
        assert!((ft.avg_classes_per_coach - 1.0).abs() < 1e-10);
        assert!((ft.utilization_rate - 50.0).abs() < 1e-10);

        let bm = &stats.coach_utilization[&CoachStatus::BranchManager];
        assert_eq!(bm.total_coaches, 0);
        assert!((bm.utilization_rate - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_schedule() {
        let stats = ScheduleStatistics::calculate(&Schedule::new(), &coaches(), 0);
        assert_eq!(stats.total_classes, 0);
        assert!((stats.coverage_percentage - 0.0).abs() < 1e-10);
        assert!(!stats.perfect_coverage);
        assert!((stats.popular_slot_ratio - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_full_coverage() {
        let mut schedule = Schedule::new();
        schedule.add_entry(entry(1, 8, true));
        let stats = ScheduleStatistics::calculate(&schedule, &coaches(), 8);
        assert!(stats.perfect_coverage);
    }
}
