//! The six scheduling phases.
//!
//! Each phase only adds classes or seats; none removes anything. Every
//! new class passes [`ConstraintChecker::check`] before it is booked.
//!
//! | Phase | Does |
//! |-------|------|
//! | Systematic | requirements in priority order, best-scoring class until met |
//! | Gap filling | one class per qualified coach for each short requirement |
//! | Merging | top up spare seats of same-branch classes of compatible levels |
//! | Multi-level | one new class shared by two compatible short levels |
//! | Exhaustive | one more class per coach and day |
//! | Max utilization | every remaining legal class per coach and day |
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 14

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use itertools::Itertools;
use log::{debug, trace};

use super::constraints::ConstraintChecker;
use super::scoring::CandidateScorer;
use super::state::SchedulingState;
use crate::config::EngineConfig;
use crate::facts::BusinessFacts;
use crate::models::{
    CandidateAssignment, Coach, CoachId, Day, Requirement, RequirementKey, ScheduledEntry,
};

/// One of the six phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Systematic,
    GapFilling,
    Merging,
    MultiLevel,
    Exhaustive,
    MaxUtilization,
}

impl Phase {
    /// All phases in run order.
    pub const ALL: [Phase; 6] = [
        Phase::Systematic,
        Phase::GapFilling,
        Phase::Merging,
        Phase::MultiLevel,
        Phase::Exhaustive,
        Phase::MaxUtilization,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Systematic => "systematic",
            Phase::GapFilling => "gap filling",
            Phase::Merging => "merging",
            Phase::MultiLevel => "multi-level merging",
            Phase::Exhaustive => "exhaustive",
            Phase::MaxUtilization => "max utilization",
        };
        f.write_str(name)
    }
}

/// What one phase added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    /// New classes.
    pub classes: usize,
    /// Newly seated students, including top-ups.
    pub students: u32,
}

type CandidateIndex<'a> = HashMap<RequirementKey, HashMap<CoachId, Vec<&'a CandidateAssignment>>>;

/// Runs the phases of one iteration over a fixed pool and coach order.
pub struct PhaseRunner<'a> {
    facts: &'a BusinessFacts,
    config: &'a EngineConfig,
    checker: &'a ConstraintChecker<'a>,
    scorer: CandidateScorer<'a>,
    coaches: Vec<&'a Coach>,
    requirements: Vec<&'a Requirement>,
    scarcity: &'a HashMap<RequirementKey, f64>,
    index: CandidateIndex<'a>,
}

impl<'a> PhaseRunner<'a> {
    /// Creates a runner.
    ///
    /// `pool` and `coaches` are read in the order given; `requirements`
    /// must already be in priority order.
    pub fn new(
        facts: &'a BusinessFacts,
        config: &'a EngineConfig,
        checker: &'a ConstraintChecker<'a>,
        pool: impl IntoIterator<Item = &'a CandidateAssignment>,
        coaches: Vec<&'a Coach>,
        requirements: Vec<&'a Requirement>,
        scarcity: &'a HashMap<RequirementKey, f64>,
    ) -> Self {
        let mut index: CandidateIndex<'a> = HashMap::new();
        for candidate in pool {
            index
                .entry(candidate.key())
                .or_default()
                .entry(candidate.coach_id)
                .or_default()
                .push(candidate);
        }
        Self {
            facts,
            config,
            checker,
            scorer: CandidateScorer::new(facts, config),
            coaches,
            requirements,
            scarcity,
            index,
        }
    }

    /// Runs all six phases in order.
    pub fn run(&self, state: &mut SchedulingState) -> Vec<PhaseReport> {
        Phase::ALL
            .into_iter()
            .map(|phase| self.run_phase(phase, state))
            .collect()
    }

    /// Runs one phase and reports what it added.
    pub fn run_phase(&self, phase: Phase, state: &mut SchedulingState) -> PhaseReport {
        let (classes, students) = (state.entries().len(), state.total_students());
        match phase {
            Phase::Systematic => self.systematic(state),
            Phase::GapFilling => self.fill_gaps(state),
            Phase::Merging => self.merge_into_existing(state),
            Phase::MultiLevel => self.merge_levels(state),
            Phase::Exhaustive => self.exhaustive(state),
            Phase::MaxUtilization => self.maximize(state),
        }
        let report = PhaseReport {
            phase,
            classes: state.entries().len() - classes,
            students: state.total_students() - students,
        };
        debug!(
            "Phase {}: +{} classes, +{} students, {} unmet",
            phase,
            report.classes,
            report.students,
            state.total_unmet()
        );
        report
    }

    /// Phase 1: requirements in priority order, full-time and part-time
    /// coaches before branch managers.
    pub fn systematic(&self, state: &mut SchedulingState) {
        for req in &self.requirements {
            let key = req.key();
            let coaches: Vec<&Coach> = self
                .coaches
                .iter()
                .copied()
                .filter(|c| c.can_teach(&req.branch, &req.level))
                .sorted_by_key(|c| c.status)
                .collect();

            let mut attempts = 0;
            while state.unmet(&key) > 0 && attempts < self.config.max_assignment_attempts {
                attempts += 1;
                let unmet = state.unmet(&key);
                let candidates = coaches
                    .iter()
                    .filter(|c| !self.checker.at_weekly_limit(c, state))
                    .flat_map(|c| self.candidates_for(&key, c.id).iter().copied());
                match self.best_for(candidates, unmet, state) {
                    Some((candidate, students)) => self.book(state, candidate, students),
                    None => break,
                }
            }
        }
    }

    /// Phase 2: largest and scarcest gaps first; each qualified coach
    /// gets at most one class per gap.
    pub fn fill_gaps(&self, state: &mut SchedulingState) {
        let mut gaps = state.gaps();
        gaps.sort_by(|(ka, a), (kb, b)| {
            b.cmp(a)
                .then_with(|| self.scarcity_of(kb).total_cmp(&self.scarcity_of(ka)))
                .then_with(|| ka.cmp(kb))
        });

        for (key, _) in gaps {
            for coach in &self.coaches {
                if !coach.can_teach(&key.branch, &key.level) {
                    continue;
                }
                let unmet = state.unmet(&key);
                if unmet == 0 {
                    break;
                }
                let candidates = self.candidates_for(&key, coach.id).iter().copied();
                if let Some((candidate, students)) = self.best_for(candidates, unmet, state) {
                    self.book(state, candidate, students);
                }
            }
        }
    }

    /// Phase 3: smallest gaps first, seated into the roomiest compatible
    /// class at the same branch.
    pub fn merge_into_existing(&self, state: &mut SchedulingState) {
        let distance = self.config.level_merge_distance;
        let mut gaps = state.gaps();
        gaps.sort_by(|(ka, a), (kb, b)| a.cmp(b).then_with(|| ka.cmp(kb)));

        for (key, _) in gaps {
            let mut hosts: Vec<(usize, u32)> = state
                .entries()
                .iter()
                .enumerate()
                .filter(|(_, e)| {
                    e.branch == key.branch
                        && self.facts.levels_compatible(&e.level, &key.level, distance)
                })
                .map(|(i, e)| (i, e.spare_seats(self.host_capacity(e))))
                .filter(|(_, spare)| *spare > 0)
                .collect();
            hosts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

            for (index, spare) in hosts {
                let unmet = state.unmet(&key);
                if unmet == 0 {
                    break;
                }
                let seats = spare.min(unmet);
                state.absorb(index, &key.level, seats);
                state.reduce_unmet(&key, seats);
                trace!("Merged {} {} student(s) into class #{}", key, seats, index);
            }
        }
    }

    /// Phase 4: per branch, pairs of compatible short levels that together
    /// reach the minimum merge size share one new class.
    pub fn merge_levels(&self, state: &mut SchedulingState) {
        let distance = self.config.level_merge_distance;
        let by_branch: BTreeMap<String, Vec<(String, u32)>> = state
            .gaps()
            .into_iter()
            .map(|(key, gap)| (key.branch, (key.level, gap)))
            .into_group_map()
            .into_iter()
            .collect();

        for (branch, levels) in by_branch {
            let pairs: Vec<(String, String)> = levels
                .iter()
                .tuple_combinations()
                .filter(|((a, _), (b, _))| self.facts.levels_compatible(a, b, distance))
                .map(|((a, ga), (b, gb))| (a.clone(), b.clone(), ga + gb))
                .filter(|(_, _, total)| *total >= self.config.min_merge_size)
                .sorted_by(|x, y| y.2.cmp(&x.2).then_with(|| (&x.0, &x.1).cmp(&(&y.0, &y.1))))
                .map(|(a, b, _)| (a, b))
                .collect();

            for (a, b) in pairs {
                self.create_merged_class(state, &branch, &a, &b);
            }
        }
    }

    fn create_merged_class(&self, state: &mut SchedulingState, branch: &str, a: &str, b: &str) {
        let (key_a, key_b) = (RequirementKey::new(branch, a), RequirementKey::new(branch, b));
        let (gap_a, gap_b) = (state.unmet(&key_a), state.unmet(&key_b));
        if gap_a == 0 || gap_b == 0 || gap_a + gap_b < self.config.min_merge_size {
            return;
        }

        let host = if self.facts.capacity_of(b) > self.facts.capacity_of(a) {
            &key_b
        } else {
            &key_a
        };
        let levels = [a, b];
        let candidates = self
            .coaches
            .iter()
            .filter(|c| c.can_teach_all(branch, &levels))
            .flat_map(|c| self.candidates_for(host, c.id).iter().copied());
        let Some((candidate, size)) = self.best_for(candidates, gap_a + gap_b, state) else {
            return;
        };

        let shares = distribute_seats(size, &[(a, gap_a), (b, gap_b)]);
        state.record(
            ScheduledEntry::from_candidate(candidate, size),
            self.scorer.morning_class(candidate),
        );
        state.set_multi_level(state.entries().len() - 1, &shares);
        for (level, seats) in &shares {
            state.reduce_unmet(&RequirementKey::new(branch, *level), *seats);
        }
        debug!(
            "Merged class {} {}+{} for {} students ({} + {})",
            branch, a, b, size, shares[0].1, shares[1].1
        );
    }

    /// Phase 5: at most one more class per coach and day.
    pub fn exhaustive(&self, state: &mut SchedulingState) {
        for coach in &self.coaches {
            for &day in &self.facts.days {
                if self.under_daily_cap(coach, day, state) {
                    self.add_one(state, coach, day);
                }
            }
        }
    }

    /// Phase 6: classes per coach and day until none fits.
    pub fn maximize(&self, state: &mut SchedulingState) {
        for coach in &self.coaches {
            for &day in &self.facts.days {
                while self.under_daily_cap(coach, day, state) && self.add_one(state, coach, day) {}
            }
        }
    }

    /// Books the first admissible class for any current gap the coach can
    /// teach on `day`.
    fn add_one(&self, state: &mut SchedulingState, coach: &Coach, day: Day) -> bool {
        for (key, unmet) in state.gaps() {
            if !coach.can_teach(&key.branch, &key.level) {
                continue;
            }
            let found = self
                .candidates_for(&key, coach.id)
                .iter()
                .copied()
                .filter(|c| c.day == day)
                .find_map(|c| {
                    let students = unmet.min(self.class_capacity(c));
                    (students > 0 && self.checker.check(c, students, state).is_ok())
                        .then_some((c, students))
                });
            if let Some((candidate, students)) = found {
                self.book(state, candidate, students);
                return true;
            }
        }
        false
    }

    fn under_daily_cap(&self, coach: &Coach, day: Day, state: &SchedulingState) -> bool {
        let cap = self
            .config
            .limits_for(coach.status)
            .daily_classes(self.facts.is_weekend(day));
        state.daily_classes(coach.id, day) < cap
    }

    fn candidates_for(&self, key: &RequirementKey, coach: CoachId) -> &[&'a CandidateAssignment] {
        self.index
            .get(key)
            .and_then(|by_coach| by_coach.get(&coach))
            .map_or(&[][..], Vec::as_slice)
    }

    fn scarcity_of(&self, key: &RequirementKey) -> f64 {
        self.scarcity.get(key).copied().unwrap_or(0.0)
    }

    fn class_capacity(&self, candidate: &CandidateAssignment) -> u32 {
        candidate.capacity.min(self.facts.capacity_of(&candidate.level))
    }

    fn host_capacity(&self, entry: &ScheduledEntry) -> u32 {
        entry.capacity.min(self.facts.capacity_of(&entry.level))
    }

    /// Highest-scoring admissible candidate, first in order on ties, with
    /// its class size.
    fn best_for(
        &self,
        candidates: impl IntoIterator<Item = &'a CandidateAssignment>,
        unmet: u32,
        state: &SchedulingState,
    ) -> Option<(&'a CandidateAssignment, u32)> {
        let mut best: Option<(&'a CandidateAssignment, u32, f64)> = None;
        for candidate in candidates {
            let students = unmet.min(self.class_capacity(candidate));
            if students == 0 {
                continue;
            }
            if let Err(reason) = self.checker.check(candidate, students, state) {
                trace!("Candidate #{} rejected: {}", candidate.id, reason);
                continue;
            }
            let score = self.scorer.score(candidate, state);
            if best.as_ref().map_or(true, |(_, _, s)| score > *s) {
                best = Some((candidate, students, score));
            }
        }
        best.map(|(candidate, students, _)| (candidate, students))
    }

    fn book(&self, state: &mut SchedulingState, candidate: &CandidateAssignment, students: u32) {
        state.record(
            ScheduledEntry::from_candidate(candidate, students),
            self.scorer.morning_class(candidate),
        );
        state.reduce_unmet(&candidate.key(), students);
    }
}

/// Splits `size` seats across levels in proportion to their gaps.
///
/// Largest remainder; ties go to the earlier level. No share exceeds its
/// gap, and the shares sum to `size` whenever `size` does not exceed the
/// total gap.
pub fn distribute_seats<'l>(size: u32, gaps: &[(&'l str, u32)]) -> Vec<(&'l str, u32)> {
    let total: u32 = gaps.iter().map(|(_, g)| g).sum();
    if total <= size {
        return gaps.to_vec();
    }

    let (size, total) = (u64::from(size), u64::from(total));
    let mut shares: Vec<(&str, u32)> = gaps
        .iter()
        .map(|(level, gap)| (*level, (size * u64::from(*gap) / total) as u32))
        .collect();
    let assigned: u64 = shares.iter().map(|(_, s)| u64::from(*s)).sum();

    let by_remainder: Vec<usize> = (0..gaps.len())
        .sorted_by(|&i, &j| {
            let ri = size * u64::from(gaps[i].1) % total;
            let rj = size * u64::from(gaps[j].1) % total;
            rj.cmp(&ri).then(i.cmp(&j))
        })
        .collect();
    for &i in by_remainder.iter().take((size - assigned) as usize) {
        shares[i].1 += 1;
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, ClockTime, CoachStatus, HalfDay};

    struct Fixture {
        facts: BusinessFacts,
        config: EngineConfig,
        coaches: Vec<Coach>,
        requirements: Vec<Requirement>,
        pool: Vec<CandidateAssignment>,
        scarcity: HashMap<RequirementKey, f64>,
    }

    impl Fixture {
        fn new(coaches: Vec<Coach>, requirements: Vec<Requirement>) -> Self {
            let facts = BusinessFacts::default();
            let mut pool = Vec::new();
            for req in &requirements {
                for coach in coaches.iter().filter(|c| c.can_teach(&req.branch, &req.level)) {
                    for &day in &[Day::Sat, Day::Sun] {
                        for h in [9, 11, 14, 16] {
                            let start = ClockTime::new(h, 0);
                            let duration = facts.duration_of(&req.level);
                            pool.push(CandidateAssignment {
                                id: pool.len(),
                                coach_id: coach.id,
                                coach_name: coach.name.clone(),
                                coach_status: coach.status,
                                branch: req.branch.clone(),
                                level: req.level.clone(),
                                day,
                                start,
                                end: start.plus_minutes(duration as u16),
                                duration,
                                period: HalfDay::of(start),
                                is_popular: true,
                                capacity: facts.capacity_of(&req.level),
                            });
                        }
                    }
                }
            }
            Self {
                facts,
                config: EngineConfig::default(),
                coaches,
                requirements,
                pool,
                scarcity: HashMap::new(),
            }
        }

        fn state(&self) -> SchedulingState {
            let mut demand = BTreeMap::new();
            for req in &self.requirements {
                *demand.entry(req.key()).or_insert(0) += req.students;
            }
            SchedulingState::new(&demand)
        }
    }

    fn coach(id: CoachId, status: CoachStatus, levels: &[&str]) -> Coach {
        Coach::new(id, format!("Coach {id}"), status)
            .with_qualifications(levels.iter().copied())
            .with_branch("BB")
            .with_availability(Availability::always(&Day::ALL))
    }

    macro_rules! runner {
        ($fx:expr, $checker:ident, $runner:ident) => {
            let $checker = ConstraintChecker::new(&$fx.facts, &$fx.config, &$fx.coaches);
            let $runner = PhaseRunner::new(
                &$fx.facts,
                &$fx.config,
                &$checker,
                &$fx.pool,
                $fx.coaches.iter().collect(),
                $fx.requirements.iter().collect(),
                &$fx.scarcity,
            );
        };
    }

    #[test]
    fn test_distribute_seats() {
        assert_eq!(distribute_seats(8, &[("L1", 2), ("L2", 3)]), vec![("L1", 2), ("L2", 3)]);
        // 10 seats over 9 + 6: 6.0 and 4.0
        assert_eq!(distribute_seats(10, &[("L2", 9), ("L3", 6)]), vec![("L2", 6), ("L3", 4)]);
        // 8 seats over 5 + 5: 4 and 4
        assert_eq!(distribute_seats(8, &[("L1", 5), ("L2", 5)]), vec![("L1", 4), ("L2", 4)]);
        // 9 seats over 5 + 5: the earlier level takes the odd seat
        assert_eq!(distribute_seats(9, &[("L1", 5), ("L2", 5)]), vec![("L1", 5), ("L2", 4)]);
        // 8 seats over 10 + 3: 6.15 and 1.85
        assert_eq!(distribute_seats(8, &[("L1", 10), ("L2", 3)]), vec![("L1", 6), ("L2", 2)]);
    }

    #[test]
    fn test_systematic_meets_demand() {
        let fx = Fixture::new(
            vec![coach(1, CoachStatus::FullTime, &["L1"])],
            vec![Requirement::new("BB", "L1", 20, 8, 90)],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        let report = runner.run_phase(Phase::Systematic, &mut state);
        assert_eq!(report.classes, 3);
        assert_eq!(report.students, 20);
        assert_eq!(state.total_unmet(), 0);
        let sizes: Vec<u32> = state.entries().iter().map(|e| e.actual_students).collect();
        assert_eq!(sizes, vec![8, 8, 4]);
    }

    #[test]
    fn test_systematic_prefers_non_managers() {
        let fx = Fixture::new(
            vec![
                coach(1, CoachStatus::BranchManager, &["L1"]),
                coach(2, CoachStatus::PartTime, &["L1"]),
            ],
            vec![Requirement::new("BB", "L1", 8, 8, 90)],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        runner.systematic(&mut state);
        assert_eq!(state.entries().len(), 1);
        assert_eq!(state.entries()[0].coach_id, 2);
    }

    #[test]
    fn test_fill_gaps_one_class_per_coach() {
        let fx = Fixture::new(
            vec![
                coach(1, CoachStatus::FullTime, &["L1"]),
                coach(2, CoachStatus::PartTime, &["L1"]),
            ],
            vec![Requirement::new("BB", "L1", 40, 8, 90)],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        runner.fill_gaps(&mut state);

        let coaches: Vec<CoachId> = state.entries().iter().map(|e| e.coach_id).collect();
        assert_eq!(coaches, vec![1, 2]);
        assert!(state.entries().iter().all(|e| e.actual_students == 8));
        assert_eq!(state.unmet(&RequirementKey::new("BB", "L1")), 24);
    }

    #[test]
    fn test_merge_absorbs_into_existing_class() {
        let fx = Fixture::new(
            vec![coach(1, CoachStatus::FullTime, &["L1", "L2"])],
            vec![
                Requirement::new("BB", "L1", 8, 8, 90),
                Requirement::new("BB", "L2", 1, 9, 90),
            ],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        let l1 = RequirementKey::new("BB", "L1");
        let l2 = RequirementKey::new("BB", "L2");

        // An L1 class of 6 leaves an L1 gap of 2 and two spare seats
        let host = fx.pool.iter().find(|c| c.level == "L1").unwrap();
        state.record(ScheduledEntry::from_candidate(host, 6), None);
        state.reduce_unmet(&l1, 6);
        assert_eq!((state.unmet(&l1), state.unmet(&l2)), (2, 1));

        runner.merge_into_existing(&mut state);

        assert_eq!(state.entries().len(), 1);
        let entry = &state.entries()[0];
        assert_eq!(entry.students_for("L2"), 1);
        assert_eq!(entry.actual_students, 8);
        assert!(entry.is_merged());
        assert_eq!(entry.merged_with().as_deref(), Some("L1+L2"));
        assert_eq!(state.unmet(&l2), 0);
        assert_eq!(state.unmet(&l1), 1);
    }

    #[test]
    fn test_merge_ignores_other_branches_and_distant_levels() {
        let fx = Fixture::new(
            vec![coach(1, CoachStatus::FullTime, &["L1", "L3"])],
            vec![
                Requirement::new("BB", "L1", 4, 8, 90),
                Requirement::new("BB", "L3", 2, 10, 90),
            ],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        let host = fx.pool.iter().find(|c| c.level == "L1").unwrap();
        state.record(ScheduledEntry::from_candidate(host, 4), None);
        state.reduce_unmet(&RequirementKey::new("BB", "L1"), 4);

        runner.merge_into_existing(&mut state);
        assert_eq!(state.entries()[0].actual_students, 4);
        assert_eq!(state.unmet(&RequirementKey::new("BB", "L3")), 2);
    }

    #[test]
    fn test_multi_level_class() {
        let fx = Fixture::new(
            vec![coach(1, CoachStatus::FullTime, &["L2", "L3"])],
            vec![
                Requirement::new("BB", "L2", 2, 9, 90),
                Requirement::new("BB", "L3", 3, 10, 90),
            ],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        let report = runner.run_phase(Phase::MultiLevel, &mut state);

        assert_eq!(report.classes, 1);
        assert_eq!(report.students, 5);
        let entry = &state.entries()[0];
        assert_eq!(entry.level, "L3");
        assert_eq!(entry.students_for("L2"), 2);
        assert_eq!(entry.students_for("L3"), 3);
        assert_eq!(state.total_unmet(), 0);
    }

    #[test]
    fn test_multi_level_needs_coach_for_both_levels() {
        let fx = Fixture::new(
            vec![
                coach(1, CoachStatus::FullTime, &["L2"]),
                coach(2, CoachStatus::FullTime, &["L3"]),
            ],
            vec![
                Requirement::new("BB", "L2", 2, 9, 90),
                Requirement::new("BB", "L3", 3, 10, 90),
            ],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        runner.merge_levels(&mut state);
        assert!(state.entries().is_empty());
    }

    #[test]
    fn test_multi_level_below_min_size() {
        let fx = Fixture::new(
            vec![coach(1, CoachStatus::FullTime, &["L1", "L2"])],
            vec![
                Requirement::new("BB", "L1", 1, 8, 90),
                Requirement::new("BB", "L2", 1, 9, 90),
            ],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        runner.merge_levels(&mut state);
        assert!(state.entries().is_empty());
    }

    #[test]
    fn test_exhaustive_adds_one_per_coach_day() {
        let fx = Fixture::new(
            vec![coach(1, CoachStatus::FullTime, &["L1"])],
            vec![Requirement::new("BB", "L1", 80, 8, 90)],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        let report = runner.run_phase(Phase::Exhaustive, &mut state);
        // one class on each of SAT and SUN
        assert_eq!(report.classes, 2);

        let report = runner.run_phase(Phase::MaxUtilization, &mut state);
        // 9:00 and 11:00 run back to back, 14:00 and 16:00 likewise
        assert_eq!(report.classes, 6);
        assert_eq!(state.total_students(), 64);
        assert_eq!(state.daily_classes(1, Day::Sat), 4);
    }

    #[test]
    fn test_every_phase_only_adds() {
        let coaches = vec![
            coach(1, CoachStatus::FullTime, &["L1", "L2"]),
            coach(2, CoachStatus::PartTime, &["L2", "L3"]),
            coach(3, CoachStatus::BranchManager, &["L1", "L3"]),
        ];
        let fx = Fixture::new(
            coaches,
            vec![
                Requirement::new("BB", "L1", 30, 8, 90),
                Requirement::new("BB", "L2", 23, 9, 90),
                Requirement::new("BB", "L3", 17, 10, 90),
            ],
        );
        runner!(fx, checker, runner);
        let mut state = fx.state();
        let demand = state.total_unmet();
        let mut before = 0;
        for phase in Phase::ALL {
            let report = runner.run_phase(phase, &mut state);
            assert!(state.total_students() >= before);
            assert_eq!(state.total_students() - before, report.students);
            before = state.total_students();
        }
        assert!(before > 0);
        assert_eq!(state.total_students() + state.total_unmet(), demand);
    }
}
