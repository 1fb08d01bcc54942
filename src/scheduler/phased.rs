//! Multi-phase scheduler with seeded restarts.
//!
//! # Algorithm
//!
//! 1. Restrict the candidate pool to popular slots (unless disabled or
//!    there are none).
//! 2. Order requirements by the weighted scarcity / complexity / size rule.
//! 3. Per iteration, run the six phases on a fresh state, then validate
//!    the result. Only violation-free results may become the best.
//! 4. Stop early at full coverage; otherwise reshuffle the pool and the
//!    coach order within each status every `shuffle_interval` iterations.
//! 5. If no iteration was violation-free, fall back to one class per
//!    requirement.
//!
//! The generator is seeded from [`EngineConfig::seed`] and owned by one
//! [`PhasedScheduler::run`] call, so equal inputs and seeds give equal
//! schedules.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 14

use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::constraints::ConstraintChecker;
use super::input::SchedulingInput;
use super::kpi::ScheduleStatistics;
use super::phases::PhaseRunner;
use super::scoring::CandidateScorer;
use super::state::SchedulingState;
use super::summary::ScheduleSummary;
use crate::config::EngineConfig;
use crate::dispatching::rules::Scarcity;
use crate::dispatching::{PriorityContext, PriorityRule, RuleEngine};
use crate::error::EngineError;
use crate::models::{
    CandidateAssignment, Coach, CoachStatus, Requirement, RequirementKey, Schedule, ScheduledEntry,
};
use crate::validation::{validate_input, validate_schedule, ViolationSummary};

/// Outcome of a scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Entries in chronological order, plus any violations.
    pub schedule: Schedule,
    pub statistics: ScheduleStatistics,
    pub iterations_run: u32,
    /// No iteration was violation-free; the single-pass fallback was used.
    pub used_fallback: bool,
    pub seed: u64,
}

/// Supply for one requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementAnalysis {
    pub key: RequirementKey,
    pub students: u32,
    pub qualified_coaches: usize,
    /// Candidates for this requirement in the pool.
    pub pool_slots: usize,
}

impl RequirementAnalysis {
    /// Students waiting with no coach or no slot to serve them.
    pub fn is_critical(&self) -> bool {
        self.students > 0 && (self.qualified_coaches == 0 || self.pool_slots == 0)
    }
}

/// Six-phase greedy scheduler.
///
/// # Example
///
/// ```
/// use coach_roster::config::EngineConfig;
/// use coach_roster::facts::{CoachRecord, EnrollmentRecord, PopularSlotRecord, RawData};
/// use coach_roster::scheduler::{PhasedScheduler, SchedulingInput};
///
/// let raw = RawData {
///     enrollments: vec![EnrollmentRecord { branch: "BB".into(), level: "L1".into(), count: 8 }],
///     coaches: vec![CoachRecord {
///         id: 1,
///         name: "Ann".into(),
///         position: "Coach".into(),
///         status: "Full time".into(),
///         branches: vec!["BB".into()],
///         qualifications: vec!["L1".into()],
///     }],
///     popular_slots: vec![PopularSlotRecord {
///         level: "L1".into(),
///         day: "SAT".into(),
///         time_slot: "09:00-10:30".into(),
///     }],
///     ..RawData::default()
/// };
/// let input = SchedulingInput::from_raw(&raw);
/// let scheduler = PhasedScheduler::new(&input, EngineConfig::default()).unwrap();
/// let result = scheduler.run();
/// assert_eq!(result.schedule.class_count(), 1);
/// assert!(result.statistics.perfect_coverage);
/// ```
#[derive(Debug)]
pub struct PhasedScheduler<'a> {
    input: &'a SchedulingInput,
    config: EngineConfig,
    pool: Vec<&'a CandidateAssignment>,
    context: PriorityContext,
    priority_order: Vec<usize>,
    scarcity: HashMap<RequirementKey, f64>,
    enrollment: BTreeMap<RequirementKey, u32>,
    total_demand: u32,
}

impl<'a> PhasedScheduler<'a> {
    /// Prepares a run.
    ///
    /// # Errors
    /// - [`EngineError::Config`] if a config field is out of range.
    /// - [`EngineError::InsufficientInput`] if there are no coaches, no
    ///   requirements, or no candidates.
    /// - [`EngineError::InvalidInput`] if the input fails validation.
    pub fn new(input: &'a SchedulingInput, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        if input.coaches.is_empty() || input.requirements.is_empty() || input.candidates.is_empty()
        {
            return Err(EngineError::InsufficientInput {
                coaches: input.coaches.len(),
                requirements: input.requirements.len(),
                candidates: input.candidates.len(),
            });
        }
        validate_input(input).map_err(EngineError::InvalidInput)?;

        let pool = select_pool(&input.candidates, config.popular_only);
        let context = PriorityContext::build(
            &input.requirements,
            &input.coaches,
            pool.iter().copied(),
            input.facts.level_hierarchy.clone(),
        );
        let priority_order = RuleEngine::from_weights(config.priority_weights())
            .sort_indices(&input.requirements, &context);
        let scarcity = input
            .requirements
            .iter()
            .map(|r| (r.key(), Scarcity.evaluate(r, &context)))
            .collect();
        let enrollment = input.enrollment();
        let total_demand = enrollment.values().sum();

        let scheduler = Self {
            input,
            config,
            pool,
            context,
            priority_order,
            scarcity,
            enrollment,
            total_demand,
        };
        scheduler.log_preflight();
        Ok(scheduler)
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Candidates the iterations draw from.
    pub fn pool(&self) -> &[&'a CandidateAssignment] {
        &self.pool
    }

    /// Requirements in scheduling priority order.
    pub fn prioritized_requirements(&self) -> Vec<&'a Requirement> {
        self.priority_order
            .iter()
            .map(|&i| &self.input.requirements[i])
            .collect()
    }

    /// Upper bound on seatable students under the workload caps.
    ///
    /// Per coach, the smaller of the summed daily class caps and the
    /// weekly cap, times the mean class capacity.
    pub fn theoretical_capacity(&self) -> u32 {
        let facts = &self.input.facts;
        let classes: u64 = self
            .input
            .coaches
            .iter()
            .map(|coach| {
                let limits = self.config.limits_for(coach.status);
                let daily: u32 = facts
                    .days
                    .iter()
                    .map(|&day| limits.daily_classes(facts.is_weekend(day)))
                    .sum();
                u64::from(daily.min(limits.weekly_classes))
            })
            .sum();
        let capacities = &facts.class_capacities;
        if capacities.is_empty() {
            return 0;
        }
        let seats: u64 = capacities.values().map(|&c| u64::from(c)).sum();
        (classes * seats / capacities.len() as u64) as u32
    }

    /// Qualified coaches and pool slots per requirement.
    pub fn requirement_analysis(&self) -> Vec<RequirementAnalysis> {
        self.enrollment
            .iter()
            .map(|(key, &students)| RequirementAnalysis {
                key: key.clone(),
                students,
                qualified_coaches: self.context.qualified_coaches_for(key),
                pool_slots: self.context.popular_slots_for(key),
            })
            .collect()
    }

    fn log_preflight(&self) {
        let coaches = &self.input.coaches;
        let count = |status: CoachStatus| coaches.iter().filter(|c| c.status == status).count();
        info!(
            "Scheduling {} students; coaches: {} FT, {} PT, {} BM; pool: {} candidates (popular only: {})",
            self.total_demand,
            count(CoachStatus::FullTime),
            count(CoachStatus::PartTime),
            count(CoachStatus::BranchManager),
            self.pool.len(),
            self.config.popular_only
        );

        for analysis in self.requirement_analysis() {
            debug!(
                "{}: {} students, {} coaches, {} slots",
                analysis.key, analysis.students, analysis.qualified_coaches, analysis.pool_slots
            );
            if analysis.is_critical() {
                warn!("Critical shortage for {}", analysis.key);
            }
        }

        let capacity = self.theoretical_capacity();
        if capacity < self.total_demand {
            warn!(
                "Theoretical capacity {} is below demand {}; maximizing coverage within limits",
                capacity, self.total_demand
            );
        }
    }

    /// Runs the iterations and returns the best schedule found.
    pub fn run(&self) -> ScheduleResult {
        let input = self.input;
        let config = &self.config;
        let checker = ConstraintChecker::new(&input.facts, config, &input.coaches);
        let requirements = self.prioritized_requirements();

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut pool = self.pool.clone();
        let mut coach_groups: Vec<Vec<&Coach>> = CoachStatus::ALL
            .iter()
            .map(|&status| input.coaches.iter().filter(|c| c.status == status).collect())
            .collect();

        let mut best: Option<(Vec<ScheduledEntry>, f64)> = None;
        let mut iterations_run = 0;

        for iteration in 1..=config.max_iterations {
            iterations_run = iteration;
            let runner = PhaseRunner::new(
                &input.facts,
                config,
                &checker,
                pool.iter().copied(),
                coach_groups.iter().flatten().copied().collect(),
                requirements.clone(),
                &self.scarcity,
            );
            let mut state = SchedulingState::new(&self.enrollment);
            runner.run(&mut state);

            let entries = state.into_entries();
            let violations = validate_schedule(&entries, input, config);
            let coverage = self.coverage_of(&entries);
            let summary = ViolationSummary::of(&violations);
            info!(
                "Iteration {}: {:.1}% coverage, {} classes, {} violations ({} workload)",
                iteration,
                coverage,
                entries.len(),
                summary.total,
                summary.workload
            );

            let valid = violations.is_empty();
            if valid {
                let best_coverage = best.as_ref().map_or(0.0, |(_, c)| *c);
                if coverage > best_coverage {
                    info!("New best result: {:.1}%", coverage);
                    best = Some((entries, coverage));
                }
            } else {
                debug!(
                    "Iteration {} rejected: {} coach(es) affected, {:?}",
                    iteration, summary.coaches, summary.by_type
                );
            }

            if valid && coverage >= 100.0 {
                info!("Full coverage with zero violations after {} iteration(s)", iteration);
                break;
            }

            if iteration % config.shuffle_interval == 0 {
                debug!("Reshuffling pool and coach order");
                pool.shuffle(&mut rng);
                for group in &mut coach_groups {
                    group.shuffle(&mut rng);
                }
            }
        }

        let (entries, used_fallback) = match best {
            Some((entries, _)) => (entries, false),
            None => {
                warn!("No violation-free iteration placed any students; using the single-pass fallback");
                (self.fallback(&checker), true)
            }
        };

        let mut schedule = Schedule::new();
        schedule.violations = validate_schedule(&entries, input, config);
        schedule.entries = entries;
        schedule.sort_chronologically();

        let statistics = ScheduleStatistics::calculate(&schedule, &input.coaches, self.total_demand);
        info!(
            "Final result: {:.1}% coverage ({} of {} students, {} classes)",
            statistics.coverage_percentage,
            statistics.total_students_scheduled,
            statistics.total_students_required,
            statistics.total_classes
        );
        if statistics.students_unplaced() > 0 {
            warn!(
                "{} students unassigned within the workload limits",
                statistics.students_unplaced()
            );
        }
        ScheduleSummary::build(&schedule, input).log();

        ScheduleResult {
            schedule,
            statistics,
            iterations_run,
            used_fallback,
            seed: config.seed,
        }
    }

    /// One class per requirement on its best admissible candidate.
    ///
    /// Classes are capped at one level's capacity and never split.
    pub fn fallback(&self, checker: &ConstraintChecker<'_>) -> Vec<ScheduledEntry> {
        let facts = &self.input.facts;
        let scorer = CandidateScorer::new(facts, &self.config);
        let mut state = SchedulingState::new(&self.enrollment);

        for (key, &students) in &self.enrollment {
            let size = students.min(facts.capacity_of(&key.level));
            if size == 0 {
                continue;
            }
            let mut best: Option<(&CandidateAssignment, f64)> = None;
            for &candidate in self
                .pool
                .iter()
                .filter(|c| c.branch == key.branch && c.level == key.level)
            {
                if checker.check(candidate, size, &state).is_err() {
                    continue;
                }
                let score = scorer.score(candidate, &state);
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((candidate, score));
                }
            }
            if let Some((candidate, _)) = best {
                state.record(
                    ScheduledEntry::from_candidate(candidate, size),
                    scorer.morning_class(candidate),
                );
                state.reduce_unmet(key, size);
            }
        }
        state.into_entries()
    }

    fn coverage_of(&self, entries: &[ScheduledEntry]) -> f64 {
        if self.total_demand == 0 {
            return 0.0;
        }
        let seated: u32 = entries.iter().map(|e| e.actual_students).sum();
        f64::from(seated) / f64::from(self.total_demand) * 100.0
    }
}

/// Popular candidates when asked for and any exist; otherwise all.
fn select_pool(candidates: &[CandidateAssignment], popular_only: bool) -> Vec<&CandidateAssignment> {
    if popular_only {
        let popular: Vec<_> = candidates.iter().filter(|c| c.is_popular).collect();
        if !popular.is_empty() {
            return popular;
        }
        warn!("No popular candidates; using all {} candidates", candidates.len());
    }
    candidates.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{BusinessFacts, CoachRecord, EnrollmentRecord, PopularSlotRecord, RawData};
    use crate::models::{Availability, ClockTime, CoachId, Day, HalfDay};
    use rand::Rng;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn coach(id: CoachId, status: CoachStatus) -> Coach {
        Coach::new(id, format!("Coach {id}"), status)
            .with_qualification("L1")
            .with_branch("BB")
            .with_availability(Availability::always(&Day::ALL))
    }

    fn cand(id: usize, coach: &Coach, day: Day, h: u16, m: u16, popular: bool) -> CandidateAssignment {
        let start = ClockTime::new(h, m);
        CandidateAssignment {
            id,
            coach_id: coach.id,
            coach_name: coach.name.clone(),
            coach_status: coach.status,
            branch: "BB".into(),
            level: "L1".into(),
            day,
            start,
            end: start.plus_minutes(90),
            duration: 90,
            period: HalfDay::of(start),
            is_popular: popular,
            capacity: 8,
        }
    }

    fn single_coach_input(students: u32, slots: &[(Day, u16, u16)]) -> SchedulingInput {
        let ann = coach(1, CoachStatus::FullTime);
        let candidates = slots
            .iter()
            .enumerate()
            .map(|(i, &(day, h, m))| cand(i, &ann, day, h, m, true))
            .collect();
        SchedulingInput::new(
            BusinessFacts::default(),
            vec![ann],
            vec![Requirement::new("BB", "L1", students, 8, 90)],
            candidates,
        )
    }

    #[test]
    fn test_single_class_full_coverage() {
        init_logger();
        let input = single_coach_input(8, &[(Day::Sat, 9, 0)]);
        let result = PhasedScheduler::new(&input, EngineConfig::default())
            .unwrap()
            .run();

        assert_eq!(result.schedule.class_count(), 1);
        assert_eq!(result.schedule.entries[0].actual_students, 8);
        assert!((result.statistics.coverage_percentage - 100.0).abs() < 1e-10);
        assert!(result.schedule.is_valid());
        assert_eq!(result.iterations_run, 1);
        assert!(!result.used_fallback);
    }

    #[test]
    fn test_weekday_cap_limits_coverage() {
        let input = single_coach_input(
            20,
            &[
                (Day::Wed, 10, 0),
                (Day::Wed, 14, 0),
                (Day::Wed, 15, 30),
                (Day::Wed, 17, 0),
            ],
        );
        let config = EngineConfig::default().with_max_iterations(5);
        let result = PhasedScheduler::new(&input, config).unwrap().run();

        assert!(result.schedule.class_count() <= 3);
        assert!(result.statistics.total_students_scheduled <= 24);
        assert!(result.statistics.coverage_percentage < 100.0);
        assert!(result.schedule.is_valid());
        assert_eq!(result.iterations_run, 5);
        // 240 weekday minutes allow two 90-minute classes
        assert_eq!(result.schedule.class_count(), 2);
    }

    #[test]
    fn test_insufficient_input() {
        let mut input = single_coach_input(8, &[(Day::Sat, 9, 0)]);
        input.coaches.clear();
        match PhasedScheduler::new(&input, EngineConfig::default()) {
            Err(EngineError::InsufficientInput { coaches, requirements, candidates }) => {
                assert_eq!((coaches, requirements, candidates), (0, 1, 1));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_input_and_config() {
        let mut input = single_coach_input(8, &[(Day::Sat, 9, 0)]);
        input.candidates[0].coach_id = 99;
        assert!(matches!(
            PhasedScheduler::new(&input, EngineConfig::default()),
            Err(EngineError::InvalidInput(_))
        ));

        let input = single_coach_input(8, &[(Day::Sat, 9, 0)]);
        let config = EngineConfig {
            shuffle_interval: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            PhasedScheduler::new(&input, config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_popular_pool_falls_back_to_all() {
        let mut input = single_coach_input(8, &[(Day::Sat, 9, 0), (Day::Sun, 9, 0)]);
        for c in &mut input.candidates {
            c.is_popular = false;
        }
        let scheduler = PhasedScheduler::new(&input, EngineConfig::default()).unwrap();
        assert_eq!(scheduler.pool().len(), 2);

        input.candidates[1].is_popular = true;
        let scheduler = PhasedScheduler::new(&input, EngineConfig::default()).unwrap();
        assert_eq!(scheduler.pool().len(), 1);

        let config = EngineConfig {
            popular_only: false,
            ..EngineConfig::default()
        };
        let scheduler = PhasedScheduler::new(&input, config).unwrap();
        assert_eq!(scheduler.pool().len(), 2);
    }

    #[test]
    fn test_theoretical_capacity() {
        let input = single_coach_input(8, &[(Day::Sat, 9, 0)]);
        let scheduler = PhasedScheduler::new(&input, EngineConfig::default()).unwrap();
        // 4 weekdays x 3 + 2 weekend days x 5 = 22 classes; mean capacity 96 / 11
        assert_eq!(scheduler.theoretical_capacity(), 192);

        let mut input = input;
        input.coaches[0].status = CoachStatus::BranchManager;
        let scheduler = PhasedScheduler::new(&input, EngineConfig::default()).unwrap();
        // weekly cap of 3
        assert_eq!(scheduler.theoretical_capacity(), 26);
    }

    #[test]
    fn test_requirement_analysis() {
        let mut input = single_coach_input(8, &[(Day::Sat, 9, 0)]);
        input.requirements.push(Requirement::new("CH", "L1", 5, 8, 90));
        let scheduler = PhasedScheduler::new(&input, EngineConfig::default()).unwrap();
        let analysis = scheduler.requirement_analysis();
        assert_eq!(analysis.len(), 2);
        assert!(!analysis[0].is_critical());
        assert_eq!(analysis[1].key, RequirementKey::new("CH", "L1"));
        assert!(analysis[1].is_critical());
    }

    #[test]
    fn test_fallback_one_class_per_requirement() {
        let input = single_coach_input(20, &[(Day::Sat, 9, 0), (Day::Sat, 11, 0)]);
        let scheduler = PhasedScheduler::new(&input, EngineConfig::default()).unwrap();
        let checker = ConstraintChecker::new(&input.facts, scheduler.config(), &input.coaches);
        let entries = scheduler.fallback(&checker);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actual_students, 8);
    }

    #[test]
    fn test_zero_coverage_uses_fallback() {
        let mut input = single_coach_input(8, &[(Day::Sat, 9, 0)]);
        input.coaches[0].availability = Availability::new();
        let config = EngineConfig::default().with_max_iterations(3);
        let result = PhasedScheduler::new(&input, config).unwrap().run();

        assert!(result.used_fallback);
        assert_eq!(result.schedule.class_count(), 0);
        assert!(result.statistics.coverage_percentage.abs() < 1e-10);
        assert_eq!(result.iterations_run, 3);
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let input = std::iter::repeat_with(|| SchedulingInput::from_raw(&random_raw(&mut rng)))
            .find(|input| PhasedScheduler::new(input, EngineConfig::default()).is_ok())
            .unwrap();
        let config = EngineConfig::default().with_max_iterations(6).with_seed(11);
        let a = PhasedScheduler::new(&input, config.clone()).unwrap().run();
        let b = PhasedScheduler::new(&input, config).unwrap().run();
        assert_eq!(a.schedule.entries, b.schedule.entries);
        assert_eq!(a.iterations_run, b.iterations_run);
        assert_eq!(a.seed, 11);
    }

    fn random_raw(rng: &mut ChaCha8Rng) -> RawData {
        const BRANCHES: [&str; 2] = ["BB", "CH"];
        const LEVELS: [&str; 4] = ["Tots", "L1", "L2", "L3"];
        const DAYS: [&str; 3] = ["WED", "SAT", "SUN"];

        let mut enrollments = Vec::new();
        for branch in BRANCHES {
            for level in LEVELS {
                if rng.random_bool(0.7) {
                    enrollments.push(EnrollmentRecord {
                        branch: branch.into(),
                        level: level.into(),
                        count: rng.random_range(1..=30),
                    });
                }
            }
        }

        let coaches = (1..=rng.random_range(2..=6))
            .map(|id| {
                let qualifications = LEVELS
                    .iter()
                    .filter(|_| rng.random_bool(0.6))
                    .map(|l| l.to_string())
                    .collect();
                let branches = BRANCHES
                    .iter()
                    .filter(|_| rng.random_bool(0.7))
                    .map(|b| b.to_string())
                    .collect();
                CoachRecord {
                    id,
                    name: format!("Coach {id}"),
                    position: if rng.random_bool(0.2) { "Branch Manager" } else { "Coach" }.into(),
                    status: if rng.random_bool(0.5) { "Full time" } else { "Part time" }.into(),
                    branches,
                    qualifications,
                }
            })
            .collect();

        let popular_slots = LEVELS
            .iter()
            .flat_map(|level| DAYS.iter().map(move |day| (*level, *day)))
            .filter(|_| rng.random_bool(0.5))
            .map(|(level, day)| PopularSlotRecord {
                level: level.into(),
                day: day.into(),
                time_slot: if day == "WED" { "14:00-19:00" } else { "09:00-13:00" }.into(),
            })
            .collect();

        RawData {
            enrollments,
            coaches,
            popular_slots,
            ..RawData::default()
        }
    }

    #[test]
    fn test_random_inputs_respect_invariants() {
        init_logger();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut runs = 0;
        for _ in 0..25 {
            let input = SchedulingInput::from_raw(&random_raw(&mut rng));
            let config = EngineConfig::default()
                .with_max_iterations(3)
                .with_seed(rng.random());
            let Ok(scheduler) = PhasedScheduler::new(&input, config.clone()) else {
                continue;
            };
            runs += 1;
            let result = scheduler.run();

            assert!(result.schedule.is_valid(), "{:?}", result.schedule.violations);
            assert!(validate_schedule(&result.schedule.entries, &input, &config).is_empty());

            for entry in &result.schedule.entries {
                assert!(entry.actual_students <= input.facts.capacity_of(&entry.level));
                assert_eq!(entry.allocations.values().sum::<u32>(), entry.actual_students);
            }
            let enrollment = input.enrollment();
            for (key, seated) in result.schedule.students_by_requirement() {
                assert!(seated <= enrollment.get(&key).copied().unwrap_or(0), "{key}");
            }
            assert!(result.statistics.coverage_percentage <= 100.0 + 1e-10);
        }
        assert!(runs > 10);
    }
}
