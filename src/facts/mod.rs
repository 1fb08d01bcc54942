//! Fact extraction.
//!
//! Normalizes raw roster, enrollment, off-day, popular-slot, and branch
//! records into canonical facts, and derives the business constants the
//! scheduler works with. Every derivation has a fallback: sparse input
//! yields fewer usable facts, never an error.
//!
//! # Derivations
//!
//! | Fact | Source | Fallback |
//! |------|--------|----------|
//! | levels | enrollment, then level config | built-in hierarchy |
//! | branches | enrollment, then branch config | built-in branch list |
//! | capacity / duration | level config | tiered by level name |
//! | branch limit | branch config | built-in limits |
//! | coach status | position + status strings | part-time |
//! | availability | off-day records | available |

pub mod defaults;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::models::{
    Availability, Coach, CoachId, CoachStatus, Day, HalfDay, Requirement, TimeWindow,
    MINUTES_PER_DAY,
};

/// One enrollment row: students waiting for a level at a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub branch: String,
    pub level: String,
    pub count: i64,
}

/// One roster row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachRecord {
    pub id: CoachId,
    pub name: String,
    pub position: String,
    pub status: String,
    /// Branch codes, each entry may hold several separated by commas or spaces.
    pub branches: Vec<String>,
    pub qualifications: Vec<String>,
}

/// A half-day a coach does not work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffdayRecord {
    pub coach_id: CoachId,
    pub day: Day,
    pub half: HalfDay,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A high-demand time range hint for a level on a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularSlotRecord {
    pub level: String,
    pub day: String,
    /// `"HH:MM-HH:MM"`.
    pub time_slot: String,
}

/// Explicit branch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub branch: String,
    pub max_classes_per_slot: u32,
}

/// Explicit level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelRecord {
    pub name: String,
    pub max_students: Option<u32>,
    pub duration_minutes: Option<u32>,
}

/// Raw collections as delivered by the data-loading layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawData {
    pub enrollments: Vec<EnrollmentRecord>,
    pub coaches: Vec<CoachRecord>,
    pub offdays: Vec<OffdayRecord>,
    pub popular_slots: Vec<PopularSlotRecord>,
    pub branches: Vec<BranchRecord>,
    pub levels: Vec<LevelRecord>,
}

/// A parsed popular range for one level and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularRange {
    pub level: String,
    pub day: Day,
    pub window: TimeWindow,
}

/// Business constants derived from the raw data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessFacts {
    pub levels: Vec<String>,
    pub branches: Vec<String>,
    /// Operating days in week order.
    pub days: Vec<Day>,
    pub weekdays: Vec<Day>,
    pub weekends: Vec<Day>,
    pub class_capacities: BTreeMap<String, u32>,
    /// Class length per level (minutes).
    pub class_durations: BTreeMap<String, u32>,
    /// Max concurrent classes per branch per 30-minute slot.
    pub branch_limits: BTreeMap<String, u32>,
    pub level_hierarchy: Vec<String>,
    pub program_groups: BTreeMap<String, String>,
    pub operating_hours: BTreeMap<Day, Vec<TimeWindow>>,
    /// Weekday closure; no class may overlap it on a weekday.
    pub lunch_break: TimeWindow,
}

/// Output of fact extraction.
#[derive(Debug, Clone)]
pub struct ExtractedFacts {
    pub facts: BusinessFacts,
    pub coaches: Vec<Coach>,
    pub requirements: Vec<Requirement>,
    pub popular_ranges: Vec<PopularRange>,
}

impl Default for BusinessFacts {
    fn default() -> Self {
        let levels: Vec<String> = defaults::LEVEL_HIERARCHY.iter().map(|l| l.to_string()).collect();
        Self {
            class_capacities: levels
                .iter()
                .map(|l| (l.clone(), defaults::capacity_for(l)))
                .collect(),
            class_durations: levels
                .iter()
                .map(|l| (l.clone(), defaults::duration_for(l)))
                .collect(),
            program_groups: levels
                .iter()
                .map(|l| (l.clone(), defaults::program_for(l).to_string()))
                .collect(),
            level_hierarchy: levels.clone(),
            levels,
            branches: defaults::BRANCH_LIMITS.iter().map(|(b, _)| b.to_string()).collect(),
            branch_limits: defaults::BRANCH_LIMITS
                .iter()
                .map(|(b, n)| (b.to_string(), *n))
                .collect(),
            days: defaults::operating_days(),
            weekdays: defaults::WEEKDAYS.to_vec(),
            weekends: defaults::WEEKENDS.to_vec(),
            operating_hours: defaults::operating_hours(),
            lunch_break: defaults::lunch_break(),
        }
    }
}

impl BusinessFacts {
    /// Class capacity of a level.
    pub fn capacity_of(&self, level: &str) -> u32 {
        self.class_capacities
            .get(level)
            .copied()
            .unwrap_or(defaults::FALLBACK_CAPACITY)
    }

    /// Class duration of a level (minutes).
    pub fn duration_of(&self, level: &str) -> u32 {
        self.class_durations
            .get(level)
            .copied()
            .unwrap_or_else(|| defaults::duration_for(level))
    }

    /// Concurrent-class limit of a branch.
    pub fn branch_limit(&self, branch: &str) -> u32 {
        self.branch_limits
            .get(branch)
            .copied()
            .unwrap_or(defaults::FALLBACK_BRANCH_LIMIT)
    }

    pub fn is_weekend(&self, day: Day) -> bool {
        self.weekends.contains(&day)
    }

    pub fn is_weekday(&self, day: Day) -> bool {
        self.weekdays.contains(&day)
    }

    /// Position of a level in the hierarchy.
    pub fn hierarchy_index(&self, level: &str) -> Option<usize> {
        self.level_hierarchy.iter().position(|l| l == level)
    }

    /// Program family of a level; a level outside every family is its own.
    pub fn program_of<'a>(&'a self, level: &'a str) -> &'a str {
        self.program_groups.get(level).map_or(level, String::as_str)
    }

    /// Whether two levels may share a class.
    ///
    /// Identical levels always may; otherwise both must be in the hierarchy
    /// and at most `distance` apart.
    pub fn levels_compatible(&self, a: &str, b: &str, distance: u32) -> bool {
        if a == b {
            return true;
        }
        match (self.hierarchy_index(a), self.hierarchy_index(b)) {
            (Some(i), Some(j)) => i.abs_diff(j) <= distance as usize,
            _ => false,
        }
    }
}

/// Extracts facts, coaches, requirements, and popular ranges from raw data.
///
/// # Example
/// ```
/// use coach_roster::facts::{extract, EnrollmentRecord, RawData};
///
/// let raw = RawData {
///     enrollments: vec![EnrollmentRecord { branch: "bb".into(), level: "Level_1".into(), count: 12 }],
///     ..RawData::default()
/// };
/// let extracted = extract(&raw);
/// assert_eq!(extracted.requirements.len(), 1);
/// assert_eq!(extracted.requirements[0].branch, "BB");
/// assert_eq!(extracted.requirements[0].level, "L1");
/// ```
pub fn extract(raw: &RawData) -> ExtractedFacts {
    let base = BusinessFacts::default();

    let levels = derive_levels(raw, &base.level_hierarchy);
    let branches = derive_branches(raw);

    let level_overrides: BTreeMap<String, &LevelRecord> = raw
        .levels
        .iter()
        .map(|l| (defaults::canonical_level(&l.name), l))
        .collect();
    let mut class_capacities = BTreeMap::new();
    let mut class_durations = BTreeMap::new();
    for level in &levels {
        let config = level_overrides.get(level);
        class_capacities.insert(
            level.clone(),
            config
                .and_then(|c| c.max_students)
                .filter(|n| *n > 0)
                .unwrap_or_else(|| defaults::capacity_for(level)),
        );
        let duration = match config.and_then(|c| c.duration_minutes) {
            Some(n) if (1..=MINUTES_PER_DAY).contains(&n) => n,
            Some(n) => {
                warn!("ignoring {n}-minute duration for {level}; using the default");
                defaults::duration_for(level)
            }
            None => defaults::duration_for(level),
        };
        class_durations.insert(level.clone(), duration);
    }

    let branch_limits = if raw.branches.is_empty() {
        base.branch_limits.clone()
    } else {
        raw.branches
            .iter()
            .map(|b| (b.branch.trim().to_ascii_uppercase(), b.max_classes_per_slot))
            .collect()
    };

    let mut program_groups = base.program_groups.clone();
    for level in &levels {
        program_groups
            .entry(level.clone())
            .or_insert_with(|| defaults::program_for(level).to_string());
    }

    let facts = BusinessFacts {
        levels,
        branches,
        class_capacities,
        class_durations,
        branch_limits,
        program_groups,
        ..base
    };

    let coaches = extract_coaches(raw, &facts);
    let requirements = extract_requirements(raw, &facts);
    let popular_ranges = extract_popular_ranges(raw, &facts);

    debug!(
        "extracted facts: {} levels, {} branches, {} coaches, {} requirements, {} popular ranges",
        facts.levels.len(),
        facts.branches.len(),
        coaches.len(),
        requirements.len(),
        popular_ranges.len()
    );

    ExtractedFacts {
        facts,
        coaches,
        requirements,
        popular_ranges,
    }
}

fn derive_levels(raw: &RawData, hierarchy: &[String]) -> Vec<String> {
    let mut found: BTreeSet<String> = raw
        .enrollments
        .iter()
        .map(|e| defaults::canonical_level(&e.level))
        .filter(|l| !l.is_empty())
        .collect();
    if found.is_empty() {
        found = raw
            .levels
            .iter()
            .map(|l| defaults::canonical_level(&l.name))
            .filter(|l| !l.is_empty())
            .collect();
    }
    if found.is_empty() {
        return hierarchy.to_vec();
    }
    let mut levels: Vec<String> = found.into_iter().collect();
    levels.sort_by_key(|l| {
        (
            hierarchy.iter().position(|h| h == l).unwrap_or(usize::MAX),
            l.clone(),
        )
    });
    levels
}

fn derive_branches(raw: &RawData) -> Vec<String> {
    let from_enrollment: BTreeSet<String> = raw
        .enrollments
        .iter()
        .map(|e| e.branch.trim().to_ascii_uppercase())
        .filter(|b| !b.is_empty())
        .collect();
    if !from_enrollment.is_empty() {
        return from_enrollment.into_iter().collect();
    }
    let from_config: BTreeSet<String> = raw
        .branches
        .iter()
        .map(|b| b.branch.trim().to_ascii_uppercase())
        .filter(|b| !b.is_empty())
        .collect();
    if !from_config.is_empty() {
        return from_config.into_iter().collect();
    }
    defaults::BRANCH_LIMITS.iter().map(|(b, _)| b.to_string()).collect()
}

/// Splits branch strings on commas and whitespace, keeping known branches.
fn parse_branches(entries: &[String], known: &[String]) -> BTreeSet<String> {
    entries
        .iter()
        .flat_map(|e| e.split(|c: char| c == ',' || c.is_whitespace()))
        .map(|b| b.trim().to_ascii_uppercase())
        .filter(|b| known.contains(b))
        .collect()
}

fn extract_coaches(raw: &RawData, facts: &BusinessFacts) -> Vec<Coach> {
    let offdays: HashSet<(CoachId, Day, HalfDay)> = raw
        .offdays
        .iter()
        .map(|o| (o.coach_id, o.day, o.half))
        .collect();

    let mut coaches: Vec<Coach> = raw
        .coaches
        .iter()
        .map(|record| {
            let mut qualifications: BTreeSet<String> = record
                .qualifications
                .iter()
                .map(|q| defaults::canonical_level(q))
                .filter(|q| !q.is_empty())
                .collect();
            if qualifications.contains("Advance") {
                qualifications.insert("Free".to_string());
            }

            let mut availability = Availability::new();
            for &day in &facts.days {
                for half in [HalfDay::Am, HalfDay::Pm] {
                    availability.set(day, half, !offdays.contains(&(record.id, day, half)));
                }
            }

            Coach {
                id: record.id,
                name: record.name.trim().to_string(),
                status: CoachStatus::from_roster(&record.position, &record.status),
                qualifications,
                branches: parse_branches(&record.branches, &facts.branches),
                availability,
            }
        })
        .collect();
    coaches.sort_by_key(|c| c.id);
    coaches
}

fn extract_requirements(raw: &RawData, facts: &BusinessFacts) -> Vec<Requirement> {
    let mut demand: BTreeMap<(String, String), u32> = BTreeMap::new();
    for record in &raw.enrollments {
        let branch = record.branch.trim().to_ascii_uppercase();
        let level = defaults::canonical_level(&record.level);
        if !facts.branches.contains(&branch) || !facts.levels.contains(&level) {
            debug!("dropping enrollment for unknown {branch} {level}");
            continue;
        }
        let Ok(count) = u32::try_from(record.count) else {
            debug!("dropping enrollment {branch} {level} with count {}", record.count);
            continue;
        };
        if count == 0 {
            continue;
        }
        *demand.entry((branch, level)).or_insert(0) += count;
    }

    demand
        .into_iter()
        .map(|((branch, level), students)| {
            let capacity = facts.capacity_of(&level);
            let duration = facts.duration_of(&level);
            Requirement::new(branch, level, students, capacity, duration)
        })
        .collect()
}

fn extract_popular_ranges(raw: &RawData, facts: &BusinessFacts) -> Vec<PopularRange> {
    raw.popular_slots
        .iter()
        .filter_map(|hint| {
            let level = defaults::canonical_level(&hint.level);
            let day: Day = hint.day.parse().ok()?;
            if !facts.levels.contains(&level) || !facts.days.contains(&day) {
                return None;
            }
            match hint.time_slot.parse::<TimeWindow>() {
                Ok(window) => Some(PopularRange { level, day, window }),
                Err(e) => {
                    debug!("skipping popular slot hint: {e}");
                    None
                }
            }
        })
        .collect()
}
