//! Coach (staff resource) model.
//!
//! A coach is the renewable resource of the timetabling problem: it teaches
//! at most one class at a time, only levels it is qualified for, only at
//! branches it is assigned to, and only during half-days it is available.
//! Employment status determines the weekly class cap.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::time::{Day, HalfDay};

/// Coach identifier.
pub type CoachId = u32;

/// Employment status of a coach.
///
/// Ordering follows selection preference: full-time before part-time
/// before branch managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoachStatus {
    #[serde(rename = "Full Time")]
    FullTime,
    #[serde(rename = "Part Time")]
    PartTime,
    #[serde(rename = "Branch Manager")]
    BranchManager,
}

impl CoachStatus {
    /// All statuses in selection order.
    pub const ALL: [CoachStatus; 3] = [
        CoachStatus::FullTime,
        CoachStatus::PartTime,
        CoachStatus::BranchManager,
    ];

    /// Derives status from roster strings.
    ///
    /// Precedence: any "manager" marker in the position wins, then a
    /// full-time marker in the status, otherwise part-time.
    pub fn from_roster(position: &str, status: &str) -> Self {
        let position = position.to_ascii_lowercase();
        let status = status.to_ascii_lowercase().replace('-', " ");
        if position.contains("manager") {
            CoachStatus::BranchManager
        } else if status.contains("full time") {
            CoachStatus::FullTime
        } else {
            CoachStatus::PartTime
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            CoachStatus::FullTime => "Full Time",
            CoachStatus::PartTime => "Part Time",
            CoachStatus::BranchManager => "Branch Manager",
        }
    }
}

impl fmt::Display for CoachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-status workload limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadLimits {
    /// Max classes on a weekday.
    pub weekday_classes: u32,
    /// Max classes on a weekend day.
    pub weekend_classes: u32,
    /// Max teaching minutes on a weekday.
    pub weekday_minutes: u32,
    /// Max teaching minutes on a weekend day.
    pub weekend_minutes: u32,
    /// Max classes per week.
    pub weekly_classes: u32,
    /// Max classes in one run without a full break.
    pub consecutive_classes: u32,
    /// Gap (minutes) that ends a run of consecutive classes.
    pub min_break_minutes: u32,
}

impl WorkloadLimits {
    /// Daily class cap for a weekend or weekday.
    pub fn daily_classes(&self, weekend: bool) -> u32 {
        if weekend {
            self.weekend_classes
        } else {
            self.weekday_classes
        }
    }

    /// Daily minute cap for a weekend or weekday.
    pub fn daily_minutes(&self, weekend: bool) -> u32 {
        if weekend {
            self.weekend_minutes
        } else {
            self.weekday_minutes
        }
    }
}

/// Availability of one day, split into halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub am: bool,
    pub pm: bool,
}

/// Per-(day, half-day) availability.
///
/// A day with no entry is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    days: BTreeMap<Day, DayAvailability>,
}

impl Availability {
    /// Creates an availability with no open half-days.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fully available on every listed day.
    pub fn always(days: &[Day]) -> Self {
        days.iter().fold(Self::new(), |a, &d| a.with_day(d, true, true))
    }

    /// Sets both halves of a day.
    pub fn with_day(mut self, day: Day, am: bool, pm: bool) -> Self {
        self.days.insert(day, DayAvailability { am, pm });
        self
    }

    /// Sets one half of a day.
    pub fn set(&mut self, day: Day, half: HalfDay, available: bool) {
        let slot = self.days.entry(day).or_default();
        match half {
            HalfDay::Am => slot.am = available,
            HalfDay::Pm => slot.pm = available,
        }
    }

    /// Whether the coach is available for the given half-day.
    pub fn is_available(&self, day: Day, half: HalfDay) -> bool {
        self.days.get(&day).is_some_and(|d| match half {
            HalfDay::Am => d.am,
            HalfDay::Pm => d.pm,
        })
    }
}

/// A coach.
///
/// Immutable for the duration of a scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    /// Unique identifier.
    pub id: CoachId,
    /// Display name.
    pub name: String,
    /// Employment status.
    pub status: CoachStatus,
    /// Levels this coach may teach.
    pub qualifications: BTreeSet<String>,
    /// Branches this coach is assigned to.
    pub branches: BTreeSet<String>,
    /// Half-day availability.
    pub availability: Availability,
}

impl Coach {
    /// Creates a coach with no qualifications, branches, or availability.
    pub fn new(id: CoachId, name: impl Into<String>, status: CoachStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            qualifications: BTreeSet::new(),
            branches: BTreeSet::new(),
            availability: Availability::new(),
        }
    }

    /// Adds a qualified level.
    pub fn with_qualification(mut self, level: impl Into<String>) -> Self {
        self.qualifications.insert(level.into());
        self
    }

    /// Adds several qualified levels.
    pub fn with_qualifications<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.qualifications.extend(levels.into_iter().map(Into::into));
        self
    }

    /// Adds an assigned branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branches.insert(branch.into());
        self
    }

    /// Sets availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Whether this coach can teach `level` at `branch`.
    pub fn can_teach(&self, branch: &str, level: &str) -> bool {
        self.qualifications.contains(level) && self.branches.contains(branch)
    }

    /// Whether this coach can teach every level in `levels` at `branch`.
    pub fn can_teach_all(&self, branch: &str, levels: &[&str]) -> bool {
        self.branches.contains(branch) && levels.iter().all(|l| self.qualifications.contains(*l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_precedence() {
        assert_eq!(
            CoachStatus::from_roster("Branch Manager", "Full time"),
            CoachStatus::BranchManager
        );
        assert_eq!(
            CoachStatus::from_roster("Coach", "Full time"),
            CoachStatus::FullTime
        );
        assert_eq!(
            CoachStatus::from_roster("Coach", "full-time"),
            CoachStatus::FullTime
        );
        assert_eq!(
            CoachStatus::from_roster("Coach", "Part time"),
            CoachStatus::PartTime
        );
        assert_eq!(CoachStatus::from_roster("", ""), CoachStatus::PartTime);
    }

    #[test]
    fn test_status_order_and_serde() {
        let mut s = vec![
            CoachStatus::BranchManager,
            CoachStatus::PartTime,
            CoachStatus::FullTime,
        ];
        s.sort();
        assert_eq!(s, CoachStatus::ALL.to_vec());
        assert_eq!(
            serde_json::to_string(&CoachStatus::BranchManager).unwrap(),
            "\"Branch Manager\""
        );
    }

    #[test]
    fn test_daily_limits_by_day_type() {
        let limits = WorkloadLimits {
            weekday_classes: 3,
            weekend_classes: 5,
            weekday_minutes: 240,
            weekend_minutes: 480,
            weekly_classes: 15,
            consecutive_classes: 3,
            min_break_minutes: 60,
        };
        assert_eq!(limits.daily_classes(true), 5);
        assert_eq!(limits.daily_classes(false), 3);
        assert_eq!(limits.daily_minutes(true), 480);
        assert_eq!(limits.daily_minutes(false), 240);
    }

    #[test]
    fn test_availability_default_closed() {
        let mut a = Availability::new().with_day(Day::Tue, true, false);
        assert!(a.is_available(Day::Tue, HalfDay::Am));
        assert!(!a.is_available(Day::Tue, HalfDay::Pm));
        assert!(!a.is_available(Day::Wed, HalfDay::Am));

        a.set(Day::Wed, HalfDay::Pm, true);
        assert!(a.is_available(Day::Wed, HalfDay::Pm));
        assert!(!a.is_available(Day::Wed, HalfDay::Am));
    }

    #[test]
    fn test_availability_serde_keys() {
        let a = Availability::always(&[Day::Sat]);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"SAT\""));
        let back: Availability = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn test_can_teach() {
        let c = Coach::new(1, "Ann", CoachStatus::FullTime)
            .with_qualifications(["L1", "L2"])
            .with_branch("BB");
        assert!(c.can_teach("BB", "L1"));
        assert!(!c.can_teach("CH", "L1"));
        assert!(!c.can_teach("BB", "L3"));
        assert!(c.can_teach_all("BB", &["L1", "L2"]));
        assert!(!c.can_teach_all("BB", &["L1", "L3"]));
    }
}
