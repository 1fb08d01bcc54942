//! Built-in business defaults.
//!
//! Used whenever the raw data does not say otherwise.

use std::collections::BTreeMap;

use crate::models::{ClockTime, Day, TimeWindow};

/// Day on which no classes run.
pub const NON_OPERATING_DAY: Day = Day::Mon;

/// Weekdays of the operating week.
pub const WEEKDAYS: [Day; 4] = [Day::Tue, Day::Wed, Day::Thu, Day::Fri];

/// Weekend days of the operating week.
pub const WEEKENDS: [Day; 2] = [Day::Sat, Day::Sun];

/// Level progression, easiest first.
pub const LEVEL_HIERARCHY: [&str; 11] = [
    "Tots", "Jolly", "Bubbly", "Lively", "Flexi", "L1", "L2", "L3", "L4", "Advance", "Free",
];

/// Branches and their concurrent-class limits.
pub const BRANCH_LIMITS: [(&str, u32); 6] = [
    ("BB", 4),
    ("CCK", 4),
    ("CH", 5),
    ("HG", 4),
    ("KT", 4),
    ("PR", 6),
];

/// Concurrent-class limit for a branch without configuration.
pub const FALLBACK_BRANCH_LIMIT: u32 = 4;

/// Class capacity for a level outside every tier.
pub const FALLBACK_CAPACITY: u32 = 8;

/// Operating days in week order.
pub fn operating_days() -> Vec<Day> {
    Day::ALL
        .into_iter()
        .filter(|d| *d != NON_OPERATING_DAY)
        .collect()
}

/// Tiered class capacity by level name.
pub fn capacity_for(level: &str) -> u32 {
    match level {
        "Tots" => 7,
        "Jolly" | "Bubbly" | "Lively" | "Flexi" | "L1" => 8,
        "L2" => 9,
        "L3" | "L4" | "Advance" | "Free" => 10,
        _ => FALLBACK_CAPACITY,
    }
}

/// Tiered class duration (minutes) by level name.
pub fn duration_for(level: &str) -> u32 {
    match level {
        "L1" | "L2" | "L3" | "L4" | "Advance" | "Free" => 90,
        _ => 60,
    }
}

/// Program family of a level.
pub fn program_for(level: &str) -> &str {
    match level {
        "L1" | "L2" | "L3" | "L4" => "Level",
        "Advance" | "Free" => "Advanced",
        other => other,
    }
}

/// Open periods per operating day.
pub fn operating_hours() -> BTreeMap<Day, Vec<TimeWindow>> {
    let w = |sh, sm, eh, em| TimeWindow::new(ClockTime::new(sh, sm), ClockTime::new(eh, em));
    let split = vec![w(10, 0, 12, 0), w(14, 0, 19, 0)];
    BTreeMap::from([
        (Day::Tue, vec![w(15, 0, 19, 0)]),
        (Day::Wed, split.clone()),
        (Day::Thu, split.clone()),
        (Day::Fri, split),
        (Day::Sat, vec![w(8, 30, 18, 30)]),
        (Day::Sun, vec![w(8, 30, 18, 30)]),
    ])
}

/// Weekday midday closure.
pub fn lunch_break() -> TimeWindow {
    TimeWindow::new(ClockTime::new(12, 0), ClockTime::new(14, 0))
}

/// Maps legacy level spellings onto canonical names.
///
/// `BearyTots` becomes `Tots`; `Level_1`, `Level 1` and `level1` become `L1`.
pub fn canonical_level(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("BearyTots") {
        return "Tots".to_string();
    }
    let lower = trimmed.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("level") {
        let digits = rest.trim_start_matches(['_', ' ', '-']);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return format!("L{digits}");
        }
    }
    trimmed.to_string()
}
