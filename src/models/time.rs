//! Wall-clock time, weekdays, and half-open time windows.
//!
//! Class times live inside a single operating day, so they are stored as
//! minutes after midnight rather than absolute timestamps. Days are the
//! seven weekdays; one of them (Monday) is a non-operating day by default.
//!
//! # Time Model
//! - `ClockTime`: minutes after midnight, serialized as `"HH:MM"`.
//! - `TimeWindow`: half-open interval `[start, end)`.
//! - Branch occupancy is counted in fixed 30-minute slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Granularity of generated start times and branch occupancy slots (minutes).
pub const SLOT_MINUTES: u16 = 30;

/// Minutes in a day; 24:00 is the latest representable end time.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Failure to parse a time, range, or day string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// Not an `HH:MM` clock time.
    #[error("invalid clock time '{0}', expected HH:MM")]
    ClockTime(String),
    /// Not an `HH:MM-HH:MM` range, or the range is empty.
    #[error("invalid time range '{0}', expected HH:MM-HH:MM")]
    Range(String),
    /// Unknown day name.
    #[error("unknown day '{0}'")]
    Day(String),
}

/// A wall-clock time of day with minute resolution.
///
/// # Example
/// ```
/// use coach_roster::models::ClockTime;
///
/// let t: ClockTime = "15:30".parse().unwrap();
/// assert_eq!(t.hour(), 15);
/// assert_eq!(t.to_string(), "15:30");
/// assert_eq!(t.compact(), "1530");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// 12:00, the am/pm boundary.
    pub const NOON: ClockTime = ClockTime(12 * 60);

    /// Creates a time from hour and minute.
    pub const fn new(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    /// Minutes after midnight.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Hour component (0-23).
    #[inline]
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Minute component (0-59).
    #[inline]
    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// This time shifted later by `minutes`, saturating at the end of
    /// the representable range.
    pub fn plus_minutes(self, minutes: u16) -> Self {
        Self(self.0.saturating_add(minutes))
    }

    /// This time shifted later by `minutes`, or `None` past 24:00.
    pub fn checked_plus_minutes(self, minutes: u16) -> Option<Self> {
        self.0
            .checked_add(minutes)
            .filter(|m| u32::from(*m) <= MINUTES_PER_DAY)
            .map(Self)
    }

    /// Signed distance in minutes from `self` to `other`.
    pub fn minutes_until(self, other: ClockTime) -> i32 {
        i32::from(other.0) - i32::from(self.0)
    }

    /// Compact `HHMM` form used by timetable views.
    pub fn compact(self) -> String {
        format!("{:02}{:02}", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimeParseError::ClockTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        let hour: u16 = h.trim().parse().map_err(|_| err())?;
        let minute: u16 = m.trim().parse().map_err(|_| err())?;
        if hour > 23 || minute > 59 {
            return Err(err());
        }
        Ok(Self::new(hour, minute))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Day of the week.
///
/// Ordering is chronological from Monday, so sorting by `Day` yields the
/// TUE..SUN display order of an operating week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    /// All seven days, Monday first.
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    /// Three-letter upper-case code (`"TUE"`).
    pub fn code(self) -> &'static str {
        match self {
            Day::Mon => "MON",
            Day::Tue => "TUE",
            Day::Wed => "WED",
            Day::Thu => "THU",
            Day::Fri => "FRI",
            Day::Sat => "SAT",
            Day::Sun => "SUN",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Day {
    type Err = TimeParseError;

    /// Accepts three-letter codes and full English names, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let prefix = lower.get(..3).unwrap_or(&lower);
        let day = match prefix {
            "mon" => Day::Mon,
            "tue" => Day::Tue,
            "wed" => Day::Wed,
            "thu" => Day::Thu,
            "fri" => Day::Fri,
            "sat" => Day::Sat,
            "sun" => Day::Sun,
            _ => return Err(TimeParseError::Day(s.to_string())),
        };
        if lower.len() > 3 && !day_full_name(day).starts_with(&lower) {
            return Err(TimeParseError::Day(s.to_string()));
        }
        Ok(day)
    }
}

fn day_full_name(day: Day) -> &'static str {
    match day {
        Day::Mon => "monday",
        Day::Tue => "tuesday",
        Day::Wed => "wednesday",
        Day::Thu => "thursday",
        Day::Fri => "friday",
        Day::Sat => "saturday",
        Day::Sun => "sunday",
    }
}

/// Half of an operating day, used for availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfDay {
    Am,
    Pm,
}

impl HalfDay {
    /// Period a class belongs to: `Am` if it starts before noon.
    pub fn of(start: ClockTime) -> Self {
        if start < ClockTime::NOON {
            HalfDay::Am
        } else {
            HalfDay::Pm
        }
    }
}

impl fmt::Display for HalfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalfDay::Am => f.write_str("am"),
            HalfDay::Pm => f.write_str("pm"),
        }
    }
}

/// A time interval [start, end) within one day.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: ClockTime,
    /// Interval end (exclusive).
    pub end: ClockTime,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Window starting at `start` lasting `minutes`.
    pub fn starting_at(start: ClockTime, minutes: u16) -> Self {
        Self::new(start, start.plus_minutes(minutes))
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.end.minutes().saturating_sub(self.start.minutes()))
    }

    /// Whether a time falls within this window.
    #[inline]
    pub fn contains(&self, time: ClockTime) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether `other` lies entirely within this window.
    pub fn encloses(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Start times of the 30-minute occupancy slots this window touches.
    pub fn slots(&self) -> impl Iterator<Item = ClockTime> {
        let end = self.end;
        std::iter::successors(Some(self.start), |t| t.checked_plus_minutes(SLOT_MINUTES))
            .take_while(move |t| *t < end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for TimeWindow {
    type Err = TimeParseError;

    /// Parses `"HH:MM-HH:MM"`. Empty or inverted ranges are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimeParseError::Range(s.to_string());
        let (a, b) = s.split_once('-').ok_or_else(err)?;
        let start: ClockTime = a.parse().map_err(|_| err())?;
        let end: ClockTime = b.parse().map_err(|_| err())?;
        if end <= start {
            return Err(err());
        }
        Ok(Self::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_time_parse_and_display() {
        let t: ClockTime = "08:30".parse().unwrap();
        assert_eq!(t.minutes(), 510);
        assert_eq!(t.to_string(), "08:30");
        assert_eq!("9:05".parse::<ClockTime>().unwrap(), ClockTime::new(9, 5));
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("12-30".parse::<ClockTime>().is_err());
        assert!("ab:cd".parse::<ClockTime>().is_err());
    }

    #[test]
    fn test_clock_time_serde_as_string() {
        let t = ClockTime::new(14, 0);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"14:00\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<ClockTime>("\"99:00\"").is_err());
    }

    #[test]
    fn test_minutes_until() {
        let a = ClockTime::new(10, 0);
        let b = ClockTime::new(11, 30);
        assert_eq!(a.minutes_until(b), 90);
        assert_eq!(b.minutes_until(a), -90);
    }

    #[test]
    fn test_day_parse() {
        assert_eq!("TUE".parse::<Day>().unwrap(), Day::Tue);
        assert_eq!("saturday".parse::<Day>().unwrap(), Day::Sat);
        assert_eq!("Sun".parse::<Day>().unwrap(), Day::Sun);
        assert!("tuesdayx".parse::<Day>().is_err());
        assert!("XYZ".parse::<Day>().is_err());
    }

    #[test]
    fn test_day_order_and_serde() {
        let mut days = vec![Day::Sun, Day::Tue, Day::Sat, Day::Wed];
        days.sort();
        assert_eq!(days, vec![Day::Tue, Day::Wed, Day::Sat, Day::Sun]);
        assert_eq!(serde_json::to_string(&Day::Thu).unwrap(), "\"THU\"");
    }

    #[test]
    fn test_half_day_of() {
        assert_eq!(HalfDay::of(ClockTime::new(11, 30)), HalfDay::Am);
        assert_eq!(HalfDay::of(ClockTime::new(12, 0)), HalfDay::Pm);
    }

    #[test]
    fn test_window_overlap_and_enclose() {
        let w1 = TimeWindow::new(ClockTime::new(10, 0), ClockTime::new(11, 0));
        let w2 = TimeWindow::new(ClockTime::new(10, 30), ClockTime::new(11, 30));
        let w3 = TimeWindow::new(ClockTime::new(11, 0), ClockTime::new(12, 0));
        assert!(w1.overlaps(&w2));
        assert!(!w1.overlaps(&w3)); // touching is not overlapping

        let outer = TimeWindow::new(ClockTime::new(9, 0), ClockTime::new(12, 0));
        assert!(outer.encloses(&w1));
        assert!(!w1.encloses(&outer));
        assert!(w1.contains(ClockTime::new(10, 0)));
        assert!(!w1.contains(ClockTime::new(11, 0)));
    }

    #[test]
    fn test_window_slots() {
        let w = TimeWindow::starting_at(ClockTime::new(15, 0), 90);
        let slots: Vec<String> = w.slots().map(|t| t.to_string()).collect();
        assert_eq!(slots, vec!["15:00", "15:30", "16:00"]);
        assert_eq!(w.duration_minutes(), 90);
    }

    #[test]
    fn test_shift_past_midnight() {
        let late = ClockTime::new(23, 0);
        assert_eq!(late.checked_plus_minutes(60), Some(ClockTime::new(24, 0)));
        assert_eq!(late.checked_plus_minutes(61), None);
        assert_eq!(late.checked_plus_minutes(u16::MAX), None);
        assert_eq!(late.plus_minutes(u16::MAX).minutes(), u16::MAX);
    }

    #[test]
    fn test_window_parse() {
        let w: TimeWindow = "10:00-11:30".parse().unwrap();
        assert_eq!(w.start, ClockTime::new(10, 0));
        assert_eq!(w.end, ClockTime::new(11, 30));
        assert!("11:00-10:00".parse::<TimeWindow>().is_err());
        assert!("10:00".parse::<TimeWindow>().is_err());
    }
}
