use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Coarse part of a day a seasonal override can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
    Anytime,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 4] = [
        DayPeriod::Morning,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
        DayPeriod::Anytime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "morning",
            DayPeriod::Afternoon => "afternoon",
            DayPeriod::Evening => "evening",
            DayPeriod::Anytime => "anytime",
        }
    }

    /// Human label used in reason strings.
    pub fn label(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "Morning",
            DayPeriod::Afternoon => "Afternoon",
            DayPeriod::Evening => "Evening",
            DayPeriod::Anytime => "Anytime",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayPeriod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(DayPeriod::Morning),
            "afternoon" => Ok(DayPeriod::Afternoon),
            "evening" => Ok(DayPeriod::Evening),
            "anytime" | "any" => Ok(DayPeriod::Anytime),
            _ => Err(ValidationError::unknown("period", value)),
        }
    }
}

/// Ordered, de-duplicated set of periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodSet(BTreeSet<DayPeriod>);

impl PeriodSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, period: DayPeriod) -> bool {
        self.0.insert(period)
    }

    pub fn contains(&self, period: DayPeriod) -> bool {
        self.0.contains(&period)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = DayPeriod> + '_ {
        self.0.iter().copied()
    }

    /// "Morning, Evening"
    pub fn labels(&self) -> String {
        self.iter()
            .map(|p| p.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<DayPeriod> for PeriodSet {
    fn from_iter<I: IntoIterator<Item = DayPeriod>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[DayPeriod; N]> for PeriodSet {
    fn from(value: [DayPeriod; N]) -> Self {
        value.into_iter().collect()
    }
}

/// Inclusive wall-clock range within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ClockRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Option<Self> {
        Some(Self {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0)?,
            end: NaiveTime::from_hms_opt(end.0, end.1, 0)?,
        })
    }

    /// True when `[start_minute, end_minute]` lies entirely inside the range.
    /// Minutes are counted from the start of the day and may exceed 1440 for
    /// windows that run past midnight.
    pub fn contains_window(&self, start_minute: u32, end_minute: u32) -> bool {
        start_minute >= minute_of_day(self.start) && end_minute <= minute_of_day(self.end)
    }
}

impl fmt::Display for ClockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
