use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::period::PeriodSet;
use crate::error::ValidationError;

pub type WorkerId = String;

/// One row of a worker's regular week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyScheduleEntry {
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl WeeklyScheduleEntry {
    pub fn new(weekday: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            weekday,
            start_time,
            end_time,
            is_active: true,
        }
    }
}

/// Leave, sickness, training: any stretch of days the worker is away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailabilityPeriod {
    pub id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl UnavailabilityPeriod {
    pub fn all_day(id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date,
            end_date,
            start_time: None,
            end_time: None,
            reason: None,
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Both times set; a half-specified range is treated as all day.
    pub fn time_range(&self) -> Option<(NaiveTime, NaiveTime)> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalDateOverride {
    pub date: NaiveDate,
    pub periods: PeriodSet,
}

/// A date range during which the worker's availability is defined per date
/// instead of by the regular week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalWindow {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub overrides: Vec<SeasonalDateOverride>,
}

impl SeasonalWindow {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            created_at: None,
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, date: NaiveDate, periods: impl Into<PeriodSet>) -> Self {
        self.set_override(date, periods.into());
        self
    }

    /// Replaces any existing override for `date`.
    pub fn set_override(&mut self, date: NaiveDate, periods: PeriodSet) {
        if let Some(existing) = self.overrides.iter_mut().find(|o| o.date == date) {
            existing.periods = periods;
        } else {
            self.overrides.push(SeasonalDateOverride { date, periods });
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn override_for(&self, date: NaiveDate) -> Option<&SeasonalDateOverride> {
        self.overrides.iter().find(|o| o.date == date)
    }

    pub fn overlaps(&self, other: &SeasonalWindow) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub id: WorkerId,
    pub name: String,
    #[serde(default)]
    pub weekly_schedule: Vec<WeeklyScheduleEntry>,
    #[serde(default)]
    pub unavailability: Vec<UnavailabilityPeriod>,
    #[serde(default)]
    pub seasonal_windows: Vec<SeasonalWindow>,
}

impl WorkerProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weekly_schedule: Vec::new(),
            unavailability: Vec::new(),
            seasonal_windows: Vec::new(),
        }
    }

    pub fn with_weekly(mut self, entry: WeeklyScheduleEntry) -> Self {
        self.weekly_schedule.push(entry);
        self
    }

    pub fn with_unavailability(mut self, period: UnavailabilityPeriod) -> Self {
        self.unavailability.push(period);
        self
    }

    pub fn with_season(mut self, window: SeasonalWindow) -> Self {
        self.seasonal_windows.push(window);
        self
    }

    /// Active weekly entry for `weekday`, if the worker works that day.
    pub fn schedule_for(&self, weekday: Weekday) -> Option<&WeeklyScheduleEntry> {
        self.weekly_schedule
            .iter()
            .find(|entry| entry.is_active && entry.weekday == weekday)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingWorkerId);
        }

        let mut active_days = HashSet::new();
        for entry in self.weekly_schedule.iter().filter(|e| e.is_active) {
            if !active_days.insert(entry.weekday) {
                return Err(ValidationError::DuplicateWeekday {
                    worker_id: self.id.clone(),
                    weekday: entry.weekday.to_string(),
                });
            }
            if entry.end_time <= entry.start_time {
                return Err(ValidationError::InvertedRange {
                    field: "weekly schedule end_time",
                    start: entry.start_time.to_string(),
                    end: entry.end_time.to_string(),
                });
            }
        }

        for period in &self.unavailability {
            if period.end_date < period.start_date {
                return Err(ValidationError::InvertedRange {
                    field: "unavailability end_date",
                    start: period.start_date.to_string(),
                    end: period.end_date.to_string(),
                });
            }
        }

        for window in &self.seasonal_windows {
            if window.end_date < window.start_date {
                return Err(ValidationError::InvertedRange {
                    field: "seasonal window end_date",
                    start: window.start_date.to_string(),
                    end: window.end_date.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DayPeriod;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn inactive_rows_are_ignored_by_lookup_and_validation() {
        let mut inactive = WeeklyScheduleEntry::new(Weekday::Mon, t(6, 0), t(10, 0));
        inactive.is_active = false;
        let worker = WorkerProfile::new("w1", "Ana")
            .with_weekly(inactive)
            .with_weekly(WeeklyScheduleEntry::new(Weekday::Mon, t(8, 0), t(16, 0)));

        assert!(worker.validate().is_ok());
        assert_eq!(worker.schedule_for(Weekday::Mon).unwrap().start_time, t(8, 0));
        assert!(worker.schedule_for(Weekday::Tue).is_none());
    }

    #[test]
    fn duplicate_active_weekday_is_rejected() {
        let worker = WorkerProfile::new("w1", "Ana")
            .with_weekly(WeeklyScheduleEntry::new(Weekday::Mon, t(8, 0), t(12, 0)))
            .with_weekly(WeeklyScheduleEntry::new(Weekday::Mon, t(13, 0), t(17, 0)));
        assert!(matches!(
            worker.validate(),
            Err(ValidationError::DuplicateWeekday { .. })
        ));
    }

    #[test]
    fn set_override_replaces_existing_date() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
        let mut window = SeasonalWindow::new("s1", "Summer", d, d);
        window.set_override(d, [DayPeriod::Morning].into());
        window.set_override(d, [DayPeriod::Evening].into());
        assert_eq!(window.overrides.len(), 1);
        assert!(
            window
                .override_for(d)
                .unwrap()
                .periods
                .contains(DayPeriod::Evening)
        );
    }
}
