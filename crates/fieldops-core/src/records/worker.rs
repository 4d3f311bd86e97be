use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{
    format_time, parse_optional_time, parse_time_of_day, weekday_from_index, weekday_index,
};
use crate::error::ValidationError;
use crate::model::{
    DayPeriod, PeriodSet, SeasonalDateOverride, SeasonalWindow, UnavailabilityPeriod,
    WeeklyScheduleEntry,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

fn default_true() -> bool {
    true
}

/// Row of `worker_schedules`: `day_of_week` is 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerScheduleRecord {
    pub worker_id: String,
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl TryFrom<&WorkerScheduleRecord> for WeeklyScheduleEntry {
    type Error = ValidationError;

    fn try_from(record: &WorkerScheduleRecord) -> Result<Self, Self::Error> {
        Ok(WeeklyScheduleEntry {
            weekday: weekday_from_index(record.day_of_week)?,
            start_time: parse_time_of_day(&record.start_time)?,
            end_time: parse_time_of_day(&record.end_time)?,
            is_active: record.is_active,
        })
    }
}

impl WorkerScheduleRecord {
    pub fn from_entry(worker_id: &str, entry: &WeeklyScheduleEntry) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            day_of_week: weekday_index(entry.weekday),
            start_time: format_time(entry.start_time),
            end_time: format_time(entry.end_time),
            is_active: entry.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerUnavailabilityRecord {
    pub id: String,
    pub worker_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TryFrom<&WorkerUnavailabilityRecord> for UnavailabilityPeriod {
    type Error = ValidationError;

    fn try_from(record: &WorkerUnavailabilityRecord) -> Result<Self, Self::Error> {
        Ok(UnavailabilityPeriod {
            id: record.id.clone(),
            start_date: record.start_date,
            end_date: record.end_date,
            start_time: parse_optional_time(record.start_time.as_deref())?,
            end_time: parse_optional_time(record.end_time.as_deref())?,
            reason: record.reason.clone(),
        })
    }
}

impl WorkerUnavailabilityRecord {
    pub fn from_period(worker_id: &str, period: &UnavailabilityPeriod) -> Self {
        Self {
            id: period.id.clone(),
            worker_id: worker_id.to_string(),
            start_date: period.start_date,
            end_date: period.end_date,
            start_time: period.start_time.map(format_time),
            end_time: period.end_time.map(format_time),
            reason: period.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalAvailabilityRecord {
    pub id: String,
    pub worker_id: String,
    pub season_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl From<&SeasonalAvailabilityRecord> for SeasonalWindow {
    fn from(record: &SeasonalAvailabilityRecord) -> Self {
        let mut window = SeasonalWindow::new(
            record.id.clone(),
            record.season_name.clone(),
            record.start_date,
            record.end_date,
        );
        window.created_at = record.created_at;
        window
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalDateOverrideRecord {
    pub seasonal_availability_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub periods: Vec<String>,
}

impl TryFrom<&SeasonalDateOverrideRecord> for SeasonalDateOverride {
    type Error = ValidationError;

    fn try_from(record: &SeasonalDateOverrideRecord) -> Result<Self, Self::Error> {
        let periods = record
            .periods
            .iter()
            .map(|p| p.parse::<DayPeriod>())
            .collect::<Result<PeriodSet, _>>()?;
        Ok(SeasonalDateOverride {
            date: record.date,
            periods,
        })
    }
}
