//! Worker availability resolution.
//!
//! A check runs an ordered chain of [`AvailabilityRule`]s. Each rule either
//! decides the outcome or passes; the first decision wins and later rules are
//! never consulted. The default chain is seasonal windows, then the weekly
//! schedule, then unavailability exceptions, so a seasonal window covering
//! the date fully replaces the worker's normal hours for that date.

mod rules;
mod seasonal;

pub use rules::{AvailabilityRule, RuleOutcome, UnavailabilityRule, WeeklyScheduleRule};
pub use seasonal::{SeasonalOverlap, SeasonalRule, select_window, validate_seasonal_windows};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::model::{PeriodSet, WorkerProfile};

/// Which rule produced an [`AvailabilityResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilitySource {
    Seasonal,
    WeeklySchedule,
    Unavailability,
    /// No rule objected.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_periods: Option<PeriodSet>,
    pub source: AvailabilitySource,
}

impl AvailabilityResult {
    pub fn available(source: AvailabilitySource) -> Self {
        Self {
            available: true,
            reason: None,
            available_periods: None,
            source,
        }
    }

    pub fn unavailable(source: AvailabilitySource, reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
            available_periods: None,
            source,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_periods(mut self, periods: PeriodSet) -> Self {
        self.available_periods = Some(periods);
        self
    }
}

/// A proposed window, pre-digested for the rules.
#[derive(Debug, Clone)]
pub struct AvailabilityQuery<'a> {
    pub worker: &'a WorkerProfile,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// Minutes from midnight of `date`.
    pub start_minute: u32,
    /// Minutes from midnight of `date`; above 1440 when `end` falls on a later day.
    pub end_minute: u32,
    /// Span of at least the configured threshold; coarse period matches suffice.
    pub day_level: bool,
}

impl<'a> AvailabilityQuery<'a> {
    pub fn new(
        worker: &'a WorkerProfile,
        start: NaiveDateTime,
        end: NaiveDateTime,
        config: &EngineConfig,
    ) -> Result<Self, ValidationError> {
        if worker.id.trim().is_empty() {
            return Err(ValidationError::MissingWorkerId);
        }
        if start >= end {
            return Err(ValidationError::EmptyInterval { start, end });
        }

        let date = start.date();
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or(start);
        let start_minute = start.hour() * 60 + start.minute();
        let end_minute = u32::try_from((end - midnight).num_minutes()).unwrap_or(u32::MAX);
        let day_level = (end - start).num_minutes() >= config.day_level_threshold_hours * 60;

        Ok(Self {
            worker,
            start,
            end,
            date,
            weekday: date.weekday(),
            start_minute,
            end_minute,
            day_level,
        })
    }
}

pub struct AvailabilityResolver {
    config: EngineConfig,
    rules: Vec<Box<dyn AvailabilityRule>>,
}

impl Default for AvailabilityResolver {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl AvailabilityResolver {
    /// Seasonal, weekly schedule, unavailability, in that order.
    pub fn new(config: EngineConfig) -> Self {
        let rules: Vec<Box<dyn AvailabilityRule>> = vec![
            Box::new(SeasonalRule::new(config.periods, config.seasonal_precedence)),
            Box::new(WeeklyScheduleRule),
            Box::new(UnavailabilityRule),
        ];
        Self { config, rules }
    }

    pub fn with_rules(config: EngineConfig, rules: Vec<Box<dyn AvailabilityRule>>) -> Self {
        Self { config, rules }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn check(
        &self,
        worker: &WorkerProfile,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<AvailabilityResult, ValidationError> {
        let query = AvailabilityQuery::new(worker, start, end, &self.config)?;
        for rule in &self.rules {
            if let RuleOutcome::Decided(result) = rule.evaluate(&query) {
                debug!(
                    worker = %worker.id,
                    rule = rule.name(),
                    available = result.available,
                    "availability decided"
                );
                return Ok(result);
            }
        }
        Ok(AvailabilityResult::available(AvailabilitySource::Default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkerProfile;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn query_classifies_day_level_at_threshold() {
        let worker = WorkerProfile::new("w1", "Ana");
        let config = EngineConfig::default();
        let start = dt("2024-05-06 08:00");
        let q = AvailabilityQuery::new(&worker, start, dt("2024-05-06 14:00"), &config).unwrap();
        assert!(q.day_level);
        let q = AvailabilityQuery::new(&worker, start, dt("2024-05-06 13:59"), &config).unwrap();
        assert!(!q.day_level);
    }

    #[test]
    fn query_counts_minutes_past_midnight() {
        let worker = WorkerProfile::new("w1", "Ana");
        let q = AvailabilityQuery::new(
            &worker,
            dt("2024-05-06 22:00"),
            dt("2024-05-07 01:00"),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(q.start_minute, 22 * 60);
        assert_eq!(q.end_minute, 25 * 60);
    }

    #[test]
    fn empty_rule_chain_defaults_to_available() {
        let resolver = AvailabilityResolver::with_rules(EngineConfig::default(), Vec::new());
        let worker = WorkerProfile::new("w1", "Ana");
        let result = resolver
            .check(&worker, dt("2024-05-06 08:00"), dt("2024-05-06 09:00"))
            .unwrap();
        assert!(result.available);
        assert_eq!(result.source, AvailabilitySource::Default);
    }
}
