use chrono::Weekday;

use super::{AvailabilityQuery, AvailabilityResult, AvailabilitySource};
use crate::model::period::minute_of_day;

pub enum RuleOutcome {
    Decided(AvailabilityResult),
    NoOpinion,
}

/// One step of the availability cascade.
pub trait AvailabilityRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, query: &AvailabilityQuery<'_>) -> RuleOutcome;
}

/// Regular weekly hours. Objects when the worker is off that day or the
/// window leaves their hours; otherwise passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyScheduleRule;

impl AvailabilityRule for WeeklyScheduleRule {
    fn name(&self) -> &'static str {
        "weekly_schedule"
    }

    fn evaluate(&self, query: &AvailabilityQuery<'_>) -> RuleOutcome {
        let Some(entry) = query.worker.schedule_for(query.weekday) else {
            return RuleOutcome::Decided(AvailabilityResult::unavailable(
                AvailabilitySource::WeeklySchedule,
                format!("Worker does not work on {}", weekday_name(query.weekday)),
            ));
        };

        let opens = minute_of_day(entry.start_time);
        let closes = minute_of_day(entry.end_time);
        if query.start_minute < opens || query.end_minute > closes {
            return RuleOutcome::Decided(AvailabilityResult::unavailable(
                AvailabilitySource::WeeklySchedule,
                format!(
                    "Outside working hours ({} - {})",
                    entry.start_time.format("%H:%M"),
                    entry.end_time.format("%H:%M")
                ),
            ));
        }
        RuleOutcome::NoOpinion
    }
}

/// Leave and other exceptions. A timed exception blocks only windows that
/// sit fully inside it; an untimed one blocks the whole day.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailabilityRule;

impl AvailabilityRule for UnavailabilityRule {
    fn name(&self) -> &'static str {
        "unavailability"
    }

    fn evaluate(&self, query: &AvailabilityQuery<'_>) -> RuleOutcome {
        for period in query.worker.unavailability.iter() {
            if !period.covers(query.date) {
                continue;
            }
            let blocks = match period.time_range() {
                Some((from, to)) => {
                    query.start_minute >= minute_of_day(from) && query.end_minute <= minute_of_day(to)
                }
                None => true,
            };
            if blocks {
                let reason = match period.reason.as_deref().map(str::trim) {
                    Some(text) if !text.is_empty() => format!("Worker is unavailable: {text}"),
                    _ => "Worker is unavailable".to_string(),
                };
                return RuleOutcome::Decided(AvailabilityResult::unavailable(
                    AvailabilitySource::Unavailability,
                    reason,
                ));
            }
        }
        RuleOutcome::NoOpinion
    }
}

pub(crate) fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
