use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::rules::{AvailabilityRule, RuleOutcome};
use super::{AvailabilityQuery, AvailabilityResult, AvailabilitySource};
use crate::config::{PeriodClock, SeasonalPrecedence};
use crate::model::{DayPeriod, SeasonalWindow};

/// Seasonal windows replace the weekly schedule for every date they cover.
/// Once a window matches, this rule always decides.
#[derive(Debug, Clone, Copy)]
pub struct SeasonalRule {
    periods: PeriodClock,
    precedence: SeasonalPrecedence,
}

impl SeasonalRule {
    pub fn new(periods: PeriodClock, precedence: SeasonalPrecedence) -> Self {
        Self {
            periods,
            precedence,
        }
    }
}

impl Default for SeasonalRule {
    fn default() -> Self {
        Self::new(PeriodClock::default(), SeasonalPrecedence::default())
    }
}

impl AvailabilityRule for SeasonalRule {
    fn name(&self) -> &'static str {
        "seasonal"
    }

    fn evaluate(&self, query: &AvailabilityQuery<'_>) -> RuleOutcome {
        let Some(window) = select_window(&query.worker.seasonal_windows, query.date, self.precedence)
        else {
            return RuleOutcome::NoOpinion;
        };

        let periods = match window.override_for(query.date) {
            Some(entry) if !entry.periods.is_empty() => entry.periods.clone(),
            _ => {
                return RuleOutcome::Decided(AvailabilityResult::unavailable(
                    AvailabilitySource::Seasonal,
                    format!("Not available on this date ({} availability)", window.name),
                ));
            }
        };

        if periods.contains(DayPeriod::Anytime) {
            return RuleOutcome::Decided(
                AvailabilityResult::available(AvailabilitySource::Seasonal).with_periods(periods),
            );
        }

        if query.day_level {
            let reason = format!("Available during {}: {}", window.name, periods.labels());
            return RuleOutcome::Decided(
                AvailabilityResult::available(AvailabilitySource::Seasonal)
                    .with_reason(reason)
                    .with_periods(periods),
            );
        }

        let fits = periods
            .iter()
            .filter_map(|p| self.periods.range_for(p))
            .any(|range| range.contains_window(query.start_minute, query.end_minute));
        if fits {
            return RuleOutcome::Decided(
                AvailabilityResult::available(AvailabilitySource::Seasonal).with_periods(periods),
            );
        }

        let allowed = periods
            .iter()
            .filter_map(|p| self.periods.range_for(p).map(|r| format!("{} ({})", p.label(), r)))
            .collect::<Vec<_>>()
            .join(", ");
        RuleOutcome::Decided(
            AvailabilityResult::unavailable(
                AvailabilitySource::Seasonal,
                format!("Only available {allowed} on this date ({} availability)", window.name),
            )
            .with_periods(periods),
        )
    }
}

/// The window that governs `date`, honouring `precedence` when several
/// windows cover it.
pub fn select_window(
    windows: &[SeasonalWindow],
    date: NaiveDate,
    precedence: SeasonalPrecedence,
) -> Option<&SeasonalWindow> {
    let mut covering = windows.iter().filter(|w| w.covers(date));
    match precedence {
        SeasonalPrecedence::FirstInOrder => covering.next(),
        SeasonalPrecedence::MostRecentlyCreated => covering.min_by(|a, b| recency_order(a, b)),
    }
}

fn recency_order(a: &SeasonalWindow, b: &SeasonalWindow) -> Ordering {
    // None sorts after any timestamp.
    let created = match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    created
        .then_with(|| a.start_date.cmp(&b.start_date))
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOverlap {
    pub first_id: String,
    pub second_id: String,
    pub overlap_start: NaiveDate,
    pub overlap_end: NaiveDate,
}

/// Pairs of windows sharing at least one date; writers can reject these.
pub fn validate_seasonal_windows(windows: &[SeasonalWindow]) -> Vec<SeasonalOverlap> {
    let mut overlaps = Vec::new();
    for (idx, first) in windows.iter().enumerate() {
        for second in &windows[idx + 1..] {
            if first.overlaps(second) {
                overlaps.push(SeasonalOverlap {
                    first_id: first.id.clone(),
                    second_id: second.id.clone(),
                    overlap_start: first.start_date.max(second.start_date),
                    overlap_end: first.end_date.min(second.end_date),
                });
            }
        }
    }
    overlaps
}
