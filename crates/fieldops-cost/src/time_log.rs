use chrono::NaiveDateTime;
use fieldops_schedule::model::{AppointmentId, GeoPoint, WorkerId};
use serde::{Deserialize, Serialize};

use crate::config::CostConfig;
use crate::error::{CostError, CostResult};
use crate::gps::{GpsVerification, verify_check_in};

/// One clock-in/clock-out session of a worker on an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLog {
    pub id: String,
    pub appointment_id: AppointmentId,
    pub worker_id: WorkerId,
    pub clock_in: NaiveDateTime,
    #[serde(default)]
    pub clock_out: Option<NaiveDateTime>,
    #[serde(default)]
    pub check_in_location: Option<GeoPoint>,
    pub hourly_rate_cents: i64,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub overhead_pct: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimeLog {
    pub fn new(
        id: impl Into<String>,
        appointment_id: impl Into<String>,
        worker_id: impl Into<String>,
        clock_in: NaiveDateTime,
        hourly_rate_cents: i64,
    ) -> Self {
        Self {
            id: id.into(),
            appointment_id: appointment_id.into(),
            worker_id: worker_id.into(),
            clock_in,
            clock_out: None,
            check_in_location: None,
            hourly_rate_cents,
            overhead_pct: None,
            notes: None,
        }
    }

    pub fn closed_at(mut self, clock_out: NaiveDateTime) -> Self {
        self.clock_out = Some(clock_out);
        self
    }

    pub fn checked_in_at(mut self, location: GeoPoint) -> Self {
        self.check_in_location = Some(location);
        self
    }

    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }

    pub fn billable_minutes(&self) -> CostResult<i64> {
        let clock_out = self
            .clock_out
            .ok_or_else(|| CostError::OpenTimeLog(self.id.clone()))?;
        if clock_out <= self.clock_in {
            return Err(CostError::InvalidInterval {
                id: self.id.clone(),
            });
        }
        Ok((clock_out - self.clock_in).num_minutes())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLogCost {
    pub log_id: String,
    pub appointment_id: AppointmentId,
    pub worker_id: WorkerId,
    pub minutes: i64,
    pub hourly_rate_cents: i64,
    pub labour_cents: i64,
    pub overhead_cents: i64,
    pub total_cents: i64,
    pub gps: GpsVerification,
}

/// `value * pct / 100`, rounded half away from zero.
pub(crate) fn percent_of(value: i64, pct: f64) -> CostResult<i64> {
    let amount = (value as f64 * pct / 100.0).round();
    if !amount.is_finite() || amount.abs() > i64::MAX as f64 {
        return Err(CostError::Overflow);
    }
    Ok(amount as i64)
}

pub fn cost_time_log(
    log: &TimeLog,
    site: Option<GeoPoint>,
    config: &CostConfig,
) -> CostResult<TimeLogCost> {
    if log.hourly_rate_cents < 0 {
        return Err(CostError::NegativeRate {
            id: log.id.clone(),
            rate_cents: log.hourly_rate_cents,
        });
    }
    let overhead_pct = log.overhead_pct.unwrap_or(config.default_overhead_pct);
    if !overhead_pct.is_finite() || overhead_pct < 0.0 {
        return Err(CostError::InvalidOverhead {
            id: log.id.clone(),
            overhead_pct,
        });
    }

    let minutes = log.billable_minutes()?;
    let labour_cents = minutes
        .checked_mul(log.hourly_rate_cents)
        .and_then(|v| v.checked_add(30))
        .map(|v| v / 60)
        .ok_or(CostError::Overflow)?;
    let overhead_cents = percent_of(labour_cents, overhead_pct)?;
    let total_cents = labour_cents
        .checked_add(overhead_cents)
        .ok_or(CostError::Overflow)?;

    Ok(TimeLogCost {
        log_id: log.id.clone(),
        appointment_id: log.appointment_id.clone(),
        worker_id: log.worker_id.clone(),
        minutes,
        hourly_rate_cents: log.hourly_rate_cents,
        labour_cents,
        overhead_cents,
        total_cents,
        gps: verify_check_in(site, log.check_in_location, &config.gps),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn labour_rounds_to_nearest_cent() {
        // 50 minutes at 45.00/h = 37.50
        let log = TimeLog::new("t1", "a1", "w1", at(9, 0), 4500).closed_at(at(9, 50));
        let cost = cost_time_log(&log, None, &CostConfig::default()).unwrap();
        assert_eq!(cost.minutes, 50);
        assert_eq!(cost.labour_cents, 3750);
        assert_eq!(cost.total_cents, 3750);

        // 7 minutes at 10.00/h = 1.1666.. -> 1.17
        let log = TimeLog::new("t2", "a1", "w1", at(9, 0), 1000).closed_at(at(9, 7));
        let cost = cost_time_log(&log, None, &CostConfig::default()).unwrap();
        assert_eq!(cost.labour_cents, 117);
    }

    #[test]
    fn overhead_is_added_on_top() {
        let mut log = TimeLog::new("t1", "a1", "w1", at(8, 0), 6000).closed_at(at(10, 0));
        log.overhead_pct = Some(15.0);
        let cost = cost_time_log(&log, None, &CostConfig::default()).unwrap();
        assert_eq!(cost.labour_cents, 12000);
        assert_eq!(cost.overhead_cents, 1800);
        assert_eq!(cost.total_cents, 13800);
    }

    #[test]
    fn open_and_inverted_logs_are_errors() {
        let open = TimeLog::new("t1", "a1", "w1", at(8, 0), 6000);
        assert!(matches!(
            cost_time_log(&open, None, &CostConfig::default()),
            Err(CostError::OpenTimeLog(_))
        ));
        let inverted = TimeLog::new("t2", "a1", "w1", at(8, 0), 6000).closed_at(at(7, 0));
        assert!(matches!(
            inverted.billable_minutes(),
            Err(CostError::InvalidInterval { .. })
        ));
    }
}
