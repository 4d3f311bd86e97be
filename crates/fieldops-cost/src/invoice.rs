//! Draft invoices from closed time logs.

use fieldops_schedule::model::{Appointment, AppointmentId, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::CostConfig;
use crate::error::{CostError, CostResult};
use crate::gps::GpsStatus;
use crate::time_log::{TimeLog, TimeLogCost, cost_time_log, percent_of};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub appointment_id: AppointmentId,
    pub worker_id: WorkerId,
    pub description: String,
    /// Hours, two decimals.
    pub quantity_hours: f64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub log_ids: Vec<String>,
    /// At least one log checked in out of range.
    pub needs_review: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub lines: Vec<InvoiceLine>,
    pub subtotal_cents: i64,
    pub tax_pct: f64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub flagged_log_ids: Vec<String>,
    /// Logs still clocked in; not billed.
    pub skipped_open_log_ids: Vec<String>,
}

impl InvoiceDraft {
    pub fn needs_review(&self) -> bool {
        !self.flagged_log_ids.is_empty()
    }
}

pub struct InvoiceBuilder<'a> {
    config: &'a CostConfig,
    appointments: BTreeMap<&'a str, &'a Appointment>,
}

impl<'a> InvoiceBuilder<'a> {
    pub fn new(config: &'a CostConfig, appointments: &'a [Appointment]) -> Self {
        Self {
            config,
            appointments: appointments.iter().map(|a| (a.id.as_str(), a)).collect(),
        }
    }

    fn appointment_for(&self, log: &TimeLog) -> CostResult<&'a Appointment> {
        let appointment = self
            .appointments
            .get(log.appointment_id.as_str())
            .copied()
            .ok_or_else(|| CostError::UnknownAppointment {
                log_id: log.id.clone(),
                appointment_id: log.appointment_id.clone(),
            })?;
        if appointment
            .worker_id
            .as_deref()
            .is_some_and(|assigned| assigned != log.worker_id)
        {
            return Err(CostError::WorkerMismatch {
                log_id: log.id.clone(),
                worker_id: log.worker_id.clone(),
                appointment_id: log.appointment_id.clone(),
            });
        }
        Ok(appointment)
    }

    /// One line per appointment, worker and rate, in appointment id order.
    pub fn build(&self, logs: &[TimeLog]) -> CostResult<InvoiceDraft> {
        let mut draft = InvoiceDraft {
            tax_pct: self.config.tax_pct,
            ..Default::default()
        };
        let mut groups: BTreeMap<(AppointmentId, WorkerId, i64), Vec<TimeLogCost>> =
            BTreeMap::new();

        for log in logs {
            let appointment = self.appointment_for(log)?;
            if log.is_open() {
                warn!(log_id = %log.id, "skipping open time log");
                draft.skipped_open_log_ids.push(log.id.clone());
                continue;
            }
            let cost = cost_time_log(log, appointment.site, self.config)?;
            if cost.gps.status == GpsStatus::OutOfRange {
                draft.flagged_log_ids.push(log.id.clone());
            }
            groups
                .entry((
                    log.appointment_id.clone(),
                    log.worker_id.clone(),
                    log.hourly_rate_cents,
                ))
                .or_default()
                .push(cost);
        }

        for ((appointment_id, worker_id, rate), costs) in groups {
            let title = self
                .appointments
                .get(appointment_id.as_str())
                .map(|a| a.title.as_str())
                .unwrap_or_default();
            let minutes: i64 = costs.iter().map(|c| c.minutes).sum();
            let line_total_cents = costs
                .iter()
                .try_fold(0i64, |acc, c| acc.checked_add(c.total_cents))
                .ok_or(CostError::Overflow)?;
            draft.subtotal_cents = draft
                .subtotal_cents
                .checked_add(line_total_cents)
                .ok_or(CostError::Overflow)?;
            draft.lines.push(InvoiceLine {
                description: format!("{title} ({worker_id})"),
                quantity_hours: (minutes as f64 / 60.0 * 100.0).round() / 100.0,
                unit_price_cents: rate,
                line_total_cents,
                log_ids: costs.iter().map(|c| c.log_id.clone()).collect(),
                needs_review: costs.iter().any(|c| c.gps.status == GpsStatus::OutOfRange),
                appointment_id,
                worker_id,
            });
        }

        draft.tax_cents = percent_of(draft.subtotal_cents, self.config.tax_pct)?;
        draft.total_cents = draft
            .subtotal_cents
            .checked_add(draft.tax_cents)
            .ok_or(CostError::Overflow)?;
        debug!(
            lines = draft.lines.len(),
            total_cents = draft.total_cents,
            flagged = draft.flagged_log_ids.len(),
            "invoice draft built"
        );
        Ok(draft)
    }
}
