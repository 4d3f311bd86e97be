use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValidationError;
use crate::model::{Appointment, AppointmentId};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictResult {
    pub conflict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicting_ids: Vec<AppointmentId>,
}

/// Three-way overlap test: the proposed start falls in `[apt_start, apt_end)`,
/// the proposed end falls in `(apt_start, apt_end]`, or the proposal contains
/// the existing interval. Touching boundaries do not overlap.
pub fn intervals_overlap(
    start: NaiveDateTime,
    end: NaiveDateTime,
    apt_start: NaiveDateTime,
    apt_end: NaiveDateTime,
) -> bool {
    (start >= apt_start && start < apt_end)
        || (end > apt_start && end <= apt_end)
        || (start <= apt_start && end >= apt_end)
}

/// Read-only view over a snapshot of appointments.
pub struct ConflictChecker<'a> {
    appointments: &'a [Appointment],
}

impl<'a> ConflictChecker<'a> {
    pub fn new(appointments: &'a [Appointment]) -> Self {
        Self { appointments }
    }

    pub fn check(
        &self,
        worker_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_appointment_id: Option<&str>,
    ) -> Result<ConflictResult, ValidationError> {
        if worker_id.trim().is_empty() {
            return Err(ValidationError::MissingWorkerId);
        }
        if start >= end {
            return Err(ValidationError::EmptyInterval { start, end });
        }

        let conflicting: Vec<&Appointment> = self
            .candidates(worker_id, exclude_appointment_id)
            .filter(|apt| intervals_overlap(start, end, apt.start, apt.end))
            .collect();

        let Some(first) = conflicting.first() else {
            return Ok(ConflictResult::default());
        };

        Ok(ConflictResult {
            conflict: true,
            reason: Some(format!(
                "Conflicts with existing appointment '{}' ({} - {})",
                first.title,
                first.start.format("%Y-%m-%d %H:%M"),
                first.end.format("%H:%M")
            )),
            conflicting_ids: conflicting.iter().map(|apt| apt.id.clone()).collect(),
        })
    }

    /// Non-cancelled, well-formed appointments of `worker_id`.
    fn candidates<'b>(
        &'b self,
        worker_id: &'b str,
        exclude: Option<&'b str>,
    ) -> impl Iterator<Item = &'a Appointment> + 'b {
        self.appointments.iter().filter(move |apt| {
            if !apt.is_assigned_to(worker_id) || apt.is_cancelled() {
                return false;
            }
            if exclude == Some(apt.id.as_str()) {
                return false;
            }
            if !apt.has_valid_interval() {
                warn!(appointment = %apt.id, "skipping appointment with empty interval");
                return false;
            }
            true
        })
    }
}
