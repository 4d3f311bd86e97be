//! Fleet-wide candidate search for a proposed booking.

use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityResolver, AvailabilityResult};
use crate::conflicts::{ConflictChecker, ConflictResult};
use crate::error::ValidationError;
use crate::model::{Appointment, WorkerId, WorkerProfile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCandidate {
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub availability: AvailabilityResult,
    pub conflict: ConflictResult,
    /// Available and free of conflicts.
    pub bookable: bool,
}

pub struct DispatchBoard<'a> {
    resolver: &'a AvailabilityResolver,
    appointments: &'a [Appointment],
}

impl<'a> DispatchBoard<'a> {
    pub fn new(resolver: &'a AvailabilityResolver, appointments: &'a [Appointment]) -> Self {
        Self {
            resolver,
            appointments,
        }
    }

    /// One candidate per worker, evaluated in parallel, ordered by name then id.
    pub fn candidates(
        &self,
        workers: &[WorkerProfile],
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_appointment_id: Option<&str>,
    ) -> Result<Vec<DispatchCandidate>, ValidationError> {
        if start >= end {
            return Err(ValidationError::EmptyInterval { start, end });
        }
        let checker = ConflictChecker::new(self.appointments);

        let mut candidates = workers
            .par_iter()
            .map(|worker| {
                let availability = self.resolver.check(worker, start, end)?;
                let conflict = checker.check(&worker.id, start, end, exclude_appointment_id)?;
                Ok(DispatchCandidate {
                    worker_id: worker.id.clone(),
                    worker_name: worker.name.clone(),
                    bookable: availability.available && !conflict.conflict,
                    availability,
                    conflict,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        candidates.sort_by(|a, b| {
            a.worker_name
                .cmp(&b.worker_name)
                .then_with(|| a.worker_id.cmp(&b.worker_id))
        });
        Ok(candidates)
    }

    pub fn bookable(
        &self,
        workers: &[WorkerProfile],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DispatchCandidate>, ValidationError> {
        Ok(self
            .candidates(workers, start, end, None)?
            .into_iter()
            .filter(|c| c.bookable)
            .collect())
    }
}
