//! Data sources for the engine: the traits the surrounding application
//! implements, an in-memory snapshot, and file/SQLite storage for it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::model::{Appointment, Dependency, Project, Task, WorkerProfile};
use crate::records::{self, SnapshotRecords};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("storage lock poisoned")]
    LockPoisoned,
    #[error("no snapshot stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait WorkerDirectory {
    fn workers(&self) -> PersistenceResult<Vec<WorkerProfile>>;

    fn worker(&self, id: &str) -> PersistenceResult<Option<WorkerProfile>> {
        Ok(self.workers()?.into_iter().find(|w| w.id == id))
    }
}

pub trait AppointmentSource {
    fn appointments(&self) -> PersistenceResult<Vec<Appointment>>;

    fn appointments_for_worker(&self, worker_id: &str) -> PersistenceResult<Vec<Appointment>> {
        Ok(self
            .appointments()?
            .into_iter()
            .filter(|a| a.is_assigned_to(worker_id))
            .collect())
    }
}

pub trait ProjectSource {
    fn project(&self, project_id: &str) -> PersistenceResult<Option<Project>>;

    fn tasks(&self, project_id: &str) -> PersistenceResult<Vec<Task>> {
        Ok(self
            .project(project_id)?
            .map(|p| p.tasks)
            .unwrap_or_default())
    }

    fn dependencies(&self, project_id: &str) -> PersistenceResult<Vec<Dependency>> {
        Ok(self
            .project(project_id)?
            .map(|p| p.dependencies)
            .unwrap_or_default())
    }
}

/// Whole-dataset storage, the way a snapshot is saved and restored.
pub trait SnapshotStore {
    fn save_snapshot(&self, snapshot: &FieldOpsSnapshot) -> PersistenceResult<()>;
    fn load_snapshot(&self) -> PersistenceResult<Option<FieldOpsSnapshot>>;
}

/// Validated in-memory copy of everything the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOpsSnapshot {
    pub workers: Vec<WorkerProfile>,
    pub appointments: Vec<Appointment>,
    pub projects: Vec<Project>,
}

impl FieldOpsSnapshot {
    pub fn from_records(records: &SnapshotRecords) -> PersistenceResult<Self> {
        Ok(Self {
            workers: records::assemble_workers(records)?,
            appointments: records::assemble_appointments(records)?,
            projects: records::assemble_projects(records)?,
        })
    }

    pub fn to_records(&self) -> SnapshotRecords {
        records::disassemble(&self.workers, &self.appointments, &self.projects)
    }

    pub fn find_worker(&self, id: &str) -> Option<&WorkerProfile> {
        self.workers.iter().find(|w| w.id == id)
    }

    pub fn find_project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Adds appointments, replacing any with the same id.
    pub fn merge_appointments(&mut self, incoming: Vec<Appointment>) -> usize {
        let count = incoming.len();
        for appointment in incoming {
            match self.appointments.iter_mut().find(|a| a.id == appointment.id) {
                Some(existing) => *existing = appointment,
                None => self.appointments.push(appointment),
            }
        }
        count
    }
}

impl WorkerDirectory for FieldOpsSnapshot {
    fn workers(&self) -> PersistenceResult<Vec<WorkerProfile>> {
        Ok(self.workers.clone())
    }

    fn worker(&self, id: &str) -> PersistenceResult<Option<WorkerProfile>> {
        Ok(self.find_worker(id).cloned())
    }
}

impl AppointmentSource for FieldOpsSnapshot {
    fn appointments(&self) -> PersistenceResult<Vec<Appointment>> {
        Ok(self.appointments.clone())
    }
}

impl ProjectSource for FieldOpsSnapshot {
    fn project(&self, project_id: &str) -> PersistenceResult<Option<Project>> {
        Ok(self.find_project(project_id).cloned())
    }
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_appointments_from_csv, load_snapshot_from_json, save_appointments_to_csv,
    save_snapshot_to_json,
};
