//! Loosely typed rows as they arrive from storage and import files, plus the
//! conversions that turn them into engine types.
//!
//! Every rejection happens here, so the engine only ever sees validated data.

pub mod appointment;
pub mod project;
pub mod worker;

pub use appointment::AppointmentRecord;
pub use project::{ProjectRecord, ProjectTaskRecord, TaskDependencyRecord};
pub use worker::{
    SeasonalAvailabilityRecord, SeasonalDateOverrideRecord, WorkerRecord, WorkerScheduleRecord,
    WorkerUnavailabilityRecord,
};

use chrono::{Datelike, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::ValidationError;
use crate::model::{
    Appointment, Dependency, Project, SeasonalDateOverride, SeasonalWindow, Task,
    UnavailabilityPeriod, WeeklyScheduleEntry, WorkerProfile,
};

/// Accepts `HH:MM:SS[.fff]` and `HH:MM`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ValidationError::InvalidTime(raw.to_string()))
}

pub(crate) fn parse_optional_time(raw: Option<&str>) -> Result<Option<NaiveTime>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_time_of_day(value).map(Some),
    }
}

pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_from_index(index: i64) -> Result<Weekday, ValidationError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(ValidationError::InvalidWeekday(other)),
    }
}

pub fn weekday_index(weekday: Weekday) -> i64 {
    i64::from(weekday.num_days_from_sunday())
}

/// Raw tables of a field-operations dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecords {
    #[serde(default)]
    pub workers: Vec<WorkerRecord>,
    #[serde(default)]
    pub worker_schedules: Vec<WorkerScheduleRecord>,
    #[serde(default)]
    pub worker_unavailability: Vec<WorkerUnavailabilityRecord>,
    #[serde(default)]
    pub seasonal_availability: Vec<SeasonalAvailabilityRecord>,
    #[serde(default)]
    pub seasonal_date_overrides: Vec<SeasonalDateOverrideRecord>,
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub project_tasks: Vec<ProjectTaskRecord>,
    #[serde(default)]
    pub task_dependencies: Vec<TaskDependencyRecord>,
}

fn unknown_owner(kind: &str, owner_kind: &str, owner: &str) -> ValidationError {
    ValidationError::Invalid(format!("{kind} references unknown {owner_kind} '{owner}'"))
}

/// Groups per-worker rows into validated profiles, in `workers` order.
pub fn assemble_workers(records: &SnapshotRecords) -> Result<Vec<WorkerProfile>, ValidationError> {
    let mut profiles: Vec<WorkerProfile> = Vec::with_capacity(records.workers.len());
    let mut index_by_id: HashMap<&str, usize> = HashMap::new();

    for worker in &records.workers {
        if worker.id.trim().is_empty() {
            return Err(ValidationError::MissingWorkerId);
        }
        if index_by_id.insert(worker.id.as_str(), profiles.len()).is_some() {
            return Err(ValidationError::Invalid(format!(
                "duplicate worker id '{}'",
                worker.id
            )));
        }
        profiles.push(WorkerProfile::new(worker.id.clone(), worker.name.clone()));
    }

    let owner_of = |worker_id: &str, kind: &str| -> Result<usize, ValidationError> {
        index_by_id
            .get(worker_id)
            .copied()
            .ok_or_else(|| unknown_owner(kind, "worker", worker_id))
    };

    for row in &records.worker_schedules {
        let ix = owner_of(&row.worker_id, "schedule row")?;
        profiles[ix]
            .weekly_schedule
            .push(WeeklyScheduleEntry::try_from(row)?);
    }

    for row in &records.worker_unavailability {
        let ix = owner_of(&row.worker_id, "unavailability row")?;
        profiles[ix]
            .unavailability
            .push(UnavailabilityPeriod::try_from(row)?);
    }

    let mut season_owner: HashMap<&str, (usize, usize)> = HashMap::new();
    for row in &records.seasonal_availability {
        let ix = owner_of(&row.worker_id, "seasonal window")?;
        let position = profiles[ix].seasonal_windows.len();
        profiles[ix].seasonal_windows.push(SeasonalWindow::from(row));
        season_owner.insert(row.id.as_str(), (ix, position));
    }

    for row in &records.seasonal_date_overrides {
        let &(ix, position) = season_owner
            .get(row.seasonal_availability_id.as_str())
            .ok_or_else(|| {
                unknown_owner(
                    "date override",
                    "seasonal window",
                    &row.seasonal_availability_id,
                )
            })?;
        let date_override = SeasonalDateOverride::try_from(row)?;
        profiles[ix].seasonal_windows[position]
            .set_override(date_override.date, date_override.periods);
    }

    for profile in &profiles {
        profile.validate()?;
    }
    Ok(profiles)
}

pub fn assemble_appointments(
    records: &SnapshotRecords,
) -> Result<Vec<Appointment>, ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.appointments.len());
    records
        .appointments
        .iter()
        .map(|row| {
            if !seen.insert(row.id.as_str()) {
                return Err(ValidationError::Invalid(format!(
                    "duplicate appointment id '{}'",
                    row.id
                )));
            }
            Appointment::try_from(row)
        })
        .collect()
}

/// Dependencies are filed under the project of their successor task, or of
/// the predecessor when the successor is unknown. References to missing tasks
/// survive assembly so the critical-path calculation can report them.
pub fn assemble_projects(records: &SnapshotRecords) -> Result<Vec<Project>, ValidationError> {
    let mut projects: Vec<Project> = Vec::with_capacity(records.projects.len());
    let mut index_by_id: HashMap<&str, usize> = HashMap::new();

    for row in &records.projects {
        if index_by_id.insert(row.id.as_str(), projects.len()).is_some() {
            return Err(ValidationError::Invalid(format!(
                "duplicate project id '{}'",
                row.id
            )));
        }
        projects.push(Project::new(row.id.clone(), row.name.clone()));
    }

    let mut project_of_task: HashMap<&str, usize> = HashMap::new();
    for row in &records.project_tasks {
        let ix = index_by_id
            .get(row.project_id.as_str())
            .copied()
            .ok_or_else(|| unknown_owner("task", "project", &row.project_id))?;
        projects[ix].tasks.push(Task::try_from(row)?);
        project_of_task.insert(row.id.as_str(), ix);
    }

    for row in &records.task_dependencies {
        let ix = project_of_task
            .get(row.task_id.as_str())
            .or_else(|| project_of_task.get(row.depends_on_task_id.as_str()))
            .copied()
            .ok_or_else(|| unknown_owner("dependency", "task", &row.task_id))?;
        projects[ix].dependencies.push(Dependency::try_from(row)?);
    }

    Ok(projects)
}

/// Flattens engine types back into rows.
pub fn disassemble(
    workers: &[WorkerProfile],
    appointments: &[Appointment],
    projects: &[Project],
) -> SnapshotRecords {
    let mut records = SnapshotRecords::default();

    for worker in workers {
        records.workers.push(WorkerRecord {
            id: worker.id.clone(),
            name: worker.name.clone(),
        });
        records.worker_schedules.extend(
            worker
                .weekly_schedule
                .iter()
                .map(|entry| WorkerScheduleRecord::from_entry(&worker.id, entry)),
        );
        records.worker_unavailability.extend(
            worker
                .unavailability
                .iter()
                .map(|period| WorkerUnavailabilityRecord::from_period(&worker.id, period)),
        );
        for window in &worker.seasonal_windows {
            records
                .seasonal_availability
                .push(SeasonalAvailabilityRecord {
                    id: window.id.clone(),
                    worker_id: worker.id.clone(),
                    season_name: window.name.clone(),
                    start_date: window.start_date,
                    end_date: window.end_date,
                    created_at: window.created_at,
                });
            records
                .seasonal_date_overrides
                .extend(window.overrides.iter().map(|o| SeasonalDateOverrideRecord {
                    seasonal_availability_id: window.id.clone(),
                    date: o.date,
                    periods: o.periods.iter().map(|p| p.as_str().to_string()).collect(),
                }));
        }
    }

    records.appointments = appointments.iter().map(AppointmentRecord::from).collect();

    for project in projects {
        records.projects.push(ProjectRecord {
            id: project.id.clone(),
            name: project.name.clone(),
        });
        records.project_tasks.extend(
            project
                .tasks
                .iter()
                .map(|task| ProjectTaskRecord::from_task(&project.id, task)),
        );
        records
            .task_dependencies
            .extend(project.dependencies.iter().map(TaskDependencyRecord::from));
    }

    records
}
