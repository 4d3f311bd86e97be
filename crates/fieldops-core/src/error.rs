//! Error types shared by the scheduling engine.
//!
//! Business outcomes such as "worker is busy" are never errors; these types
//! cover malformed input and impossible schedules only.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::model::TaskId;

/// Bad input handed to the engine, as opposed to an "unavailable" answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("worker id is required")]
    MissingWorkerId,

    #[error("start {start} must be before end {end}")]
    EmptyInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("chart end {end} is before chart start {start}")]
    InvalidChartRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid time of day '{0}' (expected HH:MM or HH:MM:SS)")]
    InvalidTime(String),

    #[error("day of week {0} is out of range (expected 0 = Sunday .. 6 = Saturday)")]
    InvalidWeekday(i64),

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("worker {worker_id} has more than one active schedule entry for {weekday}")]
    DuplicateWeekday { worker_id: String, weekday: String },

    #[error("{field} {end} is before {start}")]
    InvertedRange {
        field: &'static str,
        start: String,
        end: String,
    },

    #[error("{0}")]
    Invalid(String),
}

impl ValidationError {
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        ValidationError::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}

/// Failures of the critical-path calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("dependency cycle detected at task {task_id}")]
    Cycle { task_id: TaskId },

    #[error("task {referenced_by} depends on unknown task {task_id}")]
    UnknownTask {
        task_id: TaskId,
        referenced_by: TaskId,
    },

    #[error("duplicate task id {0}")]
    DuplicateTask(TaskId),

    #[error("task {task_id} ends on {end} before it starts on {start}")]
    InvalidTaskDates {
        task_id: TaskId,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("task {0} depends on itself")]
    SelfDependency(TaskId),

    #[error("schedule for task {0} falls outside the supported date range")]
    OutOfRange(TaskId),
}
