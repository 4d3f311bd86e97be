use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::backward_pass::BackwardPass;
use super::forward_pass::ForwardPass;
use crate::error::ScheduleError;
use crate::graph::schedule_dag::ScheduleDag;
use crate::model::{Dependency, Task, TaskId};

/// CPM times for one task, in day offsets from the project origin.
/// Finishes are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTiming {
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub slack: i64,
}

impl TaskTiming {
    pub fn is_critical(&self) -> bool {
        self.slack <= 0
    }
}

/// Calendar dates for a [`TaskTiming`]; finishes are the last working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDates {
    pub early_start: NaiveDate,
    pub early_finish: NaiveDate,
    pub late_start: NaiveDate,
    pub late_finish: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPathResult {
    pub origin: Option<NaiveDate>,
    pub project_duration: i64,
    pub critical_task_ids: BTreeSet<TaskId>,
    pub slack_by_task: BTreeMap<TaskId, i64>,
    pub timings: BTreeMap<TaskId, TaskTiming>,
}

impl CriticalPathResult {
    pub fn is_critical(&self, task_id: &str) -> bool {
        self.critical_task_ids.contains(task_id)
    }

    pub fn slack(&self, task_id: &str) -> Option<i64> {
        self.slack_by_task.get(task_id).copied()
    }

    /// Critical tasks ordered by early start, then id.
    pub fn critical_chain(&self) -> Vec<TaskId> {
        let mut chain: Vec<(i64, &TaskId)> = self
            .critical_task_ids
            .iter()
            .filter_map(|id| self.timings.get(id).map(|t| (t.early_start, id)))
            .collect();
        chain.sort();
        chain.into_iter().map(|(_, id)| id.clone()).collect()
    }

    /// `None` for unknown tasks or offsets past the calendar's range.
    pub fn dates_for(&self, task_id: &str) -> Option<TaskDates> {
        let origin = self.origin?;
        let timing = self.timings.get(task_id)?;
        Some(TaskDates {
            early_start: offset_date(origin, timing.early_start)?,
            early_finish: offset_date(origin, timing.early_finish.checked_sub(1)?)?,
            late_start: offset_date(origin, timing.late_start)?,
            late_finish: offset_date(origin, timing.late_finish.checked_sub(1)?)?,
        })
    }

    /// Last day of the project, if there are tasks.
    pub fn finish_date(&self) -> Option<NaiveDate> {
        let latest = self.timings.values().map(|t| t.early_finish).max()?;
        offset_date(self.origin?, latest.checked_sub(1)?)
    }
}

fn offset_date(origin: NaiveDate, days: i64) -> Option<NaiveDate> {
    origin.checked_add_signed(Duration::try_days(days)?)
}

/// Forward and backward pass over the task network.
pub fn compute_critical_path(
    tasks: &[Task],
    dependencies: &[Dependency],
) -> Result<CriticalPathResult, ScheduleError> {
    let dag = ScheduleDag::build(tasks, dependencies)?;
    if tasks.is_empty() {
        return Ok(CriticalPathResult::default());
    }
    let order = dag.topological_order()?;

    let earlies = ForwardPass::new(&dag).execute(&order)?;
    let project_start = earlies.values().map(|(es, _)| *es).min().unwrap_or(0);
    let project_finish = earlies.values().map(|(_, ef)| *ef).max().unwrap_or(0);
    let lates = BackwardPass::new(&dag).execute(&order, project_finish)?;

    let mut result = CriticalPathResult {
        origin: dag.origin,
        project_duration: project_finish.saturating_sub(project_start),
        ..Default::default()
    };

    for task in tasks {
        let (Some(&(es, ef)), Some(&(ls, lf))) = (earlies.get(&task.id), lates.get(&task.id))
        else {
            continue;
        };
        let timing = TaskTiming {
            early_start: es,
            early_finish: ef,
            late_start: ls,
            late_finish: lf,
            slack: ls
                .checked_sub(es)
                .ok_or_else(|| ScheduleError::OutOfRange(task.id.clone()))?,
        };
        if timing.is_critical() {
            result.critical_task_ids.insert(task.id.clone());
        }
        result.slack_by_task.insert(task.id.clone(), timing.slack);
        result.timings.insert(task.id.clone(), timing);
        if result.origin.is_some() && result.dates_for(&task.id).is_none() {
            return Err(ScheduleError::OutOfRange(task.id.clone()));
        }
    }

    debug!(
        tasks = tasks.len(),
        dependencies = dependencies.len(),
        duration = result.project_duration,
        critical = result.critical_task_ids.len(),
        "critical path computed"
    );
    Ok(result)
}
