use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculations::CriticalPathResult;
use crate::error::ValidationError;
use crate::model::{Task, TaskId};

/// Chart-relative placement of one task, in percent of the chart width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttBar {
    pub task_id: TaskId,
    pub name: String,
    pub start_offset_days: i64,
    pub duration_days: i64,
    pub left_pct: f64,
    pub width_pct: f64,
    pub progress: u8,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttLayout {
    pub chart_start: NaiveDate,
    pub chart_end: NaiveDate,
    /// Both chart ends inclusive.
    pub total_days: i64,
    pub bars: Vec<GanttBar>,
}

impl GanttLayout {
    /// Percent offset for a vertical marker such as "today".
    pub fn marker_offset(&self, date: NaiveDate) -> f64 {
        pct((date - self.chart_start).num_days(), self.total_days)
    }

    pub fn bar(&self, task_id: &str) -> Option<&GanttBar> {
        self.bars.iter().find(|bar| bar.task_id == task_id)
    }
}

fn pct(days: i64, total_days: i64) -> f64 {
    days as f64 * 100.0 / total_days as f64
}

/// Earliest start to latest end over `tasks`.
pub fn chart_bounds(tasks: &[Task]) -> Option<(NaiveDate, NaiveDate)> {
    let start = tasks.iter().map(|t| t.start_date).min()?;
    let end = tasks.iter().map(|t| t.end_date).max()?;
    Some((start, end))
}

/// Linear projection of task dates onto the chart span. `critical` marks
/// bars whose task is on the critical path.
pub fn project_layout(
    chart_start: NaiveDate,
    chart_end: NaiveDate,
    tasks: &[Task],
    critical: Option<&CriticalPathResult>,
) -> Result<GanttLayout, ValidationError> {
    if chart_end < chart_start {
        return Err(ValidationError::InvalidChartRange {
            start: chart_start,
            end: chart_end,
        });
    }
    let total_days = (chart_end - chart_start).num_days() + 1;

    let bars = tasks
        .iter()
        .map(|task| {
            let start_offset_days = (task.start_date - chart_start).num_days();
            let duration_days = task.duration_days();
            GanttBar {
                task_id: task.id.clone(),
                name: task.name.clone(),
                start_offset_days,
                duration_days,
                left_pct: pct(start_offset_days, total_days),
                width_pct: pct(duration_days, total_days),
                progress: task.progress.min(100),
                is_critical: critical.is_some_and(|cpm| cpm.is_critical(&task.id)),
            }
        })
        .collect();

    Ok(GanttLayout {
        chart_start,
        chart_end,
        total_days,
        bars,
    })
}
