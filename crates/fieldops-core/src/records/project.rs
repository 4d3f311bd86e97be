use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{Dependency, DependencyType, MAX_LAG_DAYS, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

fn default_task_status() -> String {
    TaskStatus::NotStarted.as_str().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTaskRecord {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_task_status")]
    pub status: String,
    #[serde(default)]
    pub progress_percentage: Option<f64>,
}

impl TryFrom<&ProjectTaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(record: &ProjectTaskRecord) -> Result<Self, Self::Error> {
        let status: TaskStatus = record.status.parse()?;
        let progress = match record.progress_percentage {
            None => 0,
            Some(pct) if pct.is_finite() => pct.round().clamp(0.0, 100.0) as u8,
            Some(pct) => {
                return Err(ValidationError::Invalid(format!(
                    "task {} has non-numeric progress {pct}",
                    record.id
                )));
            }
        };

        let mut task = Task::new(
            record.id.clone(),
            record.name.clone(),
            record.start_date,
            record.end_date,
        );
        task.status = status;
        task.progress = progress;
        Ok(task)
    }
}

impl ProjectTaskRecord {
    pub fn from_task(project_id: &str, task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            project_id: project_id.to_string(),
            name: task.name.clone(),
            start_date: task.start_date,
            end_date: task.end_date,
            status: task.status.as_str().to_string(),
            progress_percentage: Some(f64::from(task.progress)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDependencyRecord {
    pub task_id: String,
    pub depends_on_task_id: String,
    #[serde(default)]
    pub dependency_type: Option<String>,
    #[serde(default)]
    pub lag_days: Option<i64>,
}

impl TryFrom<&TaskDependencyRecord> for Dependency {
    type Error = ValidationError;

    fn try_from(record: &TaskDependencyRecord) -> Result<Self, Self::Error> {
        let dependency_type = match record.dependency_type.as_deref() {
            None | Some("") => DependencyType::default(),
            Some(raw) => raw.parse()?,
        };
        let lag_days = record.lag_days.unwrap_or(0);
        if !(-MAX_LAG_DAYS..=MAX_LAG_DAYS).contains(&lag_days) {
            return Err(ValidationError::Invalid(format!(
                "dependency {} -> {} has lag {lag_days} days (limit {MAX_LAG_DAYS})",
                record.depends_on_task_id, record.task_id
            )));
        }
        Ok(Dependency {
            task_id: record.task_id.clone(),
            depends_on: record.depends_on_task_id.clone(),
            dependency_type,
            lag_days,
        })
    }
}

impl From<&Dependency> for TaskDependencyRecord {
    fn from(dep: &Dependency) -> Self {
        Self {
            task_id: dep.task_id.clone(),
            depends_on_task_id: dep.depends_on.clone(),
            dependency_type: Some(dep.dependency_type.as_str().to_string()),
            lag_days: Some(dep.lag_days),
        }
    }
}
