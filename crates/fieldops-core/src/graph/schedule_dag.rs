use chrono::NaiveDate;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::error::ScheduleError;
use crate::model::{Dependency, DependencyType, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    pub kind: DependencyType,
    pub lag_days: i64,
}

/// Task network with edges running predecessor -> successor.
pub struct ScheduleDag {
    pub graph: DiGraph<TaskId, DependencyEdge>,
    pub id_to_index: HashMap<TaskId, NodeIndex>,
    pub durations: HashMap<TaskId, i64>,
    /// Day offset of each task's own start date from `origin`.
    pub start_offsets: HashMap<TaskId, i64>,
    pub origin: Option<NaiveDate>,
}

impl ScheduleDag {
    pub fn build(tasks: &[Task], dependencies: &[Dependency]) -> Result<Self, ScheduleError> {
        let mut graph: DiGraph<TaskId, DependencyEdge> = DiGraph::new();
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::with_capacity(tasks.len());
        let mut durations: HashMap<TaskId, i64> = HashMap::with_capacity(tasks.len());
        let origin = tasks.iter().map(|t| t.start_date).min();

        // Add nodes first
        for task in tasks {
            if task.end_date < task.start_date {
                return Err(ScheduleError::InvalidTaskDates {
                    task_id: task.id.clone(),
                    start: task.start_date,
                    end: task.end_date,
                });
            }
            if id_to_index.contains_key(&task.id) {
                return Err(ScheduleError::DuplicateTask(task.id.clone()));
            }
            let node_ix = graph.add_node(task.id.clone());
            id_to_index.insert(task.id.clone(), node_ix);
            durations.insert(task.id.clone(), task.duration_days());
        }

        let start_offsets = match origin {
            Some(origin) => tasks
                .iter()
                .map(|t| (t.id.clone(), (t.start_date - origin).num_days()))
                .collect(),
            None => HashMap::new(),
        };

        // Add edges: pred -> task
        for dep in dependencies {
            if dep.task_id == dep.depends_on {
                return Err(ScheduleError::SelfDependency(dep.task_id.clone()));
            }
            let succ = *id_to_index
                .get(&dep.task_id)
                .ok_or_else(|| ScheduleError::UnknownTask {
                    task_id: dep.task_id.clone(),
                    referenced_by: dep.depends_on.clone(),
                })?;
            let pred = *id_to_index
                .get(&dep.depends_on)
                .ok_or_else(|| ScheduleError::UnknownTask {
                    task_id: dep.depends_on.clone(),
                    referenced_by: dep.task_id.clone(),
                })?;
            graph.add_edge(
                pred,
                succ,
                DependencyEdge {
                    kind: dep.dependency_type,
                    lag_days: dep.lag_days,
                },
            );
        }

        Ok(Self {
            graph,
            id_to_index,
            durations,
            start_offsets,
            origin,
        })
    }

    /// Predecessors before successors; a cycle is reported with one of its tasks.
    pub fn topological_order(&self) -> Result<Vec<NodeIndex>, ScheduleError> {
        toposort(&self.graph, None).map_err(|cycle| ScheduleError::Cycle {
            task_id: self.graph[cycle.node_id()].clone(),
        })
    }

    pub fn duration(&self, node: NodeIndex) -> i64 {
        self.durations.get(&self.graph[node]).copied().unwrap_or(0)
    }

    pub fn start_offset(&self, node: NodeIndex) -> i64 {
        self.start_offsets
            .get(&self.graph[node])
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn offsets_are_relative_to_earliest_start() {
        let tasks = vec![
            Task::new("a", "A", d(2024, 3, 4), d(2024, 3, 5)),
            Task::new("b", "B", d(2024, 3, 1), d(2024, 3, 1)),
        ];
        let dag = ScheduleDag::build(&tasks, &[]).unwrap();
        assert_eq!(dag.origin, Some(d(2024, 3, 1)));
        assert_eq!(dag.start_offsets["a"], 3);
        assert_eq!(dag.durations["a"], 2);
        assert_eq!(dag.durations["b"], 1);
    }

    #[test]
    fn dangling_predecessor_is_rejected() {
        let tasks = vec![Task::new("a", "A", d(2024, 3, 4), d(2024, 3, 5))];
        let deps = vec![Dependency::finish_to_start("a", "ghost")];
        let err = ScheduleDag::build(&tasks, &deps).err().unwrap();
        assert_eq!(
            err,
            ScheduleError::UnknownTask {
                task_id: "ghost".into(),
                referenced_by: "a".into()
            }
        );
    }

    #[test]
    fn cycle_is_reported_by_toposort() {
        let tasks = vec![
            Task::new("a", "A", d(2024, 3, 1), d(2024, 3, 1)),
            Task::new("b", "B", d(2024, 3, 1), d(2024, 3, 1)),
        ];
        let deps = vec![
            Dependency::finish_to_start("b", "a"),
            Dependency::finish_to_start("a", "b"),
        ];
        let dag = ScheduleDag::build(&tasks, &deps).unwrap();
        assert!(matches!(
            dag.topological_order(),
            Err(ScheduleError::Cycle { .. })
        ));
    }
}
