use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::error::ScheduleError;
use crate::graph::schedule_dag::ScheduleDag;
use crate::model::{DependencyType, TaskId};

/// Latest start/finish per task, anchored to `project_finish`.
pub struct BackwardPass<'a> {
    dag: &'a ScheduleDag,
}

impl<'a> BackwardPass<'a> {
    pub fn new(dag: &'a ScheduleDag) -> Self {
        Self { dag }
    }

    pub fn execute(
        &self,
        order: &[NodeIndex],
        project_finish: i64,
    ) -> Result<HashMap<TaskId, (i64, i64)>, ScheduleError> {
        let graph = &self.dag.graph;

        // LS/LF maps keyed by node
        let mut late_starts: HashMap<NodeIndex, i64> = HashMap::with_capacity(order.len());
        let mut late_finishes: HashMap<NodeIndex, i64> = HashMap::with_capacity(order.len());

        // Reverse topological order
        for &node_ix in order.iter().rev() {
            let duration = self.dag.duration(node_ix);
            let out_of_range = || ScheduleError::OutOfRange(graph[node_ix].clone());
            let mut lf = project_finish;

            for edge in graph.edges_directed(node_ix, Direction::Outgoing) {
                let succ_ix = edge.target();
                let (Some(&succ_ls), Some(&succ_lf)) =
                    (late_starts.get(&succ_ix), late_finishes.get(&succ_ix))
                else {
                    continue;
                };
                let lag = edge.weight().lag_days;
                let bound = match edge.weight().kind {
                    DependencyType::FinishToStart => succ_ls.checked_sub(lag),
                    DependencyType::StartToStart => succ_ls
                        .checked_sub(lag)
                        .and_then(|v| v.checked_add(duration)),
                    DependencyType::FinishToFinish => succ_lf.checked_sub(lag),
                    DependencyType::StartToFinish => succ_lf
                        .checked_sub(lag)
                        .and_then(|v| v.checked_add(duration)),
                }
                .ok_or_else(out_of_range)?;
                lf = lf.min(bound);
            }

            let ls = lf.checked_sub(duration).ok_or_else(out_of_range)?;
            late_finishes.insert(node_ix, lf);
            late_starts.insert(node_ix, ls);
        }

        Ok(late_starts
            .into_iter()
            .filter_map(|(node_ix, ls)| {
                late_finishes
                    .get(&node_ix)
                    .map(|&lf| (graph[node_ix].clone(), (ls, lf)))
            })
            .collect())
    }
}
