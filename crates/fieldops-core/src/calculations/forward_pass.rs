use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::error::ScheduleError;
use crate::graph::schedule_dag::ScheduleDag;
use crate::model::{DependencyType, TaskId};

/// Earliest start/finish per task, as day offsets. Finish is exclusive:
/// a one-day task starting at 0 finishes at 1.
pub struct ForwardPass<'a> {
    dag: &'a ScheduleDag,
}

impl<'a> ForwardPass<'a> {
    pub fn new(dag: &'a ScheduleDag) -> Self {
        Self { dag }
    }

    pub fn execute(
        &self,
        order: &[NodeIndex],
    ) -> Result<HashMap<TaskId, (i64, i64)>, ScheduleError> {
        let graph = &self.dag.graph;
        let mut early_starts: HashMap<NodeIndex, i64> = HashMap::with_capacity(order.len());
        let mut early_finishes: HashMap<NodeIndex, i64> = HashMap::with_capacity(order.len());

        for &node_ix in order {
            let duration = self.dag.duration(node_ix);
            let out_of_range = || ScheduleError::OutOfRange(graph[node_ix].clone());
            let mut has_pred = false;
            let mut es = i64::MIN;

            for edge in graph.edges_directed(node_ix, Direction::Incoming) {
                let pred_ix = edge.source();
                let (Some(&pred_es), Some(&pred_ef)) =
                    (early_starts.get(&pred_ix), early_finishes.get(&pred_ix))
                else {
                    continue;
                };
                has_pred = true;
                let lag = edge.weight().lag_days;
                let candidate = match edge.weight().kind {
                    DependencyType::FinishToStart => pred_ef.checked_add(lag),
                    DependencyType::StartToStart => pred_es.checked_add(lag),
                    DependencyType::FinishToFinish => pred_ef
                        .checked_add(lag)
                        .and_then(|v| v.checked_sub(duration)),
                    DependencyType::StartToFinish => pred_es
                        .checked_add(lag)
                        .and_then(|v| v.checked_sub(duration)),
                }
                .ok_or_else(out_of_range)?;
                es = es.max(candidate);
            }

            // Tasks without predecessors keep their authored start.
            let es = if has_pred {
                es.max(0)
            } else {
                self.dag.start_offset(node_ix)
            };
            let ef = es.checked_add(duration).ok_or_else(out_of_range)?;
            early_starts.insert(node_ix, es);
            early_finishes.insert(node_ix, ef);
        }

        Ok(early_starts
            .into_iter()
            .filter_map(|(node_ix, es)| {
                early_finishes
                    .get(&node_ix)
                    .map(|&ef| (graph[node_ix].clone(), (es, ef)))
            })
            .collect())
    }
}
