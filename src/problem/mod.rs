//! A complete allocation problem: dependency graph, resource pool and
//! time/cost matrix, with random generation and the text file format.

pub mod format;
pub mod generate;

#[cfg(test)]
mod tests;

pub use format::*;
pub use generate::*;

use crate::model::{CostEntry, CostMatrix, Graph, MatrixError, Resource, TaskId};
use rand::Rng;
use std::fmt;
use tracing::{debug, info, warn};

/// Graph, resources and costs describing one dataset.
///
/// The graph always has at least one vertex per matrix row; the task count
/// is the graph's vertex count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Problem {
    graph: Graph,
    costs: CostMatrix,
}

impl Problem {
    /// Assemble a problem; the graph is grown to cover every matrix row
    pub fn from_parts(mut graph: Graph, costs: CostMatrix) -> Self {
        graph.ensure_vertices(costs.task_count());
        Self { graph, costs }
    }

    /// Build a random problem from generation settings
    pub fn generate<R: Rng>(config: &GenerationConfig, rng: &mut R) -> Result<Self, GenerationError> {
        let graph = random_task_graph(config.task_count, config.weighted_edges, rng);
        let resources = random_resources(config.core_count, config.unit_count, rng)?;

        let mut costs = CostMatrix::with_tasks(config.task_count);
        costs.load_resources(&resources);
        costs.generate_random(&config.costs, rng)?;

        info!(
            "Generated problem with {} tasks, {} edges and {} resources",
            config.task_count,
            graph.edge_count(),
            resources.len()
        );
        Ok(Self::from_parts(graph, costs))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    pub fn resources(&self) -> &[Resource] {
        self.costs.resources()
    }

    pub fn task_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Append a synthetic task assembled from subtasks of existing tasks.
    ///
    /// Draws between `min_subtasks` and `max_subtasks` (task, subtask)
    /// pairs; on every resource the new task's entry is the vector of the
    /// picked times and costs. The graph gains one isolated vertex.
    pub fn add_random_compound_task<R: Rng>(
        &mut self,
        min_subtasks: usize,
        max_subtasks: usize,
        rng: &mut R,
    ) -> Result<Option<TaskId>, MatrixError> {
        let task_count = self.costs.task_count();
        let Some(first) = self.resources().first().copied() else {
            warn!("Cannot add a compound task without resources");
            return Ok(None);
        };
        if task_count == 0 {
            warn!("Cannot add a compound task without existing tasks");
            return Ok(None);
        }
        if min_subtasks == 0 || min_subtasks > max_subtasks {
            return Err(MatrixError::InvalidRange {
                what: "compound subtask count",
                min: min_subtasks as i64,
                max: max_subtasks as i64,
            });
        }

        let count = rng.random_range(min_subtasks..=max_subtasks);
        let picked: Vec<(TaskId, usize)> = (0..count)
            .map(|_| {
                let task = rng.random_range(0..task_count);
                let subtasks = self.costs.times(task, &first).len().max(1);
                (task, rng.random_range(0..subtasks))
            })
            .collect();

        let row = self
            .resources()
            .iter()
            .map(|resource| {
                let (times, costs) = picked
                    .iter()
                    .map(|&(task, subtask)| {
                        let pick = |values: &[i64]| {
                            values
                                .get(subtask)
                                .or_else(|| values.first())
                                .copied()
                                .unwrap_or(0)
                        };
                        (
                            pick(self.costs.times(task, resource)),
                            pick(self.costs.costs(task, resource)),
                        )
                    })
                    .unzip();
                CostEntry::from_parts(times, costs).unwrap_or_default()
            })
            .collect();

        let task = self.costs.push_task(row)?;
        self.graph.ensure_vertices(task + 1);
        debug!("Compound task {} built from {:?}", task, picked);
        info!("Added compound task {} with {} subtasks", task, count);
        Ok(Some(task))
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_problem(self, f)
    }
}
