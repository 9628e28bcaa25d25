use crate::model::{Graph, MatrixError, RandomCostParams, Resource, ResourceCategory};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound for random edge weights
pub const MAX_EDGE_WEIGHT: u32 = 100;

/// Upper bound for random resource base costs
pub const MAX_BASE_COST: u32 = 5;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid number of resources: {cores} cores and {units} processing units (need at least one of each)")]
    InvalidResourceCounts { cores: usize, units: usize },

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Settings for random problem generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub task_count: usize,
    /// Number of hardware cores (HC)
    pub core_count: usize,
    /// Number of processing elements (PE)
    pub unit_count: usize,
    /// Draw edge weights in `1..=100` instead of using unit weights
    pub weighted_edges: bool,
    pub costs: RandomCostParams,
    /// Seed for reproducible runs; a fresh OS seed is used when unset
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            task_count: 10,
            core_count: 2,
            unit_count: 2,
            weighted_edges: true,
            costs: RandomCostParams::default(),
            seed: None,
        }
    }
}

/// Generator for one run: reproducible when `seed` is set
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            info!("Using random seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    }
}

/// Build a random graph rooted at task 0 that reaches every task.
///
/// Starts with `0 -> 1`, then links 0 to each other task with probability
/// `1 / (n/6 + 1)`, and finally attaches every unreached task to a randomly
/// chosen reached one.
pub fn random_task_graph<R: Rng>(task_count: usize, weighted: bool, rng: &mut R) -> Graph {
    let mut graph = Graph::with_vertices(task_count);
    if task_count <= 1 {
        warn!("Invalid number of tasks for a random graph: {}", task_count);
        return graph;
    }

    let weight = |rng: &mut R| {
        if weighted {
            rng.random_range(1..=MAX_EDGE_WEIGHT)
        } else {
            1
        }
    };

    let mut reached = BTreeSet::from([0, 1]);
    let first_weight = weight(rng);
    graph.add_weighted_edge(0, 1, first_weight);

    let odds = task_count / 6 + 1;
    for task in 2..task_count {
        if rng.random_range(0..odds) == 0 {
            let w = weight(rng);
            graph.add_weighted_edge(0, task, w);
            reached.insert(task);
        }
    }

    for task in 0..task_count {
        if reached.contains(&task) {
            continue;
        }
        let pick = rng.random_range(0..reached.len());
        let Some(&parent) = reached.iter().nth(pick) else {
            continue;
        };
        if !graph.check_edge(parent, task) {
            let w = weight(rng);
            graph.add_weighted_edge(parent, task, w);
            reached.insert(task);
        }
    }

    debug!(
        "Random graph with {} vertices and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    graph
}

/// Build `cores` HC resources followed by `units` PE resources.
///
/// Ids restart at 0 for each category; base costs are drawn in `1..=5`.
pub fn random_resources<R: Rng>(
    cores: usize,
    units: usize,
    rng: &mut R,
) -> Result<Vec<Resource>, GenerationError> {
    if cores < 1 || units < 1 {
        return Err(GenerationError::InvalidResourceCounts { cores, units });
    }

    let mut resources = Vec::with_capacity(cores + units);
    for (category, count) in [
        (ResourceCategory::Core, cores),
        (ResourceCategory::Processing, units),
    ] {
        for id in 0..count as u32 {
            let base_cost = rng.random_range(1..=MAX_BASE_COST);
            resources.push(Resource::new(base_cost, category, id));
        }
    }
    Ok(resources)
}
