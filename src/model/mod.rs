//! Core data model: the task dependency graph, the resource pool, the
//! per-(task, resource) time/cost matrix and assignments of tasks to
//! resource instances.

pub mod assignment;
pub mod cost;
pub mod graph;
pub mod resource;


pub use assignment::*;
pub use cost::*;
pub use graph::*;
pub use resource::*;

/// Identifier of a task: a vertex in the [`Graph`] and a row in the [`CostMatrix`].
pub type TaskId = usize;
