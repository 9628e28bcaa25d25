//! # cosynth
//!
//! Greedy assignment of tasks onto a pool of heterogeneous resources, and a
//! concurrent simulator that executes the resulting assignments.
//!
//! ## Architecture Overview
//!
//! - **[`model`]**: Dependency graph, resources, time/cost matrix and assignments
//! - **[`problem`]**: One dataset (graph + matrix), random generation and the text file format
//! - **[`scheduler`]**: Assignment strategies (fastest, cheapest, per-rule distribution)
//! - **[`simulation`]**: Concurrent execution of assignments and the resulting report
//! - **[`cli`]**: Argument parsing and configuration discovery
//!
//! Data flows from a [`Problem`] through the [`Scheduler`] into a set of
//! assignments, which the [`ExecutionSimulator`] runs to produce a schedule
//! and a critical-path time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cosynth::{ExecutionSimulator, GenerationConfig, Problem, Scheduler, SimulationReport, Strategy};
//! use cosynth::problem::seeded_rng;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut rng = seeded_rng(Some(7));
//!     let problem = Problem::generate(&GenerationConfig::default(), &mut rng)?;
//!
//!     let mut scheduler = Scheduler::new();
//!     let summary = scheduler.apply(Strategy::Fastest, &problem);
//!     println!("{}", summary);
//!
//!     let run = ExecutionSimulator::default().run(&problem, &scheduler).await;
//!     println!("{}", SimulationReport::build(&problem, &scheduler, &run));
//!     Ok(())
//! }
//! ```

/// Core data types.
///
/// Graph, resources, the per-task per-resource cost matrix and assignments.
pub mod model;

/// Problem aggregate, random generation and file format.
pub mod problem;

/// Assignment strategies.
pub mod scheduler;

/// Concurrent execution simulator.
pub mod simulation;

/// Environment constants and path utilities.
pub mod env;

/// Command line interface.
pub mod cli;

pub use model::{Assignment, CostEntry, CostMatrix, Graph, Resource, ResourceCategory, TaskId};
pub use problem::{GenerationConfig, LoadError, Problem};
pub use scheduler::{AllocationSummary, Rule, Scheduler, Strategy};
pub use simulation::{
    ExecutionSimulator, ReadinessSeed, SimulationConfig, SimulationReport, SimulationRun,
};
