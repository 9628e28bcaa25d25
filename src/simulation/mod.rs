//! Concurrent execution of assignments against simulated durations.
//!
//! Readiness is seeded once at the start of a run and never unlocked from
//! graph edges; see [`ReadinessSeed`].

pub mod progress;
pub mod report;
pub mod runner;


pub use progress::*;
pub use report::*;
pub use runner::*;
