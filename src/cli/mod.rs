//! Command line front end
//!
//! Argument parsing and configuration discovery.

pub mod args;
pub mod config;

pub use args::{Args, Commands, GenerateOptions, SimulationOptions};
pub use config::{ConfigDiscovery, CosynthConfig, SchedulingConfig};
