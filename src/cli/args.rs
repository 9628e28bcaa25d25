//! Command line argument parsing
//!
//! Subcommands:
//! - `generate`: Write a random problem file
//! - `show`: Print a problem file in normalized form
//! - `assign`: Run an assignment strategy and print the assignments
//! - `run`: Assign, simulate execution and print the report
//! - `paths`: List every simple path between two tasks
//! - `bfs`: Print the breadth-first order from task 0
//! - `add-compound`: Append a random compound task to a problem file
//! - `show-config`: Show configuration discovery information

use crate::env::{self, defaults};
use crate::problem::GenerationConfig;
use crate::scheduler::Strategy;
use crate::simulation::{ReadinessSeed, SimulationConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cosynth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assign tasks to heterogeneous resources and simulate their execution")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file path (skips discovery)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a random problem file
    Generate {
        /// Output file
        #[arg(short = 'o', long = "output", default_value = defaults::PROBLEM_FILE_NAME)]
        output: PathBuf,
        #[command(flatten)]
        options: GenerateOptions,
    },
    /// Print a problem file
    Show {
        file: PathBuf,
    },
    /// Run an assignment strategy and print the assignments
    Assign {
        file: PathBuf,
        /// fastest, cheapest, distribute-time or distribute-cost
        #[arg(short = 's', long = "strategy")]
        strategy: Option<Strategy>,
        /// Print JSON instead of text
        #[arg(long = "json")]
        json: bool,
    },
    /// Assign, simulate execution and print the report
    Run {
        file: PathBuf,
        /// fastest, cheapest, distribute-time or distribute-cost
        #[arg(short = 's', long = "strategy")]
        strategy: Option<Strategy>,
        #[command(flatten)]
        simulation: SimulationOptions,
        /// Print JSON instead of text
        #[arg(long = "json")]
        json: bool,
    },
    /// List every simple path between two tasks
    Paths {
        file: PathBuf,
        from: usize,
        to: usize,
    },
    /// Print the breadth-first order from task 0
    Bfs {
        file: PathBuf,
    },
    /// Append a random compound task to a problem file
    AddCompound {
        file: PathBuf,
        /// Write the result here instead of overwriting the input
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        #[arg(long = "min-subtasks", default_value_t = defaults::COMPOUND_MIN_SUBTASKS)]
        min_subtasks: usize,
        #[arg(long = "max-subtasks", default_value_t = defaults::COMPOUND_MAX_SUBTASKS)]
        max_subtasks: usize,
        /// Random seed
        #[arg(long = "seed")]
        seed: Option<u64>,
    },
    /// Show configuration discovery information
    ShowConfig,
}

/// Overrides for the `[generation]` configuration section
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GenerateOptions {
    /// Number of tasks
    #[arg(short = 't', long = "tasks")]
    pub tasks: Option<usize>,
    /// Number of hardware cores (HC)
    #[arg(long = "cores")]
    pub cores: Option<usize>,
    /// Number of processing elements (PE)
    #[arg(long = "units")]
    pub units: Option<usize>,
    /// Use unit edge weights
    #[arg(long = "unweighted")]
    pub unweighted: bool,
    /// Random seed
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

impl GenerateOptions {
    pub fn apply(&self, config: &mut GenerationConfig) {
        if let Some(tasks) = self.tasks {
            config.task_count = tasks;
        }
        if let Some(cores) = self.cores {
            config.core_count = cores;
        }
        if let Some(units) = self.units {
            config.unit_count = units;
        }
        if self.unweighted {
            config.weighted_edges = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

/// Overrides for the `[simulation]` configuration section
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SimulationOptions {
    /// Milliseconds slept per time unit
    #[arg(long = "scale")]
    pub scale: Option<u64>,
    /// Mark every task ready instead of only task 0
    #[arg(long = "all-ready")]
    pub all_ready: bool,
}

impl SimulationOptions {
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(scale) = self.scale {
            config.time_scale_ms = scale;
        }
        if self.all_ready {
            config.readiness = ReadinessSeed::AllTasks;
        }
    }
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn command(&self) -> Result<&Commands, String> {
        self.command.as_ref().ok_or_else(|| {
            "No command specified. Use 'cosynth --help' to see available commands.".to_string()
        })
    }

    /// Log filter used when `RUST_LOG` does not override it
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            env::VERBOSE_LOG_FILTER
        } else {
            env::DEFAULT_LOG_FILTER
        }
    }
}
