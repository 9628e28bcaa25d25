use crate::model::{CostEntry, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-task optimization target used by distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Time,
    Cost,
}

impl Rule {
    /// Numeric rule code: 0 optimizes time, anything else optimizes cost
    pub fn from_code(code: i32) -> Self {
        if code == 0 { Rule::Time } else { Rule::Cost }
    }

    /// Scalar value of a whole entry under this rule
    pub fn entry_metric(self, entry: &CostEntry) -> i64 {
        match self {
            Rule::Time => entry.duration(),
            Rule::Cost => entry.total_cost(),
        }
    }

    /// Value of one subtask of an entry under this rule
    pub fn subtask_metric(self, entry: &CostEntry, subtask: usize) -> Option<i64> {
        match self {
            Rule::Time => entry.times().get(subtask).copied(),
            Rule::Cost => entry.costs().get(subtask).copied(),
        }
    }
}

/// Assignment strategy selectable from configuration and the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Every task on its fastest resource, one instance per resource
    #[default]
    Fastest,
    /// All tasks on the resource with the lowest total cost
    Cheapest,
    /// Independent per-task (and per-subtask) placement by time
    DistributeTime,
    /// Independent per-task (and per-subtask) placement by cost
    DistributeCost,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Fastest => "fastest",
            Strategy::Cheapest => "cheapest",
            Strategy::DistributeTime => "distribute-time",
            Strategy::DistributeCost => "distribute-cost",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fastest" => Ok(Strategy::Fastest),
            "cheapest" => Ok(Strategy::Cheapest),
            "distribute-time" | "time" => Ok(Strategy::DistributeTime),
            "distribute-cost" | "cost" => Ok(Strategy::DistributeCost),
            other => Err(format!(
                "unknown strategy '{}' (expected fastest, cheapest, distribute-time or distribute-cost)",
                other
            )),
        }
    }
}

/// Outcome of one strategy invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    /// Number of distinct tasks placed at least once
    pub allocated: usize,
    pub estimated_time: i64,
    pub estimated_cost: i64,
    /// Tasks for which no feasible resource was found
    pub skipped: Vec<TaskId>,
}

impl fmt::Display for AllocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Allocated {} tasks. Estimated time: {}, Estimated cost: {}",
            self.allocated, self.estimated_time, self.estimated_cost
        )?;
        if !self.skipped.is_empty() {
            write!(f, " (skipped: {:?})", self.skipped)?;
        }
        Ok(())
    }
}
