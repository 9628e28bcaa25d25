use crate::model::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution state of one task during a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskProgress {
    NotReachable,
    Ready,
    Running,
    Done,
}

impl TaskProgress {
    /// Numeric status code; `NotReachable` and `Done` share -2
    pub fn code(self) -> i32 {
        match self {
            TaskProgress::NotReachable => -2,
            TaskProgress::Ready => -1,
            TaskProgress::Running => 0,
            TaskProgress::Done => -2,
        }
    }
}

impl fmt::Display for TaskProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskProgress::NotReachable => "not reachable",
            TaskProgress::Ready => "ready",
            TaskProgress::Running => "running",
            TaskProgress::Done => "done",
        };
        f.write_str(name)
    }
}

/// Which tasks start out READY.
///
/// Graph edges are never consulted: a task that is not seeded stays
/// `NotReachable` for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessSeed {
    /// Only task 0
    #[default]
    FirstTask,
    /// Every task
    AllTasks,
}

/// Per-task progress, indexed by task id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTable {
    states: Vec<TaskProgress>,
}

impl ProgressTable {
    pub fn seeded(task_count: usize, seed: ReadinessSeed) -> Self {
        let states = match seed {
            ReadinessSeed::FirstTask => {
                let mut states = vec![TaskProgress::NotReachable; task_count];
                if let Some(first) = states.first_mut() {
                    *first = TaskProgress::Ready;
                }
                states
            }
            ReadinessSeed::AllTasks => vec![TaskProgress::Ready; task_count],
        };
        Self { states }
    }

    /// Lowest task id currently READY
    pub fn first_ready(&self) -> Option<TaskId> {
        self.states
            .iter()
            .position(|state| *state == TaskProgress::Ready)
    }

    pub fn get(&self, task: TaskId) -> Option<TaskProgress> {
        self.states.get(task).copied()
    }

    /// Set the state of `task`; false when the task is out of range
    pub fn set(&mut self, task: TaskId, state: TaskProgress) -> bool {
        match self.states.get_mut(task) {
            Some(slot) => {
                *slot = state;
                true
            }
            None => false,
        }
    }

    pub fn count(&self, state: TaskProgress) -> usize {
        self.states.iter().filter(|s| **s == state).count()
    }

    pub fn states(&self) -> &[TaskProgress] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
