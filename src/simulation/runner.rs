use super::progress::{ProgressTable, ReadinessSeed, TaskProgress};
use crate::model::{Assignment, CostEntry, CostMatrix, TaskId};
use crate::problem::Problem;
use crate::scheduler::Scheduler;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Task {task} has negative duration {value}")]
    NegativeDuration { task: TaskId, value: i64 },

    #[error("Runner for {assignment} panicked: {reason}")]
    RunnerPanicked { assignment: String, reason: String },
}

/// Settings for simulated execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock milliseconds slept per time unit
    pub time_scale_ms: u64,
    pub readiness: ReadinessSeed,
    /// Sampling period of the elapsed-time poller
    pub poll_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_scale_ms: 1,
            readiness: ReadinessSeed::FirstTask,
            poll_interval_ms: 1,
        }
    }
}

/// Simulated start and end time of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start: i64,
    pub end: i64,
}

impl ScheduleEntry {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// Outcome of one simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub started_at: DateTime<Utc>,
    pub schedule: BTreeMap<TaskId, ScheduleEntry>,
    pub progress: ProgressTable,
    /// Tasks forced to DONE after an execution error
    pub failed_tasks: Vec<TaskId>,
    /// Largest recorded end time
    pub critical_path_time: i64,
    pub elapsed_ms: u64,
    pub time_scale_ms: u64,
}

impl SimulationRun {
    pub fn entry(&self, task: TaskId) -> Option<ScheduleEntry> {
        self.schedule.get(&task).copied()
    }
}

/// State shared by every runner, always accessed under one lock
#[derive(Debug, Default)]
struct SimulationState {
    progress: ProgressTable,
    schedule: BTreeMap<TaskId, ScheduleEntry>,
    failed_tasks: Vec<TaskId>,
}

impl SimulationState {
    /// Latest recorded end among the assignment's tasks
    fn assignment_start(&self, assignment: &Assignment) -> i64 {
        assignment
            .tasks()
            .iter()
            .filter_map(|task| self.schedule.get(task))
            .map(|entry| entry.end)
            .max()
            .unwrap_or(0)
    }
}

/// Runs assignments concurrently and records a schedule.
///
/// One runner is spawned per assignment. A runner repeatedly claims the
/// lowest READY task, sleeps for its duration on the runner's resource
/// outside the lock, then records it as DONE. Tasks of one assignment run
/// serially; distinct assignments run in parallel.
#[derive(Debug, Clone, Default)]
pub struct ExecutionSimulator {
    config: SimulationConfig,
}

impl ExecutionSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub async fn run(&self, problem: &Problem, scheduler: &Scheduler) -> SimulationRun {
        let started_at = Utc::now();
        let costs = Arc::new(problem.costs().clone());
        let state = Arc::new(Mutex::new(SimulationState {
            progress: ProgressTable::seeded(problem.task_count(), self.config.readiness),
            ..SimulationState::default()
        }));

        info!(
            "Running {} assignments over {} tasks in scale x{}",
            scheduler.assignment_count(),
            problem.task_count(),
            self.config.time_scale_ms
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms.max(1));
        let poller = tokio::spawn(poll_elapsed(stop_rx, poll_interval));
        let clock = Instant::now();

        let runners: Vec<_> = scheduler
            .assignments()
            .map(|assignment| {
                let runner = AssignmentRunner {
                    assignment: assignment.clone(),
                    costs: Arc::clone(&costs),
                    state: Arc::clone(&state),
                    time_scale_ms: self.config.time_scale_ms,
                };
                (assignment.to_string(), tokio::spawn(runner.run()))
            })
            .collect();

        for (label, handle) in runners {
            match handle.await {
                Ok(completed) => debug!("Runner {} finished after {} tasks", label, completed),
                Err(e) => error!(
                    "{}",
                    SimulationError::RunnerPanicked {
                        assignment: label,
                        reason: e.to_string(),
                    }
                ),
            }
        }

        let _ = stop_tx.send(true);
        let elapsed_ms = match poller.await {
            Ok(elapsed) => elapsed,
            Err(e) => {
                warn!("Elapsed-time poller failed: {}", e);
                clock.elapsed().as_millis() as u64
            }
        };

        let state = std::mem::take(&mut *state.lock().await);
        let critical_path_time = state
            .schedule
            .values()
            .map(|entry| entry.end)
            .max()
            .unwrap_or(0);

        info!(
            "Simulation finished: {} tasks scheduled, critical path time {}, {} ms elapsed",
            state.schedule.len(),
            critical_path_time,
            elapsed_ms
        );

        SimulationRun {
            started_at,
            schedule: state.schedule,
            progress: state.progress,
            failed_tasks: state.failed_tasks,
            critical_path_time,
            elapsed_ms,
            time_scale_ms: self.config.time_scale_ms,
        }
    }
}

/// Samples wall-clock time until told to stop
async fn poll_elapsed(mut stop: watch::Receiver<bool>, interval: Duration) -> u64 {
    let start = Instant::now();
    loop {
        if *stop.borrow() {
            break;
        }
        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
    start.elapsed().as_millis() as u64
}

struct AssignmentRunner {
    assignment: Assignment,
    costs: Arc<CostMatrix>,
    state: Arc<Mutex<SimulationState>>,
    time_scale_ms: u64,
}

impl AssignmentRunner {
    /// Claim and execute READY tasks until none remain; returns the number completed
    async fn run(self) -> usize {
        let resource = *self.assignment.resource();
        let mut completed = 0;

        loop {
            let task = {
                let mut state = self.state.lock().await;
                let Some(task) = state.progress.first_ready() else {
                    break;
                };
                state.progress.set(task, TaskProgress::Running);
                task
            };

            debug!("{} started task {}", self.assignment, task);
            let entry = self
                .costs
                .entry(task, &resource)
                .cloned()
                .unwrap_or_default();

            let outcome = self.execute(task, &entry).await;

            let mut state = self.state.lock().await;
            state.progress.set(task, TaskProgress::Done);
            match outcome {
                Ok(span) => {
                    let start = state.assignment_start(&self.assignment);
                    let end = start + span;
                    state.schedule.insert(task, ScheduleEntry { start, end });
                    debug!("{} finished task {} ({}..{})", self.assignment, task, start, end);
                    completed += 1;
                }
                Err(e) => {
                    error!("{}: {}", self.assignment, e);
                    state.failed_tasks.push(task);
                }
            }
        }

        completed
    }

    /// Sleep for the task's duration; subtasks sleep concurrently
    async fn execute(&self, task: TaskId, entry: &CostEntry) -> Result<i64, SimulationError> {
        if entry.is_empty() {
            warn!(
                "Task {} has no entry on {}, using zero duration",
                task,
                self.assignment.resource()
            );
            return Ok(0);
        }
        if let Some(&value) = entry.times().iter().find(|time| **time < 0) {
            return Err(SimulationError::NegativeDuration { task, value });
        }

        if entry.has_subtasks() {
            let subtasks = entry.times().iter().map(|&time| {
                let delay = self.scaled(time);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    time
                })
            });

            let mut span = 0;
            for (subtask, result) in join_all(subtasks).await.into_iter().enumerate() {
                match result {
                    Ok(time) => span = span.max(time),
                    Err(e) => error!("Subtask {} of task {} failed: {}", subtask, task, e),
                }
            }
            Ok(span)
        } else {
            let time = entry.times()[0];
            tokio::time::sleep(self.scaled(time)).await;
            Ok(time)
        }
    }

    fn scaled(&self, time: i64) -> Duration {
        Duration::from_millis((time.max(0) as u64).saturating_mul(self.time_scale_ms))
    }
}
