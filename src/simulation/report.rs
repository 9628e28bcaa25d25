use super::runner::{ScheduleEntry, SimulationRun};
use crate::model::{Assignment, Resource, TaskId};
use crate::problem::Problem;
use crate::scheduler::Scheduler;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One task as seen from the assignment it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub task: TaskId,
    pub times: Vec<i64>,
    pub costs: Vec<i64>,
    pub schedule: Option<ScheduleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentReport {
    pub assignment: String,
    pub resource: Resource,
    pub subtask: Option<usize>,
    pub tasks: Vec<TaskReport>,
    pub expected_time: i64,
    /// Task costs plus the resource base cost
    pub expected_cost: i64,
    pub running_time: i64,
    /// Critical path time minus running time
    pub idle_time: i64,
    /// Latest start among the scheduled tasks
    pub starting_time: i64,
    /// Latest end among the scheduled tasks
    pub ending_time: i64,
}

impl AssignmentReport {
    fn build(assignment: &Assignment, problem: &Problem, run: &SimulationRun) -> Self {
        let resource = *assignment.resource();
        let mut report = Self {
            assignment: assignment.to_string(),
            resource,
            subtask: assignment.subtask(),
            tasks: Vec::with_capacity(assignment.len()),
            expected_time: 0,
            expected_cost: i64::from(resource.base_cost()),
            running_time: 0,
            idle_time: 0,
            starting_time: 0,
            ending_time: 0,
        };

        for &task in assignment.tasks() {
            let entry = problem.costs().entry(task, &resource).cloned().unwrap_or_default();
            report.expected_time += entry.duration();
            report.expected_cost += entry.total_cost();

            let schedule = run.entry(task);
            if let Some(scheduled) = schedule {
                report.running_time += scheduled.duration();
                report.starting_time = report.starting_time.max(scheduled.start);
                report.ending_time = report.ending_time.max(scheduled.end);
            }

            report.tasks.push(TaskReport {
                task,
                times: entry.times().to_vec(),
                costs: entry.costs().to_vec(),
                schedule,
            });
        }

        report.idle_time = run.critical_path_time - report.running_time;
        report
    }
}

/// A scheduled task and the assignment it is indexed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledTask {
    pub task: TaskId,
    pub assignment: Option<String>,
    pub start: i64,
    pub end: i64,
}

/// Summary of a finished simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub started_at: DateTime<Utc>,
    pub time_scale_ms: u64,
    pub elapsed_ms: u64,
    pub critical_path_time: i64,
    pub assignments: Vec<AssignmentReport>,
    pub schedule: Vec<ScheduledTask>,
    /// Tasks that never ran
    pub unscheduled: Vec<TaskId>,
    pub failed_tasks: Vec<TaskId>,
}

impl SimulationReport {
    pub fn build(problem: &Problem, scheduler: &Scheduler, run: &SimulationRun) -> Self {
        let assignments = scheduler
            .assignments()
            .map(|assignment| AssignmentReport::build(assignment, problem, run))
            .collect();

        let schedule = run
            .schedule
            .iter()
            .map(|(&task, entry)| ScheduledTask {
                task,
                assignment: scheduler.assignment_for(task).map(ToString::to_string),
                start: entry.start,
                end: entry.end,
            })
            .collect();

        let unscheduled = (0..problem.task_count())
            .filter(|task| !run.schedule.contains_key(task) && !run.failed_tasks.contains(task))
            .collect();

        Self {
            started_at: run.started_at,
            time_scale_ms: run.time_scale_ms,
            elapsed_ms: run.elapsed_ms,
            critical_path_time: run.critical_path_time,
            assignments,
            schedule,
            unscheduled,
            failed_tasks: run.failed_tasks.clone(),
        }
    }

    /// Assignment with the largest running time; the first one wins ties
    pub fn longest_running(&self) -> Option<&AssignmentReport> {
        self.assignments.iter().reduce(|longest, candidate| {
            if candidate.running_time > longest.running_time {
                candidate
            } else {
                longest
            }
        })
    }

    /// Assignment with the smallest running time; the first one wins ties
    pub fn shortest_running(&self) -> Option<&AssignmentReport> {
        self.assignments.iter().min_by_key(|a| a.running_time)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created {} components", self.assignments.len())?;
        for assignment in &self.assignments {
            writeln!(
                f,
                "{} Tasks: {} Expected time: {} Idle time: {} Cost: {} Including initial: {}",
                assignment.assignment,
                assignment.tasks.len(),
                assignment.expected_time,
                assignment.idle_time,
                assignment.expected_cost,
                assignment.resource.base_cost()
            )?;
            for task in &assignment.tasks {
                if task.times.len() > 1 {
                    writeln!(
                        f,
                        "  T{} (Subtasks: Times={}, Costs={})",
                        task.task,
                        join(&task.times),
                        join(&task.costs)
                    )?;
                } else {
                    writeln!(
                        f,
                        "  T{} (Time: {}, Cost: {})",
                        task.task,
                        task.times.first().copied().unwrap_or(0),
                        task.costs.first().copied().unwrap_or(0)
                    )?;
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Task schedule:")?;
        for entry in &self.schedule {
            writeln!(
                f,
                "T{}\ton {} from: {} to: {}",
                entry.task,
                entry.assignment.as_deref().unwrap_or("None"),
                entry.start,
                entry.end
            )?;
        }
        if !self.unscheduled.is_empty() {
            writeln!(f, "Not run: {:?}", self.unscheduled)?;
        }
        if !self.failed_tasks.is_empty() {
            writeln!(f, "Failed: {:?}", self.failed_tasks)?;
        }

        writeln!(f, "Critical path time: {}", self.critical_path_time)?;
        write!(
            f,
            "Program execution time: {} milliseconds. (scale x{})",
            self.elapsed_ms, self.time_scale_ms
        )
    }
}

fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
