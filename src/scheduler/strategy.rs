use crate::model::{Assignment, AssignmentKey, CostEntry, Resource, ResourceKey, TaskId};
use crate::problem::Problem;
use crate::scheduler::types::*;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, info, warn};

/// Greedy assignment engine.
///
/// Owns the current set of [`Assignment`]s and the task to assignment
/// index. Every strategy starts from a cleared state.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    assignments: BTreeMap<AssignmentKey, Assignment>,
    task_index: HashMap<TaskId, AssignmentKey>,
    instance_counts: HashMap<ResourceKey, u32>,
    total_cost: i64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the given strategy against a problem
    pub fn apply(&mut self, strategy: Strategy, problem: &Problem) -> AllocationSummary {
        match strategy {
            Strategy::Fastest => self.assign_fastest(problem),
            Strategy::Cheapest => self.assign_cheapest(problem),
            Strategy::DistributeTime => self.distribute(problem, Rule::Time),
            Strategy::DistributeCost => self.distribute(problem, Rule::Cost),
        }
    }

    /// Place every task on the resource with the lowest duration.
    ///
    /// A task's duration is its slowest subtask when it has subtasks, its
    /// single time otherwise. Ties go to the first resource in pool order.
    /// Tasks mapped to the same resource share one assignment.
    pub fn assign_fastest(&mut self, problem: &Problem) -> AllocationSummary {
        self.clear();
        let mut summary = AllocationSummary::default();
        if !Self::has_resources(problem) {
            return summary;
        }

        let costs = problem.costs();
        let mut per_resource: HashMap<ResourceKey, AssignmentKey> = HashMap::new();

        for task in 0..problem.task_count() {
            let fastest = Self::feasible_entries(problem, task)
                .min_by_key(|(_, entry)| entry.duration());

            let Some((resource, entry)) = fastest else {
                warn!("No suitable resource found for task {}", task);
                summary.skipped.push(task);
                continue;
            };

            let key = match per_resource.get(&resource.key()) {
                Some(key) => *key,
                None => {
                    let key = self.create_assignment(*resource, None);
                    per_resource.insert(resource.key(), key);
                    key
                }
            };

            self.place_task(task, key);
            summary.estimated_time += entry.duration();
            summary.estimated_cost += entry.total_cost();
            summary.allocated += 1;
        }

        self.total_cost = summary.estimated_cost;
        debug!("Fastest placement over {} resources", costs.resources().len());
        info!("Assigned to fastest resources: {}", summary);
        summary
    }

    /// Place all tasks on the single resource with the lowest total cost.
    ///
    /// Resources missing an entry for any task are not candidates.
    pub fn assign_cheapest(&mut self, problem: &Problem) -> AllocationSummary {
        self.clear();
        let mut summary = AllocationSummary::default();
        if !Self::has_resources(problem) {
            return summary;
        }

        let costs = problem.costs();
        let task_count = problem.task_count();

        let cheapest = problem
            .resources()
            .iter()
            .filter_map(|resource| {
                let mut total = 0;
                for task in 0..task_count {
                    let entry = costs.entry(task, resource).filter(|e| !e.is_empty())?;
                    total += entry.total_cost();
                }
                Some((resource, total))
            })
            .min_by_key(|(_, total)| *total);

        let Some((resource, total)) = cheapest else {
            warn!("No suitable resource found for the whole task set");
            summary.skipped = (0..task_count).collect();
            return summary;
        };
        debug!("Cheapest resource {} with total cost {}", resource, total);

        let key = self.create_assignment(*resource, None);
        for task in 0..task_count {
            if let Some(entry) = costs.entry(task, resource) {
                summary.estimated_time += entry.duration();
                summary.estimated_cost += entry.total_cost();
            }
            self.place_task(task, key);
            summary.allocated += 1;
        }

        self.total_cost = summary.estimated_cost;
        info!("Assigned to {}: {}", resource, summary);
        summary
    }

    /// Place every task independently under `rule`.
    ///
    /// Tasks with subtasks (judged by their entry on the first resource)
    /// get one new assignment per subtask, each on the resource with the
    /// best value for that subtask index. Other tasks get one new
    /// assignment on their best resource. Assignments are never shared.
    pub fn distribute(&mut self, problem: &Problem, rule: Rule) -> AllocationSummary {
        self.clear();
        let mut summary = AllocationSummary::default();
        let Some(first) = problem.resources().first() else {
            error!("Invalid task graph or resource list");
            return summary;
        };

        let subtask_counts: Vec<usize> = (0..problem.task_count())
            .map(|task| problem.costs().times(task, first).len())
            .collect();

        for (task, subtask_count) in subtask_counts.into_iter().enumerate() {
            let placed = if subtask_count > 1 {
                self.distribute_subtasks(problem, task, subtask_count, rule, &mut summary)
            } else {
                self.distribute_whole(problem, task, rule, &mut summary)
            };

            if placed {
                summary.allocated += 1;
            } else {
                summary.skipped.push(task);
            }
        }

        self.total_cost = summary.estimated_cost;
        info!("Distributed by {:?}: {}", rule, summary);
        summary
    }

    fn distribute_subtasks(
        &mut self,
        problem: &Problem,
        task: TaskId,
        subtask_count: usize,
        rule: Rule,
        summary: &mut AllocationSummary,
    ) -> bool {
        let mut placed = false;

        for subtask in 0..subtask_count {
            let best = Self::feasible_entries(problem, task)
                .filter(|(_, entry)| entry.len() > subtask)
                .filter_map(|(resource, entry)| {
                    rule.subtask_metric(entry, subtask)
                        .map(|value| (resource, entry, value))
                })
                .min_by_key(|(_, _, value)| *value);

            match best {
                Some((resource, entry, _)) => {
                    let key = self.create_assignment(*resource, Some(subtask));
                    self.place_task(task, key);
                    summary.estimated_time += entry.times()[subtask];
                    summary.estimated_cost += entry.costs()[subtask];
                    placed = true;
                }
                None => warn!(
                    "No suitable resource found for task {}, subtask {}",
                    task, subtask
                ),
            }
        }

        placed
    }

    fn distribute_whole(
        &mut self,
        problem: &Problem,
        task: TaskId,
        rule: Rule,
        summary: &mut AllocationSummary,
    ) -> bool {
        let best =
            Self::feasible_entries(problem, task).min_by_key(|(_, entry)| rule.entry_metric(entry));

        match best {
            Some((resource, entry)) => {
                let key = self.create_assignment(*resource, None);
                self.place_task(task, key);
                summary.estimated_time += entry.duration();
                summary.estimated_cost += entry.total_cost();
                true
            }
            None => {
                warn!("No suitable resource found for task {}", task);
                false
            }
        }
    }

    /// Resources with a non-empty entry for `task`, in pool order
    fn feasible_entries<'a>(
        problem: &'a Problem,
        task: TaskId,
    ) -> impl Iterator<Item = (&'a Resource, &'a CostEntry)> + 'a {
        problem.resources().iter().filter_map(move |resource| {
            problem
                .costs()
                .entry(task, resource)
                .filter(|entry| !entry.is_empty())
                .map(|entry| (resource, entry))
        })
    }

    fn has_resources(problem: &Problem) -> bool {
        if problem.resources().is_empty() {
            error!("Invalid task graph or resource list");
            return false;
        }
        true
    }

    /// Drop all assignments and the task index
    pub fn clear(&mut self) {
        self.assignments.clear();
        self.task_index.clear();
        self.instance_counts.clear();
        self.total_cost = 0;
    }

    /// Create an empty assignment on `resource` with the next per-resource id
    pub fn create_assignment(&mut self, resource: Resource, subtask: Option<usize>) -> AssignmentKey {
        let counter = self.instance_counts.entry(resource.key()).or_insert(0);
        let id = *counter;
        *counter += 1;

        let assignment = match subtask {
            Some(subtask) => Assignment::for_subtask(id, resource, subtask),
            None => Assignment::new(id, resource),
        };
        let key = assignment.key();
        self.assignments.insert(key, assignment);
        key
    }

    /// Add `task` to an existing assignment and point the index at it.
    ///
    /// A task indexed under another assignment is removed from it first, and
    /// that assignment is discarded when left empty.
    pub fn add_task_to_assignment(&mut self, task: TaskId, key: AssignmentKey) -> bool {
        if !self.assignments.contains_key(&key) {
            return false;
        }
        if self.task_index.get(&task).is_some_and(|current| *current != key) {
            self.remove_task_from_assignment(task);
        }
        self.place_task(task, key)
    }

    /// Record a placement without touching earlier memberships; subtask
    /// placements put one task into several assignments
    fn place_task(&mut self, task: TaskId, key: AssignmentKey) -> bool {
        match self.assignments.get_mut(&key) {
            Some(assignment) => {
                assignment.add_task(task);
                self.task_index.insert(task, key);
                true
            }
            None => false,
        }
    }

    /// Remove `task` from the assignment it is indexed under.
    ///
    /// An assignment left without tasks is discarded.
    pub fn remove_task_from_assignment(&mut self, task: TaskId) -> Option<AssignmentKey> {
        let key = self.task_index.remove(&task)?;
        if let Some(assignment) = self.assignments.get_mut(&key) {
            assignment.remove_task(task);
            if assignment.is_empty() {
                self.assignments.remove(&key);
                debug!("Discarded empty assignment {:?}", key);
            }
        }
        Some(key)
    }

    /// Assignments sorted by resource category, resource id, then assignment id
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    pub fn assignment(&self, key: &AssignmentKey) -> Option<&Assignment> {
        self.assignments.get(key)
    }

    /// Assignment a task is currently indexed under
    pub fn assignment_for(&self, task: TaskId) -> Option<&Assignment> {
        self.task_index
            .get(&task)
            .and_then(|key| self.assignments.get(key))
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Estimated cost of the last strategy run
    pub fn total_cost(&self) -> i64 {
        self.total_cost
    }
}
