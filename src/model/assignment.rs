use super::{Resource, ResourceCategory, TaskId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Ordering key of an assignment: resource category, resource id, assignment id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub category: Option<ResourceCategory>,
    pub resource_id: u32,
    pub id: u32,
}

/// A group of tasks bound to one instance of a resource.
///
/// Assignment ids are scoped per resource: the first instance of a
/// resource is 0, the next 1, and so on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    id: u32,
    resource: Resource,
    tasks: BTreeSet<TaskId>,
    /// Subtask index carried by this instance when a task's subtasks were
    /// placed one by one
    subtask: Option<usize>,
}

impl Assignment {
    pub fn new(id: u32, resource: Resource) -> Self {
        Self {
            id,
            resource,
            tasks: BTreeSet::new(),
            subtask: None,
        }
    }

    /// Instance created for a single subtask placement
    pub fn for_subtask(id: u32, resource: Resource, subtask: usize) -> Self {
        Self {
            subtask: Some(subtask),
            ..Self::new(id, resource)
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn subtask(&self) -> Option<usize> {
        self.subtask
    }

    pub fn key(&self) -> AssignmentKey {
        AssignmentKey {
            category: self.resource.category(),
            resource_id: self.resource.id(),
            id: self.id,
        }
    }

    /// Add a task; returns false when it was already a member
    pub fn add_task(&mut self, task: TaskId) -> bool {
        self.tasks.insert(task)
    }

    /// Remove a task; returns false when it was not a member
    pub fn remove_task(&mut self, task: TaskId) -> bool {
        self.tasks.remove(&task)
    }

    pub fn contains(&self, task: TaskId) -> bool {
        self.tasks.contains(&task)
    }

    pub fn tasks(&self) -> &BTreeSet<TaskId> {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Assignment {}

impl PartialOrd for Assignment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Assignment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.id)
    }
}
