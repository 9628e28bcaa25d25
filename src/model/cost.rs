use super::{Resource, ResourceKey, TaskId};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static ROW_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\[\]]*\]|-?\d+").expect("row token pattern is valid"));

/// Errors raised while building or overlaying cost matrices
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("Invalid matrix token '{token}'")]
    InvalidToken { token: String },

    #[error("Row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Matrix has {found} rows, expected {expected}")]
    RowCount { expected: usize, found: usize },

    #[error("Task {task} column {column}: {times} times but {costs} costs")]
    SubtaskLength {
        task: TaskId,
        column: usize,
        times: usize,
        costs: usize,
    },

    #[error("Invalid range for {what}: {min}..={max}")]
    InvalidRange { what: &'static str, min: i64, max: i64 },
}

/// Execution profile of one task on one resource.
///
/// A single value describes an atomic task; `k > 1` values describe `k`
/// subtasks running in parallel on the same resource. `times` and `costs`
/// always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEntry {
    times: Vec<i64>,
    costs: Vec<i64>,
}

impl CostEntry {
    /// Atomic task with one duration and one cost
    pub fn atomic(time: i64, cost: i64) -> Self {
        Self {
            times: vec![time],
            costs: vec![cost],
        }
    }

    /// Entry from parallel subtask vectors, which must have equal length
    pub fn from_parts(times: Vec<i64>, costs: Vec<i64>) -> Option<Self> {
        (times.len() == costs.len()).then_some(Self { times, costs })
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    pub fn costs(&self) -> &[i64] {
        &self.costs
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn has_subtasks(&self) -> bool {
        self.times.len() > 1
    }

    /// Overall duration: the slowest subtask, or the single time
    pub fn duration(&self) -> i64 {
        if self.has_subtasks() {
            self.times.iter().copied().max().unwrap_or(0)
        } else {
            self.times.first().copied().unwrap_or(0)
        }
    }

    /// Overall cost: the sum of subtask costs, or the single cost
    pub fn total_cost(&self) -> i64 {
        if self.has_subtasks() {
            self.costs.iter().sum()
        } else {
            self.costs.first().copied().unwrap_or(0)
        }
    }
}

/// Parameters for pseudo-random matrix generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomCostParams {
    /// Chance (in percent) that a task decomposes into subtasks
    pub subtask_probability: u32,
    pub min_subtasks: usize,
    pub max_subtasks: usize,
    pub min_value: i64,
    pub max_value: i64,
}

impl Default for RandomCostParams {
    fn default() -> Self {
        Self {
            subtask_probability: 50,
            min_subtasks: 2,
            max_subtasks: 4,
            min_value: 1,
            max_value: 100,
        }
    }
}

impl RandomCostParams {
    fn validate(&self) -> Result<(), MatrixError> {
        if self.min_subtasks == 0 || self.min_subtasks > self.max_subtasks {
            return Err(MatrixError::InvalidRange {
                what: "subtask count",
                min: self.min_subtasks as i64,
                max: self.max_subtasks as i64,
            });
        }
        if self.min_value < 0 || self.min_value > self.max_value {
            return Err(MatrixError::InvalidRange {
                what: "value",
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }
}

/// Dense per-task, per-resource table of [`CostEntry`] values.
///
/// Rows are tasks, columns follow the order resources were loaded in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CostMatrixData")]
pub struct CostMatrix {
    rows: Vec<Vec<CostEntry>>,
    resources: Vec<Resource>,
    #[serde(skip)]
    columns: HashMap<ResourceKey, usize>,
}

/// Serialized form of [`CostMatrix`]; the column index is rebuilt on load
#[derive(Deserialize)]
struct CostMatrixData {
    rows: Vec<Vec<CostEntry>>,
    resources: Vec<Resource>,
}

impl From<CostMatrixData> for CostMatrix {
    fn from(data: CostMatrixData) -> Self {
        Self {
            columns: column_index(&data.resources),
            rows: data.rows,
            resources: data.resources,
        }
    }
}

fn column_index(resources: &[Resource]) -> HashMap<ResourceKey, usize> {
    resources
        .iter()
        .enumerate()
        .map(|(column, resource)| (resource.key(), column))
        .collect()
}

impl CostMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matrix with `tasks` empty rows and no resources
    pub fn with_tasks(tasks: usize) -> Self {
        Self {
            rows: vec![Vec::new(); tasks],
            ..Self::default()
        }
    }

    /// Replace the resource pool and reset every row to one empty entry per resource
    pub fn load_resources(&mut self, resources: &[Resource]) {
        self.resources = resources.to_vec();
        self.columns = column_index(resources);
        for row in &mut self.rows {
            *row = vec![CostEntry::default(); resources.len()];
        }
    }

    /// Fill every entry with pseudo-random values.
    ///
    /// Whether a task has subtasks, and how many, is drawn once per task and
    /// shared by all resources; the values themselves are drawn independently
    /// for every resource.
    pub fn generate_random<R: Rng>(
        &mut self,
        params: &RandomCostParams,
        rng: &mut R,
    ) -> Result<(), MatrixError> {
        params.validate()?;
        let columns = self.resources.len();

        for row in &mut self.rows {
            let has_subtasks = rng.random_range(0..100) < params.subtask_probability;
            let count = if has_subtasks {
                rng.random_range(params.min_subtasks..=params.max_subtasks)
            } else {
                1
            };

            *row = (0..columns)
                .map(|_| {
                    let times = (0..count)
                        .map(|_| rng.random_range(params.min_value..=params.max_value))
                        .collect();
                    let costs = (0..count)
                        .map(|_| rng.random_range(params.min_value..=params.max_value))
                        .collect();
                    CostEntry { times, costs }
                })
                .collect();
        }

        debug!(
            "Generated random costs for {} tasks on {} resources",
            self.rows.len(),
            columns
        );
        Ok(())
    }

    /// Replace the matrix with parsed time tokens; costs are zeroed.
    ///
    /// Every row must carry one token per loaded resource. Nothing is
    /// changed when any row is rejected.
    pub fn set_times_matrix(&mut self, rows: &[Vec<String>]) -> Result<(), MatrixError> {
        let mut parsed = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            if !self.resources.is_empty() && row.len() != self.resources.len() {
                return Err(MatrixError::ColumnCount {
                    row: row_index,
                    expected: self.resources.len(),
                    found: row.len(),
                });
            }
            let entries = row
                .iter()
                .map(|token| {
                    let times = parse_token(token)?;
                    let costs = vec![0; times.len()];
                    Ok(CostEntry { times, costs })
                })
                .collect::<Result<Vec<_>, MatrixError>>()?;
            parsed.push(entries);
        }

        self.rows = parsed;
        Ok(())
    }

    /// Overlay parsed cost tokens onto the entries set by [`Self::set_times_matrix`]
    pub fn set_costs_matrix(&mut self, rows: &[Vec<String>]) -> Result<(), MatrixError> {
        if rows.len() != self.rows.len() {
            return Err(MatrixError::RowCount {
                expected: self.rows.len(),
                found: rows.len(),
            });
        }

        let mut parsed = Vec::with_capacity(rows.len());
        for (task, (row, existing)) in rows.iter().zip(&self.rows).enumerate() {
            if row.len() != existing.len() {
                return Err(MatrixError::ColumnCount {
                    row: task,
                    expected: existing.len(),
                    found: row.len(),
                });
            }
            let mut costs_row = Vec::with_capacity(row.len());
            for (column, (token, entry)) in row.iter().zip(existing).enumerate() {
                let costs = parse_token(token)?;
                if costs.len() != entry.times.len() {
                    return Err(MatrixError::SubtaskLength {
                        task,
                        column,
                        times: entry.times.len(),
                        costs: costs.len(),
                    });
                }
                costs_row.push(costs);
            }
            parsed.push(costs_row);
        }

        for (row, costs_row) in self.rows.iter_mut().zip(parsed) {
            for (entry, costs) in row.iter_mut().zip(costs_row) {
                entry.costs = costs;
            }
        }
        Ok(())
    }

    /// Entry of `task` on `resource`, if both are known
    pub fn entry(&self, task: TaskId, resource: &Resource) -> Option<&CostEntry> {
        let column = *self.columns.get(&resource.key())?;
        self.rows.get(task)?.get(column)
    }

    /// Times of `task` on `resource`; empty when out of range
    pub fn times(&self, task: TaskId, resource: &Resource) -> &[i64] {
        self.entry(task, resource).map_or(&[], CostEntry::times)
    }

    /// Costs of `task` on `resource`; empty when out of range
    pub fn costs(&self, task: TaskId, resource: &Resource) -> &[i64] {
        self.entry(task, resource).map_or(&[], CostEntry::costs)
    }

    /// Entries of one task, in resource order
    pub fn row(&self, task: TaskId) -> &[CostEntry] {
        self.rows.get(task).map_or(&[], Vec::as_slice)
    }

    /// Append a task row; it must have one entry per loaded resource
    pub fn push_task(&mut self, row: Vec<CostEntry>) -> Result<TaskId, MatrixError> {
        if row.len() != self.resources.len() {
            return Err(MatrixError::ColumnCount {
                row: self.rows.len(),
                expected: self.resources.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn task_count(&self) -> usize {
        self.rows.len()
    }

    /// Write the `@times` and `@cost` sections
    pub fn show<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "@times")?;
        self.write_section(out, CostEntry::times)?;
        writeln!(out, "@cost")?;
        self.write_section(out, CostEntry::costs)
    }

    fn write_section<W: fmt::Write>(
        &self,
        out: &mut W,
        values: fn(&CostEntry) -> &[i64],
    ) -> fmt::Result {
        for row in &self.rows {
            for entry in row {
                match values(entry) {
                    [] => write!(out, "0 ")?,
                    [single] => write!(out, "{} ", single)?,
                    many => {
                        let joined: Vec<String> = many.iter().map(i64::to_string).collect();
                        write!(out, "[{}] ", joined.join(" "))?;
                    }
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl fmt::Display for CostMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.show(f)
    }
}

/// Split a matrix row into tokens: bracketed subtask lists or bare integers
pub fn tokenize_row(line: &str) -> Result<Vec<String>, MatrixError> {
    if !line.contains('[') {
        return Ok(line.split_whitespace().map(str::to_string).collect());
    }

    let tokens: Vec<String> = ROW_TOKEN
        .find_iter(line)
        .map(|m| m.as_str().to_string())
        .collect();
    let leftover = ROW_TOKEN.replace_all(line, "");
    if let Some(garbage) = leftover.split_whitespace().next() {
        return Err(MatrixError::InvalidToken {
            token: garbage.to_string(),
        });
    }
    Ok(tokens)
}

/// Parse one token: `[a b c]` gives a subtask vector, `n` a single value
pub fn parse_token(token: &str) -> Result<Vec<i64>, MatrixError> {
    let token = token.trim();
    let invalid = || MatrixError::InvalidToken {
        token: token.to_string(),
    };

    let values = match token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => inner
            .split_whitespace()
            .map(|value| value.parse::<i64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?,
        None => vec![token.parse::<i64>().map_err(|_| invalid())?],
    };

    if values.is_empty() {
        return Err(invalid());
    }
    Ok(values)
}
