//! Text file format.
//!
//! ```text
//! @tasks 3
//! T0 2 1(4) 2(1)
//! T1 0
//! T2 0
//! @proc 2
//! 3 1 0
//! 2 2 0
//! @times
//! 5 [2 7]
//! ...
//! @cost
//! ...
//! ```
//!
//! `@tasks` may also appear without edge lines, as a plain task count, and
//! `@proc` lines may omit the category (`<cost> <id>`) to declare workers.
//! `@comm` is accepted and ignored.

use super::Problem;
use crate::model::{
    CostMatrix, Graph, MatrixError, Resource, ResourceCategory, ResourceKey, TaskId, parse_token,
    tokenize_row,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

pub const TASKS_HEADER: &str = "@tasks";
pub const PROC_HEADER: &str = "@proc";
pub const TIMES_HEADER: &str = "@times";
pub const COST_HEADER: &str = "@cost";
pub const COMM_HEADER: &str = "@comm";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error in line {line}: \"{text}\": {reason}")]
    Parse {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("Inconsistent dimensions: {reason}")]
    Dimension { reason: String },

    #[error("Duplicate resource {resource} in line {line}")]
    DuplicateResource { line: usize, resource: String },

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Section {
    Tasks,
    Proc,
    Times,
    Cost,
    Comm,
}

/// A line of the file kept for error reporting
#[derive(Debug, Clone)]
struct SourceLine {
    line: usize,
    text: String,
}

/// One `@times` or `@cost` row
#[derive(Debug)]
struct MatrixRow {
    source: SourceLine,
    tokens: Vec<String>,
}

/// Accumulates sections; nothing is exposed until [`ProblemParser::finish`]
#[derive(Debug, Default)]
struct ProblemParser {
    section: Option<Section>,
    task_count: Option<usize>,
    resource_count: Option<usize>,
    graph: Graph,
    resources: Vec<Resource>,
    seen_resources: HashSet<ResourceKey>,
    headers: HashMap<Section, SourceLine>,
    times_rows: Vec<MatrixRow>,
    cost_rows: Vec<MatrixRow>,
}

impl ProblemParser {
    fn parse(mut self, content: &str) -> Result<Problem, LoadError> {
        for (index, raw) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            self.parse_line(line, line_number)
                .map_err(|reason| match reason {
                    LineError::Invalid(reason) => LoadError::Parse {
                        line: line_number,
                        text: line.to_string(),
                        reason,
                    },
                    LineError::Duplicate(resource) => LoadError::DuplicateResource {
                        line: line_number,
                        resource,
                    },
                })?;
        }

        self.finish()
    }

    fn parse_line(&mut self, line: &str, line_number: usize) -> Result<(), LineError> {
        if line.starts_with('@') {
            return self.parse_header(line, line_number);
        }

        match self.section {
            None => Err(LineError::Invalid(
                "line outside of any section".to_string(),
            )),
            Some(Section::Tasks) => self.parse_task_line(line),
            Some(Section::Proc) => self.parse_proc_line(line),
            Some(Section::Times) => {
                self.times_rows.push(matrix_row(line, line_number)?);
                Ok(())
            }
            Some(Section::Cost) => {
                self.cost_rows.push(matrix_row(line, line_number)?);
                Ok(())
            }
            Some(Section::Comm) => {
                debug!("Ignoring @comm line {}", line_number);
                Ok(())
            }
        }
    }

    fn parse_header(&mut self, line: &str, line_number: usize) -> Result<(), LineError> {
        let mut tokens = line.split_whitespace();
        let header = tokens.next().unwrap_or_default();
        let mut count = || -> Result<usize, LineError> {
            let value = tokens
                .next()
                .ok_or_else(|| LineError::Invalid(format!("missing count after {}", header)))?;
            value
                .parse()
                .map_err(|_| LineError::Invalid(format!("invalid count '{}'", value)))
        };

        let section = match header {
            TASKS_HEADER => {
                let tasks = count()?;
                self.task_count = Some(tasks);
                self.graph = Graph::with_vertices(tasks);
                Section::Tasks
            }
            PROC_HEADER => {
                self.resource_count = Some(count()?);
                Section::Proc
            }
            TIMES_HEADER => Section::Times,
            COST_HEADER => Section::Cost,
            COMM_HEADER => Section::Comm,
            other => {
                return Err(LineError::Invalid(format!("unknown section '{}'", other)));
            }
        };

        self.section = Some(section);
        self.headers.insert(
            section,
            SourceLine {
                line: line_number,
                text: line.to_string(),
            },
        );
        Ok(())
    }

    /// `T<i> <k> <j1>(<w1>) ... <jk>(<wk>)`
    fn parse_task_line(&mut self, line: &str) -> Result<(), LineError> {
        let task_count = self.task_count.unwrap_or_default();
        let mut tokens = line.split_whitespace();

        let head = tokens.next().unwrap_or_default();
        let task: TaskId = head
            .strip_prefix('T')
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| LineError::Invalid(format!("expected 'T<id>', found '{}'", head)))?;
        if task >= task_count {
            return Err(LineError::Invalid(format!(
                "task T{} out of range (declared {} tasks)",
                task, task_count
            )));
        }

        let declared: usize = tokens
            .next()
            .ok_or_else(|| LineError::Invalid("missing edge count".to_string()))?
            .parse()
            .map_err(|_| LineError::Invalid("invalid edge count".to_string()))?;

        let mut edges = Vec::with_capacity(declared);
        for token in tokens {
            let (to, weight) = token
                .strip_suffix(')')
                .and_then(|edge| edge.split_once('('))
                .ok_or_else(|| LineError::Invalid(format!("invalid edge format: {}", token)))?;
            let to: TaskId = to
                .parse()
                .map_err(|_| LineError::Invalid(format!("invalid edge target: {}", token)))?;
            let weight: u32 = weight
                .parse()
                .map_err(|_| LineError::Invalid(format!("invalid edge weight: {}", token)))?;
            if to >= task_count {
                return Err(LineError::Invalid(format!(
                    "edge target {} out of range (declared {} tasks)",
                    to, task_count
                )));
            }
            edges.push((to, weight.max(1)));
        }

        if edges.len() != declared {
            return Err(LineError::Invalid(format!(
                "declared {} edges but found {}",
                declared,
                edges.len()
            )));
        }

        for (to, weight) in edges {
            self.graph.add_weighted_edge(task, to, weight);
        }
        Ok(())
    }

    /// `<cost> <type> <id>` or `<cost> <id>`
    fn parse_proc_line(&mut self, line: &str) -> Result<(), LineError> {
        let values = line
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<u32>()
                    .map_err(|_| LineError::Invalid(format!("invalid number '{}'", token)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let resource = match values.as_slice() {
            [cost, code, id] => {
                let category = u8::try_from(*code)
                    .ok()
                    .and_then(ResourceCategory::from_code)
                    .ok_or_else(|| {
                        LineError::Invalid(format!("unknown resource type {}", code))
                    })?;
                Resource::new(*cost, category, *id)
            }
            [cost, id] => Resource::worker(*cost, *id),
            _ => {
                return Err(LineError::Invalid(
                    "expected '<cost> <type> <id>' or '<cost> <id>'".to_string(),
                ));
            }
        };

        if !self.seen_resources.insert(resource.key()) {
            return Err(LineError::Duplicate(resource.to_string()));
        }
        self.resources.push(resource);
        Ok(())
    }

    fn finish(mut self) -> Result<Problem, LoadError> {
        let task_count = self.task_count.unwrap_or(self.times_rows.len());

        match self.resource_count {
            Some(count) if self.resources.is_empty() => {
                self.resources = (0..count as u32).map(|id| Resource::worker(0, id)).collect();
            }
            Some(count) if self.resources.len() != count => {
                return Err(self.section_error(
                    &[Section::Proc],
                    format!(
                        "@proc declares {} resources but lists {}",
                        count,
                        self.resources.len()
                    ),
                ));
            }
            _ => {}
        }

        if self.times_rows.len() != self.cost_rows.len() {
            return Err(self.section_error(
                &[Section::Cost, Section::Times],
                format!(
                    "@times has {} rows but @cost has {}",
                    self.times_rows.len(),
                    self.cost_rows.len()
                ),
            ));
        }
        if self.times_rows.len() != task_count {
            return Err(self.section_error(
                &[Section::Times, Section::Tasks],
                format!(
                    "@times has {} rows but {} tasks are declared",
                    self.times_rows.len(),
                    task_count
                ),
            ));
        }
        if task_count > 0 && self.resources.is_empty() {
            return Err(LoadError::Dimension {
                reason: "no resources declared".to_string(),
            });
        }

        let mut costs = CostMatrix::new();
        costs.load_resources(&self.resources);
        costs
            .set_times_matrix(&tokens_of(&self.times_rows))
            .map_err(|error| row_error(error, &self.times_rows))?;
        costs
            .set_costs_matrix(&tokens_of(&self.cost_rows))
            .map_err(|error| row_error(error, &self.cost_rows))?;

        self.graph.ensure_vertices(task_count);
        Ok(Problem::from_parts(self.graph, costs))
    }

    /// Report a section-wide error at the first of `sections` present in the file
    fn section_error(&self, sections: &[Section], reason: String) -> LoadError {
        match sections.iter().find_map(|section| self.headers.get(section)) {
            Some(header) => LoadError::Parse {
                line: header.line,
                text: header.text.clone(),
                reason,
            },
            None => LoadError::Dimension { reason },
        }
    }
}

fn tokens_of(rows: &[MatrixRow]) -> Vec<Vec<String>> {
    rows.iter().map(|row| row.tokens.clone()).collect()
}

/// Attach the offending row's line to a matrix error
fn row_error(error: MatrixError, rows: &[MatrixRow]) -> LoadError {
    let row = match &error {
        MatrixError::ColumnCount { row, .. } => Some(*row),
        MatrixError::SubtaskLength { task, .. } => Some(*task),
        _ => None,
    };

    match row.and_then(|row| rows.get(row)) {
        Some(row) => LoadError::Parse {
            line: row.source.line,
            text: row.source.text.clone(),
            reason: error.to_string(),
        },
        None => LoadError::Matrix(error),
    }
}

#[derive(Debug)]
enum LineError {
    Invalid(String),
    Duplicate(String),
}

fn invalid(error: MatrixError) -> LineError {
    LineError::Invalid(error.to_string())
}

/// Tokenize a matrix row and check every token parses
fn matrix_row(line: &str, line_number: usize) -> Result<MatrixRow, LineError> {
    let tokens = tokenize_row(line).map_err(invalid)?;
    for token in &tokens {
        parse_token(token).map_err(invalid)?;
    }
    Ok(MatrixRow {
        source: SourceLine {
            line: line_number,
            text: line.to_string(),
        },
        tokens,
    })
}

impl Problem {
    /// Parse a problem from text; fails without side effects
    pub fn parse(content: &str) -> Result<Self, LoadError> {
        ProblemParser::default().parse(content)
    }

    /// Load a problem file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let problem = Self::parse(&content)?;
        info!(
            "Loaded {:?}: {} tasks, {} resources",
            path,
            problem.task_count(),
            problem.resources().len()
        );
        Ok(problem)
    }

    /// Write the problem in the text format
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string())?;
        info!("Saved problem to {:?}", path);
        Ok(())
    }
}

impl FromStr for Problem {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Emit `@tasks`, `@proc`, `@times` and `@cost`
pub fn write_problem<W: fmt::Write>(problem: &Problem, out: &mut W) -> fmt::Result {
    let graph = problem.graph();
    writeln!(out, "{} {}", TASKS_HEADER, problem.task_count())?;
    for task in 0..problem.task_count() {
        let edges = graph.edges_from(task);
        write!(out, "T{} {}", task, edges.len())?;
        for edge in edges {
            write!(out, " {}({})", edge.to, edge.weight)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{} {}", PROC_HEADER, problem.resources().len())?;
    for resource in problem.resources() {
        match resource.category() {
            Some(category) => writeln!(
                out,
                "{} {} {}",
                resource.base_cost(),
                category.code(),
                resource.id()
            )?,
            None => writeln!(out, "{} {}", resource.base_cost(), resource.id())?,
        }
    }

    problem.costs().show(out)
}
