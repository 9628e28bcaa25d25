use super::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Directed, weighted dependency edge between two tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: TaskId,
    pub to: TaskId,
    pub weight: u32,
}

impl Edge {
    pub fn new(from: TaskId, to: TaskId, weight: u32) -> Self {
        Self { from, to, weight }
    }
}

/// Adjacency-list dependency graph over task identifiers.
///
/// Storage grows on demand: adding an edge guarantees that both endpoints
/// have an adjacency list. Duplicate edges are kept and self-loops are not
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with `vertices` isolated vertices
    pub fn with_vertices(vertices: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertices],
        }
    }

    /// Grow storage so that at least `vertices` vertices exist
    pub fn ensure_vertices(&mut self, vertices: usize) {
        if self.adjacency.len() < vertices {
            self.adjacency.resize_with(vertices, Vec::new);
        }
    }

    /// Append a new isolated vertex and return its id
    pub fn add_vertex(&mut self) -> TaskId {
        self.adjacency.push(Vec::new());
        self.adjacency.len() - 1
    }

    /// Add a directed edge `from -> to` with unit weight
    pub fn add_edge(&mut self, from: TaskId, to: TaskId) {
        self.add_weighted_edge(from, to, 1);
    }

    /// Add a directed edge `from -> to` with the given weight
    pub fn add_weighted_edge(&mut self, from: TaskId, to: TaskId, weight: u32) {
        self.ensure_vertices(from.max(to) + 1);
        self.adjacency[from].push(Edge::new(from, to, weight));
    }

    /// Check whether an edge `from -> to` exists
    pub fn check_edge(&self, from: TaskId, to: TaskId) -> bool {
        self.find_edge(from, to).is_some()
    }

    /// Weight of the first edge `from -> to`, or 0 when absent
    pub fn edge_weight(&self, from: TaskId, to: TaskId) -> u32 {
        self.find_edge(from, to).map_or(0, |edge| edge.weight)
    }

    fn find_edge(&self, from: TaskId, to: TaskId) -> Option<&Edge> {
        self.adjacency.get(from)?.iter().find(|edge| edge.to == to)
    }

    /// Targets of all outgoing edges of `vertex`, in insertion order
    pub fn out_neighbors(&self, vertex: TaskId) -> Vec<TaskId> {
        self.edges_from(vertex).iter().map(|edge| edge.to).collect()
    }

    /// Outgoing edges of `vertex` (empty when out of range)
    pub fn edges_from(&self, vertex: TaskId) -> &[Edge] {
        self.adjacency.get(vertex).map_or(&[], Vec::as_slice)
    }

    /// Number of vertices currently stored
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Breadth-first traversal starting at vertex 0.
    ///
    /// Vertices not reachable from 0 are not visited.
    pub fn bfs(&self) -> Vec<TaskId> {
        let mut order = Vec::new();
        if self.adjacency.is_empty() {
            return order;
        }

        let mut visited = vec![false; self.adjacency.len()];
        let mut queue = VecDeque::from([0]);
        visited[0] = true;

        while let Some(vertex) = queue.pop_front() {
            order.push(vertex);
            for edge in &self.adjacency[vertex] {
                if !visited[edge.to] {
                    visited[edge.to] = true;
                    queue.push_back(edge.to);
                }
            }
        }

        order
    }

    /// Enumerate every simple path from `start` to `end`.
    ///
    /// Uses an explicit stack of per-depth edge cursors; the visited set
    /// only holds the vertices on the current path. Exponential in the
    /// worst case, meant for small graphs.
    pub fn dfs(&self, start: TaskId, end: TaskId) -> Vec<Vec<TaskId>> {
        let mut paths = Vec::new();
        let size = self.adjacency.len();
        if start >= size || end >= size {
            return paths;
        }
        if start == end {
            paths.push(vec![start]);
            return paths;
        }

        let mut visited = vec![false; size];
        let mut path = vec![start];
        let mut cursors = vec![0usize];
        visited[start] = true;

        while let Some(&vertex) = path.last() {
            let depth = path.len() - 1;
            match self.adjacency[vertex].get(cursors[depth]) {
                Some(edge) => {
                    cursors[depth] += 1;
                    let next = edge.to;
                    if visited[next] {
                        continue;
                    }
                    if next == end {
                        let mut found = path.clone();
                        found.push(next);
                        paths.push(found);
                        continue;
                    }
                    visited[next] = true;
                    path.push(next);
                    cursors.push(0);
                }
                None => {
                    cursors.pop();
                    path.pop();
                    visited[vertex] = false;
                }
            }
        }

        paths
    }
}
