//! Core data model for the route picker.
//!
//! The graph is a fixed undirected grid: vertices and edges are declared
//! once at startup and never added or removed afterwards. The only mutable
//! bit is each edge's `removed` flag, which the selection machine toggles
//! while the user marks obstacles.

use crate::error::GraphError;
use crate::id::VertexId;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

// ─── Vertices & edges ────────────────────────────────────────────────────

/// A labelled point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Unordered pair of vertex ids.
///
/// Keeps the declaration orientation for display and wire labels, but
/// `(a, b)` and `(b, a)` compare equal.
#[derive(Debug, Clone, Copy)]
pub struct EdgeKey {
    a: VertexId,
    b: VertexId,
}

impl EdgeKey {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        Self { a, b }
    }

    pub fn a(&self) -> VertexId {
        self.a
    }

    pub fn b(&self) -> VertexId {
        self.b
    }

    /// True if this edge joins `x` and `y` in either direction.
    pub fn joins(&self, x: VertexId, y: VertexId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// Wire label, e.g. `"v1-v6"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.a, self.b)
    }

    /// Parse a wire label. Returns `None` unless it is exactly two
    /// non-empty labels separated by one `-`.
    pub fn parse(label: &str) -> Option<Self> {
        let (a, b) = label.split_once('-')?;
        if a.is_empty() || b.is_empty() || b.contains('-') {
            return None;
        }
        Some(Self::new(VertexId::intern(a), VertexId::intern(b)))
    }
}

impl PartialEq for EdgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.joins(other.a, other.b)
    }
}

impl Eq for EdgeKey {}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// An undirected edge with its cached midpoint (the removal marker).
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub key: EdgeKey,
    pub midpoint: (f64, f64),
    pub removed: bool,
}

/// Static wall rectangle drawn behind the graph. Decor only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

// ─── Graph model ─────────────────────────────────────────────────────────

/// The fixed grid graph.
///
/// Backed by a `petgraph` undirected graph; node and edge indices follow
/// declaration order, so iteration order is the declared order.
#[derive(Debug, Clone)]
pub struct GraphModel {
    graph: UnGraph<Vertex, Edge>,
    id_index: HashMap<VertexId, NodeIndex>,
    walls: Vec<Wall>,
}

impl GraphModel {
    /// Build a graph from vertex `(label, x, y)` and edge `(a, b)`
    /// declarations. Every edge endpoint must be a declared vertex.
    pub fn build(
        vertices: &[(&str, f64, f64)],
        edges: &[(&str, &str)],
        walls: Vec<Wall>,
    ) -> Result<Self, GraphError> {
        let mut graph = UnGraph::with_capacity(vertices.len(), edges.len());
        let mut id_index = HashMap::with_capacity(vertices.len());

        for &(label, x, y) in vertices {
            let id = VertexId::intern(label);
            if id_index.contains_key(&id) {
                return Err(GraphError::DuplicateVertex(label.to_string()));
            }
            let idx = graph.add_node(Vertex { id, x, y });
            id_index.insert(id, idx);
        }

        for &(a, b) in edges {
            let edge_label = format!("{a}-{b}");
            let lookup = |label: &str| {
                VertexId::lookup(label)
                    .and_then(|id| id_index.get(&id).copied())
                    .ok_or_else(|| GraphError::UnknownVertex {
                        edge: edge_label.clone(),
                        label: label.to_string(),
                    })
            };
            let ia = lookup(a)?;
            let ib = lookup(b)?;
            if ia == ib {
                return Err(GraphError::SelfLoop(edge_label));
            }
            if graph.find_edge(ia, ib).is_some() {
                return Err(GraphError::DuplicateEdge(edge_label));
            }
            let (va, vb) = (graph[ia], graph[ib]);
            graph.add_edge(
                ia,
                ib,
                Edge {
                    key: EdgeKey::new(va.id, vb.id),
                    midpoint: ((va.x + vb.x) / 2.0, (va.y + vb.y) / 2.0),
                    removed: false,
                },
            );
        }

        log::debug!(
            "graph built: {} vertices, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            graph,
            id_index,
            walls,
        })
    }

    /// Vertices in declaration order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.node_weights()
    }

    /// Edges in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn vertex_by_label(&self, label: &str) -> Option<&Vertex> {
        VertexId::lookup(label).and_then(|id| self.vertex(id))
    }

    /// Unordered edge lookup.
    pub fn edge(&self, a: VertexId, b: VertexId) -> Option<&Edge> {
        self.edge_index(a, b).map(|idx| &self.graph[idx])
    }

    pub fn edge_by_label_pair(&self, a: &str, b: &str) -> Option<&Edge> {
        let a = VertexId::lookup(a)?;
        let b = VertexId::lookup(b)?;
        self.edge(a, b)
    }

    fn edge_index(&self, a: VertexId, b: VertexId) -> Option<EdgeIndex> {
        let ia = *self.id_index.get(&a)?;
        let ib = *self.id_index.get(&b)?;
        self.graph.find_edge(ia, ib)
    }

    /// Flip an edge's `removed` flag. Returns the new value, or `None` if
    /// the edge does not exist.
    pub fn toggle_removed(&mut self, key: EdgeKey) -> Option<bool> {
        let idx = self.edge_index(key.a(), key.b())?;
        let edge = &mut self.graph[idx];
        edge.removed = !edge.removed;
        Some(edge.removed)
    }

    /// Restore every edge to `removed = false`.
    pub fn clear_removed(&mut self) {
        for edge in self.graph.edge_weights_mut() {
            edge.removed = false;
        }
    }

    /// Keys of removed edges, in declaration order.
    pub fn removed_edges(&self) -> Vec<EdgeKey> {
        self.edges()
            .filter(|e| e.removed)
            .map(|e| e.key)
            .collect()
    }
}

// ─── Selection stage ─────────────────────────────────────────────────────

/// Which step of the pick → submit → disambiguate cycle the user is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionStage {
    ChoosingStart,
    ChoosingGoal,
    ChoosingRemovedEdges,
    AwaitingRoutes,
    DisambiguatingCandidates,
    Confirmed,
}

impl SelectionStage {
    /// Short machine-friendly name (used across the WASM boundary).
    pub fn name(&self) -> &'static str {
        match self {
            SelectionStage::ChoosingStart => "choosingStart",
            SelectionStage::ChoosingGoal => "choosingGoal",
            SelectionStage::ChoosingRemovedEdges => "choosingRemovedEdges",
            SelectionStage::AwaitingRoutes => "awaitingRoutes",
            SelectionStage::DisambiguatingCandidates => "disambiguatingCandidates",
            SelectionStage::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for SelectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectionStage::ChoosingStart => "choosing the start vertex",
            SelectionStage::ChoosingGoal => "choosing the goal vertex",
            SelectionStage::ChoosingRemovedEdges => "choosing edges to remove",
            SelectionStage::AwaitingRoutes => "waiting for routes",
            SelectionStage::DisambiguatingCandidates => "choosing between candidate routes",
            SelectionStage::Confirmed => "route confirmed",
        })
    }
}

// ─── Routes & queries ────────────────────────────────────────────────────

/// An ordered vertex sequence returned by the route service.
///
/// The service guarantees at least two labels and that consecutive pairs
/// are non-removed edges; the client does not re-check the latter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateRoute(SmallVec<[VertexId; 8]>);

impl CandidateRoute {
    pub fn new(labels: impl IntoIterator<Item = VertexId>) -> Self {
        Self(labels.into_iter().collect())
    }

    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        Self::new(labels.iter().map(|s| VertexId::intern(s.as_ref())))
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<VertexId> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<VertexId> {
        self.0.last().copied()
    }

    /// Consecutive `(from, to)` pairs.
    pub fn segments(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|id| id.as_str()).collect()
    }
}

impl fmt::Display for CandidateRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join(" → "))
    }
}

/// The immutable (start, goal, removed edges) triple sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub start: VertexId,
    pub goal: VertexId,
    pub removed_edges: Vec<EdgeKey>,
}
