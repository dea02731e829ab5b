//! Undirected typed graph with no chemistry attached.
//!
//! [`Graph`] wraps a petgraph [`UnGraph`] arena. Vertices and edges are
//! addressed by [`NodeIndex`] and [`EdgeIndex`]; removal follows petgraph's
//! swap-remove rule, so the last vertex (or edge) takes over the removed
//! index. Parallel edges and self-loops are rejected at insertion.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("vertex {0} not found")]
    Vertex(usize),
    #[error("edge {0} not found")]
    Edge(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("self-loop on vertex {0}")]
    SelfLoop(usize),
    #[error("vertices {0} and {1} are already joined")]
    DuplicateEdge(usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenumberError {
    #[error("new order length {got} != vertex count {expected}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("new order is not a valid permutation")]
    InvalidPermutation,
}

#[derive(Debug, Clone)]
pub struct Graph<V, E> {
    inner: UnGraph<V, E>,
}

impl<V, E> Graph<V, E> {
    pub fn new() -> Self {
        Self {
            inner: UnGraph::default(),
        }
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            inner: UnGraph::with_capacity(vertices, edges),
        }
    }

    pub fn inner(&self) -> &UnGraph<V, E> {
        &self.inner
    }

    pub fn vertex_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    pub fn vertices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner.node_indices()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.inner.edge_indices()
    }

    pub fn contains_vertex(&self, v: NodeIndex) -> bool {
        v.index() < self.inner.node_count()
    }

    pub fn contains_edge(&self, e: EdgeIndex) -> bool {
        e.index() < self.inner.edge_count()
    }

    fn check_vertex(&self, v: NodeIndex) -> Result<(), NotFoundError> {
        if self.contains_vertex(v) {
            Ok(())
        } else {
            Err(NotFoundError::Vertex(v.index()))
        }
    }

    pub fn add_vertex(&mut self, value: V) -> NodeIndex {
        self.inner.add_node(value)
    }

    /// Removes `v` and its edges. The previously last vertex is renumbered
    /// to `v`.
    pub fn remove_vertex(&mut self, v: NodeIndex) -> Result<V, NotFoundError> {
        self.inner
            .remove_node(v)
            .ok_or(NotFoundError::Vertex(v.index()))
    }

    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex, value: E) -> Result<EdgeIndex, GraphError> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        if a == b {
            return Err(GraphError::SelfLoop(a.index()));
        }
        if self.inner.find_edge(a, b).is_some() {
            return Err(GraphError::DuplicateEdge(a.index(), b.index()));
        }
        Ok(self.inner.add_edge(a, b, value))
    }

    /// Insertion without the endpoint, self-loop and duplicate checks, for
    /// copying a topology that already passed them.
    pub(crate) fn add_edge_unchecked(&mut self, a: NodeIndex, b: NodeIndex, value: E) -> EdgeIndex {
        self.inner.add_edge(a, b, value)
    }

    pub fn remove_edge(&mut self, e: EdgeIndex) -> Result<E, NotFoundError> {
        self.inner
            .remove_edge(e)
            .ok_or(NotFoundError::Edge(e.index()))
    }

    /// Panics if `v` is out of range; see [`Graph::try_vertex`].
    pub fn vertex(&self, v: NodeIndex) -> &V {
        &self.inner[v]
    }

    pub fn vertex_mut(&mut self, v: NodeIndex) -> &mut V {
        &mut self.inner[v]
    }

    pub fn try_vertex(&self, v: NodeIndex) -> Result<&V, NotFoundError> {
        self.inner
            .node_weight(v)
            .ok_or(NotFoundError::Vertex(v.index()))
    }

    pub fn try_vertex_mut(&mut self, v: NodeIndex) -> Result<&mut V, NotFoundError> {
        self.inner
            .node_weight_mut(v)
            .ok_or(NotFoundError::Vertex(v.index()))
    }

    pub fn edge(&self, e: EdgeIndex) -> &E {
        &self.inner[e]
    }

    pub fn edge_mut(&mut self, e: EdgeIndex) -> &mut E {
        &mut self.inner[e]
    }

    pub fn try_edge(&self, e: EdgeIndex) -> Result<&E, NotFoundError> {
        self.inner
            .edge_weight(e)
            .ok_or(NotFoundError::Edge(e.index()))
    }

    pub fn try_edge_mut(&mut self, e: EdgeIndex) -> Result<&mut E, NotFoundError> {
        self.inner
            .edge_weight_mut(e)
            .ok_or(NotFoundError::Edge(e.index()))
    }

    /// Neighbors in petgraph's internal order. Use [`Graph::adjacent`] when
    /// a stable order matters.
    pub fn neighbors(&self, v: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner.neighbors(v)
    }

    pub fn incident_edges(&self, v: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.inner.edges(v).map(|e| e.id())
    }

    /// `(edge, neighbor)` pairs of `v`, sorted by neighbor index.
    pub fn adjacent(&self, v: NodeIndex) -> Result<Vec<(EdgeIndex, NodeIndex)>, NotFoundError> {
        self.check_vertex(v)?;
        let mut out: Vec<(EdgeIndex, NodeIndex)> = self
            .inner
            .edges(v)
            .map(|e| {
                let other = if e.source() == v { e.target() } else { e.source() };
                (e.id(), other)
            })
            .collect();
        out.sort_by_key(|&(_, n)| n);
        Ok(out)
    }

    pub fn degree(&self, v: NodeIndex) -> Result<usize, NotFoundError> {
        self.check_vertex(v)?;
        Ok(self.inner.edges(v).count())
    }

    pub fn edge_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.inner.find_edge(a, b)
    }

    pub fn edge_endpoints(&self, e: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.inner.edge_endpoints(e)
    }

    /// The endpoint of `e` that is not `v`, or `None` if `v` is not on `e`.
    pub fn other_end(&self, e: EdgeIndex, v: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.inner.edge_endpoints(e)?;
        if a == v {
            Some(b)
        } else if b == v {
            Some(a)
        } else {
            None
        }
    }

    /// Hop counts from `from`; `None` for unreachable vertices.
    pub fn bfs_distances(&self, from: NodeIndex) -> Result<Vec<Option<usize>>, NotFoundError> {
        self.check_vertex(from)?;
        Ok(self.bfs_avoiding(from, None))
    }

    fn bfs_avoiding(&self, from: NodeIndex, skip: Option<EdgeIndex>) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.vertex_count()];
        dist[from.index()] = Some(0);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            let d = dist[current.index()].unwrap_or(0);
            for e in self.inner.edges(current) {
                if Some(e.id()) == skip {
                    continue;
                }
                let next = if e.source() == current { e.target() } else { e.source() };
                if dist[next.index()].is_none() {
                    dist[next.index()] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// Components as sorted vertex lists, ordered by their smallest vertex.
    pub fn connected_components(&self) -> Vec<Vec<NodeIndex>> {
        let n = self.vertex_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();
        for start in self.vertices() {
            if visited[start.index()] {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![start];
            visited[start.index()] = true;
            while let Some(current) = stack.pop() {
                component.push(current);
                for next in self.inner.neighbors(current) {
                    if !visited[next.index()] {
                        visited[next.index()] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort();
            components.push(component);
        }
        components
    }

    pub fn is_connected(&self) -> bool {
        self.connected_components().len() <= 1
    }

    /// Rank of the cycle space: `E - V + C`.
    pub fn cyclomatic_number(&self) -> usize {
        let components = self.connected_components().len();
        (self.edge_count() + components).saturating_sub(self.vertex_count())
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclomatic_number() > 0
    }

    /// An edge lies on a cycle when its endpoints stay connected without it.
    pub fn is_edge_in_cycle(&self, e: EdgeIndex) -> Result<bool, NotFoundError> {
        let (a, b) = self
            .inner
            .edge_endpoints(e)
            .ok_or(NotFoundError::Edge(e.index()))?;
        Ok(self.bfs_avoiding(a, Some(e))[b.index()].is_some())
    }

    pub fn is_vertex_in_cycle(&self, v: NodeIndex) -> Result<bool, NotFoundError> {
        self.check_vertex(v)?;
        for e in self.incident_edges(v) {
            if self.is_edge_in_cycle(e)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Same topology and indices with transformed payloads.
    pub fn map<V2, E2>(
        &self,
        mut vertex_map: impl FnMut(NodeIndex, &V) -> V2,
        mut edge_map: impl FnMut(EdgeIndex, &E) -> E2,
    ) -> Graph<V2, E2> {
        Graph {
            inner: self
                .inner
                .map(|i, v| vertex_map(i, v), |i, e| edge_map(i, e)),
        }
    }
}

impl<V: Clone, E: Clone> Graph<V, E> {
    /// Builds a copy where vertex `new_order[i]` of `self` becomes vertex
    /// `i`. Edges are re-added in order of their new endpoint pairs.
    pub fn renumber(&self, new_order: &[usize]) -> Result<Graph<V, E>, RenumberError> {
        let n = self.vertex_count();
        validate_permutation(new_order, n)?;

        let mut old_to_new = vec![0usize; n];
        for (new_idx, &old_idx) in new_order.iter().enumerate() {
            old_to_new[old_idx] = new_idx;
        }

        let mut out = Graph::with_capacity(n, self.edge_count());
        for &old_idx in new_order {
            out.inner.add_node(self.inner[NodeIndex::new(old_idx)].clone());
        }

        let mut edges: Vec<(usize, usize, EdgeIndex)> = self
            .inner
            .edge_references()
            .map(|e| {
                let a = old_to_new[e.source().index()];
                let b = old_to_new[e.target().index()];
                (a.min(b), a.max(b), e.id())
            })
            .collect();
        edges.sort_unstable();
        for (a, b, e) in edges {
            out.inner
                .add_edge(NodeIndex::new(a), NodeIndex::new(b), self.inner[e].clone());
        }
        Ok(out)
    }
}

impl<V, E> Default for Graph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_permutation(new_order: &[usize], n: usize) -> Result<(), RenumberError> {
    if new_order.len() != n {
        return Err(RenumberError::LengthMismatch {
            expected: n,
            got: new_order.len(),
        });
    }
    let mut seen = vec![false; n];
    for &idx in new_order {
        if idx >= n || seen[idx] {
            return Err(RenumberError::InvalidPermutation);
        }
        seen[idx] = true;
    }
    Ok(())
}
