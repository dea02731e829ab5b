//! Ring perception.
//!
//! The smallest set of smallest rings is assembled from the shortest cycle
//! through each edge, smallest first, keeping a cycle only when its edge set
//! is independent (over GF(2)) of the cycles already kept. When those
//! per-edge cycles do not span the whole cycle space, Horton candidates
//! (a shortest path pair from every vertex to the ends of every edge) fill
//! in. Like every SSSR heuristic the result is not unique for some bridged
//! systems.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::unionfind::UnionFind;

use crate::graph::Graph;
use crate::molecule::Molecule;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn sssr<V, E>(graph: &Graph<V, E>) -> Self {
        let num_expected = Self::expected_ring_count(graph);
        if num_expected == 0 {
            return Self::default();
        }

        let num_edges = graph.edge_count();
        let mut candidates = edge_cycles(graph);
        let mut rings = select_independent_rings(&candidates, num_expected, num_edges, graph);

        if rings.len() < num_expected {
            candidates.extend(horton_candidates(graph));
            sort_rings(&mut candidates);
            rings = select_independent_rings(&candidates, num_expected, num_edges, graph);
        }

        Self { rings }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    /// Rings sorted by size, each starting at its lowest vertex.
    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn into_rings(self) -> Vec<Vec<NodeIndex>> {
        self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring_has_bond(ring, a, b))
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .map(|ring| ring.len())
            .min()
    }

    pub fn atom_rings(&self, atom: NodeIndex) -> Vec<&Vec<NodeIndex>> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .collect()
    }

    /// Groups of ring indices fused through at least one shared bond.
    /// Spiro rings, which share only an atom, stay separate.
    pub fn ring_systems(&self) -> Vec<Vec<usize>> {
        let n = self.rings.len();
        let mut uf = UnionFind::<usize>::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                if shares_bond(&self.rings[i], &self.rings[j]) {
                    uf.union(i, j);
                }
            }
        }
        let mut systems: Vec<Vec<usize>> = Vec::new();
        let mut slot_of_root = vec![usize::MAX; n];
        for i in 0..n {
            let root = uf.find(i);
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = systems.len();
                systems.push(Vec::new());
            }
            systems[slot_of_root[root]].push(i);
        }
        systems
    }

    /// Cyclomatic number `E - V + C`: the size of any cycle basis.
    pub fn expected_ring_count<V, E>(graph: &Graph<V, E>) -> usize {
        graph.cyclomatic_number()
    }
}

/// SSSR of a molecule's graph.
pub fn smallest_set_of_smallest_rings(mol: &Molecule) -> Vec<Vec<NodeIndex>> {
    RingInfo::sssr(mol.graph()).into_rings()
}

fn ring_has_bond(ring: &[NodeIndex], a: NodeIndex, b: NodeIndex) -> bool {
    let len = ring.len();
    (0..len).any(|i| {
        let j = (i + 1) % len;
        (ring[i] == a && ring[j] == b) || (ring[i] == b && ring[j] == a)
    })
}

fn shares_bond(r1: &[NodeIndex], r2: &[NodeIndex]) -> bool {
    let len = r1.len();
    (0..len).any(|i| ring_has_bond(r2, r1[i], r1[(i + 1) % len]))
}

/// Shortest cycle through each edge: a BFS between its endpoints that is
/// not allowed to use the edge itself.
fn edge_cycles<V, E>(graph: &Graph<V, E>) -> Vec<Vec<NodeIndex>> {
    let mut out = Vec::new();
    for e in graph.edges() {
        if let Some(ring) = shortest_cycle_through(graph, e) {
            out.push(normalize_ring(&ring));
        }
    }
    sort_rings(&mut out);
    out
}

fn shortest_cycle_through<V, E>(graph: &Graph<V, E>, skip: EdgeIndex) -> Option<Vec<NodeIndex>> {
    let (a, b) = graph.edge_endpoints(skip)?;
    let n = graph.vertex_count();
    let mut pred: Vec<Option<NodeIndex>> = vec![None; n];
    let mut seen = vec![false; n];
    seen[a.index()] = true;
    let mut queue = VecDeque::from([a]);
    while let Some(cur) = queue.pop_front() {
        for (e, next) in graph.adjacent(cur).ok()? {
            if e == skip || seen[next.index()] {
                continue;
            }
            seen[next.index()] = true;
            pred[next.index()] = Some(cur);
            if next == b {
                let mut path = vec![b];
                let mut node = b;
                while let Some(p) = pred[node.index()] {
                    path.push(p);
                    node = p;
                }
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

fn horton_candidates<V, E>(graph: &Graph<V, E>) -> Vec<Vec<NodeIndex>> {
    let n = graph.vertex_count();
    let pred: Vec<Vec<Option<NodeIndex>>> = (0..n)
        .map(|src| bfs_predecessors(graph, NodeIndex::new(src)))
        .collect();

    let mut candidates: Vec<Vec<NodeIndex>> = Vec::new();
    for e in graph.edges() {
        let Some((u, v)) = graph.edge_endpoints(e) else {
            continue;
        };
        for w in graph.vertices() {
            let path_u = reconstruct_path(&pred[w.index()], w, u);
            let path_v = reconstruct_path(&pred[w.index()], w, v);
            if path_u.is_empty() || path_v.is_empty() {
                continue;
            }
            if path_u.len() + path_v.len() < 4 || paths_share_internal_node(&path_u, &path_v) {
                continue;
            }
            let mut ring = path_u;
            ring.extend(path_v[1..].iter().rev());
            candidates.push(normalize_ring(&ring));
        }
    }
    sort_rings(&mut candidates);
    candidates
}

fn bfs_predecessors<V, E>(graph: &Graph<V, E>, src: NodeIndex) -> Vec<Option<NodeIndex>> {
    let n = graph.vertex_count();
    let mut pred = vec![None; n];
    let mut seen = vec![false; n];
    seen[src.index()] = true;
    let mut queue = VecDeque::from([src]);
    while let Some(cur) = queue.pop_front() {
        for (_, next) in graph.adjacent(cur).unwrap_or_default() {
            if !seen[next.index()] {
                seen[next.index()] = true;
                pred[next.index()] = Some(cur);
                queue.push_back(next);
            }
        }
    }
    pred
}

fn reconstruct_path(pred: &[Option<NodeIndex>], src: NodeIndex, dst: NodeIndex) -> Vec<NodeIndex> {
    let mut path = vec![dst];
    let mut cur = dst;
    while cur != src {
        match pred[cur.index()] {
            Some(p) => {
                path.push(p);
                cur = p;
            }
            None => return vec![],
        }
    }
    path.reverse();
    path
}

fn paths_share_internal_node(path_u: &[NodeIndex], path_v: &[NodeIndex]) -> bool {
    path_u[1..].iter().any(|node| path_v[1..].contains(node))
}

fn sort_rings(rings: &mut Vec<Vec<NodeIndex>>) {
    rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    rings.dedup();
}

fn ring_to_edge_bitvector<V, E>(ring: &[NodeIndex], num_edges: usize, graph: &Graph<V, E>) -> Vec<u64> {
    let mut bv = vec![0u64; num_edges.div_ceil(64)];
    let len = ring.len();
    for i in 0..len {
        if let Some(edge) = graph.edge_between(ring[i], ring[(i + 1) % len]) {
            let idx = edge.index();
            bv[idx / 64] |= 1u64 << (idx % 64);
        }
    }
    bv
}

fn select_independent_rings<V, E>(
    candidates: &[Vec<NodeIndex>],
    num_needed: usize,
    num_edges: usize,
    graph: &Graph<V, E>,
) -> Vec<Vec<NodeIndex>> {
    let mut result = Vec::with_capacity(num_needed);
    let mut basis: Vec<Vec<u64>> = Vec::with_capacity(num_needed);

    for ring in candidates {
        if result.len() >= num_needed {
            break;
        }
        let bv = ring_to_edge_bitvector(ring, num_edges, graph);
        if bv.iter().all(|&w| w == 0) {
            continue;
        }
        if try_add_to_basis(&mut basis, bv) {
            result.push(ring.clone());
        }
    }

    sort_rings(&mut result);
    result
}

/// Gaussian elimination step: reduces `candidate` by the basis and keeps it
/// if anything is left. Basis rows are kept with distinct pivots.
fn try_add_to_basis(basis: &mut Vec<Vec<u64>>, candidate: Vec<u64>) -> bool {
    let mut v = candidate;
    for row in basis.iter() {
        if let Some(p) = leading_bit(row) {
            if v[p / 64] & (1u64 << (p % 64)) != 0 {
                xor_into(&mut v, row);
            }
        }
    }
    if v.iter().all(|&w| w == 0) {
        return false;
    }
    if let Some(p) = leading_bit(&v) {
        for row in basis.iter_mut() {
            if row[p / 64] & (1u64 << (p % 64)) != 0 {
                xor_into(row, &v);
            }
        }
    }
    basis.push(v);
    true
}

fn leading_bit(bv: &[u64]) -> Option<usize> {
    bv.iter()
        .enumerate()
        .find(|(_, &word)| word != 0)
        .map(|(i, &word)| i * 64 + word.trailing_zeros() as usize)
}

fn xor_into(a: &mut [u64], b: &[u64]) {
    for (aw, bw) in a.iter_mut().zip(b.iter()) {
        *aw ^= *bw;
    }
}

/// Rotates the ring to start at its lowest vertex, walking toward the
/// lower of that vertex's two ring neighbors.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let Some(min_pos) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| idx)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };

    let len = ring.len();
    let mut normalized: Vec<NodeIndex> = (0..len).map(|i| ring[(min_pos + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}
