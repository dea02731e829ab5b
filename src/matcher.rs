//! VF2 graph matching over [`Graph`].
//!
//! The search extends a partial vertex mapping one pair at a time. Pattern
//! vertices are taken in ascending index order from the terminal set (the
//! unmapped neighbors of the mapped region) and paired with terminal target
//! vertices, also ascending; only when both terminal sets are empty does the
//! search open a new component. Backtracking runs on an explicit stack of
//! search frames instead of the call stack, so a [`Matches`] iterator can
//! stop after any mapping and resume later.

use std::iter::FusedIterator;

use petgraph::graph::NodeIndex;

use crate::graph::Graph;

/// `(pattern, target)` pairs sorted by pattern index.
pub type VertexMapping = Vec<(NodeIndex, NodeIndex)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Bijection preserving adjacency in both directions.
    Isomorphism,
    /// Injection where every pattern edge must exist in the target. Extra
    /// target edges between matched vertices are allowed.
    Subgraph,
}

/// A configured search. Nothing runs until [`Vf2::matches`] is polled.
pub struct Vf2<'a, V1, E1, V2, E2, FV, FE> {
    pattern: &'a Graph<V1, E1>,
    target: &'a Graph<V2, E2>,
    mode: MatchMode,
    vertex_match: FV,
    edge_match: FE,
    seeds: Vec<(NodeIndex, NodeIndex)>,
}

impl<'a, V1, E1, V2, E2, FV, FE> Vf2<'a, V1, E1, V2, E2, FV, FE>
where
    FV: Fn(&V1, &V2) -> bool,
    FE: Fn(&E1, &E2) -> bool,
{
    pub fn new(
        pattern: &'a Graph<V1, E1>,
        target: &'a Graph<V2, E2>,
        mode: MatchMode,
        vertex_match: FV,
        edge_match: FE,
    ) -> Self {
        Self {
            pattern,
            target,
            mode,
            vertex_match,
            edge_match,
            seeds: Vec::new(),
        }
    }

    /// Pairs every reported mapping must contain. An infeasible seed set
    /// yields no mappings.
    pub fn with_seeds(mut self, seeds: impl IntoIterator<Item = (NodeIndex, NodeIndex)>) -> Self {
        self.seeds.extend(seeds);
        self
    }

    pub fn matches(self) -> Matches<'a, V1, E1, V2, E2, FV, FE> {
        let adj_p = adjacency(self.pattern);
        let adj_t = adjacency(self.target);
        let state = State::new(self.pattern.vertex_count(), self.target.vertex_count());
        Matches {
            vf2: self,
            adj_p,
            adj_t,
            state,
            stack: Vec::new(),
            phase: Phase::Fresh,
        }
    }

    pub fn first(self) -> Option<VertexMapping> {
        self.matches().next()
    }

    pub fn exists(self) -> bool {
        self.first().is_some()
    }

    pub fn count(self) -> usize {
        self.matches().count()
    }
}

fn adjacency<V, E>(graph: &Graph<V, E>) -> Vec<Vec<usize>> {
    graph
        .vertices()
        .map(|v| {
            let mut ns: Vec<usize> = graph.neighbors(v).map(|n| n.index()).collect();
            ns.sort_unstable();
            ns
        })
        .collect()
}

/// Forward/inverse partial maps plus terminal-set depth stamps. A stamp of
/// zero means the vertex has not been reached; mapped vertices are always
/// stamped, so `stamped - depth` is the size of the unmapped terminal set.
struct State {
    core_p: Vec<Option<usize>>,
    core_t: Vec<Option<usize>>,
    term_p: Vec<usize>,
    term_t: Vec<usize>,
    stamped_p: usize,
    stamped_t: usize,
    depth: usize,
}

/// Vertices stamped by one extension, replayed backwards on retraction.
struct Extension {
    t: usize,
    stamped_p: Vec<usize>,
    stamped_t: Vec<usize>,
}

impl State {
    fn new(np: usize, nt: usize) -> Self {
        Self {
            core_p: vec![None; np],
            core_t: vec![None; nt],
            term_p: vec![0; np],
            term_t: vec![0; nt],
            stamped_p: 0,
            stamped_t: 0,
            depth: 0,
        }
    }

    fn extend(&mut self, adj_p: &[Vec<usize>], adj_t: &[Vec<usize>], p: usize, t: usize) -> Extension {
        self.core_p[p] = Some(t);
        self.core_t[t] = Some(p);
        self.depth += 1;
        let d = self.depth;

        let mut stamped_p = Vec::new();
        for v in std::iter::once(p).chain(adj_p[p].iter().copied()) {
            if self.term_p[v] == 0 {
                self.term_p[v] = d;
                stamped_p.push(v);
            }
        }
        let mut stamped_t = Vec::new();
        for v in std::iter::once(t).chain(adj_t[t].iter().copied()) {
            if self.term_t[v] == 0 {
                self.term_t[v] = d;
                stamped_t.push(v);
            }
        }
        self.stamped_p += stamped_p.len();
        self.stamped_t += stamped_t.len();
        Extension {
            t,
            stamped_p,
            stamped_t,
        }
    }

    fn retract(&mut self, p: usize, ext: Extension) {
        for v in ext.stamped_p.iter().rev() {
            self.term_p[*v] = 0;
        }
        for v in ext.stamped_t.iter().rev() {
            self.term_t[*v] = 0;
        }
        self.stamped_p -= ext.stamped_p.len();
        self.stamped_t -= ext.stamped_t.len();
        self.core_p[p] = None;
        self.core_t[ext.t] = None;
        self.depth -= 1;
    }
}

/// One level of the search: the pattern vertex being placed, its target
/// candidates, and the extension currently applied for it.
struct Frame {
    p: usize,
    candidates: Vec<usize>,
    next: usize,
    current: Option<Extension>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Running,
    Done,
}

/// Lazy sequence of all mappings of a [`Vf2`] search, in a deterministic
/// order fixed by vertex indices.
pub struct Matches<'a, V1, E1, V2, E2, FV, FE> {
    vf2: Vf2<'a, V1, E1, V2, E2, FV, FE>,
    adj_p: Vec<Vec<usize>>,
    adj_t: Vec<Vec<usize>>,
    state: State,
    stack: Vec<Frame>,
    phase: Phase,
}

impl<'a, V1, E1, V2, E2, FV, FE> Matches<'a, V1, E1, V2, E2, FV, FE>
where
    FV: Fn(&V1, &V2) -> bool,
    FE: Fn(&E1, &E2) -> bool,
{
    /// Rewinds to the beginning; the next call to `next` yields the first
    /// mapping again.
    pub fn restart(&mut self) {
        self.state = State::new(self.state.core_p.len(), self.state.core_t.len());
        self.stack.clear();
        self.phase = Phase::Fresh;
    }

    fn np(&self) -> usize {
        self.state.core_p.len()
    }

    fn nt(&self) -> usize {
        self.state.core_t.len()
    }

    fn prechecks(&self) -> bool {
        let (pg, tg) = (self.vf2.pattern, self.vf2.target);
        match self.vf2.mode {
            MatchMode::Isomorphism => {
                pg.vertex_count() == tg.vertex_count() && pg.edge_count() == tg.edge_count()
            }
            MatchMode::Subgraph => {
                pg.vertex_count() <= tg.vertex_count() && pg.edge_count() <= tg.edge_count()
            }
        }
    }

    fn apply_seeds(&mut self) -> bool {
        let seeds = std::mem::take(&mut self.vf2.seeds);
        let mut ok = true;
        for &(p, t) in &seeds {
            let (p, t) = (p.index(), t.index());
            if p >= self.np()
                || t >= self.nt()
                || self.state.core_p[p].is_some()
                || self.state.core_t[t].is_some()
                || !self.feasible(p, t)
            {
                ok = false;
                break;
            }
            // seeds stay applied until restart
            let _ = self.state.extend(&self.adj_p, &self.adj_t, p, t);
        }
        self.vf2.seeds = seeds;
        ok
    }

    fn feasible(&self, p: usize, t: usize) -> bool {
        let (pg, tg) = (self.vf2.pattern, self.vf2.target);
        let (pn, tn) = (NodeIndex::new(p), NodeIndex::new(t));
        if !(self.vf2.vertex_match)(pg.vertex(pn), tg.vertex(tn)) {
            return false;
        }

        let (mut term_p, mut new_p) = (0usize, 0usize);
        for &n in &self.adj_p[p] {
            match self.state.core_p[n] {
                Some(m) => {
                    let Some(te) = tg.edge_between(tn, NodeIndex::new(m)) else {
                        return false;
                    };
                    let Some(pe) = pg.edge_between(pn, NodeIndex::new(n)) else {
                        return false;
                    };
                    if !(self.vf2.edge_match)(pg.edge(pe), tg.edge(te)) {
                        return false;
                    }
                }
                None if self.state.term_p[n] > 0 => term_p += 1,
                None => new_p += 1,
            }
        }

        let iso = self.vf2.mode == MatchMode::Isomorphism;
        let (mut term_t, mut new_t) = (0usize, 0usize);
        for &n in &self.adj_t[t] {
            match self.state.core_t[n] {
                Some(m) => {
                    if iso && pg.edge_between(pn, NodeIndex::new(m)).is_none() {
                        return false;
                    }
                }
                None if self.state.term_t[n] > 0 => term_t += 1,
                None => new_t += 1,
            }
        }

        if iso {
            term_p == term_t && new_p == new_t
        } else {
            term_p <= term_t && term_p + new_p <= term_t + new_t
        }
    }

    fn next_frame(&self) -> Frame {
        let s = &self.state;
        let tp = s.stamped_p - s.depth;
        let tt = s.stamped_t - s.depth;
        let from_terminal = tp > 0;

        let p = (0..self.np())
            .find(|&v| s.core_p[v].is_none() && (!from_terminal || s.term_p[v] > 0));
        let Some(p) = p else {
            return Frame {
                p: 0,
                candidates: Vec::new(),
                next: 0,
                current: None,
            };
        };

        let unmapped = |t: &usize| s.core_t[*t].is_none();
        let candidates: Vec<usize> = match (tp > 0, tt > 0) {
            (true, true) if self.vf2.mode == MatchMode::Isomorphism && tp != tt => Vec::new(),
            (true, true) => (0..self.nt())
                .filter(unmapped)
                .filter(|&t| s.term_t[t] > 0)
                .collect(),
            (false, false) => (0..self.nt()).filter(unmapped).collect(),
            (false, true) if self.vf2.mode == MatchMode::Subgraph => {
                (0..self.nt()).filter(unmapped).collect()
            }
            _ => Vec::new(),
        };
        Frame {
            p,
            candidates,
            next: 0,
            current: None,
        }
    }

    fn mapping(&self) -> VertexMapping {
        self.state
            .core_p
            .iter()
            .enumerate()
            .filter_map(|(p, t)| t.map(|t| (NodeIndex::new(p), NodeIndex::new(t))))
            .collect()
    }
}

impl<'a, V1, E1, V2, E2, FV, FE> Iterator for Matches<'a, V1, E1, V2, E2, FV, FE>
where
    FV: Fn(&V1, &V2) -> bool,
    FE: Fn(&E1, &E2) -> bool,
{
    type Item = VertexMapping;

    fn next(&mut self) -> Option<VertexMapping> {
        match self.phase {
            Phase::Done => return None,
            Phase::Fresh => {
                if !self.prechecks() || !self.apply_seeds() {
                    self.phase = Phase::Done;
                    return None;
                }
                if self.state.depth == self.np() {
                    self.phase = Phase::Done;
                    return Some(self.mapping());
                }
                self.phase = Phase::Running;
                let frame = self.next_frame();
                self.stack.push(frame);
            }
            Phase::Running => {}
        }

        while let Some(mut frame) = self.stack.pop() {
            if let Some(ext) = frame.current.take() {
                self.state.retract(frame.p, ext);
            }

            let mut found = None;
            while frame.next < frame.candidates.len() {
                let t = frame.candidates[frame.next];
                frame.next += 1;
                if self.feasible(frame.p, t) {
                    found = Some(t);
                    break;
                }
            }
            let Some(t) = found else {
                continue;
            };

            let ext = self.state.extend(&self.adj_p, &self.adj_t, frame.p, t);
            frame.current = Some(ext);
            self.stack.push(frame);
            if self.state.depth == self.np() {
                return Some(self.mapping());
            }
            let child = self.next_frame();
            self.stack.push(child);
        }

        self.phase = Phase::Done;
        None
    }
}

impl<'a, V1, E1, V2, E2, FV, FE> FusedIterator for Matches<'a, V1, E1, V2, E2, FV, FE>
where
    FV: Fn(&V1, &V2) -> bool,
    FE: Fn(&E1, &E2) -> bool,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn build(labels: &[u8], edges: &[(usize, usize)]) -> Graph<u8, u8> {
        let mut g = Graph::new();
        for &l in labels {
            g.add_vertex(l);
        }
        for &(a, b) in edges {
            g.add_edge(n(a), n(b), 1).unwrap();
        }
        g
    }

    fn cycle(len: usize) -> Graph<u8, u8> {
        let edges: Vec<_> = (0..len).map(|i| (i, (i + 1) % len)).collect();
        build(&vec![0; len], &edges)
    }

    fn eq(a: &u8, b: &u8) -> bool {
        a == b
    }

    fn automorphisms(g: &Graph<u8, u8>) -> usize {
        Vf2::new(g, g, MatchMode::Isomorphism, eq, eq).count()
    }

    #[test]
    fn automorphism_counts() {
        assert_eq!(automorphisms(&build(&[0, 0, 0], &[(0, 1), (1, 2)])), 2);
        assert_eq!(automorphisms(&cycle(6)), 12);
        let k4 = build(&[0; 4], &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(automorphisms(&k4), 24);
        let star = build(&[1, 0, 0, 0, 0], &[(0, 1), (0, 2), (0, 3), (0, 4)]);
        assert_eq!(automorphisms(&star), 24);
    }

    #[test]
    fn labels_break_symmetry() {
        let g = build(&[1, 0, 0], &[(0, 1), (1, 2)]);
        assert_eq!(automorphisms(&g), 1);
    }

    #[test]
    fn isomorphism_of_relabeled_graphs() {
        let a = build(&[6, 8, 6], &[(0, 1), (1, 2)]);
        let b = build(&[8, 6, 6], &[(1, 0), (0, 2)]);
        let m = Vf2::new(&a, &b, MatchMode::Isomorphism, eq, eq)
            .first()
            .unwrap();
        assert_eq!(m[1], (n(1), n(0)));
        assert_eq!(m.len(), 3);

        let c = build(&[6, 6, 8], &[(0, 1), (1, 2)]);
        assert!(!Vf2::new(&a, &c, MatchMode::Isomorphism, eq, eq).exists());
    }

    #[test]
    fn disconnected_graphs() {
        let a = build(&[0, 0, 1, 1], &[(0, 1), (2, 3)]);
        let b = build(&[1, 0, 1, 0], &[(0, 2), (1, 3)]);
        assert_eq!(Vf2::new(&a, &b, MatchMode::Isomorphism, eq, eq).count(), 4);
    }

    #[test]
    fn edge_predicate_is_respected() {
        let mut a = build(&[0, 0, 0], &[]);
        a.add_edge(n(0), n(1), 2).unwrap();
        a.add_edge(n(1), n(2), 1).unwrap();
        let mut b = build(&[0, 0, 0], &[]);
        b.add_edge(n(0), n(1), 1).unwrap();
        b.add_edge(n(1), n(2), 2).unwrap();
        let m = Vf2::new(&a, &b, MatchMode::Isomorphism, eq, eq)
            .first()
            .unwrap();
        assert_eq!(m, vec![(n(0), n(2)), (n(1), n(1)), (n(2), n(0))]);
        assert_eq!(Vf2::new(&a, &b, MatchMode::Isomorphism, eq, |_: &u8, _: &u8| true).count(), 2);
    }

    #[test]
    fn subgraph_matches_in_cycle() {
        let p3 = build(&[0; 3], &[(0, 1), (1, 2)]);
        let c4 = cycle(4);
        assert_eq!(Vf2::new(&p3, &c4, MatchMode::Subgraph, eq, eq).count(), 8);

        let triangle = cycle(3);
        assert!(!Vf2::new(&triangle, &c4, MatchMode::Subgraph, eq, eq).exists());
    }

    #[test]
    fn subgraph_allows_extra_target_edges() {
        let p3 = build(&[0; 3], &[(0, 1), (1, 2)]);
        let triangle = cycle(3);
        assert_eq!(Vf2::new(&p3, &triangle, MatchMode::Subgraph, eq, eq).count(), 6);
    }

    #[test]
    fn subgraph_with_disconnected_pattern() {
        let two = build(&[0, 0], &[]);
        let p3 = build(&[0; 3], &[(0, 1), (1, 2)]);
        assert_eq!(Vf2::new(&two, &p3, MatchMode::Subgraph, eq, eq).count(), 6);
    }

    #[test]
    fn seeds_restrict_results() {
        let c6 = cycle(6);
        let with_seed = Vf2::new(&c6, &c6, MatchMode::Isomorphism, eq, eq)
            .with_seeds([(n(0), n(0))])
            .count();
        assert_eq!(with_seed, 2);
        let two_seeds = Vf2::new(&c6, &c6, MatchMode::Isomorphism, eq, eq)
            .with_seeds([(n(0), n(0)), (n(1), n(5))])
            .count();
        assert_eq!(two_seeds, 1);
        let bad = Vf2::new(&c6, &c6, MatchMode::Isomorphism, eq, eq)
            .with_seeds([(n(0), n(0)), (n(1), n(3))])
            .count();
        assert_eq!(bad, 0);
    }

    #[test]
    fn empty_pattern_has_one_mapping() {
        let empty: Graph<u8, u8> = Graph::new();
        let c4 = cycle(4);
        let all: Vec<_> = Vf2::new(&empty, &c4, MatchMode::Subgraph, eq, eq)
            .matches()
            .collect();
        assert_eq!(all, vec![Vec::new()]);
        assert_eq!(Vf2::new(&empty, &empty, MatchMode::Isomorphism, eq, eq).count(), 1);
    }

    #[test]
    fn matches_are_lazy_and_restartable() {
        let c6 = cycle(6);
        let mut it = Vf2::new(&c6, &c6, MatchMode::Isomorphism, eq, eq).matches();
        let first = it.next().unwrap();
        let second = it.next().unwrap();
        assert_ne!(first, second);
        assert_eq!(first, (0..6).map(|i| (n(i), n(i))).collect::<Vec<_>>());
        it.restart();
        assert_eq!(it.next(), Some(first));
        assert_eq!(it.by_ref().count(), 11);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn mappings_are_distinct() {
        let c6 = cycle(6);
        let mut all: Vec<_> = Vf2::new(&c6, &c6, MatchMode::Isomorphism, eq, eq)
            .matches()
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
