//! Shortest paths and the local electron-delocalization patterns that drive
//! resonance.
//!
//! The `find_*` functions return atom paths starting at the given atom. The
//! bonds along a path are looked up with [`Molecule::bond_between`].

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::graph::{Graph, NotFoundError};
use crate::molecule::Molecule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no path from vertex {} to vertex {}", .from.index(), .to.index())]
pub struct NoPathError {
    pub from: NodeIndex,
    pub to: NodeIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    NoPath(#[from] NoPathError),
}

/// Breadth-first shortest path, inclusive of both ends. Neighbors are
/// visited in index order, so ties resolve toward lower indices.
pub fn shortest_path<V, E>(
    graph: &Graph<V, E>,
    from: NodeIndex,
    to: NodeIndex,
) -> Result<Vec<NodeIndex>, PathError> {
    for v in [from, to] {
        if !graph.contains_vertex(v) {
            return Err(NotFoundError::Vertex(v.index()).into());
        }
    }
    if from == to {
        return Ok(vec![from]);
    }

    let mut pred: Vec<Option<NodeIndex>> = vec![None; graph.vertex_count()];
    let mut seen = vec![false; graph.vertex_count()];
    seen[from.index()] = true;
    let mut queue = VecDeque::from([from]);
    while let Some(cur) = queue.pop_front() {
        for (_, next) in graph.adjacent(cur)? {
            if seen[next.index()] {
                continue;
            }
            seen[next.index()] = true;
            pred[next.index()] = Some(cur);
            if next == to {
                let mut path = vec![to];
                let mut node = to;
                while let Some(p) = pred[node.index()] {
                    path.push(p);
                    node = p;
                }
                path.reverse();
                return Ok(path);
            }
            queue.push_back(next);
        }
    }
    Err(NoPathError { from, to }.into())
}

fn order(mol: &Molecule, a: NodeIndex, b: NodeIndex) -> Option<BondOrder> {
    mol.bond_between(a, b).map(|e| mol.bond(e).order)
}

/// `[a1, a2, a3]` where `a1` carries a radical, `a1-a2` can be raised and
/// `a2-a3` is a double or triple bond: `*a1-a2=a3 <-> a1=a2-a3*`.
pub fn find_allyl_delocalization_paths(mol: &Molecule, a1: NodeIndex) -> Vec<[NodeIndex; 3]> {
    if mol.atom(a1).radical_electrons == 0 {
        return Vec::new();
    }
    conjugated_paths(mol, a1)
}

/// `[a1, a2, a3]` where `a1` carries a lone pair, `a1-a2` can be raised and
/// `a2-a3` is a double or triple bond: `:a1-a2=a3 <-> (+)a1=a2-a3:(-)`.
pub fn find_lone_pair_multiple_bond_paths(mol: &Molecule, a1: NodeIndex) -> Vec<[NodeIndex; 3]> {
    if mol.atom(a1).lone_pairs == 0 {
        return Vec::new();
    }
    conjugated_paths(mol, a1)
}

fn conjugated_paths(mol: &Molecule, a1: NodeIndex) -> Vec<[NodeIndex; 3]> {
    let mut out = Vec::new();
    for (_, a2) in mol.graph().adjacent(a1).unwrap_or_default() {
        if order(mol, a1, a2).and_then(BondOrder::increment).is_none() {
            continue;
        }
        for (_, a3) in mol.graph().adjacent(a2).unwrap_or_default() {
            if a3 != a1 && order(mol, a2, a3).is_some_and(BondOrder::is_multiple) {
                out.push([a1, a2, a3]);
            }
        }
    }
    out
}

/// `[a1, a2]` where `a1` carries a radical and its neighbor `a2` a lone
/// pair: `*a1-a2: <-> (-):a1-a2*(+)`.
pub fn find_adjacent_lone_pair_radical_paths(mol: &Molecule, a1: NodeIndex) -> Vec<[NodeIndex; 2]> {
    if mol.atom(a1).radical_electrons == 0 {
        return Vec::new();
    }
    mol.graph()
        .adjacent(a1)
        .unwrap_or_default()
        .into_iter()
        .filter(|&(_, a2)| mol.atom(a2).lone_pairs > 0)
        .map(|(_, a2)| [a1, a2])
        .collect()
}

/// Shortest simple path from `start` to `end` whose bonds alternate
/// multiple, single, multiple, ending on a multiple bond.
pub fn find_butadiene(mol: &Molecule, start: NodeIndex, end: NodeIndex) -> Option<Vec<NodeIndex>> {
    if !mol.graph().contains_vertex(start) || !mol.graph().contains_vertex(end) || start == end {
        return None;
    }
    let mut queue: VecDeque<Vec<NodeIndex>> = VecDeque::from([vec![start]]);
    while let Some(path) = queue.pop_front() {
        let Some(&last) = path.last() else {
            continue;
        };
        let want_multiple = path.len() % 2 == 1;
        for (_, next) in mol.graph().adjacent(last).unwrap_or_default() {
            if path.contains(&next) {
                continue;
            }
            let Some(o) = order(mol, last, next) else {
                continue;
            };
            let fits = if want_multiple {
                o.is_multiple()
            } else {
                o == BondOrder::Single
            };
            if !fits {
                continue;
            }
            let mut extended = path.clone();
            extended.push(next);
            if next == end && want_multiple {
                return Some(extended);
            }
            queue.push_back(extended);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn shortest_path_around_ring() {
        let mol = testutil::benzene();
        assert_eq!(shortest_path(mol.graph(), n(0), n(2)), Ok(vec![n(0), n(1), n(2)]));
        assert_eq!(shortest_path(mol.graph(), n(0), n(3)).map(|p| p.len()), Ok(4));
        assert_eq!(shortest_path(mol.graph(), n(4), n(4)), Ok(vec![n(4)]));
    }

    #[test]
    fn disconnected_has_no_path() {
        let mut mol = testutil::ethene();
        let lone = mol.add_atom(crate::atom::Atom::new(crate::element::Element::He));
        let err = shortest_path(mol.graph(), n(0), lone).unwrap_err();
        assert_eq!(err, PathError::NoPath(NoPathError { from: n(0), to: lone }));
        assert_eq!(err.to_string(), "no path from vertex 0 to vertex 2");
    }

    #[test]
    fn missing_vertex_is_not_found() {
        let mol = testutil::ethene();
        let err = shortest_path(mol.graph(), n(0), n(7)).unwrap_err();
        assert_eq!(err, PathError::NotFound(NotFoundError::Vertex(7)));
        assert_eq!(err.to_string(), "vertex 7 not found");
        assert_eq!(
            shortest_path(mol.graph(), n(9), n(0)),
            Err(PathError::NotFound(NotFoundError::Vertex(9)))
        );
    }

    #[test]
    fn allyl_path() {
        let mol = testutil::allyl();
        assert_eq!(find_allyl_delocalization_paths(&mol, n(2)), vec![[n(2), n(1), n(0)]]);
        assert!(find_allyl_delocalization_paths(&mol, n(0)).is_empty());
    }

    #[test]
    fn vinoxy_has_allyl_path_onto_oxygen() {
        let mol = testutil::vinoxy();
        assert_eq!(find_allyl_delocalization_paths(&mol, n(0)), vec![[n(0), n(1), n(2)]]);
    }

    #[test]
    fn formamide_lone_pair_path() {
        let mol = testutil::formamide();
        assert_eq!(find_lone_pair_multiple_bond_paths(&mol, n(2)), vec![[n(2), n(1), n(0)]]);
        // the carbonyl oxygen's only bond is already double
        assert_eq!(find_lone_pair_multiple_bond_paths(&mol, n(0)), Vec::<[NodeIndex; 3]>::new());
    }

    #[test]
    fn aromatic_bonds_do_not_delocalize() {
        let mol = testutil::pyridine();
        assert!(find_lone_pair_multiple_bond_paths(&mol, n(0)).is_empty());
    }

    #[test]
    fn adjacent_lone_pair_radical() {
        let mol = testutil::vinoxy();
        assert!(find_adjacent_lone_pair_radical_paths(&mol, n(0)).is_empty());

        let hydroxymethyl = crate::Molecule::from_parts(
            [
                crate::Atom::new(crate::Element::C).with_hydrogens(2).with_radicals(1),
                crate::Atom::new(crate::Element::O).with_hydrogens(1).with_lone_pairs(2),
            ],
            &[(0, 1, BondOrder::Single)],
        )
        .unwrap();
        assert_eq!(find_adjacent_lone_pair_radical_paths(&hydroxymethyl, n(0)), vec![[n(0), n(1)]]);
    }

    #[test]
    fn butadiene_chain() {
        let mol = testutil::butadiene();
        assert_eq!(find_butadiene(&mol, n(0), n(3)), Some(vec![n(0), n(1), n(2), n(3)]));
        assert_eq!(find_butadiene(&mol, n(0), n(2)), None);
        assert_eq!(find_butadiene(&mol, n(0), n(1)), Some(vec![n(0), n(1)]));
    }

    #[test]
    fn kekule_ring_alternates() {
        let mol = testutil::benzene_kekule();
        let path = find_butadiene(&mol, n(0), n(5)).unwrap();
        assert_eq!(path, vec![n(0), n(1), n(2), n(3), n(4), n(5)]);
    }
}
