use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::graph::Graph;
use crate::molecule::Molecule;

/// Turns every implicit hydrogen into an explicit `H` vertex.
///
/// Heavy atoms keep their indices; new hydrogens are appended in parent
/// order.
pub fn expand_hydrogens(mol: &Molecule) -> Molecule {
    let src = mol.graph();
    let extra: usize = src
        .vertices()
        .map(|v| src.vertex(v).implicit_hydrogens as usize)
        .sum();
    let mut graph = Graph::with_capacity(src.vertex_count() + extra, src.edge_count() + extra);

    for v in src.vertices() {
        graph.add_vertex(Atom {
            implicit_hydrogens: 0,
            ..*src.vertex(v)
        });
    }
    for e in src.edges() {
        if let Some((a, b)) = src.edge_endpoints(e) {
            graph.add_edge_unchecked(a, b, *src.edge(e));
        }
    }
    for v in src.vertices() {
        for _ in 0..src.vertex(v).implicit_hydrogens {
            let h = graph.add_vertex(Atom::new(Element::H));
            graph.add_edge_unchecked(v, h, Bond::new(BondOrder::Single));
        }
    }
    Molecule::from_graph(graph)
}

/// Folds explicit hydrogens back into their parents' implicit counts.
///
/// Only plain terminal hydrogens are folded: no isotope, charge, radical or
/// lone pair, and one single bond. When both ends of an H-H bond qualify,
/// the higher index folds into the lower, so H2 becomes one `H` with one
/// implicit hydrogen.
pub fn merge_hydrogens(mol: &Molecule) -> Molecule {
    let src = mol.graph();
    let n = src.vertex_count();
    let mut removable = vec![false; n];
    let mut extra_h = vec![0u8; n];

    for v in src.vertices() {
        if let Some(parent) = mergeable_parent(src, v) {
            removable[v.index()] = true;
            extra_h[parent.index()] += 1;
        }
    }

    let mut graph = Graph::new();
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; n];
    for v in src.vertices() {
        if removable[v.index()] {
            continue;
        }
        let atom = src.vertex(v);
        index_map[v.index()] = Some(graph.add_vertex(Atom {
            implicit_hydrogens: atom.implicit_hydrogens + extra_h[v.index()],
            ..*atom
        }));
    }
    for e in src.edges() {
        let Some((a, b)) = src.edge_endpoints(e) else {
            continue;
        };
        if let (Some(na), Some(nb)) = (index_map[a.index()], index_map[b.index()]) {
            graph.add_edge_unchecked(na, nb, *src.edge(e));
        }
    }
    Molecule::from_graph(graph)
}

fn mergeable_parent(graph: &Graph<Atom, Bond>, v: NodeIndex) -> Option<NodeIndex> {
    let parent = terminal_hydrogen_parent(graph, v)?;
    if graph.vertex(parent).is_hydrogen()
        && parent.index() > v.index()
        && terminal_hydrogen_parent(graph, parent).is_some()
    {
        return None;
    }
    Some(parent)
}

fn terminal_hydrogen_parent(graph: &Graph<Atom, Bond>, v: NodeIndex) -> Option<NodeIndex> {
    let atom = graph.vertex(v);
    if !atom.is_hydrogen()
        || atom.isotope != 0
        || atom.charge != 0
        || atom.radical_electrons != 0
        || atom.lone_pairs != 0
        || atom.implicit_hydrogens != 0
    {
        return None;
    }
    let mut edges = graph.incident_edges(v);
    let e = edges.next()?;
    if edges.next().is_some() || graph.edge(e).order != BondOrder::Single {
        return None;
    }
    graph.other_end(e, v)
}

/// Implicit plus explicit hydrogen atoms.
pub fn total_hydrogens(mol: &Molecule) -> usize {
    mol.atoms()
        .map(|v| {
            let a = mol.atom(v);
            a.implicit_hydrogens as usize + usize::from(a.is_hydrogen())
        })
        .sum()
}
