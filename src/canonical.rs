//! Canonical vertex ordering.
//!
//! Atoms are first partitioned by an invariant key, then the partition is
//! refined by neighbor ranks until it stops splitting. Refinement never
//! reorders existing cells: a vertex's rank is the position of the first
//! vertex of its cell, and splitting a cell only hands out positions inside
//! its old range. Remaining ties are broken by individualizing each member
//! of the first non-singleton cell in turn (depth first, ascending index),
//! skipping members that an automorphism fixing the path so far maps onto
//! an already explored sibling. Every discrete partition reached is a leaf;
//! the leaf with the smallest code wins and the first one found is kept on
//! ties.
//!
//! Because the individualized vertex takes the start of its cell,
//! canonicalizing an already canonically numbered molecule explores the
//! identity labeling first, which makes the ranking a fixed point.

use std::hash::{Hash, Hasher};

use petgraph::graph::NodeIndex;
use tracing::{debug, warn};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::graph::{Graph, RenumberError};
use crate::matcher::{MatchMode, Vf2};
use crate::molecule::Molecule;
use crate::substruct::{self, Comparability};

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanonicalOptions {
    /// Leaves of the individualization search visited before giving up.
    /// A truncated search yields an inexact form.
    pub max_leaves: usize,
}

impl Default for CanonicalOptions {
    fn default() -> Self {
        Self { max_leaves: 4096 }
    }
}

/// Result of canonicalization.
///
/// `ranks[v]` is the canonical position of atom `v`; `order` is the inverse
/// (the atom at each position). Two molecules with the same `string` are
/// isomorphic. When `exact` holds the converse is also true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalForm {
    ranks: Vec<usize>,
    order: Vec<NodeIndex>,
    string: String,
    exact: bool,
}

impl CanonicalForm {
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    pub fn order(&self) -> &[NodeIndex] {
        &self.order
    }

    pub fn string(&self) -> &str {
        &self.string
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// FNV-1a digest of the canonical string, stable across runs and
    /// platforms.
    pub fn digest(&self) -> u64 {
        let mut h = Fnv1aHasher::new();
        self.string.hash(&mut h);
        h.finish()
    }
}

impl std::fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.string)
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
struct AtomKey {
    label: AtomLabel,
    degree: usize,
    bond_counts: [u8; 4],
}

/// Atom attributes written into the canonical string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct AtomLabel {
    atomic_num: u8,
    charge: i8,
    radicals: u8,
    lone_pairs: u8,
    isotope: u16,
    hydrogens: u8,
}

impl AtomLabel {
    fn of(atom: &Atom) -> Self {
        Self {
            atomic_num: atom.element.atomic_num(),
            charge: atom.charge,
            radicals: atom.radical_electrons,
            lone_pairs: atom.lone_pairs,
            isotope: atom.isotope,
            hydrogens: atom.implicit_hydrogens,
        }
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LeafCode {
    atoms: Vec<AtomLabel>,
    edges: Vec<(usize, usize, u8)>,
}

fn bond_code(bond: &Bond) -> u8 {
    bond.order.ordinal()
}

/// `(neighbor, bond code)` lists, ascending by neighbor.
fn neighbor_table(graph: &Graph<Atom, Bond>) -> Vec<Vec<(usize, u8)>> {
    graph
        .vertices()
        .map(|v| {
            let mut out: Vec<(usize, u8)> = graph
                .incident_edges(v)
                .filter_map(|e| {
                    let other = graph.other_end(e, v)?;
                    Some((other.index(), bond_code(graph.edge(e))))
                })
                .collect();
            out.sort_unstable();
            out
        })
        .collect()
}

fn atom_key(graph: &Graph<Atom, Bond>, nbrs: &[(usize, u8)], v: NodeIndex) -> AtomKey {
    let mut bond_counts = [0u8; 4];
    for &(_, code) in nbrs {
        let slot = match code {
            c if c == BondOrder::Single.ordinal() => 0,
            c if c == BondOrder::Double.ordinal() => 1,
            c if c == BondOrder::Triple.ordinal() => 2,
            _ => 3,
        };
        bond_counts[slot] += 1;
    }
    AtomKey {
        label: AtomLabel::of(graph.vertex(v)),
        degree: nbrs.len(),
        bond_counts,
    }
}

/// Rank of each item is the sorted position of the first item with an
/// equal key.
fn ranks_from_keys<K: Ord>(keys: &[K]) -> Vec<usize> {
    let n = keys.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0usize; n];
    for i in 1..n {
        ranks[indices[i]] = if keys[indices[i]] == keys[indices[i - 1]] {
            ranks[indices[i - 1]]
        } else {
            i
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn refine(nbrs: &[Vec<(usize, u8)>], ranks: &mut Vec<usize>) {
    let mut distinct = count_distinct(ranks);
    loop {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = nbrs
            .iter()
            .enumerate()
            .map(|(i, list)| {
                let mut sig: Vec<(usize, u8)> =
                    list.iter().map(|&(nb, code)| (ranks[nb], code)).collect();
                sig.sort_unstable();
                (ranks[i], sig)
            })
            .collect();
        let next = ranks_from_keys(&keys);
        let d = count_distinct(&next);
        if d == distinct {
            return;
        }
        *ranks = next;
        distinct = d;
    }
}

/// Splits `v` off the front of its cell.
fn individualize(ranks: &[usize], v: usize) -> Vec<usize> {
    let r = ranks[v];
    let keys: Vec<(usize, bool)> = ranks
        .iter()
        .enumerate()
        .map(|(u, &ru)| (ru, ru == r && u != v))
        .collect();
    ranks_from_keys(&keys)
}

/// Members of the lowest-ranked cell with more than one vertex.
fn target_cell(ranks: &[usize]) -> Option<Vec<usize>> {
    let n = ranks.len();
    let mut sizes = vec![0usize; n];
    for &r in ranks {
        sizes[r] += 1;
    }
    let r = (0..n).find(|&r| sizes[r] > 1)?;
    Some((0..n).filter(|&v| ranks[v] == r).collect())
}

fn leaf_code(graph: &Graph<Atom, Bond>, nbrs: &[Vec<(usize, u8)>], ranks: &[usize]) -> LeafCode {
    let n = ranks.len();
    let mut atoms = vec![
        AtomLabel {
            atomic_num: 0,
            charge: 0,
            radicals: 0,
            lone_pairs: 0,
            isotope: 0,
            hydrogens: 0,
        };
        n
    ];
    for v in 0..n {
        atoms[ranks[v]] = AtomLabel::of(graph.vertex(NodeIndex::new(v)));
    }
    let mut edges = Vec::with_capacity(graph.edge_count());
    for (v, list) in nbrs.iter().enumerate() {
        for &(u, code) in list {
            if v < u {
                let (a, b) = (ranks[v], ranks[u]);
                edges.push((a.min(b), a.max(b), code));
            }
        }
    }
    edges.sort_unstable();
    LeafCode { atoms, edges }
}

fn render(code: &LeafCode) -> String {
    let atoms: Vec<String> = code
        .atoms
        .iter()
        .map(|a| {
            let symbol = crate::element::Element::from_atomic_num(a.atomic_num)
                .map(|e| e.symbol())
                .unwrap_or("?");
            format!(
                "{}{:+}r{}l{}i{}h{}",
                symbol, a.charge, a.radicals, a.lone_pairs, a.isotope, a.hydrogens
            )
        })
        .collect();
    let edges: Vec<String> = code
        .edges
        .iter()
        .map(|(a, b, c)| format!("{a}-{b}:{c}"))
        .collect();
    format!("{}|{}", atoms.join(";"), edges.join(","))
}

struct SearchNode {
    ranks: Vec<usize>,
    fixed: Vec<usize>,
    cell: Vec<usize>,
    next: usize,
    explored: Vec<usize>,
}

/// Whether an automorphism fixing `fixed` pointwise maps `w` to `v`.
fn same_orbit(graph: &Graph<Atom, Bond>, fixed: &[usize], w: usize, v: usize) -> bool {
    let cmp = Comparability::STRICT;
    let seeds = fixed
        .iter()
        .map(|&f| (NodeIndex::new(f), NodeIndex::new(f)))
        .chain(std::iter::once((NodeIndex::new(w), NodeIndex::new(v))));
    Vf2::new(graph, graph, MatchMode::Isomorphism, cmp.atoms, cmp.bonds)
        .with_seeds(seeds)
        .exists()
}

pub(crate) fn compute(graph: &Graph<Atom, Bond>, opts: &CanonicalOptions) -> CanonicalForm {
    let n = graph.vertex_count();
    let nbrs = neighbor_table(graph);
    let keys: Vec<AtomKey> = graph
        .vertices()
        .map(|v| atom_key(graph, &nbrs[v.index()], v))
        .collect();
    let mut root = ranks_from_keys(&keys);
    refine(&nbrs, &mut root);

    let mut best: Option<(LeafCode, Vec<usize>)> = None;
    let mut exact = true;
    let mut leaves = 0usize;

    match target_cell(&root) {
        None => best = Some((leaf_code(graph, &nbrs, &root), root)),
        Some(cell) => {
            let mut stack = vec![SearchNode {
                ranks: root,
                fixed: Vec::new(),
                cell,
                next: 0,
                explored: Vec::new(),
            }];
            'search: while let Some(node) = stack.last_mut() {
                if node.next >= node.cell.len() {
                    stack.pop();
                    continue;
                }
                let v = node.cell[node.next];
                node.next += 1;
                if node
                    .explored
                    .iter()
                    .any(|&w| same_orbit(graph, &node.fixed, w, v))
                {
                    continue;
                }
                node.explored.push(v);

                let mut child = individualize(&node.ranks, v);
                refine(&nbrs, &mut child);
                let mut fixed = node.fixed.clone();
                fixed.push(v);

                match target_cell(&child) {
                    Some(cell) => stack.push(SearchNode {
                        ranks: child,
                        fixed,
                        cell,
                        next: 0,
                        explored: Vec::new(),
                    }),
                    None => {
                        leaves += 1;
                        let code = leaf_code(graph, &nbrs, &child);
                        if best.as_ref().map_or(true, |(b, _)| code < *b) {
                            best = Some((code, child));
                        }
                        if leaves >= opts.max_leaves
                            && stack.iter().any(|s| s.next < s.cell.len())
                        {
                            exact = false;
                            warn!(
                                atoms = n,
                                leaves, "canonical search truncated; form is inexact"
                            );
                            break 'search;
                        }
                    }
                }
            }
        }
    }

    let (code, ranks) = best.unwrap_or_else(|| {
        (
            LeafCode {
                atoms: Vec::new(),
                edges: Vec::new(),
            },
            Vec::new(),
        )
    });
    let mut order = vec![NodeIndex::new(0); n];
    for (v, &r) in ranks.iter().enumerate() {
        order[r] = NodeIndex::new(v);
    }
    debug!(atoms = n, leaves, exact, "canonical form computed");
    CanonicalForm {
        ranks,
        order,
        string: render(&code),
        exact,
    }
}

/// Canonical form under default options, served from the molecule's cache.
pub fn canonical_form(mol: &Molecule) -> CanonicalForm {
    mol.canonical_form().clone()
}

/// Canonical form with explicit options. Never cached.
pub fn canonical_form_with(mol: &Molecule, opts: &CanonicalOptions) -> CanonicalForm {
    compute(mol.graph(), opts)
}

pub fn canonical_rank(mol: &Molecule) -> Vec<usize> {
    mol.canonical_form().ranks().to_vec()
}

/// Structural equality: equal canonical strings, or, when either form is
/// inexact, a full isomorphism check.
pub fn graphs_equal(a: &Molecule, b: &Molecule) -> bool {
    if a.atom_count() != b.atom_count() || a.bond_count() != b.bond_count() {
        return false;
    }
    let (fa, fb) = (a.canonical_form(), b.canonical_form());
    if fa.string() == fb.string() {
        return true;
    }
    if fa.is_exact() && fb.is_exact() {
        return false;
    }
    debug!("canonical strings differ on an inexact form; checking isomorphism");
    substruct::is_isomorphic(a, b)
}

/// Copy of `mol` with atoms renumbered into canonical order.
pub fn renumber_canonical(mol: &Molecule) -> Result<Molecule, RenumberError> {
    let order: Vec<usize> = mol
        .canonical_form()
        .order()
        .iter()
        .map(|v| v.index())
        .collect();
    Ok(Molecule::from_graph(mol.graph().renumber(&order)?))
}
