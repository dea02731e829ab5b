//! Symmetry numbers from automorphism counts.

use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;

use crate::element::Element;
use crate::graph::Graph;
use crate::matcher::{MatchMode, Vf2};
use crate::molecule::Molecule;
use crate::resonance::{self, ResonanceOptions};
use crate::substruct::{self, Comparability};

/// Automorphisms preserving every atom field (isotope included) and bond
/// order. Hydrogens are counted as implicit, so a methyl rotor contributes
/// nothing; expand hydrogens first to include it.
///
/// ```
/// use molcrab::{symmetry_number, Atom, BondOrder, Element, Molecule};
///
/// let mut b = Molecule::builder();
/// let c = b.atom(Atom::new(Element::C));
/// for _ in 0..4 {
///     let cl = b.atom(Atom::new(Element::Cl).with_lone_pairs(3));
///     b.bond(c, cl, BondOrder::Single);
/// }
/// assert_eq!(symmetry_number(&b.build().unwrap()), 24);
/// ```
pub fn symmetry_number(mol: &Molecule) -> usize {
    substruct::count_automorphisms(mol)
}

/// Orbits of the strict automorphism group, each sorted, ordered by their
/// smallest atom.
pub fn symmetry_classes(mol: &Molecule) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut uf = UnionFind::<usize>::new(n);
    let cmp = Comparability::STRICT;
    for mapping in Vf2::new(mol.graph(), mol.graph(), MatchMode::Isomorphism, cmp.atoms, cmp.bonds).matches() {
        for (from, to) in mapping {
            uf.union(from.index(), to.index());
        }
    }

    let mut classes: Vec<Vec<NodeIndex>> = Vec::new();
    let mut slot = vec![usize::MAX; n];
    for v in 0..n {
        let root = uf.find(v);
        if slot[root] == usize::MAX {
            slot[root] = classes.len();
            classes.push(Vec::new());
        }
        classes[slot[root]].push(NodeIndex::new(v));
    }
    classes
}

/// Atom of the resonance hybrid: fixed skeleton fields plus electron
/// counts summed over every labeled resonance structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HybridAtom {
    element: Element,
    isotope: u16,
    hydrogens: u8,
    charge: i32,
    radicals: u32,
    lone_pairs: u32,
}

/// Sum of half-bond units over every labeled structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HybridBond(u32);

/// Symmetry number of the resonance hybrid. Delocalization can make atoms
/// equivalent that no single structure treats alike: the allyl radical has
/// symmetry number 1 as drawn but 2 as a hybrid.
pub fn hybrid_symmetry_number(mol: &Molecule, opts: &ResonanceOptions) -> usize {
    let structures = resonance::enumerate_labeled_structures(mol, opts);
    let hybrid = hybrid_graph(mol, &structures);
    Vf2::new(
        &hybrid,
        &hybrid,
        MatchMode::Isomorphism,
        |a: &HybridAtom, b: &HybridAtom| a == b,
        |a: &HybridBond, b: &HybridBond| a == b,
    )
    .count()
}

fn hybrid_graph(mol: &Molecule, structures: &[Molecule]) -> Graph<HybridAtom, HybridBond> {
    mol.graph().map(
        |v, atom| {
            let mut hybrid = HybridAtom {
                element: atom.element,
                isotope: atom.isotope,
                hydrogens: atom.implicit_hydrogens,
                charge: 0,
                radicals: 0,
                lone_pairs: 0,
            };
            for s in structures {
                let a = s.atom(v);
                hybrid.charge += a.charge as i32;
                hybrid.radicals += a.radical_electrons as u32;
                hybrid.lone_pairs += a.lone_pairs as u32;
            }
            hybrid
        },
        |e, _| HybridBond(structures.iter().map(|s| s.bond(e).order.half_units() as u32).sum()),
    )
}
