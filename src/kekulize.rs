//! Kekulization assigns alternating single and double bonds to aromatic
//! ring systems.
//!
//! Every atom touching an aromatic bond has an electron gap: what its
//! valence electrons leave over once charge, lone pairs, radicals,
//! hydrogens and its bonds (aromatic ones counted as single) are paid for.
//! Atoms with a gap of one need exactly one double bond. The aromatic bonds
//! between such atoms form a general graph, and a Kekulé structure is a
//! perfect matching on it, found with Edmonds' blossom algorithm
//! ([`petgraph::algo::maximum_matching`]) since fused systems need not be
//! bipartite.
//!
//! The bonds keep `is_aromatic`, so [`crate::aromaticity::aromatize`] can
//! restore them.

use petgraph::algo::maximum_matching;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use tracing::{debug, trace};

use crate::bond::BondOrder;
use crate::molecule::Molecule;
use crate::valence;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KekulizeError {
    /// These atoms need a double bond and none could be assigned.
    #[error("cannot kekulize aromatic system: unmatched atoms {:?}", indices(.0))]
    Unkekulizable(Vec<NodeIndex>),
    /// The atom's electrons admit neither zero nor one double bond.
    #[error("aromatic atom {} has an impossible electron count", .0.index())]
    ElectronCount(NodeIndex),
}

fn indices(atoms: &[NodeIndex]) -> Vec<usize> {
    atoms.iter().map(|a| a.index()).collect()
}

/// Replaces every aromatic bond with a single or double bond. On failure
/// the molecule is not modified.
///
/// ```
/// use molcrab::{kekulize, Atom, BondOrder, Element, Molecule};
///
/// let ring: Vec<_> = (0..6).map(|i| (i, (i + 1) % 6, BondOrder::Aromatic)).collect();
/// let mut benzene =
///     Molecule::from_parts(vec![Atom::new(Element::C).with_hydrogens(1); 6], &ring).unwrap();
/// kekulize(&mut benzene).unwrap();
/// let doubles = benzene
///     .bonds()
///     .filter(|&e| benzene.bond(e).order == BondOrder::Double)
///     .count();
/// assert_eq!(doubles, 3);
/// ```
pub fn kekulize(mol: &mut Molecule) -> Result<(), KekulizeError> {
    let aromatic: Vec<EdgeIndex> = mol
        .bonds()
        .filter(|&e| mol.bond(e).order == BondOrder::Aromatic)
        .collect();
    if aromatic.is_empty() {
        return Ok(());
    }

    let n = mol.atom_count();
    let mut in_system = vec![false; n];
    for &e in &aromatic {
        if let Some((a, b)) = mol.bond_endpoints(e) {
            in_system[a.index()] = true;
            in_system[b.index()] = true;
        }
    }

    let mut needs_double = vec![false; n];
    for v in mol.atoms().filter(|v| in_system[v.index()]) {
        match electron_gap(mol, v) {
            0 => {}
            1 => needs_double[v.index()] = true,
            _ => {
                debug!(atom = v.index(), "aromatic atom with no valid bond pattern");
                return Err(KekulizeError::ElectronCount(v));
            }
        }
    }

    // matching graph shares vertex indices with the molecule
    let mut pairing: UnGraph<(), EdgeIndex> = UnGraph::with_capacity(n, aromatic.len());
    for _ in 0..n {
        pairing.add_node(());
    }
    for &e in &aromatic {
        if let Some((a, b)) = mol.bond_endpoints(e) {
            if needs_double[a.index()] && needs_double[b.index()] {
                pairing.add_edge(a, b, e);
            }
        }
    }
    let matching = maximum_matching(&pairing);

    let unmatched: Vec<NodeIndex> = mol
        .atoms()
        .filter(|v| needs_double[v.index()] && matching.mate(*v).is_none())
        .collect();
    if !unmatched.is_empty() {
        debug!(unmatched = ?indices(&unmatched), "kekulization failed");
        return Err(KekulizeError::Unkekulizable(unmatched));
    }

    let mut next = mol.graph().clone();
    for &e in &aromatic {
        let double = mol
            .bond_endpoints(e)
            .and_then(|(a, b)| matching.mate(a).filter(|&m| m == b))
            .is_some();
        let bond = next.edge_mut(e);
        bond.order = if double {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
        bond.is_aromatic = true;
    }
    for v in mol.atoms().filter(|v| in_system[v.index()]) {
        if let Err(err) = valence::check_atom(&next, v) {
            return Err(KekulizeError::ElectronCount(err.atom));
        }
    }

    trace!(bonds = aromatic.len(), "kekulized");
    *mol.graph_mut() = next;
    Ok(())
}

/// Kekulizes a copy, leaving `mol` alone.
pub fn kekulized(mol: &Molecule) -> Result<Molecule, KekulizeError> {
    let mut out = mol.clone();
    kekulize(&mut out)?;
    Ok(out)
}

fn electron_gap(mol: &Molecule, v: NodeIndex) -> i16 {
    let atom = mol.atom(v);
    let free = atom.element.valence_electrons() as i16
        - atom.charge as i16
        - 2 * atom.lone_pairs as i16
        - atom.radical_electrons as i16
        - atom.implicit_hydrogens as i16;
    let bonded: i16 = mol
        .bonds_of(v)
        .map(|e| match mol.bond(e).order {
            BondOrder::Aromatic => 1,
            order => order.ordinal() as i16,
        })
        .sum();
    free - bonded
}
