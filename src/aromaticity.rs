//! Re-aromatization of Kekulé benzenoid rings.
//!
//! A six-membered SSSR ring is aromatic when all its atoms can take part in
//! a pi system and every one of them carries exactly one double bond that
//! lies inside the aromatic ring set. The set is found as a fixpoint, so a
//! naphthalene ring whose fused atoms hold their double bonds in the
//! neighboring ring still counts.

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::bond::BondOrder;
use crate::element::Element;
use crate::molecule::Molecule;
use crate::rings::RingInfo;
use crate::valence;

const PI_CAPABLE: [Element; 6] = [
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::P,
    Element::S,
];

/// Rings [`aromatize`] would convert, in SSSR order.
pub fn aromatic_rings(mol: &Molecule) -> Vec<Vec<NodeIndex>> {
    let mut candidates: Vec<Vec<NodeIndex>> = RingInfo::sssr(mol.graph())
        .into_rings()
        .into_iter()
        .filter(|ring| is_candidate_ring(mol, ring))
        .collect();

    loop {
        let ring_bonds = bonds_of_rings(mol, &candidates);
        let before = candidates.len();
        candidates.retain(|ring| {
            ring.iter().all(|&v| {
                let doubles: Vec<EdgeIndex> = mol
                    .bonds_of(v)
                    .filter(|&e| mol.bond(e).order == BondOrder::Double)
                    .collect();
                doubles.len() == 1 && ring_bonds.contains(&doubles[0])
            })
        });
        if candidates.len() == before {
            return candidates;
        }
    }
}

fn is_candidate_ring(mol: &Molecule, ring: &[NodeIndex]) -> bool {
    ring.len() == 6
        && ring.iter().all(|&v| PI_CAPABLE.contains(&mol.atom(v).element))
        && ring_edges(mol, ring)
            .iter()
            .all(|&e| matches!(mol.bond(e).order, BondOrder::Single | BondOrder::Double))
}

fn ring_edges(mol: &Molecule, ring: &[NodeIndex]) -> Vec<EdgeIndex> {
    let len = ring.len();
    (0..len)
        .filter_map(|i| mol.bond_between(ring[i], ring[(i + 1) % len]))
        .collect()
}

fn bonds_of_rings(mol: &Molecule, rings: &[Vec<NodeIndex>]) -> Vec<EdgeIndex> {
    let mut out: Vec<EdgeIndex> = rings.iter().flat_map(|r| ring_edges(mol, r)).collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Turns every bond of [`aromatic_rings`] into an aromatic bond. Returns
/// whether anything changed. A result that would break an atom's electron
/// budget is discarded.
pub fn aromatize(mol: &mut Molecule) -> bool {
    let rings = aromatic_rings(mol);
    if rings.is_empty() {
        return false;
    }
    let mut next = mol.graph().clone();
    for e in bonds_of_rings(mol, &rings) {
        let bond = next.edge_mut(e);
        bond.order = BondOrder::Aromatic;
        bond.is_aromatic = true;
    }
    if valence::check_all(&next).is_err() {
        tracing::debug!("aromatized form violates valence, keeping Kekulé bonds");
        return false;
    }
    *mol.graph_mut() = next;
    true
}
