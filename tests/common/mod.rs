#![allow(dead_code)]

use molcrab::{Atom, BondOrder, Element, Molecule};

pub fn carbon(h: u8) -> Atom {
    Atom::new(Element::C).with_hydrogens(h)
}

pub fn ring(n: usize, order: BondOrder) -> Vec<(usize, usize, BondOrder)> {
    (0..n).map(|i| (i, (i + 1) % n, order)).collect()
}

pub fn ethene() -> Molecule {
    Molecule::from_parts([carbon(2), carbon(2)], &[(0, 1, BondOrder::Double)]).unwrap()
}

pub fn benzene() -> Molecule {
    Molecule::from_parts(vec![carbon(1); 6], &ring(6, BondOrder::Aromatic)).unwrap()
}

pub fn cyclopentadienyl() -> Molecule {
    Molecule::from_parts(vec![carbon(1); 5], &ring(5, BondOrder::Aromatic)).unwrap()
}

/// CH2=CH-CH2*
pub fn allyl() -> Molecule {
    Molecule::from_parts(
        [carbon(2), carbon(1), carbon(2).with_radicals(1)],
        &[(0, 1, BondOrder::Double), (1, 2, BondOrder::Single)],
    )
    .unwrap()
}

/// Copy of `mol` where old atom `order[i]` becomes atom `i`.
pub fn permuted(mol: &Molecule, order: &[usize]) -> Molecule {
    Molecule::from_graph(mol.graph().renumber(order).unwrap())
}
