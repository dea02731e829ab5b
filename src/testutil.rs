use crate::atom::Atom;
use crate::bond::BondOrder;
use crate::element::Element;
use crate::molecule::Molecule;

use BondOrder::{Aromatic, Double, Single};

fn c(h: u8) -> Atom {
    Atom::new(Element::C).with_hydrogens(h)
}

fn build(atoms: Vec<Atom>, bonds: &[(usize, usize, BondOrder)]) -> Molecule {
    Molecule::from_parts(atoms, bonds).unwrap()
}

fn ring_bonds(n: usize, order: BondOrder) -> Vec<(usize, usize, BondOrder)> {
    (0..n).map(|i| (i, (i + 1) % n, order)).collect()
}

/// CH2=CH2
pub fn ethene() -> Molecule {
    build(vec![c(2), c(2)], &[(0, 1, Double)])
}

/// CH3-CH3
pub fn ethane() -> Molecule {
    build(vec![c(3), c(3)], &[(0, 1, Single)])
}

/// Six aromatic CH around one ring.
pub fn benzene() -> Molecule {
    build(vec![c(1); 6], &ring_bonds(6, Aromatic))
}

/// 0=1-2=3-4=5-0
pub fn benzene_kekule() -> Molecule {
    let bonds: Vec<_> = (0..6)
        .map(|i| (i, (i + 1) % 6, if i % 2 == 0 { Double } else { Single }))
        .collect();
    build(vec![c(1); 6], &bonds)
}

/// Rings 0-1-2-3-4-9 and 4-5-6-7-8-9 fused at 4-9.
pub fn naphthalene() -> Molecule {
    let mut atoms = vec![c(1); 10];
    atoms[4] = c(0);
    atoms[9] = c(0);
    build(
        atoms,
        &[
            (0, 1, Aromatic),
            (1, 2, Aromatic),
            (2, 3, Aromatic),
            (3, 4, Aromatic),
            (4, 9, Aromatic),
            (9, 0, Aromatic),
            (4, 5, Aromatic),
            (5, 6, Aromatic),
            (6, 7, Aromatic),
            (7, 8, Aromatic),
            (8, 9, Aromatic),
        ],
    )
}

/// Five aromatic CH: no alternating assignment exists.
pub fn cyclopentadienyl() -> Molecule {
    build(vec![c(1); 5], &ring_bonds(5, Aromatic))
}

/// Aromatic ring with N at 0.
pub fn pyridine() -> Molecule {
    let mut atoms = vec![c(1); 6];
    atoms[0] = Atom::new(Element::N).with_lone_pairs(1);
    build(atoms, &ring_bonds(6, Aromatic))
}

/// CH2=CH-CH2*, radical on 2.
pub fn allyl() -> Molecule {
    build(
        vec![c(2), c(1), c(2).with_radicals(1)],
        &[(0, 1, Double), (1, 2, Single)],
    )
}

/// CH2=CH-CH=CH2
pub fn butadiene() -> Molecule {
    build(
        vec![c(2), c(1), c(1), c(2)],
        &[(0, 1, Double), (1, 2, Single), (2, 3, Double)],
    )
}

/// *CH2-CH=O
pub fn vinoxy() -> Molecule {
    build(
        vec![
            c(2).with_radicals(1),
            c(1),
            Atom::new(Element::O).with_lone_pairs(2),
        ],
        &[(0, 1, Single), (1, 2, Double)],
    )
}

/// O=CH-NH2
pub fn formamide() -> Molecule {
    build(
        vec![
            Atom::new(Element::O).with_lone_pairs(2),
            c(1),
            Atom::new(Element::N).with_hydrogens(2).with_lone_pairs(1),
        ],
        &[(0, 1, Double), (1, 2, Single)],
    )
}

/// [O-]-[O+]=O
pub fn ozone() -> Molecule {
    build(
        vec![
            Atom::new(Element::O).with_lone_pairs(3).with_charge(-1),
            Atom::new(Element::O).with_lone_pairs(1).with_charge(1),
            Atom::new(Element::O).with_lone_pairs(2),
        ],
        &[(0, 1, Single), (1, 2, Double)],
    )
}

/// C(CH3)4, center at 0.
pub fn neopentane() -> Molecule {
    build(
        vec![c(0), c(3), c(3), c(3), c(3)],
        &[(0, 1, Single), (0, 2, Single), (0, 3, Single), (0, 4, Single)],
    )
}
