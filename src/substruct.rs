use crate::atom::Atom;
use crate::bond::Bond;
use crate::matcher::{MatchMode, Matches, VertexMapping, Vf2};
use crate::molecule::Molecule;

pub type AtomPredicate = fn(&Atom, &Atom) -> bool;
pub type BondPredicate = fn(&Bond, &Bond) -> bool;

/// Matches of one molecule inside another under a [`Comparability`].
pub type MoleculeMatches<'a> = Matches<'a, Atom, Bond, Atom, Bond, AtomPredicate, BondPredicate>;

/// A pair of atom and bond predicates. The first argument is always the
/// pattern side.
#[derive(Clone, Copy)]
pub struct Comparability {
    pub atoms: AtomPredicate,
    pub bonds: BondPredicate,
}

impl Comparability {
    /// Every atom field and the bond order.
    pub const STRICT: Self = Self {
        atoms: strict_atoms,
        bonds: same_order,
    };

    /// Element, charge and radicals; lone pairs, hydrogens and isotopes are
    /// left to the target.
    pub const SUBSTRUCTURE: Self = Self {
        atoms: substructure_atoms,
        bonds: same_order,
    };

    /// The skeleton shared by resonance structures: element, isotope and
    /// hydrogens, any bond order.
    pub const SKELETON: Self = Self {
        atoms: skeleton_atoms,
        bonds: any_bond,
    };
}

impl std::fmt::Debug for Comparability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparability").finish_non_exhaustive()
    }
}

fn strict_atoms(a: &Atom, b: &Atom) -> bool {
    a == b
}

fn substructure_atoms(a: &Atom, b: &Atom) -> bool {
    a.element == b.element && a.charge == b.charge && a.radical_electrons == b.radical_electrons
}

fn skeleton_atoms(a: &Atom, b: &Atom) -> bool {
    a.element == b.element && a.isotope == b.isotope && a.implicit_hydrogens == b.implicit_hydrogens
}

fn same_order(a: &Bond, b: &Bond) -> bool {
    a.order == b.order
}

fn any_bond(_: &Bond, _: &Bond) -> bool {
    true
}

pub fn is_isomorphic(a: &Molecule, b: &Molecule) -> bool {
    is_isomorphic_with(a, b, Comparability::STRICT)
}

pub fn is_isomorphic_with(a: &Molecule, b: &Molecule, cmp: Comparability) -> bool {
    is_isomorphic_by(a, b, cmp.atoms, cmp.bonds)
}

pub fn is_isomorphic_by(
    a: &Molecule,
    b: &Molecule,
    atom_match: impl Fn(&Atom, &Atom) -> bool,
    bond_match: impl Fn(&Bond, &Bond) -> bool,
) -> bool {
    Vf2::new(a.graph(), b.graph(), MatchMode::Isomorphism, atom_match, bond_match).exists()
}

pub fn find_isomorphism(a: &Molecule, b: &Molecule) -> Option<VertexMapping> {
    let cmp = Comparability::STRICT;
    Vf2::new(a.graph(), b.graph(), MatchMode::Isomorphism, cmp.atoms, cmp.bonds).first()
}

/// All embeddings of `pattern` in `target` under
/// [`Comparability::SUBSTRUCTURE`], produced lazily.
pub fn find_subgraph_matches<'a>(pattern: &'a Molecule, target: &'a Molecule) -> MoleculeMatches<'a> {
    find_subgraph_matches_with(pattern, target, Comparability::SUBSTRUCTURE)
}

pub fn find_subgraph_matches_with<'a>(
    pattern: &'a Molecule,
    target: &'a Molecule,
    cmp: Comparability,
) -> MoleculeMatches<'a> {
    Vf2::new(pattern.graph(), target.graph(), MatchMode::Subgraph, cmp.atoms, cmp.bonds).matches()
}

pub fn find_subgraph_matches_by<'a, FA, FB>(
    pattern: &'a Molecule,
    target: &'a Molecule,
    atom_match: FA,
    bond_match: FB,
) -> Matches<'a, Atom, Bond, Atom, Bond, FA, FB>
where
    FA: Fn(&Atom, &Atom) -> bool,
    FB: Fn(&Bond, &Bond) -> bool,
{
    Vf2::new(pattern.graph(), target.graph(), MatchMode::Subgraph, atom_match, bond_match).matches()
}

pub fn has_subgraph_match(pattern: &Molecule, target: &Molecule) -> bool {
    find_subgraph_matches(pattern, target).next().is_some()
}

/// Automorphisms under [`Comparability::STRICT`].
pub fn count_automorphisms(mol: &Molecule) -> usize {
    count_automorphisms_with(mol, Comparability::STRICT)
}

pub fn count_automorphisms_with(mol: &Molecule, cmp: Comparability) -> usize {
    Vf2::new(mol.graph(), mol.graph(), MatchMode::Isomorphism, cmp.atoms, cmp.bonds).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use crate::element::Element;
    use crate::testutil;
    use petgraph::graph::NodeIndex;

    fn ethyl_fragment() -> Molecule {
        Molecule::from_parts(
            [Atom::new(Element::C), Atom::new(Element::C)],
            &[(0, 1, BondOrder::Single)],
        )
        .unwrap()
    }

    #[test]
    fn ethene_matches_reversed_copy() {
        let a = testutil::ethene();
        let b = Molecule::from_parts(
            [
                Atom::new(Element::C).with_hydrogens(2),
                Atom::new(Element::C).with_hydrogens(2),
            ],
            &[(1, 0, BondOrder::Double)],
        )
        .unwrap();
        assert!(is_isomorphic(&a, &b));
        assert_eq!(find_isomorphism(&a, &b).map(|m| m.len()), Some(2));
    }

    #[test]
    fn strict_rejects_radical_difference() {
        let allyl = testutil::allyl();
        let mut moved = testutil::allyl();
        let g = moved.graph_mut();
        g.vertex_mut(NodeIndex::new(2)).radical_electrons = 0;
        g.vertex_mut(NodeIndex::new(1)).radical_electrons = 1;
        assert!(!is_isomorphic(&allyl, &moved));
        assert!(is_isomorphic_by(&allyl, &moved, |a, b| a.element == b.element, |_, _| true));
    }

    #[test]
    fn skeleton_ignores_electron_placement() {
        let benzene = testutil::benzene();
        let kekule = testutil::benzene_kekule();
        assert!(!is_isomorphic(&benzene, &kekule));
        assert!(is_isomorphic_with(&benzene, &kekule, Comparability::SKELETON));
    }

    #[test]
    fn subgraph_matches_are_lazy() {
        let pattern = ethyl_fragment();
        let target = testutil::neopentane();
        let mut matches = find_subgraph_matches(&pattern, &target);
        let first = matches.next().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(matches.count(), 7);
        assert!(has_subgraph_match(&pattern, &target));
    }

    #[test]
    fn subgraph_respects_bond_order() {
        let pattern = ethyl_fragment();
        assert!(!has_subgraph_match(&pattern, &testutil::ethene()));
        assert!(!has_subgraph_match(&pattern, &testutil::benzene()));
        assert!(has_subgraph_match(&pattern, &testutil::benzene_kekule()));
    }

    #[test]
    fn subgraph_by_closure() {
        let pattern = ethyl_fragment();
        let count = find_subgraph_matches_by(
            &pattern,
            &testutil::benzene(),
            |a, b| a.element == b.element,
            |_, _| true,
        )
        .count();
        assert_eq!(count, 12);
    }

    #[test]
    fn automorphism_counts() {
        assert_eq!(count_automorphisms(&testutil::ethene()), 2);
        assert_eq!(count_automorphisms(&testutil::benzene()), 12);
        assert_eq!(count_automorphisms(&testutil::benzene_kekule()), 6);
        assert_eq!(count_automorphisms(&testutil::neopentane()), 24);
        assert_eq!(count_automorphisms(&testutil::vinoxy()), 1);
    }
}
