use crate::element::Element;

/// Vertex payload of a [`Molecule`](crate::Molecule).
///
/// `Atom` stores the electron placement explicitly: formal charge, radical
/// electrons and lone pairs are all fields rather than values inferred from
/// a valence model. That is what lets resonance structures differ only in
/// these numbers while sharing one skeleton.
///
/// # Examples
///
/// ```
/// use molcrab::{Atom, Element};
///
/// let methyl = Atom::new(Element::C).with_hydrogens(3).with_radicals(1);
/// assert_eq!(methyl.radical_electrons, 1);
/// assert_eq!(methyl.implicit_hydrogens, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atom {
    pub element: Element,
    /// Formal charge in elementary charge units.
    pub charge: i8,
    /// Unpaired electrons.
    pub radical_electrons: u8,
    /// Non-bonding electron pairs.
    pub lone_pairs: u8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Hydrogens folded into this atom instead of being graph vertices.
    pub implicit_hydrogens: u8,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            charge: 0,
            radical_electrons: 0,
            lone_pairs: 0,
            isotope: 0,
            implicit_hydrogens: 0,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_radicals(mut self, radicals: u8) -> Self {
        self.radical_electrons = radicals;
        self
    }

    pub fn with_lone_pairs(mut self, lone_pairs: u8) -> Self {
        self.lone_pairs = lone_pairs;
        self
    }

    pub fn with_isotope(mut self, isotope: u16) -> Self {
        self.isotope = isotope;
        self
    }

    pub fn with_hydrogens(mut self, count: u8) -> Self {
        self.implicit_hydrogens = count;
        self
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == Element::H
    }

    /// Electrons the atom owns outright: two per lone pair plus radicals.
    pub fn nonbonding_electrons(&self) -> u8 {
        2 * self.lone_pairs + self.radical_electrons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods() {
        let o = Atom::new(Element::O)
            .with_charge(-1)
            .with_lone_pairs(3)
            .with_isotope(18);
        assert_eq!(o.element, Element::O);
        assert_eq!(o.charge, -1);
        assert_eq!(o.lone_pairs, 3);
        assert_eq!(o.isotope, 18);
        assert_eq!(o.nonbonding_electrons(), 6);
    }

    #[test]
    fn hydrogen_detection() {
        assert!(Atom::new(Element::H).is_hydrogen());
        assert!(!Atom::new(Element::He).is_hydrogen());
    }
}
