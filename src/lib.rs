//! Molecular graph engine: atoms and bonds over a petgraph arena with
//! electron bookkeeping, VF2 (sub)graph matching, canonical numbering,
//! resonance enumeration, kekulization, symmetry numbers and ring
//! perception.
//!
//! ```
//! use molcrab::{canonical_rank, is_isomorphic, Atom, BondOrder, Element, Molecule};
//!
//! let ethene = Molecule::from_parts(
//!     [Atom::new(Element::C).with_hydrogens(2), Atom::new(Element::C).with_hydrogens(2)],
//!     &[(0, 1, BondOrder::Double)],
//! )
//! .unwrap();
//! let reversed = Molecule::from_parts(
//!     [Atom::new(Element::C).with_hydrogens(2), Atom::new(Element::C).with_hydrogens(2)],
//!     &[(1, 0, BondOrder::Double)],
//! )
//! .unwrap();
//! assert!(ethene.is_valid());
//! assert!(is_isomorphic(&ethene, &reversed));
//! assert_eq!(canonical_rank(&ethene), canonical_rank(&reversed));
//! ```

pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod canonical;
pub mod element;
pub mod graph;
pub mod hydrogen;
pub mod kekulize;
pub mod matcher;
pub mod molecule;
pub mod paths;
pub mod resonance;
pub mod rings;
pub mod substruct;
pub mod symmetry;
pub mod valence;

pub use aromaticity::{aromatic_rings, aromatize};
pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use canonical::{
    canonical_form, canonical_form_with, canonical_rank, graphs_equal, renumber_canonical,
    CanonicalForm, CanonicalOptions,
};
pub use element::Element;
pub use graph::{Graph, GraphError, NotFoundError, RenumberError};
pub use hydrogen::{expand_hydrogens, merge_hydrogens};
pub use kekulize::{kekulize, KekulizeError};
pub use matcher::{MatchMode, Matches, VertexMapping, Vf2};
pub use molecule::{Edit, Molecule, MoleculeBuilder, MoleculeError};
pub use paths::{shortest_path, NoPathError, PathError};
pub use resonance::{
    enumerate_labeled_structures, enumerate_resonance_structures,
    enumerate_resonance_structures_with, MaximizeConjugation, MinimizeFormalCharge,
    ResonanceFilter, ResonanceOptions, ResonanceSet,
};
pub use rings::{smallest_set_of_smallest_rings, RingInfo};
pub use substruct::{
    count_automorphisms, find_isomorphism, find_subgraph_matches, has_subgraph_match,
    is_isomorphic, is_isomorphic_with, Comparability,
};
pub use symmetry::{hybrid_symmetry_number, symmetry_classes, symmetry_number};
pub use valence::{InvalidValenceError, ValenceViolation};

#[cfg(test)]
mod testutil;
