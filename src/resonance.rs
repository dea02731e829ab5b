//! Resonance structure enumeration.
//!
//! Starting from a seed, local electron shifts are applied breadth first:
//!
//! - allyl radical shift, `*a1-a2=a3 <-> a1=a2-a3*`
//! - lone pair to multiple bond shift, `:a1-a2=a3 <-> (+)a1=a2-a3:(-)`
//! - adjacent radical and lone pair shift, `*a1-a2: <-> (-):a1-a2*(+)`
//! - pi bond rotation around an alternating ring
//! - Kekulé to aromatic and back
//!
//! Every shift goes through [`Molecule::apply`], so each structure
//! produced has a balanced electron budget. Each shift is its own inverse
//! read from the other end, which makes the explored set the same from any
//! of its members as long as no bound cuts the search short. Structures are
//! deduplicated by structural equality; the labeled variant keeps every
//! distinct electron placement on the fixed atom numbering.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use petgraph::graph::NodeIndex;
use tracing::{debug, trace, warn};

use crate::aromaticity;
use crate::atom::Atom;
use crate::bond::BondOrder;
use crate::kekulize;
use crate::molecule::{Edit, Molecule};
use crate::paths;
use crate::rings::RingInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResonanceOptions {
    /// Structures kept before the search stops. A truncated set is flagged.
    pub max_structures: usize,
    /// Largest formal charge magnitude a shift may create on an atom.
    pub max_abs_charge: u8,
    /// Allow the shifts that separate charge.
    pub charge_separation: bool,
    /// Include Kekulé and aromatic forms of benzenoid rings.
    pub aromatic_forms: bool,
}

impl Default for ResonanceOptions {
    fn default() -> Self {
        Self {
            max_structures: 256,
            max_abs_charge: 1,
            charge_separation: true,
            aromatic_forms: true,
        }
    }
}

/// Chooses the representative of a [`ResonanceSet`]. Lowest penalty wins;
/// ties go to the smallest canonical string.
pub trait ResonanceFilter {
    fn penalty(&self, mol: &Molecule) -> i64;
}

/// Prefers the structure with the least total formal charge magnitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimizeFormalCharge;

impl ResonanceFilter for MinimizeFormalCharge {
    fn penalty(&self, mol: &Molecule) -> i64 {
        mol.atoms()
            .map(|v| (mol.atom(v).charge as i64).abs())
            .sum()
    }
}

/// Prefers the structure with the most pi bonds, then the least charge.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaximizeConjugation;

impl ResonanceFilter for MaximizeConjugation {
    fn penalty(&self, mol: &Molecule) -> i64 {
        let pi: i64 = mol
            .bonds()
            .map(|e| match mol.bond(e).order {
                BondOrder::Single => 0,
                BondOrder::Double | BondOrder::Aromatic => 1,
                BondOrder::Triple => 2,
            })
            .sum();
        -pi * 64 + MinimizeFormalCharge.penalty(mol)
    }
}

/// Distinct resonance structures of one molecule, seed first.
#[derive(Debug, Clone)]
pub struct ResonanceSet {
    structures: Vec<Molecule>,
    representative: usize,
    truncated: bool,
}

impl ResonanceSet {
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn structures(&self) -> &[Molecule] {
        &self.structures
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Molecule> {
        self.structures.iter()
    }

    pub fn representative(&self) -> &Molecule {
        &self.structures[self.representative]
    }

    pub fn representative_index(&self) -> usize {
        self.representative
    }

    /// Whether `max_structures` stopped the search.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn contains(&self, mol: &Molecule) -> bool {
        self.structures.iter().any(|s| s == mol)
    }

    pub fn into_structures(self) -> Vec<Molecule> {
        self.structures
    }
}

impl<'a> IntoIterator for &'a ResonanceSet {
    type Item = &'a Molecule;
    type IntoIter = std::slice::Iter<'a, Molecule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Resonance structures under default options, represented by the one with
/// the least formal charge.
pub fn enumerate_resonance_structures(mol: &Molecule) -> ResonanceSet {
    enumerate_resonance_structures_with(mol, &ResonanceOptions::default(), &MinimizeFormalCharge)
}

pub fn enumerate_resonance_structures_with(
    mol: &Molecule,
    opts: &ResonanceOptions,
    filter: &dyn ResonanceFilter,
) -> ResonanceSet {
    let (structures, truncated) = explore(mol, opts, |m| m.clone());
    let representative = structures
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            filter
                .penalty(a)
                .cmp(&filter.penalty(b))
                .then_with(|| a.canonical_form().string().cmp(b.canonical_form().string()))
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    debug!(
        structures = structures.len(),
        representative, truncated, "resonance enumeration finished"
    );
    ResonanceSet {
        structures,
        representative,
        truncated,
    }
}

/// Every distinct electron placement on the seed's own numbering, seed
/// first. Structures related by a symmetry of the skeleton are all kept.
pub fn enumerate_labeled_structures(mol: &Molecule, opts: &ResonanceOptions) -> Vec<Molecule> {
    explore(mol, opts, labeled_key).0
}

/// Bond orders only: the aromatic flag a Kekulé form carries depends on how
/// it was reached, not on where the electrons sit.
type LabeledKey = (Vec<Atom>, Vec<BondOrder>);

fn labeled_key(mol: &Molecule) -> LabeledKey {
    (
        mol.atoms().map(|v| *mol.atom(v)).collect(),
        mol.bonds().map(|e| mol.bond(e).order).collect(),
    )
}

fn explore<K: Eq + Hash>(
    seed: &Molecule,
    opts: &ResonanceOptions,
    key: impl Fn(&Molecule) -> K,
) -> (Vec<Molecule>, bool) {
    let mut seen: HashSet<K> = HashSet::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::new();

    seen.insert(key(seed));
    out.push(seed.clone());
    queue.push_back(0usize);

    while let Some(i) = queue.pop_front() {
        for next in adjacent_structures(&out[i], opts) {
            if !seen.insert(key(&next)) {
                continue;
            }
            if out.len() >= opts.max_structures {
                warn!(
                    max_structures = opts.max_structures,
                    "resonance search truncated"
                );
                return (out, true);
            }
            trace!(index = out.len(), from = i, "new resonance structure");
            out.push(next);
            queue.push_back(out.len() - 1);
        }
    }
    (out, false)
}

/// Structures one shift away from `mol`, possibly with repeats.
pub fn adjacent_structures(mol: &Molecule, opts: &ResonanceOptions) -> Vec<Molecule> {
    let mut out = Vec::new();

    for a1 in mol.atoms() {
        for path in paths::find_allyl_delocalization_paths(mol, a1) {
            push_shift(mol, &mut out, allyl_shift(mol, path), opts, &[]);
        }
        if opts.charge_separation {
            for path in paths::find_lone_pair_multiple_bond_paths(mol, a1) {
                let touched = [path[0], path[2]];
                push_shift(mol, &mut out, lone_pair_shift(mol, path), opts, &touched);
            }
            for path in paths::find_adjacent_lone_pair_radical_paths(mol, a1) {
                push_shift(mol, &mut out, radical_lone_pair_shift(mol, path), opts, &path);
            }
        }
    }

    for ring in RingInfo::sssr(mol.graph()).rings() {
        push_shift(mol, &mut out, ring_flip(mol, ring), opts, &[]);
    }

    if opts.aromatic_forms {
        if mol.has_aromatic_bonds() {
            match kekulize::kekulized(mol) {
                Ok(k) => out.push(k),
                Err(err) => trace!(%err, "no Kekulé form"),
            }
        }
        let mut aromatic = mol.clone();
        if aromaticity::aromatize(&mut aromatic) {
            out.push(aromatic);
        }
    }

    out
}

fn push_shift(
    mol: &Molecule,
    out: &mut Vec<Molecule>,
    edits: Option<Vec<Edit>>,
    opts: &ResonanceOptions,
    charged: &[NodeIndex],
) {
    let Some(edits) = edits else {
        return;
    };
    let mut next = mol.clone();
    if let Err(err) = next.apply(&edits) {
        trace!(%err, "shift rejected");
        return;
    }
    let within_bound = charged.iter().all(|&v| {
        let before = mol.atom(v).charge.unsigned_abs();
        let after = next.atom(v).charge.unsigned_abs();
        after <= opts.max_abs_charge || after < before
    });
    if within_bound {
        out.push(next);
    }
}

fn bond_shift(mol: &Molecule, a1: NodeIndex, a2: NodeIndex, a3: NodeIndex) -> Option<[Edit; 2]> {
    let b12 = mol.bond_between(a1, a2)?;
    let b23 = mol.bond_between(a2, a3)?;
    Some([
        Edit::BondOrder(b12, mol.bond(b12).order.increment()?),
        Edit::BondOrder(b23, mol.bond(b23).order.decrement()?),
    ])
}

fn allyl_shift(mol: &Molecule, [a1, a2, a3]: [NodeIndex; 3]) -> Option<Vec<Edit>> {
    let mut edits = bond_shift(mol, a1, a2, a3)?.to_vec();
    edits.push(Edit::Radicals(a1, mol.atom(a1).radical_electrons.checked_sub(1)?));
    edits.push(Edit::Radicals(a3, mol.atom(a3).radical_electrons.checked_add(1)?));
    Some(edits)
}

fn lone_pair_shift(mol: &Molecule, [a1, a2, a3]: [NodeIndex; 3]) -> Option<Vec<Edit>> {
    let mut edits = bond_shift(mol, a1, a2, a3)?.to_vec();
    let (donor, acceptor) = (mol.atom(a1), mol.atom(a3));
    edits.push(Edit::LonePairs(a1, donor.lone_pairs.checked_sub(1)?));
    edits.push(Edit::Charge(a1, donor.charge.checked_add(1)?));
    edits.push(Edit::LonePairs(a3, acceptor.lone_pairs.checked_add(1)?));
    edits.push(Edit::Charge(a3, acceptor.charge.checked_sub(1)?));
    Some(edits)
}

fn radical_lone_pair_shift(mol: &Molecule, [a1, a2]: [NodeIndex; 2]) -> Option<Vec<Edit>> {
    let (radical, donor) = (mol.atom(a1), mol.atom(a2));
    Some(vec![
        Edit::Radicals(a1, radical.radical_electrons.checked_sub(1)?),
        Edit::LonePairs(a1, radical.lone_pairs.checked_add(1)?),
        Edit::Charge(a1, radical.charge.checked_sub(1)?),
        Edit::LonePairs(a2, donor.lone_pairs.checked_sub(1)?),
        Edit::Radicals(a2, donor.radical_electrons.checked_add(1)?),
        Edit::Charge(a2, donor.charge.checked_add(1)?),
    ])
}

/// Swaps single and double bonds around an even ring whose bonds strictly
/// alternate between the two.
fn ring_flip(mol: &Molecule, ring: &[NodeIndex]) -> Option<Vec<Edit>> {
    if ring.len() % 2 != 0 {
        return None;
    }
    let len = ring.len();
    let mut edits = Vec::with_capacity(len);
    let mut previous: Option<BondOrder> = None;
    for i in 0..len {
        let e = mol.bond_between(ring[i], ring[(i + 1) % len])?;
        let order = mol.bond(e).order;
        let flipped = match order {
            BondOrder::Single => BondOrder::Double,
            BondOrder::Double => BondOrder::Single,
            _ => return None,
        };
        if previous == Some(order) {
            return None;
        }
        previous = Some(order);
        edits.push(Edit::BondOrder(e, flipped));
    }
    Some(edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn no_charge_separation() -> ResonanceOptions {
        ResonanceOptions {
            charge_separation: false,
            ..ResonanceOptions::default()
        }
    }

    #[test]
    fn allyl_forms_are_equivalent() {
        let set = enumerate_resonance_structures(&testutil::allyl());
        assert_eq!(set.len(), 1);
        assert!(!set.is_truncated());
        let labeled = enumerate_labeled_structures(&testutil::allyl(), &ResonanceOptions::default());
        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled[1].atom(NodeIndex::new(0)).radical_electrons, 1);
    }

    #[test]
    fn vinoxy_radical_moves_onto_oxygen() {
        let mol = testutil::vinoxy();
        let set = enumerate_resonance_structures_with(&mol, &no_charge_separation(), &MinimizeFormalCharge);
        assert_eq!(set.len(), 2);
        let oxyl = &set.structures()[1];
        assert_eq!(oxyl.atom(NodeIndex::new(2)).radical_electrons, 1);
        assert_eq!(oxyl.atom(NodeIndex::new(0)).radical_electrons, 0);

        // charge separation adds [CH2-]-CH=[O+*]
        let full = enumerate_resonance_structures(&mol);
        assert_eq!(full.len(), 3);
        assert_eq!(full.representative().total_charge(), 0);
        assert_eq!(MinimizeFormalCharge.penalty(full.representative()), 0);
    }

    #[test]
    fn formamide_charge_separated_form() {
        let set = enumerate_resonance_structures(&testutil::formamide());
        assert_eq!(set.len(), 2);
        assert_eq!(set.representative_index(), 0);
        let zwitterion = &set.structures()[1];
        assert_eq!(zwitterion.atom(NodeIndex::new(0)).charge, -1);
        assert_eq!(zwitterion.atom(NodeIndex::new(2)).charge, 1);
        assert!(zwitterion.is_valid());

        let neutral_only =
            enumerate_resonance_structures_with(&testutil::formamide(), &no_charge_separation(), &MinimizeFormalCharge);
        assert_eq!(neutral_only.len(), 1);
    }

    #[test]
    fn ozone_is_symmetric() {
        let set = enumerate_resonance_structures(&testutil::ozone());
        assert_eq!(set.len(), 1);
        let labeled = enumerate_labeled_structures(&testutil::ozone(), &ResonanceOptions::default());
        assert_eq!(labeled.len(), 2);
    }

    #[test]
    fn benzene_kekule_and_aromatic() {
        let set = enumerate_resonance_structures(&testutil::benzene());
        assert_eq!(set.len(), 2);
        assert!(set.contains(&testutil::benzene_kekule()));

        let conjugated =
            enumerate_resonance_structures_with(&testutil::benzene(), &ResonanceOptions::default(), &MaximizeConjugation);
        assert_eq!(conjugated.representative(), &testutil::benzene());

        let plain = ResonanceOptions {
            aromatic_forms: false,
            ..ResonanceOptions::default()
        };
        assert_eq!(enumerate_resonance_structures_with(&testutil::benzene(), &plain, &MinimizeFormalCharge).len(), 1);
    }

    #[test]
    fn kekule_ring_flip_is_labeled_distinct() {
        let opts = ResonanceOptions {
            aromatic_forms: false,
            ..ResonanceOptions::default()
        };
        let labeled = enumerate_labeled_structures(&testutil::benzene_kekule(), &opts);
        assert_eq!(labeled.len(), 2);
    }

    #[test]
    fn kekule_forms_are_not_doubled_by_the_aromatic_flag() {
        // two placements plus the aromatic form; kekulizing that form
        // lands on the same placements with the flag set
        let seed = testutil::benzene_kekule();
        assert!(seed.bonds().all(|e| !seed.bond(e).is_aromatic));
        let labeled = enumerate_labeled_structures(&seed, &ResonanceOptions::default());
        assert_eq!(labeled.len(), 3);
    }

    #[test]
    fn naphthalene_has_two_kekule_classes() {
        let set = enumerate_resonance_structures(&testutil::naphthalene());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn closed_shell_without_shifts() {
        let set = enumerate_resonance_structures(&testutil::neopentane());
        assert_eq!(set.len(), 1);
        assert_eq!(set.representative(), &testutil::neopentane());
    }

    #[test]
    fn truncation_is_flagged() {
        let opts = ResonanceOptions {
            max_structures: 1,
            ..ResonanceOptions::default()
        };
        let set = enumerate_resonance_structures_with(&testutil::formamide(), &opts, &MinimizeFormalCharge);
        assert_eq!(set.len(), 1);
        assert!(set.is_truncated());
    }

    #[test]
    fn every_structure_shares_the_skeleton() {
        for mol in [testutil::vinoxy(), testutil::naphthalene(), testutil::formamide()] {
            for s in &enumerate_resonance_structures(&mol) {
                assert!(crate::substruct::is_isomorphic_with(
                    &mol,
                    s,
                    crate::substruct::Comparability::SKELETON
                ));
                assert!(s.is_valid());
            }
        }
    }
}
