use serde::Deserialize;

use molcrab::{
    enumerate_resonance_structures, hybrid_symmetry_number, kekulize, smallest_set_of_smallest_rings,
    symmetry_number, Atom, BondOrder, Element, Molecule, ResonanceOptions,
};

#[derive(Deserialize)]
struct AtomEntry {
    element: String,
    #[serde(default)]
    h: u8,
    #[serde(default)]
    charge: i8,
    #[serde(default)]
    radicals: u8,
    #[serde(default)]
    lone_pairs: u8,
}

#[derive(Deserialize)]
struct MoleculeEntry {
    name: String,
    atoms: Vec<AtomEntry>,
    bonds: Vec<(usize, usize, String)>,
    symmetry_number: usize,
    hybrid_symmetry_number: Option<usize>,
    rings: usize,
    resonance_structures: Option<usize>,
    kekulizable: bool,
}

fn order(name: &str) -> BondOrder {
    match name {
        "Single" => BondOrder::Single,
        "Double" => BondOrder::Double,
        "Triple" => BondOrder::Triple,
        "Aromatic" => BondOrder::Aromatic,
        other => panic!("unknown bond order {other:?}"),
    }
}

fn build(entry: &MoleculeEntry) -> Molecule {
    let atoms: Vec<Atom> = entry
        .atoms
        .iter()
        .map(|a| {
            let element = Element::from_symbol(&a.element)
                .unwrap_or_else(|| panic!("{}: unknown element {:?}", entry.name, a.element));
            Atom::new(element)
                .with_hydrogens(a.h)
                .with_charge(a.charge)
                .with_radicals(a.radicals)
                .with_lone_pairs(a.lone_pairs)
        })
        .collect();
    let bonds: Vec<(usize, usize, BondOrder)> = entry
        .bonds
        .iter()
        .map(|(a, b, o)| (*a, *b, order(o)))
        .collect();
    Molecule::from_parts(atoms, &bonds).unwrap()
}

fn load() -> Vec<MoleculeEntry> {
    serde_json::from_str(include_str!("approval_data/molecules.json")).unwrap()
}

#[test]
fn approval_fixtures_are_valid() {
    let mut failures = Vec::new();
    for entry in &load() {
        if let Err(err) = build(entry).validate() {
            failures.push(format!("[valence] {}: {err}", entry.name));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn approval_symmetry() {
    let mut failures = Vec::new();
    let opts = ResonanceOptions::default();
    for entry in &load() {
        let mol = build(entry);
        let got = symmetry_number(&mol);
        if got != entry.symmetry_number {
            failures.push(format!(
                "[symmetry] {}: expected {}, got {got}",
                entry.name, entry.symmetry_number
            ));
        }
        if let Some(expected) = entry.hybrid_symmetry_number {
            let got = hybrid_symmetry_number(&mol, &opts);
            if got != expected {
                failures.push(format!("[hybrid] {}: expected {expected}, got {got}", entry.name));
            }
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn approval_rings_and_kekulization() {
    let mut failures = Vec::new();
    for entry in &load() {
        let mut mol = build(entry);
        let rings = smallest_set_of_smallest_rings(&mol).len();
        if rings != entry.rings {
            failures.push(format!("[rings] {}: expected {}, got {rings}", entry.name, entry.rings));
        }
        let ok = kekulize(&mut mol).is_ok();
        if ok != entry.kekulizable {
            failures.push(format!(
                "[kekulize] {}: expected {}, got {ok}",
                entry.name, entry.kekulizable
            ));
        }
        if ok && !mol.is_valid() {
            failures.push(format!("[kekulize] {}: result is not valid", entry.name));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn approval_resonance() {
    let mut failures = Vec::new();
    for entry in &load() {
        let Some(expected) = entry.resonance_structures else {
            continue;
        };
        let set = enumerate_resonance_structures(&build(entry));
        if set.len() != expected {
            failures.push(format!(
                "[resonance] {}: expected {expected}, got {}",
                entry.name,
                set.len()
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[cfg(feature = "serde")]
#[test]
fn options_round_trip_through_json() {
    let opts = ResonanceOptions {
        max_structures: 12,
        ..ResonanceOptions::default()
    };
    let json = serde_json::to_string(&opts).unwrap();
    let back: ResonanceOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, opts);

    let partial: ResonanceOptions = serde_json::from_str(r#"{"aromatic_forms": false}"#).unwrap();
    assert_eq!(partial.max_structures, 256);
    assert!(!partial.aromatic_forms);
}
