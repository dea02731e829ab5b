use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValenceViolation {
    /// Placed electrons do not add up to the element's budget. Both counts
    /// are doubled so aromatic bonds stay integral.
    ElectronCount { expected: i16, found: i16 },
    ShellOverflow { electrons: i16, capacity: u8 },
}

impl std::fmt::Display for ValenceViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElectronCount { expected, found } => write!(
                f,
                "electron count {} != budget {}",
                *found as f32 / 2.0,
                *expected as f32 / 2.0
            ),
            Self::ShellOverflow {
                electrons,
                capacity,
            } => write!(f, "{electrons} electrons exceed shell capacity {capacity}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("atom {} ({element}): {kind}", .atom.index())]
pub struct InvalidValenceError {
    pub atom: NodeIndex,
    pub element: Element,
    pub kind: ValenceViolation,
}

/// Bonding electrons of `atom`, in half-bond units (two per single bond).
///
/// Aromatic bonds are shared out of the ring system: an atom with `k >= 2`
/// aromatic bonds receives `k + 1` bonds' worth (benzene carbon 3, fused
/// naphthalene carbon 4). A lone aromatic bond counts one and a half.
pub fn bonding_half_units(graph: &Graph<Atom, Bond>, atom: NodeIndex) -> i16 {
    let mut half = 0i16;
    let mut aromatic = 0i16;
    for e in graph.incident_edges(atom) {
        match graph.edge(e).order {
            BondOrder::Aromatic => aromatic += 1,
            order => half += order.half_units() as i16,
        }
    }
    half + aromatic_half_units(aromatic)
}

fn aromatic_half_units(k: i16) -> i16 {
    if k >= 2 {
        2 * (k + 1)
    } else {
        3 * k
    }
}

/// Checks the electron budget and shell capacity of one atom.
pub fn check_atom(graph: &Graph<Atom, Bond>, atom: NodeIndex) -> Result<(), InvalidValenceError> {
    let a = graph.vertex(atom);
    let half = bonding_half_units(graph, atom);
    let lp = a.lone_pairs as i16;
    let rad = a.radical_electrons as i16;
    let h = a.implicit_hydrogens as i16;

    let expected = 2 * (a.element.valence_electrons() as i16 - a.charge as i16);
    let found = 4 * lp + 2 * rad + half + 2 * h;
    if expected != found {
        return Err(InvalidValenceError {
            atom,
            element: a.element,
            kind: ValenceViolation::ElectronCount { expected, found },
        });
    }

    // half units of bonding equal the shared electrons around the atom
    let electrons = half + 2 * h + 2 * lp + rad;
    let capacity = a.element.shell_capacity();
    if electrons > capacity as i16 {
        return Err(InvalidValenceError {
            atom,
            element: a.element,
            kind: ValenceViolation::ShellOverflow {
                electrons,
                capacity,
            },
        });
    }
    Ok(())
}

/// First violation in vertex order.
pub fn check_all(graph: &Graph<Atom, Bond>) -> Result<(), InvalidValenceError> {
    graph.vertices().try_for_each(|v| check_atom(graph, v))
}

/// Lone pairs that balance the budget given everything else on the atom,
/// or `None` when no non-negative whole number does.
pub fn balancing_lone_pairs(graph: &Graph<Atom, Bond>, atom: NodeIndex) -> Option<u8> {
    let a = graph.vertex(atom);
    let rest = 2 * (a.element.valence_electrons() as i16 - a.charge as i16)
        - 2 * a.radical_electrons as i16
        - bonding_half_units(graph, atom)
        - 2 * a.implicit_hydrogens as i16;
    if rest < 0 || rest % 4 != 0 {
        return None;
    }
    u8::try_from(rest / 4).ok()
}

/// Formal charge that balances the budget, or `None` when the placed
/// electrons are not a whole number.
pub fn balancing_charge(graph: &Graph<Atom, Bond>, atom: NodeIndex) -> Option<i8> {
    let a = graph.vertex(atom);
    let placed = 4 * a.lone_pairs as i16
        + 2 * a.radical_electrons as i16
        + bonding_half_units(graph, atom)
        + 2 * a.implicit_hydrogens as i16;
    if placed % 2 != 0 {
        return None;
    }
    i8::try_from(a.element.valence_electrons() as i16 - placed / 2).ok()
}
