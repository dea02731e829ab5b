//! Element data needed for electron bookkeeping.
//!
//! Only the main-group elements that appear in gas-phase and combustion
//! mechanisms are covered. Each carries its valence electron count and the
//! maximum number of electrons its outer shell may hold, which together
//! bound every legal electron placement on an atom.

/// Chemical elements known to the molecular graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    Br = 35,
    I = 53,
}

const ALL: [Element; 15] = [
    Element::H,
    Element::He,
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::F,
    Element::Ne,
    Element::Si,
    Element::P,
    Element::S,
    Element::Cl,
    Element::Ar,
    Element::Br,
    Element::I,
];

impl Element {
    pub fn all() -> &'static [Element] {
        &ALL
    }

    pub fn from_atomic_num(n: u8) -> Option<Element> {
        ALL.iter().copied().find(|e| e.atomic_num() == n)
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        ALL.iter().copied().find(|e| e.symbol() == s)
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Element::H => "H",
            Element::He => "He",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Ne => "Ne",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Ar => "Ar",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    /// Electrons in the neutral atom's outer shell.
    pub fn valence_electrons(self) -> u8 {
        match self {
            Element::H => 1,
            Element::He => 2,
            Element::B => 3,
            Element::C | Element::Si => 4,
            Element::N | Element::P => 5,
            Element::O | Element::S => 6,
            Element::F | Element::Cl | Element::Br | Element::I => 7,
            Element::Ne | Element::Ar => 8,
        }
    }

    /// Row of the periodic table.
    pub fn period(self) -> u8 {
        match self.atomic_num() {
            1..=2 => 1,
            3..=10 => 2,
            11..=18 => 3,
            19..=36 => 4,
            _ => 5,
        }
    }

    /// Upper bound on electrons (shared and unshared) around the atom.
    ///
    /// Period 1 holds a duet and period 2 an octet. Heavier atoms may
    /// expand their octet up to six electron pairs (SF6, PCl5).
    pub fn shell_capacity(self) -> u8 {
        match self.period() {
            1 => 2,
            2 => 8,
            _ => 12,
        }
    }

    /// Common neutral valences, lowest first.
    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C | Element::Si => &[4],
            Element::N => &[3],
            Element::P => &[3, 5],
            Element::O => &[2],
            Element::S => &[2, 4, 6],
            Element::F | Element::Cl | Element::Br => &[1],
            Element::I => &[1, 3, 5, 7],
            Element::He | Element::Ne | Element::Ar => &[0],
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
