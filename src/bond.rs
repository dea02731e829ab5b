/// Bond multiplicity. The discriminant is the ordinal used for ordering and
/// canonical strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BondOrder {
    #[default]
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}

impl BondOrder {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Bond order in half-bond units: 2, 4, 6, and 3 for aromatic.
    pub fn half_units(self) -> u8 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Aromatic => 3,
        }
    }

    /// The next higher localized order. Aromatic bonds have none.
    pub fn increment(self) -> Option<BondOrder> {
        match self {
            BondOrder::Single => Some(BondOrder::Double),
            BondOrder::Double => Some(BondOrder::Triple),
            BondOrder::Triple | BondOrder::Aromatic => None,
        }
    }

    pub fn decrement(self) -> Option<BondOrder> {
        match self {
            BondOrder::Double => Some(BondOrder::Single),
            BondOrder::Triple => Some(BondOrder::Double),
            BondOrder::Single | BondOrder::Aromatic => None,
        }
    }

    pub fn is_multiple(self) -> bool {
        matches!(self, BondOrder::Double | BondOrder::Triple)
    }
}

/// Edge payload of a [`Molecule`](crate::Molecule).
///
/// `is_aromatic` records ring aromaticity independently of `order`: a
/// kekulized benzene keeps the flag while its orders become single and
/// double.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bond {
    pub order: BondOrder,
    pub is_aromatic: bool,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: order == BondOrder::Aromatic,
        }
    }
}

impl From<BondOrder> for Bond {
    fn from(order: BondOrder) -> Self {
        Bond::new(order)
    }
}
