//! Multiplicity, cardinality and sort order of relation types.

use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// How many values a vertex may hold for one property key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// At most one value.
    Single,
    /// Distinct values.
    Set,
    /// Any values, duplicates allowed.
    List,
}

/// Uniqueness constraint on relations of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    /// No constraint; parallel relations coexist.
    Multi,
    /// At most one relation per vertex pair (or per distinct value).
    Simple,
    /// At most one outgoing relation per vertex.
    Many2One,
    /// At most one incoming relation per vertex.
    One2Many,
    /// At most one relation per vertex in either direction.
    One2One,
}

impl Multiplicity {
    /// Whether any uniqueness constraint applies.
    #[must_use]
    pub const fn is_constrained(self) -> bool {
        !matches!(self, Self::Multi)
    }

    /// Whether a vertex may hold at most one relation in `direction`.
    #[must_use]
    pub const fn is_unique(self, direction: Direction) -> bool {
        match direction {
            Direction::Out => matches!(self, Self::Many2One | Self::One2One),
            Direction::In => matches!(self, Self::One2Many | Self::One2One),
            Direction::Both => matches!(self, Self::One2One),
        }
    }

    /// Multiplicity implied by a property cardinality.
    #[must_use]
    pub const fn from_cardinality(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Single => Self::Many2One,
            Cardinality::Set => Self::Simple,
            Cardinality::List => Self::Multi,
        }
    }

    /// Property cardinality corresponding to this multiplicity.
    #[must_use]
    pub const fn cardinality(self) -> Cardinality {
        match self {
            Self::Multi => Cardinality::List,
            Self::Simple => Cardinality::Set,
            Self::Many2One | Self::One2Many | Self::One2One => Cardinality::Single,
        }
    }
}

/// Order in which relations of one type are laid out by sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending byte order.
    #[default]
    Asc,
    /// Descending; the sort-key bytes are flipped.
    Desc,
}
