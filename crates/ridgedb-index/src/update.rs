//! Index updates produced by graph mutations.

use ridgedb_core::{Cardinality, SchemaId};
use tracing::trace;

use crate::document::MixedFieldValue;
use crate::index::{ElementRef, IndexEntry};

/// Whether an update adds or removes an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    /// Add the entry.
    Add,
    /// Remove the entry.
    Delete,
}

/// Add or remove one composite index entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeUpdate {
    /// Index id.
    pub index: SchemaId,
    /// Add or delete.
    pub kind: UpdateKind,
    /// Composite key.
    pub key: Vec<u8>,
    /// Entry under the key.
    pub entry: IndexEntry,
    /// Element the entry points at.
    pub element: ElementRef,
    /// Seconds until the entry expires.
    pub ttl: Option<u32>,
}

/// Add or remove one field value of a mixed index document.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedUpdate {
    /// Index id.
    pub index: SchemaId,
    /// Backing store name.
    pub store: String,
    /// Element whose document changes.
    pub element: ElementRef,
    /// Backend field name.
    pub field: String,
    /// Cardinality of the indexed key.
    pub cardinality: Cardinality,
    /// Add or delete.
    pub kind: UpdateKind,
    /// Field value with its auxiliary sub-fields.
    pub value: MixedFieldValue,
    /// Seconds until the document expires.
    pub ttl: Option<u32>,
}

impl MixedUpdate {
    /// Whether `other` touches the same value of the same document field.
    ///
    /// LIST values never share a target: each property relation holds its
    /// own entry, equal values included.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        self.cardinality != Cardinality::List
            && self.cardinality == other.cardinality
            && self.index == other.index
            && self.kind == other.kind
            && self.element == other.element
            && self.field == other.field
            && self.value.value == other.value.value
    }
}

/// A single index change.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexUpdate {
    /// Composite index entry change.
    Composite(CompositeUpdate),
    /// Mixed index document change.
    Mixed(MixedUpdate),
}

impl IndexUpdate {
    /// Index id.
    #[must_use]
    pub const fn index(&self) -> SchemaId {
        match self {
            Self::Composite(u) => u.index,
            Self::Mixed(u) => u.index,
        }
    }

    /// Add or delete.
    #[must_use]
    pub const fn kind(&self) -> UpdateKind {
        match self {
            Self::Composite(u) => u.kind,
            Self::Mixed(u) => u.kind,
        }
    }

    /// Whether this update adds an entry.
    #[must_use]
    pub const fn is_addition(&self) -> bool {
        matches!(self.kind(), UpdateKind::Add)
    }

    /// Seconds until the entry expires.
    #[must_use]
    pub const fn ttl(&self) -> Option<u32> {
        match self {
            Self::Composite(u) => u.ttl,
            Self::Mixed(u) => u.ttl,
        }
    }

    /// Element the update concerns.
    #[must_use]
    pub const fn element(&self) -> &ElementRef {
        match self {
            Self::Composite(u) => &u.element,
            Self::Mixed(u) => &u.element,
        }
    }
}

/// Smallest positive TTL, if any.
pub fn min_ttl(ttls: impl IntoIterator<Item = Option<u32>>) -> Option<u32> {
    ttls.into_iter().flatten().filter(|t| *t > 0).min()
}

/// A set of index updates without duplicates, in insertion order.
///
/// Repeated mixed updates of the same SINGLE or SET field value merge their
/// provenance tags instead of being added twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexUpdateSet {
    updates: Vec<IndexUpdate>,
}

impl IndexUpdateSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an update. Returns `false` if it was already present.
    pub fn insert(&mut self, update: IndexUpdate) -> bool {
        match update {
            IndexUpdate::Composite(ref c) => {
                if self.updates.iter().any(|u| matches!(u, IndexUpdate::Composite(e) if e == c)) {
                    return false;
                }
            }
            IndexUpdate::Mixed(ref m) => {
                let existing = self.updates.iter_mut().find_map(|u| match u {
                    IndexUpdate::Mixed(e) if e.same_target(m) => Some(e),
                    _ => None,
                });
                if let Some(existing) = existing {
                    existing.value.merge_dsr(&m.value.dsr);
                    trace!(field = %m.field, "merged repeated mixed update");
                    return false;
                }
            }
        }
        self.updates.push(update);
        true
    }

    /// Number of updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Iterate over the updates.
    pub fn iter(&self) -> impl Iterator<Item = &IndexUpdate> {
        self.updates.iter()
    }

    /// Composite updates only.
    pub fn composite(&self) -> impl Iterator<Item = &CompositeUpdate> {
        self.updates.iter().filter_map(|u| match u {
            IndexUpdate::Composite(c) => Some(c),
            IndexUpdate::Mixed(_) => None,
        })
    }

    /// Mixed updates only.
    pub fn mixed(&self) -> impl Iterator<Item = &MixedUpdate> {
        self.updates.iter().filter_map(|u| match u {
            IndexUpdate::Mixed(m) => Some(m),
            IndexUpdate::Composite(_) => None,
        })
    }

    /// Take the updates out.
    #[must_use]
    pub fn into_vec(self) -> Vec<IndexUpdate> {
        self.updates
    }
}

impl Extend<IndexUpdate> for IndexUpdateSet {
    fn extend<I: IntoIterator<Item = IndexUpdate>>(&mut self, iter: I) {
        for update in iter {
            self.insert(update);
        }
    }
}

impl IntoIterator for IndexUpdateSet {
    type Item = IndexUpdate;
    type IntoIter = std::vec::IntoIter<IndexUpdate>;

    fn into_iter(self) -> Self::IntoIter {
        self.updates.into_iter()
    }
}
