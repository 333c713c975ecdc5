//! Byte ranges for adjacency-list scans.
//!
//! A [`SliceRange`] is a half-open `[start, end)` interval over record keys
//! that selects the relations of one type and direction, optionally
//! narrowed by constraints on the type's sort key and by the adjacent
//! vertex.

use std::ops::Bound;

use tracing::trace;

use super::cursor::ByteWriter;
use super::keys::{next_bigger, HeaderDirection, RecordHeader};
use super::relation::{write_header, write_inline, Layout};
use crate::error::{CoreError, CoreResult};
use crate::schema::{RelationType, SortOrder, TypeInspector};
use crate::types::{Direction, Value, VertexId};

/// Constraint on one sort-key field.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKeyInterval {
    /// Exactly this value.
    Point(Value),
    /// Values between two bounds.
    Range {
        /// Lower bound.
        start: Bound<Value>,
        /// Upper bound.
        end: Bound<Value>,
    },
}

impl SortKeyInterval {
    /// Half-open interval `[start, end)`.
    #[must_use]
    pub fn half_open(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self::Range { start: Bound::Included(start.into()), end: Bound::Excluded(end.into()) }
    }

    /// Closed interval `[start, end]`.
    #[must_use]
    pub fn closed(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self::Range { start: Bound::Included(start.into()), end: Bound::Included(end.into()) }
    }
}

/// Half-open key range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceRange {
    /// Inclusive lower bound.
    pub start: Vec<u8>,
    /// Exclusive upper bound.
    pub end: Vec<u8>,
}

impl SliceRange {
    /// Whether `key` falls inside the range.
    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.start.as_slice() && key < self.end.as_slice()
    }
}

/// Builds [`SliceRange`]s. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliceRangeBuilder;

impl SliceRangeBuilder {
    /// Range over relations of `ty` seen in `direction`.
    ///
    /// `intervals` constrain the sort-key fields in order: leading points,
    /// then at most one range, which ends the walk. `adjacent` narrows to
    /// one other vertex; it applies to edges whose other vertex follows
    /// the (fully pointed) sort key in the key.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] if there are more intervals than sort-key
    ///   fields, a range is followed by further intervals, `BOTH` is
    ///   combined with constraints, or `adjacent` cannot narrow this type
    /// - [`CoreError::TypeMismatch`] if a bound does not fit its key
    pub fn build(
        ty: &RelationType,
        direction: Direction,
        intervals: &[SortKeyInterval],
        adjacent: Option<&VertexId>,
        types: &dyn TypeInspector,
    ) -> CoreResult<SliceRange> {
        if direction == Direction::Both && !ty.is_property_key() {
            if !intervals.is_empty() || adjacent.is_some() {
                return Err(CoreError::Validation(
                    "BOTH direction cannot be combined with sort-key constraints".into(),
                ));
            }
            let header = |slot: HeaderDirection| {
                RecordHeader { type_id: ty.id, direction: slot, invisible: ty.invisible }
                    .to_bytes()
            };
            let range = SliceRange {
                start: header(HeaderDirection::EdgeOut)?,
                end: next_bigger(&header(HeaderDirection::EdgeIn)?)?,
            };
            trace!(type_id = %ty.id, "built BOTH slice range");
            return Ok(range);
        }
        let direction = if ty.is_property_key() { Direction::Out } else { direction };

        if intervals.len() > ty.sort_key.len() {
            return Err(CoreError::Validation(format!(
                "{} intervals for sort key of length {}",
                intervals.len(),
                ty.sort_key.len()
            )));
        }
        if let Some(pos) = intervals.iter().position(|i| matches!(i, SortKeyInterval::Range { .. }))
        {
            if pos + 1 != intervals.len() {
                return Err(CoreError::Validation(
                    "a range interval must be the last sort-key constraint".into(),
                ));
            }
        }

        let mut start = ByteWriter::with_capacity(32);
        let mut end = ByteWriter::with_capacity(32);
        write_header(&mut start, ty, direction)?;
        write_header(&mut end, ty, direction)?;
        let sort_key_start = start.position();

        let mut range = None;
        for (key, interval) in ty.sort_key.iter().zip(intervals) {
            let declared = types.key_data_type(*key)?;
            match interval {
                SortKeyInterval::Point(value) => {
                    write_inline(&mut start, Some(value), declared)?;
                    write_inline(&mut end, Some(value), declared)?;
                }
                SortKeyInterval::Range { start: lo, end: hi } => {
                    if let Bound::Included(v) | Bound::Excluded(v) = lo {
                        write_inline(&mut start, Some(v), declared)?;
                    }
                    if let Bound::Included(v) | Bound::Excluded(v) = hi {
                        write_inline(&mut end, Some(v), declared)?;
                    }
                    range = Some((lo, hi));
                }
            }
        }

        if ty.sort_order == SortOrder::Desc {
            let (s, e) = (start.position(), end.position());
            start.flip_range(sort_key_start, s);
            end.flip_range(sort_key_start, e);
        }

        let slice = match range {
            None => {
                if let Some(vertex) = adjacent {
                    let layout = Layout::of(ty, direction);
                    let narrows = !ty.is_property_key()
                        && match layout {
                            Layout::Unconstrained => intervals.len() == ty.sort_key.len(),
                            Layout::Constrained => true,
                            Layout::Unique => false,
                        };
                    if !narrows {
                        return Err(CoreError::Validation(format!(
                            "adjacent vertex cannot narrow a slice of type '{}'",
                            ty.name
                        )));
                    }
                    start.put_escaped(vertex.as_str().as_bytes());
                }
                let start = start.into_bytes();
                let end = next_bigger(&start)?;
                SliceRange { start, end }
            }
            Some((lo, hi)) => {
                if adjacent.is_some() {
                    return Err(CoreError::Validation(
                        "adjacent vertex cannot follow a sort-key range".into(),
                    ));
                }
                let (start, end) = (start.into_bytes(), end.into_bytes());
                match ty.sort_order {
                    SortOrder::Asc => SliceRange {
                        start: match lo {
                            Bound::Excluded(_) => next_bigger(&start)?,
                            Bound::Included(_) | Bound::Unbounded => start,
                        },
                        end: match hi {
                            Bound::Excluded(_) => end,
                            Bound::Included(_) | Bound::Unbounded => next_bigger(&end)?,
                        },
                    },
                    // Flipped bytes invert the order: the upper value bound
                    // becomes the lower byte bound.
                    SortOrder::Desc => SliceRange {
                        start: match hi {
                            Bound::Excluded(_) => next_bigger(&end)?,
                            Bound::Included(_) | Bound::Unbounded => end,
                        },
                        end: match lo {
                            Bound::Excluded(_) => start,
                            Bound::Included(_) | Bound::Unbounded => next_bigger(&start)?,
                        },
                    },
                }
            }
        };
        trace!(type_id = %ty.id, ?direction, constraints = intervals.len(), "built slice range");
        Ok(slice)
    }
}
