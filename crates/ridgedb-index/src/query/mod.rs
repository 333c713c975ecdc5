//! Index query translation.
//!
//! A [`Condition`] tree over property keys is translated for one index:
//!
//! - composite indexes answer conjunctions of equalities; the result is the
//!   set of composite keys to fetch ([`CompositeQuery`])
//! - mixed indexes answer boolean combinations of compare, text and geo
//!   predicates; the result is a backend query document ([`MixedQuery`])
//! - raw backend query strings get their key references rewritten to
//!   backend field names ([`RawQuery`])

mod composite;
mod mixed;
mod raw;

use ridgedb_core::{SchemaId, SortOrder, TypeInspector, Value};

pub use composite::CompositeQuery;
pub use mixed::MixedQuery;
pub use raw::{substitute_keys, RawQuery};

use crate::cache::SchemaCache;
use crate::config::IndexConfig;
use crate::defaults::DefaultFieldRegistry;
use crate::error::IndexResult;
use crate::index::{CompositeKeyCodec, IndexDefinition};

/// Relational comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
}

impl Cmp {
    /// Whether this is an ordering comparison.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }
}

/// String predicate.
///
/// The `Contains*` family matches tokens of analyzed text; the others match
/// the whole string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Text {
    /// Every token of the query occurs.
    Contains,
    /// The tokens occur as a phrase.
    ContainsPhrase,
    /// Some token starts with the query.
    ContainsPrefix,
    /// Some token matches the regular expression.
    ContainsRegex,
    /// Every token of the query occurs, allowing typos.
    ContainsFuzzy,
    /// The string starts with the query.
    Prefix,
    /// The string matches the regular expression.
    Regex,
    /// The string equals the query, allowing typos.
    Fuzzy,
}

impl Text {
    /// Whether this predicate matches tokens of analyzed text.
    #[must_use]
    pub const fn is_contains(self) -> bool {
        matches!(
            self,
            Self::Contains
                | Self::ContainsPhrase
                | Self::ContainsPrefix
                | Self::ContainsRegex
                | Self::ContainsFuzzy
        )
    }
}

/// Geographic predicate against a point value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geo {
    /// Within this many kilometers of the point.
    WithinDistance(f64),
}

/// Predicate of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// Comparison.
    Cmp(Cmp),
    /// String predicate.
    Text(Text),
    /// Geographic predicate.
    Geo(Geo),
}

/// Boolean condition over property keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// All children hold. Empty means true.
    And(Vec<Condition>),
    /// Some child holds. Empty means false.
    Or(Vec<Condition>),
    /// The child does not hold.
    Not(Box<Condition>),
    /// `key predicate value`.
    Leaf {
        /// Property key.
        key: SchemaId,
        /// Predicate.
        predicate: Predicate,
        /// Right-hand side.
        value: Value,
    },
}

impl Condition {
    /// Leaf condition.
    #[must_use]
    pub fn leaf(key: SchemaId, predicate: Predicate, value: impl Into<Value>) -> Self {
        Self::Leaf { key, predicate, value: value.into() }
    }

    /// `key == value`.
    #[must_use]
    pub fn equals(key: SchemaId, value: impl Into<Value>) -> Self {
        Self::leaf(key, Predicate::Cmp(Cmp::Eq), value)
    }

    /// `key` satisfies a comparison.
    #[must_use]
    pub fn compare(key: SchemaId, cmp: Cmp, value: impl Into<Value>) -> Self {
        Self::leaf(key, Predicate::Cmp(cmp), value)
    }

    /// `key` satisfies a string predicate.
    #[must_use]
    pub fn text(key: SchemaId, text: Text, value: impl Into<String>) -> Self {
        Self::leaf(key, Predicate::Text(text), Value::String(value.into()))
    }

    /// Negation.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Sort instruction for mixed queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    /// Property key.
    pub key: SchemaId,
    /// Direction.
    pub order: SortOrder,
}

impl OrderBy {
    /// Ascending by `key`.
    #[must_use]
    pub const fn asc(key: SchemaId) -> Self {
        Self { key, order: SortOrder::Asc }
    }

    /// Descending by `key`.
    #[must_use]
    pub const fn desc(key: SchemaId) -> Self {
        Self { key, order: SortOrder::Desc }
    }
}

/// A condition translated for one index.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatedQuery {
    /// Keys to fetch from a composite index.
    Composite(CompositeQuery),
    /// Query document for a search backend.
    Mixed(MixedQuery),
}

/// Translates conditions into index queries.
///
/// Stateless apart from the shared field-name cache, which it only reads
/// through; it never registers fields.
pub struct IndexQueryTranslator<'a> {
    types: &'a dyn TypeInspector,
    cache: &'a SchemaCache,
    defaults: &'a DefaultFieldRegistry,
    config: &'a IndexConfig,
    keys: CompositeKeyCodec,
}

impl<'a> IndexQueryTranslator<'a> {
    /// Create a translator.
    #[must_use]
    pub const fn new(
        types: &'a dyn TypeInspector,
        cache: &'a SchemaCache,
        defaults: &'a DefaultFieldRegistry,
        config: &'a IndexConfig,
    ) -> Self {
        Self { types, cache, defaults, config, keys: CompositeKeyCodec::from_config(config) }
    }

    /// Translate `condition` and `order` for `index`.
    ///
    /// Composite results are unordered; `order` only applies to mixed
    /// indexes.
    ///
    /// # Errors
    ///
    /// - [`IndexError::InvalidQuery`](crate::IndexError::InvalidQuery) if the
    ///   index cannot answer the condition
    /// - [`IndexError::SchemaViolation`](crate::IndexError::SchemaViolation)
    ///   if a predicate is not allowed by a field's mapping
    pub fn translate(
        &self,
        index: &IndexDefinition,
        condition: &Condition,
        order: &[OrderBy],
    ) -> IndexResult<TranslatedQuery> {
        match index {
            IndexDefinition::Composite(c) => {
                self.translate_composite(c, condition).map(TranslatedQuery::Composite)
            }
            IndexDefinition::Mixed(m) => {
                self.translate_mixed(m, condition, order).map(TranslatedQuery::Mixed)
            }
        }
    }
}
