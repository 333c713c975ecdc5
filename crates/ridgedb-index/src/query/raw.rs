//! Backend-native query strings.
//!
//! Raw queries refer to keys as `<prefix><name>` or `<prefix>"<name>"`, for
//! example `v.name:ann AND v."home town":rome`. Before execution each
//! reference is replaced with the backend field name; `<prefix>*` becomes
//! the wildcard field.

use serde::Serialize;
use tracing::trace;

use super::IndexQueryTranslator;
use crate::error::{IndexError, IndexResult};
use crate::index::MixedIndex;

/// A raw query with key references resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawQuery {
    /// Backing store name.
    pub store: String,
    /// Index (document collection) name.
    pub index: String,
    /// Query string in the backend's syntax.
    pub query: String,
    /// Number of hits to skip.
    pub offset: usize,
    /// Maximum number of hits.
    pub limit: Option<usize>,
}

impl RawQuery {
    /// Skip the first `offset` hits.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Return at most `limit` hits.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Replace every key reference in `raw`.
///
/// A reference starts with `prefix` at the start of the string or after a
/// character that is not alphanumeric. The name is either quoted and runs
/// to the closing quote, or is the longest run of alphanumerics and `_`.
/// `resolve` maps a name to its field; names it does not know are replaced
/// by `fallback` when given.
///
/// # Errors
///
/// - [`IndexError::InvalidQuery`] for an unterminated quote or an unknown
///   name without fallback
/// - whatever `resolve` returns
///
/// ```
/// use ridgedb_index::query::substitute_keys;
///
/// let out = substitute_keys("v.name:ann OR v.\"home town\":rome", "v.", "*", None, |name| {
///     Ok(Some(format!("f_{}", name.replace(' ', "_"))))
/// })
/// .unwrap();
/// assert_eq!(out, "f_name:ann OR f_home_town:rome");
/// ```
pub fn substitute_keys(
    raw: &str,
    prefix: &str,
    wildcard: &str,
    fallback: Option<&str>,
    mut resolve: impl FnMut(&str) -> IndexResult<Option<String>>,
) -> IndexResult<String> {
    if prefix.is_empty() {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(prefix) {
        let start = raw.len() - rest.len() + pos;
        out.push_str(&rest[..pos]);
        let after = &rest[pos + prefix.len()..];
        let at_boundary = raw[..start].chars().next_back().map_or(true, |c| !c.is_alphanumeric());
        if !at_boundary {
            out.push_str(prefix);
            rest = after;
            continue;
        }

        let (name, consumed) = if let Some(quoted) = after.strip_prefix('"') {
            let end = quoted.find('"').ok_or_else(|| {
                IndexError::InvalidQuery(format!("unterminated quoted key in '{raw}'"))
            })?;
            (&quoted[..end], end + 2)
        } else if after.starts_with('*') {
            ("*", 1)
        } else {
            let end =
                after.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(after.len());
            (&after[..end], end)
        };

        if name.is_empty() {
            out.push_str(prefix);
            rest = after;
            continue;
        }
        if name == "*" {
            out.push_str(wildcard);
        } else {
            match (resolve(name)?, fallback) {
                (Some(field), _) => out.push_str(&field),
                (None, Some(fallback)) => out.push_str(fallback),
                (None, None) => {
                    return Err(IndexError::InvalidQuery(format!(
                        "unknown key '{name}' in raw query"
                    )));
                }
            }
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

impl IndexQueryTranslator<'_> {
    /// Resolve the key references of a raw query against `index`.
    ///
    /// Names are schema key names; keys the index does not cover use
    /// `fallback` if given.
    ///
    /// # Errors
    ///
    /// - [`IndexError::InvalidQuery`] as for [`substitute_keys`]
    /// - [`IndexError::SchemaViolation`] if an external index does not map
    ///   a referenced key
    pub fn translate_raw(
        &self,
        index: &MixedIndex,
        raw: &str,
        fallback: Option<&str>,
    ) -> IndexResult<RawQuery> {
        let query = substitute_keys(
            raw,
            &self.config.raw_query_prefix,
            &self.config.wildcard_field,
            fallback,
            |name| {
                let Some(key) = self.types.type_by_name(name) else {
                    return Ok(None);
                };
                match self.cache.resolve(index, key.id, self.types, self.defaults) {
                    Ok(field) => Ok(Some(field)),
                    Err(IndexError::InvalidQuery(_)) => Ok(None),
                    Err(e) => Err(e),
                }
            },
        )?;
        trace!(index = %index.name, %query, "resolved raw query");
        Ok(RawQuery {
            store: index.store.clone(),
            index: index.name.clone(),
            query,
            offset: 0,
            limit: None,
        })
    }
}
