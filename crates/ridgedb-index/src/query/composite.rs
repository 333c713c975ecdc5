//! Equality lookups against composite indexes.

use std::collections::BTreeMap;

use ridgedb_core::{SchemaId, Value};
use serde::Serialize;
use tracing::trace;

use super::{Cmp, Condition, IndexQueryTranslator, Predicate};
use crate::error::{IndexError, IndexResult};
use crate::index::CompositeIndex;

/// Keys to fetch from a composite index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeQuery {
    /// Index id.
    pub index: SchemaId,
    /// Distinct keys, in field-value order of the expansion.
    pub keys: Vec<Vec<u8>>,
}

impl IndexQueryTranslator<'_> {
    /// Keys answering `condition` on `index`.
    ///
    /// The condition must constrain every field by equality, alone or as an
    /// OR of equalities on the same key. Alternatives expand to the
    /// cartesian product of keys; repeated constraints on one key intersect.
    ///
    /// # Errors
    ///
    /// - [`IndexError::InvalidQuery`] for any other condition shape, keys
    ///   outside the index, or disabled indexes
    /// - [`IndexError::Core`] if a value does not fit its key
    pub fn translate_composite(
        &self,
        index: &CompositeIndex,
        condition: &Condition,
    ) -> IndexResult<CompositeQuery> {
        if !index.status.is_maintained() {
            return Err(IndexError::InvalidQuery(format!("index '{}' is disabled", index.name)));
        }
        let mut constraints: BTreeMap<SchemaId, Vec<Value>> = BTreeMap::new();
        collect(condition, &mut constraints)?;

        let mut alternatives = Vec::with_capacity(index.fields.len());
        for field in &index.fields {
            let values = constraints.remove(field).ok_or_else(|| {
                IndexError::InvalidQuery(format!(
                    "index '{}' needs an equality on key {field}",
                    index.name
                ))
            })?;
            alternatives.push(values);
        }
        if let Some(key) = constraints.keys().next() {
            return Err(IndexError::InvalidQuery(format!(
                "key {key} is not covered by index '{}'",
                index.name
            )));
        }

        let mut keys: Vec<Vec<u8>> = Vec::new();
        let mut combination = Vec::with_capacity(alternatives.len());
        expand(&alternatives, &mut combination, &mut |values| {
            let key = self.keys.build_key(index, values, self.types)?;
            if !keys.contains(&key) {
                keys.push(key);
            }
            Ok(())
        })?;
        trace!(index = %index.name, keys = keys.len(), "translated composite query");
        Ok(CompositeQuery { index: index.id, keys })
    }
}

fn collect(
    condition: &Condition,
    constraints: &mut BTreeMap<SchemaId, Vec<Value>>,
) -> IndexResult<()> {
    match condition {
        Condition::And(children) => {
            for child in children {
                collect(child, constraints)?;
            }
            Ok(())
        }
        Condition::Or(children) => {
            let mut key = None;
            let mut values = Vec::with_capacity(children.len());
            for child in children {
                let (k, v) = equality(child)?;
                if key.is_some_and(|seen| seen != k) {
                    return Err(IndexError::InvalidQuery(
                        "OR branches of a composite query must constrain the same key".into(),
                    ));
                }
                key = Some(k);
                if !values.contains(v) {
                    values.push(v.clone());
                }
            }
            match key {
                Some(k) => {
                    constrain(constraints, k, values);
                    Ok(())
                }
                None => Err(IndexError::InvalidQuery("empty OR in composite query".into())),
            }
        }
        Condition::Leaf { .. } => {
            let (k, v) = equality(condition)?;
            constrain(constraints, k, vec![v.clone()]);
            Ok(())
        }
        Condition::Not(_) => {
            Err(IndexError::InvalidQuery("composite indexes cannot answer negations".into()))
        }
    }
}

fn equality(condition: &Condition) -> IndexResult<(SchemaId, &Value)> {
    match condition {
        Condition::Leaf { key, predicate: Predicate::Cmp(Cmp::Eq), value } => Ok((*key, value)),
        _ => Err(IndexError::InvalidQuery(
            "composite indexes only answer equality conditions".into(),
        )),
    }
}

fn constrain(constraints: &mut BTreeMap<SchemaId, Vec<Value>>, key: SchemaId, values: Vec<Value>) {
    match constraints.get_mut(&key) {
        Some(existing) => existing.retain(|v| values.contains(v)),
        None => {
            constraints.insert(key, values);
        }
    }
}

fn expand(
    alternatives: &[Vec<Value>],
    combination: &mut Vec<Value>,
    emit: &mut dyn FnMut(&[Value]) -> IndexResult<()>,
) -> IndexResult<()> {
    let Some(values) = alternatives.get(combination.len()) else {
        return emit(combination);
    };
    for value in values {
        combination.push(value.clone());
        expand(alternatives, combination, emit)?;
        combination.pop();
    }
    Ok(())
}
