//! Search backend queries against mixed indexes.
//!
//! Conditions lower to a JSON boolean query in the search backend's
//! dialect:
//!
//! | condition | query |
//! |---|---|
//! | `And` | `bool.filter` (empty: `match_all`) |
//! | `Or` | `bool.should` with `minimum_should_match: 1` (empty: `match_none`) |
//! | `Not` | `bool.must_not` |
//! | `=` / `!=` | `term`, negated `term` |
//! | `<` `<=` `>` `>=` | `range` |
//! | text predicates | `match`, `match_phrase`, `prefix`, `regexp`, `fuzzy` |
//! | geo distance | `geo_distance` |
//!
//! String predicates are gated by the field's [`Mapping`].

use ridgedb_core::{SchemaId, SortOrder, Value};
use serde::Serialize;
use serde_json::{json, Value as Json};

use super::{Cmp, Condition, Geo, IndexQueryTranslator, OrderBy, Predicate, Text};
use crate::document::value_to_json;
use crate::error::{IndexError, IndexResult};
use crate::index::{Mapping, MixedIndex};

/// A query document for one mixed index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedQuery {
    /// Backing store name.
    pub store: String,
    /// Index (document collection) name.
    pub index: String,
    /// Boolean query.
    pub query: Json,
    /// Sort clauses, most significant first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Json>,
}

impl MixedQuery {
    /// Request body for the backend's search endpoint.
    #[must_use]
    pub fn to_json(&self) -> Json {
        let mut body = json!({ "query": self.query });
        if !self.sort.is_empty() {
            body["sort"] = Json::Array(self.sort.clone());
        }
        body
    }
}

/// A key resolved against one index.
struct Field {
    name: String,
    mapping: Mapping,
}

impl IndexQueryTranslator<'_> {
    /// Query document answering `condition` on `index`, sorted by `order`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::InvalidQuery`] if a key is not indexed or disabled,
    ///   or a predicate does not apply to its value
    /// - [`IndexError::SchemaViolation`] if a string predicate or sort is
    ///   not allowed by the field's mapping, or an external index does
    ///   not map a key
    pub fn translate_mixed(
        &self,
        index: &MixedIndex,
        condition: &Condition,
        order: &[OrderBy],
    ) -> IndexResult<MixedQuery> {
        let query = self.lower(index, condition)?;
        let sort = order.iter().map(|o| self.sort_clause(index, o)).collect::<IndexResult<_>>()?;
        Ok(MixedQuery { store: index.store.clone(), index: index.name.clone(), query, sort })
    }

    fn lower(&self, index: &MixedIndex, condition: &Condition) -> IndexResult<Json> {
        match condition {
            Condition::And(children) if children.is_empty() => Ok(json!({ "match_all": {} })),
            Condition::Or(children) if children.is_empty() => Ok(json!({ "match_none": {} })),
            Condition::And(children) => {
                let filter = self.lower_all(index, children)?;
                Ok(json!({ "bool": { "filter": filter } }))
            }
            Condition::Or(children) => {
                let should = self.lower_all(index, children)?;
                Ok(json!({ "bool": { "should": should, "minimum_should_match": 1 } }))
            }
            Condition::Not(child) => {
                let inner = self.lower(index, child)?;
                Ok(json!({ "bool": { "must_not": [inner] } }))
            }
            Condition::Leaf { key, predicate, value } => {
                let field = self.field(index, *key)?;
                leaf(&field, *predicate, value, &self.config.string_suffix)
            }
        }
    }

    fn lower_all(&self, index: &MixedIndex, children: &[Condition]) -> IndexResult<Vec<Json>> {
        children.iter().map(|c| self.lower(index, c)).collect()
    }

    fn field(&self, index: &MixedIndex, key: SchemaId) -> IndexResult<Field> {
        let name = self.cache.resolve(index, key, self.types, self.defaults)?;
        let mapping = match index.field(key) {
            Some(f) if !f.status.is_maintained() => {
                return Err(IndexError::InvalidQuery(format!(
                    "field '{name}' of index '{}' is {}",
                    index.name,
                    f.status.as_str()
                )));
            }
            Some(f) => f.mapping,
            None => self.defaults.field(key).map(|d| d.mapping).unwrap_or_default(),
        };
        Ok(Field { name, mapping })
    }

    fn sort_clause(&self, index: &MixedIndex, order: &OrderBy) -> IndexResult<Json> {
        let field = self.field(index, order.key)?;
        let name = match field.mapping {
            Mapping::Text => {
                return Err(IndexError::SchemaViolation(format!(
                    "cannot sort on analyzed text field '{}'",
                    field.name
                )));
            }
            Mapping::TextString => format!("{}{}", field.name, self.config.string_suffix),
            Mapping::Default | Mapping::String => field.name,
        };
        let direction = match order.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        Ok(json!({ name: { "order": direction } }))
    }
}

fn leaf(field: &Field, predicate: Predicate, value: &Value, suffix: &str) -> IndexResult<Json> {
    match (value, predicate) {
        (Value::String(s), _) => string_leaf(field, predicate, s, suffix),
        (Value::Int(_) | Value::Float(_) | Value::Date(_), Predicate::Cmp(cmp)) => {
            Ok(compare(&field.name, cmp, value_to_json(value)))
        }
        (Value::Bool(_) | Value::Uuid(_), Predicate::Cmp(cmp @ (Cmp::Eq | Cmp::Ne))) => {
            Ok(compare(&field.name, cmp, value_to_json(value)))
        }
        (Value::Geo { lat, lon }, Predicate::Geo(Geo::WithinDistance(km))) => {
            if !km.is_finite() || km < 0.0 {
                return Err(IndexError::InvalidQuery(format!("invalid distance {km}")));
            }
            Ok(json!({
                "geo_distance": { "distance": format!("{km}km"), field.name.as_str(): [lon, lat] }
            }))
        }
        _ => Err(IndexError::InvalidQuery(format!(
            "predicate {predicate:?} does not apply to {:?} values of field '{}'",
            value.data_type(),
            field.name
        ))),
    }
}

fn string_leaf(field: &Field, predicate: Predicate, s: &str, suffix: &str) -> IndexResult<Json> {
    let exact = || format!("{}{suffix}", field.name);
    let rejected = || {
        Err(IndexError::SchemaViolation(format!(
            "predicate {predicate:?} is not allowed on {:?} field '{}'",
            field.mapping, field.name
        )))
    };
    match predicate {
        Predicate::Geo(_) => Err(IndexError::InvalidQuery(format!(
            "geo predicate on string value of field '{}'",
            field.name
        ))),
        Predicate::Cmp(cmp) => {
            let name = match field.mapping {
                Mapping::String => field.name.clone(),
                Mapping::TextString => exact(),
                Mapping::Text | Mapping::Default if cmp.is_ordering() => field.name.clone(),
                Mapping::Text | Mapping::Default => return rejected(),
            };
            Ok(compare(&name, cmp, Json::from(s)))
        }
        Predicate::Text(text) if text.is_contains() => {
            if !field.mapping.is_analyzed() {
                return rejected();
            }
            Ok(contains(&field.name, text, s))
        }
        Predicate::Text(text) => {
            let name = match field.mapping {
                Mapping::String => field.name.clone(),
                Mapping::TextString => exact(),
                Mapping::Text | Mapping::Default => return rejected(),
            };
            Ok(pattern(&name, text, s))
        }
    }
}

fn compare(name: &str, cmp: Cmp, value: Json) -> Json {
    let op = match cmp {
        Cmp::Eq => return json!({ "term": { name: value } }),
        Cmp::Ne => return json!({ "bool": { "must_not": [{ "term": { name: value } }] } }),
        Cmp::Lt => "lt",
        Cmp::Lte => "lte",
        Cmp::Gt => "gt",
        Cmp::Gte => "gte",
    };
    json!({ "range": { name: { op: value } } })
}

fn contains(name: &str, text: Text, s: &str) -> Json {
    match text {
        Text::ContainsPhrase => json!({ "match_phrase": { name: s } }),
        Text::ContainsPrefix => json!({ "prefix": { name: s.to_lowercase() } }),
        Text::ContainsRegex => json!({ "regexp": { name: s } }),
        Text::ContainsFuzzy => {
            json!({ "match": { name: { "query": s, "operator": "and", "fuzziness": "AUTO" } } })
        }
        _ => json!({ "match": { name: { "query": s, "operator": "and" } } }),
    }
}

fn pattern(name: &str, text: Text, s: &str) -> Json {
    match text {
        Text::Prefix => json!({ "prefix": { name: s } }),
        Text::Regex => json!({ "regexp": { name: s } }),
        _ => json!({ "fuzzy": { name: { "value": s, "fuzziness": "AUTO" } } }),
    }
}
