//! Mixed index documents.
//!
//! Each indexed field of a document holds one [`MixedFieldValue`] for
//! SINGLE keys and an array of them for SET and LIST keys:
//!
//! ```json
//! {
//!   "name": { "value": "ann", "dsr": ["crm"] },
//!   "visits": [
//!     { "value": "rome", "startDate": "2019-01-01T00:00:00.000Z", "geo": [12.5, 41.9] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use ridgedb_core::{Cardinality, SchemaId, Value};
use serde::{Deserialize, Serialize};

use crate::update::{IndexUpdate, MixedUpdate, UpdateKind};

/// One value of a document field with its auxiliary sub-fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedFieldValue {
    /// The indexed value.
    pub value: serde_json::Value,
    /// Start of validity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// End of validity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Location as `[lon, lat]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<[f64; 2]>,
    /// Role of the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Provenance tags, sorted and unique.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dsr: Vec<String>,
}

impl MixedFieldValue {
    /// A value without auxiliary sub-fields.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self { value, start_date: None, end_date: None, geo: None, role: None, dsr: Vec::new() }
    }

    /// Add provenance tags.
    #[must_use]
    pub fn with_dsr(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        let tags: Vec<String> = tags.into_iter().collect();
        self.merge_dsr(&tags);
        self
    }

    /// Merge provenance tags, keeping them sorted and unique.
    pub fn merge_dsr(&mut self, tags: &[String]) {
        self.dsr.extend(tags.iter().cloned());
        self.dsr.sort();
        self.dsr.dedup();
    }
}

/// JSON form of a property value as handed to the search backend.
///
/// Dates become RFC 3339 strings with millisecond precision, geo points
/// `[lon, lat]` arrays and bytes lowercase hex. Non-finite floats become
/// `null`.
#[must_use]
pub fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::String(s) => Json::String(s.clone()),
        Value::Date(d) => Json::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Value::Uuid(u) => Json::String(u.to_string()),
        Value::Geo { lat, lon } => serde_json::json!([lon, lat]),
        Value::Bytes(b) => Json::String(b.iter().map(|byte| format!("{byte:02x}")).collect()),
    }
}

/// Meta-property keys whose values become auxiliary sub-fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryKeys {
    /// Date key for `startDate`.
    pub start_date: Option<SchemaId>,
    /// Date key for `endDate`.
    pub end_date: Option<SchemaId>,
    /// Geo key for `geo`.
    pub geo: Option<SchemaId>,
    /// String key for `role`.
    pub role: Option<SchemaId>,
    /// String key for `dsr`.
    pub dsr: Option<SchemaId>,
}

impl AuxiliaryKeys {
    /// No auxiliary sub-fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validity start key.
    #[must_use]
    pub const fn start_date(mut self, key: SchemaId) -> Self {
        self.start_date = Some(key);
        self
    }

    /// Set the validity end key.
    #[must_use]
    pub const fn end_date(mut self, key: SchemaId) -> Self {
        self.end_date = Some(key);
        self
    }

    /// Set the location key.
    #[must_use]
    pub const fn geo(mut self, key: SchemaId) -> Self {
        self.geo = Some(key);
        self
    }

    /// Set the role key.
    #[must_use]
    pub const fn role(mut self, key: SchemaId) -> Self {
        self.role = Some(key);
        self
    }

    /// Set the provenance key.
    #[must_use]
    pub const fn dsr(mut self, key: SchemaId) -> Self {
        self.dsr = Some(key);
        self
    }

    /// Field value for `value`, with sub-fields taken from `meta`.
    ///
    /// Meta values of the wrong type are ignored.
    #[must_use]
    pub fn field_value(&self, value: &Value, meta: &BTreeMap<SchemaId, Value>) -> MixedFieldValue {
        let get = |key: Option<SchemaId>| key.and_then(|k| meta.get(&k));
        MixedFieldValue {
            value: value_to_json(value),
            start_date: get(self.start_date).and_then(Value::as_date),
            end_date: get(self.end_date).and_then(Value::as_date),
            geo: get(self.geo).and_then(Value::as_lon_lat).map(|(lon, lat)| [lon, lat]),
            role: get(self.role).and_then(Value::as_str).map(str::to_owned),
            dsr: get(self.dsr)
                .and_then(Value::as_str)
                .map(|s| vec![s.to_owned()])
                .unwrap_or_default(),
        }
    }
}

/// Content of one document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSlot {
    /// SINGLE keys.
    Single(MixedFieldValue),
    /// SET and LIST keys.
    Many(Vec<MixedFieldValue>),
}

/// A search-backend document assembled from mixed updates.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedDocument {
    /// Index id.
    pub index: SchemaId,
    /// Backing store name.
    pub store: String,
    /// Document id.
    pub id: String,
    fields: BTreeMap<String, FieldSlot>,
}

impl MixedDocument {
    /// An empty document.
    #[must_use]
    pub fn new(index: SchemaId, store: impl Into<String>, id: impl Into<String>) -> Self {
        Self { index, store: store.into(), id: id.into(), fields: BTreeMap::new() }
    }

    /// Group the mixed updates in `updates` into documents, in first-seen order.
    #[must_use]
    pub fn assemble<'a>(updates: impl IntoIterator<Item = &'a IndexUpdate>) -> Vec<Self> {
        let mut docs: Vec<Self> = Vec::new();
        for update in updates {
            let IndexUpdate::Mixed(m) = update else { continue };
            let id = m.element.document_id();
            match docs.iter_mut().find(|d| d.index == m.index && d.id == id) {
                Some(doc) => doc.apply(m),
                None => {
                    let mut doc = Self::new(m.index, m.store.clone(), id);
                    doc.apply(m);
                    docs.push(doc);
                }
            }
        }
        docs
    }

    /// Apply one field update.
    ///
    /// SINGLE fields are replaced or cleared. SET fields hold each value
    /// once, LIST fields keep duplicates and drop one per deletion.
    pub fn apply(&mut self, update: &MixedUpdate) {
        let field = update.field.clone();
        match (update.kind, update.cardinality) {
            (UpdateKind::Add, Cardinality::Single) => {
                self.fields.insert(field, FieldSlot::Single(update.value.clone()));
            }
            (UpdateKind::Add, cardinality) => {
                let slot = self.fields.entry(field).or_insert_with(|| FieldSlot::Many(Vec::new()));
                if matches!(slot, FieldSlot::Single(_)) {
                    *slot = FieldSlot::Many(Vec::new());
                }
                let FieldSlot::Many(values) = slot else { return };
                let existing = values.iter_mut().find(|v| v.value == update.value.value);
                match existing {
                    Some(v) if cardinality == Cardinality::Set => v.merge_dsr(&update.value.dsr),
                    _ => values.push(update.value.clone()),
                }
            }
            (UpdateKind::Delete, Cardinality::Single) => {
                self.fields.remove(&field);
            }
            (UpdateKind::Delete, _) => {
                if let Some(FieldSlot::Many(values)) = self.fields.get_mut(&field) {
                    if let Some(pos) = values.iter().position(|v| v.value == update.value.value) {
                        values.remove(pos);
                    }
                    if values.is_empty() {
                        self.fields.remove(&field);
                    }
                }
            }
        }
    }

    /// Content of a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.get(name)
    }

    /// Whether the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document body as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(name, slot)| {
                    (name.clone(), serde_json::to_value(slot).unwrap_or(serde_json::Value::Null))
                })
                .collect(),
        )
    }
}
