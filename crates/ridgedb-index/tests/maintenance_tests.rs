//! Integration tests for index maintenance.

use std::cell::RefCell;

use proptest::prelude::*;
use ridgedb_core::schema::VertexLabel;
use ridgedb_core::{
    Cardinality, DataType, ElementCategory, Relation, RelationType, Schema, SchemaId, Value, Vertex,
    VertexProperty,
};
use ridgedb_index::{
    AuxiliaryKeys, BackendError, CompositeIndex, CompositeKeyCodec, Condition, DefaultFieldRegistry,
    ElementRef, FieldRegistrar, FieldSlot, HashLength, IndexCatalog, IndexConfig, IndexMatcher,
    IndexQueryTranslator, IndexUpdate, IndexUpdatePlanner, IndexUpdateSet, Mapping, MixedDocument,
    MixedField, MixedIndex, Mutation, SchemaCache, Text, UpdateKind,
};
use serde_json::json;

const NAME: SchemaId = SchemaId::new(20);
const CITY: SchemaId = SchemaId::new(21);
const SINCE: SchemaId = SchemaId::new(22);
const NOTES: SchemaId = SchemaId::new(23);
const SOURCE: SchemaId = SchemaId::new(24);
const KNOWS: SchemaId = SchemaId::new(30);
const PERSON: SchemaId = SchemaId::new(40);

const BY_NAME_CITY: SchemaId = SchemaId::new(100);
const BY_SINCE: SchemaId = SchemaId::new(101);
const SEARCH: SchemaId = SchemaId::new(200);

fn schema() -> Schema {
    let mut s = Schema::new();
    for ty in [
        RelationType::property_key(NAME, "name", DataType::String)
            .with_cardinality(Cardinality::Set)
            .with_ttl(600),
        RelationType::property_key(CITY, "city", DataType::String)
            .with_cardinality(Cardinality::List),
        RelationType::property_key(SINCE, "since", DataType::Int).with_ttl(30),
        RelationType::property_key(NOTES, "notes", DataType::String),
        RelationType::property_key(SOURCE, "source", DataType::String),
        RelationType::edge_label(KNOWS, "knows"),
    ] {
        s.add_type(ty).unwrap();
    }
    s.add_vertex_label(VertexLabel::new(PERSON, "person").with_ttl(60)).unwrap();
    s
}

fn by_name_city() -> CompositeIndex {
    CompositeIndex::builder(BY_NAME_CITY, "by_name_city", ElementCategory::Vertex)
        .field(NAME)
        .field(CITY)
        .build()
}

fn by_since() -> CompositeIndex {
    CompositeIndex::builder(BY_SINCE, "by_since", ElementCategory::Edge)
        .field(SINCE)
        .label(KNOWS)
        .build()
}

fn search() -> MixedIndex {
    MixedIndex::builder(SEARCH, "people", "es", ElementCategory::Vertex)
        .field(MixedField::new(NAME).mapping(Mapping::TextString))
        .field(MixedField::new(CITY).mapped_name("town"))
        .build()
}

fn catalog() -> IndexCatalog {
    let mut c = IndexCatalog::new();
    c.create_index(by_name_city().into()).unwrap();
    c.create_index(by_since().into()).unwrap();
    c.create_index(search().into()).unwrap();
    c
}

fn person() -> Vertex {
    Vertex::new("v1")
        .with_label(PERSON)
        .with_property(VertexProperty::new("p1", NAME, "ann"))
        .with_property(VertexProperty::new("p2", NAME, "anna"))
        .with_property(VertexProperty::new("p3", CITY, "rome"))
        .with_property(VertexProperty::new("p4", CITY, "oslo"))
        .with_property(VertexProperty::new("p5", CITY, "lima"))
}

fn on_vertex<'m>(
    vertex: &'m Vertex,
    property: &'m VertexProperty,
    kind: UpdateKind,
) -> Mutation<'m> {
    Mutation::VertexProperty { vertex, property, kind }
}

#[derive(Default)]
struct Registrar {
    calls: RefCell<Vec<String>>,
}

impl FieldRegistrar for Registrar {
    fn register_field(
        &self,
        store: &str,
        index: &str,
        field: &str,
        _data_type: DataType,
        _mapping: Mapping,
    ) -> Result<(), BackendError> {
        self.calls.borrow_mut().push(format!("{store}/{index}/{field}"));
        Ok(())
    }
}

#[test]
fn matcher_expands_every_combination() {
    let records = IndexMatcher::match_vertex(&person(), &by_name_city(), None);
    assert_eq!(records.len(), 6);

    let codec = CompositeKeyCodec::default();
    let mut keys: Vec<Vec<u8>> =
        records.iter().map(|r| codec.record_key(&by_name_city(), r, &schema()).unwrap()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 6);
}

#[test]
fn adding_a_value_touches_each_combination_with_it() {
    let (s, cache, defaults, config) =
        (schema(), SchemaCache::new(), DefaultFieldRegistry::new(), IndexConfig::default());
    let catalog = catalog();
    let planner = IndexUpdatePlanner::new(&catalog, &s, &cache, &defaults, &config);

    let vertex = person();
    let added = VertexProperty::new("p6", NAME, "annie");
    let updates = planner.plan(on_vertex(&vertex, &added, UpdateKind::Add)).unwrap();

    assert_eq!(updates.composite().count(), 3);
    assert!(updates.composite().all(|u| u.kind == UpdateKind::Add && u.ttl == Some(60)));
    assert_eq!(updates.mixed().count(), 1);
    assert_eq!(updates.mixed().next().unwrap().field, "name");

    let removed = planner.plan(on_vertex(&vertex, &added, UpdateKind::Delete)).unwrap();
    assert_eq!(removed.len(), 4);
    assert!(removed.iter().all(|u| u.kind() == UpdateKind::Delete && u.ttl().is_none()));
}

#[test]
fn hashed_keys_decode_back() {
    let s = schema();
    let (cache, defaults) = (SchemaCache::new(), DefaultFieldRegistry::new());
    let config = IndexConfig::new().hash_keys(Some(HashLength::Long));
    let catalog = catalog();
    let planner = IndexUpdatePlanner::new(&catalog, &s, &cache, &defaults, &config);

    let vertex = Vertex::new("v9")
        .with_property(VertexProperty::new("p1", NAME, "bob"))
        .with_property(VertexProperty::new("p2", CITY, "bern"));
    let property = &vertex.properties[0];
    let updates = planner.plan(on_vertex(&vertex, property, UpdateKind::Add)).unwrap();
    let update = updates.composite().next().unwrap();

    let codec = CompositeKeyCodec::from_config(&config);
    assert_eq!(codec.index_id_from_key(&update.key).unwrap(), BY_NAME_CITY);
    assert_eq!(
        codec.decode_key_values(&by_name_city(), &update.key, &s).unwrap(),
        vec![Value::from("bob"), Value::from("bern")]
    );
    assert_eq!(
        codec.decode_entry(&by_name_city(), &update.entry).unwrap(),
        ElementRef::Vertex("v9".into())
    );

    let mut tampered = update.key.clone();
    tampered[0] ^= 0xff;
    assert!(codec.index_id_from_key(&tampered).is_err());
}

#[test]
fn edge_updates_point_at_the_relation() {
    let (s, cache, defaults, config) =
        (schema(), SchemaCache::new(), DefaultFieldRegistry::new(), IndexConfig::default());
    let catalog = catalog();
    let planner = IndexUpdatePlanner::new(&catalog, &s, &cache, &defaults, &config);

    let edge = Relation::edge("e1", KNOWS, "v1", "v2").with_property(SINCE, 2015i64);
    let updates =
        planner.plan(Mutation::Relation { relation: &edge, kind: UpdateKind::Add }).unwrap();
    assert_eq!(updates.len(), 1);
    let update = updates.composite().next().unwrap();
    assert_eq!(update.ttl, Some(30));
    assert_eq!(
        CompositeKeyCodec::default().decode_entry(&by_since(), &update.entry).unwrap(),
        ElementRef::Relation(edge.identifier())
    );

    let other = Relation::edge("e2", SchemaId::new(31), "v1", "v2").with_property(SINCE, 2015i64);
    let mut s2 = schema();
    s2.add_type(RelationType::edge_label(SchemaId::new(31), "likes")).unwrap();
    let planner = IndexUpdatePlanner::new(&catalog, &s2, &cache, &defaults, &config);
    let updates = planner.plan(Mutation::Relation { relation: &other, kind: UpdateKind::Add });
    assert!(updates.unwrap().is_empty());
}

#[test]
fn mixed_updates_assemble_into_documents() {
    let (s, cache, defaults, config) =
        (schema(), SchemaCache::new(), DefaultFieldRegistry::new(), IndexConfig::default());
    let catalog = catalog();
    let planner = IndexUpdatePlanner::new(&catalog, &s, &cache, &defaults, &config)
        .with_auxiliary(AuxiliaryKeys::new().dsr(SOURCE));

    let vertex = person();
    let mut updates = Vec::new();
    for property in &vertex.properties {
        let property = property.clone().with_meta(SOURCE, "crm");
        let set = planner.plan(on_vertex(&vertex, &property, UpdateKind::Add)).unwrap();
        updates.extend(set.into_vec().into_iter().filter(|u| matches!(u, IndexUpdate::Mixed(_))));
    }

    let docs = MixedDocument::assemble(&updates);
    assert_eq!(docs.len(), 1);
    let doc = &docs[0];
    assert_eq!(doc.id, "v1");
    assert!(matches!(doc.field("town"), Some(FieldSlot::Many(v)) if v.len() == 3));
    assert_eq!(
        doc.to_json()["name"],
        json!([{ "value": "ann", "dsr": ["crm"] }, { "value": "anna", "dsr": ["crm"] }])
    );
}

#[test]
fn default_fields_register_once_and_become_queryable() {
    let (s, cache, config) = (schema(), SchemaCache::new(), IndexConfig::default());
    let defaults =
        DefaultFieldRegistry::new().with_field(NOTES, "__notes", DataType::String, Mapping::Text);
    let registrar = Registrar::default();
    let catalog = catalog();
    let planner = IndexUpdatePlanner::new(&catalog, &s, &cache, &defaults, &config)
        .with_registrar(&registrar);

    let vertex = Vertex::new("v1").with_label(PERSON);
    for id in ["n1", "n2"] {
        let note = VertexProperty::new(id, NOTES, "likes tea");
        let updates = planner.plan(on_vertex(&vertex, &note, UpdateKind::Add)).unwrap();
        assert_eq!(updates.mixed().next().unwrap().field, "__notes");
    }
    assert_eq!(*registrar.calls.borrow(), vec!["es/people/__notes".to_owned()]);

    let translator = IndexQueryTranslator::new(&s, &cache, &defaults, &config);
    let query = translator
        .translate_mixed(&search(), &Condition::text(NOTES, Text::Contains, "tea"), &[])
        .unwrap();
    assert_eq!(
        query.query,
        json!({ "match": { "__notes": { "query": "tea", "operator": "and" } } })
    );
}

#[test]
fn default_fields_register_with_every_index_of_a_store() {
    let (s, cache, config) = (schema(), SchemaCache::new(), IndexConfig::default());
    let defaults =
        DefaultFieldRegistry::new().with_field(NOTES, "__notes", DataType::String, Mapping::Text);
    let registrar = Registrar::default();
    let archive = MixedIndex::builder(SchemaId::new(201), "archive", "es", ElementCategory::Vertex)
        .field(MixedField::new(NAME))
        .build();
    let mut catalog = catalog();
    catalog.create_index(archive.clone().into()).unwrap();
    cache.field_names(&archive, &s, &defaults).unwrap();

    let planner = IndexUpdatePlanner::new(&catalog, &s, &cache, &defaults, &config)
        .with_registrar(&registrar);
    let vertex = Vertex::new("v1").with_label(PERSON);
    let note = VertexProperty::new("n1", NOTES, "likes tea");
    let updates = planner.plan(on_vertex(&vertex, &note, UpdateKind::Add)).unwrap();

    let indexes: Vec<SchemaId> = updates.mixed().map(|u| u.index).collect();
    assert_eq!(indexes, vec![SEARCH, SchemaId::new(201)]);
    assert_eq!(
        *registrar.calls.borrow(),
        vec!["es/people/__notes".to_owned(), "es/archive/__notes".to_owned()]
    );

    let translator = IndexQueryTranslator::new(&s, &cache, &defaults, &config);
    let query = translator
        .translate_mixed(&archive, &Condition::text(NOTES, Text::Contains, "tea"), &[])
        .unwrap();
    assert_eq!(
        query.query,
        json!({ "match": { "__notes": { "query": "tea", "operator": "and" } } })
    );
}

#[test]
fn equal_list_values_keep_one_entry_each() {
    let (s, cache, defaults, config) =
        (schema(), SchemaCache::new(), DefaultFieldRegistry::new(), IndexConfig::default());
    let catalog = catalog();
    let planner = IndexUpdatePlanner::new(&catalog, &s, &cache, &defaults, &config);

    let vertex = Vertex::new("v1")
        .with_property(VertexProperty::new("c1", CITY, "rome"))
        .with_property(VertexProperty::new("c2", CITY, "rome"));
    let mut updates = IndexUpdateSet::new();
    for property in &vertex.properties {
        planner.plan_into(on_vertex(&vertex, property, UpdateKind::Add), &mut updates).unwrap();
    }
    assert_eq!(updates.mixed().count(), 2);

    let docs = MixedDocument::assemble(updates.iter());
    assert_eq!(docs[0].to_json(), json!({ "town": [{ "value": "rome" }, { "value": "rome" }] }));
}

proptest! {
    #[test]
    fn composite_records_are_the_cartesian_product(
        names in prop::collection::btree_set("[a-z]{1,6}", 1..4),
        cities in prop::collection::btree_set("[a-z]{1,6}", 1..4),
    ) {
        let mut vertex = Vertex::new("v1");
        for (i, name) in names.iter().enumerate() {
            let property = VertexProperty::new(format!("n{i}"), NAME, name.as_str());
            vertex = vertex.with_property(property);
        }
        for (i, city) in cities.iter().enumerate() {
            let property = VertexProperty::new(format!("c{i}"), CITY, city.as_str());
            vertex = vertex.with_property(property);
        }
        let records = IndexMatcher::match_vertex(&vertex, &by_name_city(), None);
        prop_assert_eq!(records.len(), names.len() * cities.len());

        let codec = CompositeKeyCodec::new(Some(HashLength::Short));
        let s = schema();
        let mut keys: Vec<Vec<u8>> = records
            .iter()
            .map(|r| codec.record_key(&by_name_city(), r, &s).unwrap())
            .collect();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), records.len());
    }
}
