//! Integration tests for relation records.

use ridgedb_core::encoding::{RelationEnd, RelationRecord};
use ridgedb_core::{
    Cardinality, CoreError, DataType, Direction, ImplicitKey, Multiplicity, Relation, RelationCodec,
    RelationType, Schema, SchemaId, SortOrder, Value,
};

const NAME: SchemaId = SchemaId::new(100);
const AGE: SchemaId = SchemaId::new(101);
const SINCE: SchemaId = SchemaId::new(102);
const WEIGHT: SchemaId = SchemaId::new(103);

const MOTHER: SchemaId = SchemaId::new(200); // unique out
const CHILD: SchemaId = SchemaId::new(201); // unique in
const FRIEND: SchemaId = SchemaId::new(202); // simple
const KNOWS: SchemaId = SchemaId::new(203); // multi, sort key
const RATED: SchemaId = SchemaId::new(204); // multi, desc sort key

const EMAIL: SchemaId = SchemaId::new(300); // single
const ALIAS: SchemaId = SchemaId::new(301); // set
const VISIT: SchemaId = SchemaId::new(302); // list

fn schema() -> Schema {
    let mut s = Schema::new();
    for ty in [
        RelationType::property_key(NAME, "name", DataType::String),
        RelationType::property_key(AGE, "age", DataType::Int),
        RelationType::property_key(SINCE, "since", DataType::Date),
        RelationType::property_key(WEIGHT, "weight", DataType::Float),
        RelationType::edge_label(MOTHER, "mother").with_multiplicity(Multiplicity::Many2One),
        RelationType::edge_label(CHILD, "child").with_multiplicity(Multiplicity::One2Many),
        RelationType::edge_label(FRIEND, "friend")
            .with_multiplicity(Multiplicity::Simple)
            .with_signature(vec![NAME]),
        RelationType::edge_label(KNOWS, "knows")
            .with_sort_key(vec![AGE])
            .with_signature(vec![NAME]),
        RelationType::edge_label(RATED, "rated")
            .with_sort_key(vec![AGE])
            .with_sort_order(SortOrder::Desc),
        RelationType::property_key(EMAIL, "email", DataType::String),
        RelationType::property_key(ALIAS, "alias", DataType::String)
            .with_cardinality(Cardinality::Set),
        RelationType::property_key(VISIT, "visit", DataType::Int)
            .with_cardinality(Cardinality::List),
    ] {
        s.add_type(ty).unwrap();
    }
    s
}

fn roundtrip(s: &Schema, relation: &Relation, position: usize) -> Relation {
    let record = RelationCodec::encode(relation, position, s).unwrap();
    RelationCodec::decode(&record, false, s)
        .unwrap()
        .into_relation(relation.vertex(position).clone())
}

fn decorated(relation: Relation) -> Relation {
    relation
        .with_property(NAME, "marko")
        .with_property(AGE, 29i64)
        .with_property(WEIGHT, 0.5f64)
        .with_property(
            SINCE,
            chrono::DateTime::from_timestamp_millis(1_600_000_000_000).unwrap(),
        )
}

#[test]
fn unique_out_edge_scenario() {
    let s = schema();
    let edge = Relation::edge("r1", MOTHER, "v1", "v2");
    let record = RelationCodec::encode(&edge, 0, &s).unwrap();
    let decoded = RelationCodec::decode(&record, true, &s).unwrap();

    assert_eq!(decoded.direction, Direction::Out);
    assert_eq!(decoded.other_vertex().map(|v| v.as_str()), Some("v2"));
    assert_eq!(decoded.relation_id.as_str(), "r1");
    assert!(decoded.properties.is_none());
}

#[test]
fn every_edge_layout_roundtrips() {
    let s = schema();
    for type_id in [MOTHER, CHILD, FRIEND, KNOWS, RATED] {
        let edge = decorated(Relation::edge("e7", type_id, "alice", "bob"));
        for position in 0..2 {
            assert_eq!(roundtrip(&s, &edge, position), edge, "type {type_id} at {position}");
        }
    }
}

#[test]
fn every_property_cardinality_roundtrips() {
    let s = schema();
    let props = [
        Relation::property("p1", EMAIL, "v", "a@b.c").with_property(AGE, 3i64),
        Relation::property("p2", ALIAS, "v", "al").with_property(NAME, "x"),
        Relation::property("p3", VISIT, "v", 42i64),
    ];
    for prop in props {
        assert_eq!(roundtrip(&s, &prop, 0), prop);
    }
}

#[test]
fn unique_direction_moves_identity_to_value() {
    let s = schema();
    let edge = Relation::edge("r1", CHILD, "parent", "kid");

    // unique seen from the in vertex: nothing after the header
    let incoming = RelationCodec::encode(&edge, 1, &s).unwrap();
    assert!(!incoming.key().windows(6).any(|w| w == b"parent"));
    assert!(incoming.value().starts_with(b"parent"));

    // not unique from the out vertex: the other vertex disambiguates
    let outgoing = RelationCodec::encode(&edge, 0, &s).unwrap();
    assert!(outgoing.key().ends_with(b"kid\0\0"));
    assert!(outgoing.value().starts_with(b"r1"));
}

#[test]
fn ascending_sort_key_orders_keys() {
    let s = schema();
    let key = |age: i64| {
        let edge = Relation::edge("e", KNOWS, "v", "w").with_property(AGE, age);
        RelationCodec::encode(&edge, 0, &s).unwrap().key().to_vec()
    };
    assert!(key(-3) < key(4));
    assert!(key(4) < key(400));
}

#[test]
fn descending_sort_key_reverses_keys() {
    let s = schema();
    let key = |age: i64| {
        let edge = Relation::edge("e", RATED, "v", "w").with_property(AGE, age);
        RelationCodec::encode(&edge, 0, &s).unwrap().key().to_vec()
    };
    assert!(key(-3) > key(4));
    assert!(key(4) > key(400));
}

#[test]
fn missing_sort_key_value_sorts_first() {
    let s = schema();
    let without = RelationCodec::encode(&Relation::edge("e", KNOWS, "v", "w"), 0, &s).unwrap();
    let with = RelationCodec::encode(
        &Relation::edge("e", KNOWS, "v", "w").with_property(AGE, i64::MIN),
        0,
        &s,
    )
    .unwrap();
    assert!(without.key() < with.key());
}

#[test]
fn encoding_is_byte_identical() {
    let s = schema();
    let a = decorated(Relation::edge("e1", KNOWS, "a", "b"));
    let b = Relation::edge("e1", KNOWS, "a", "b")
        .with_property(SINCE, chrono::DateTime::from_timestamp_millis(1_600_000_000_000).unwrap())
        .with_property(WEIGHT, 0.5f64)
        .with_property(AGE, 29i64)
        .with_property(NAME, "marko");
    assert_eq!(
        RelationCodec::encode(&a, 0, &s).unwrap(),
        RelationCodec::encode(&b, 0, &s).unwrap()
    );
}

#[test]
fn metadata_folds_into_properties() {
    let s = schema();
    let edge = Relation::edge("e1", FRIEND, "a", "b");
    let record = RelationCodec::encode(&edge, 0, &s)
        .unwrap()
        .with_metadata(ImplicitKey::Visibility, "secret");
    let decoded = RelationCodec::decode(&record, false, &s).unwrap();
    assert_eq!(
        decoded.get_property(ImplicitKey::Visibility.id()),
        Some(&Value::String("secret".into()))
    );
}

#[test]
fn property_values_decode_as_values() {
    let s = schema();
    let record =
        RelationCodec::encode(&Relation::property("p", ALIAS, "v", "al"), 0, &s).unwrap();
    let decoded = RelationCodec::decode(&record, true, &s).unwrap();
    assert_eq!(decoded.other, RelationEnd::Value(Value::from("al")));
}

#[test]
fn unknown_type_in_record() {
    let s = schema();
    let record = RelationCodec::encode(&Relation::edge("e", KNOWS, "a", "b"), 0, &s).unwrap();
    let empty = Schema::new();
    let err = RelationCodec::decode(&record, false, &empty).unwrap_err();
    assert!(matches!(err, CoreError::UnknownType(id) if id == KNOWS));
}

#[test]
fn mismatched_value_offset_is_fatal() {
    let s = schema();
    let record = RelationCodec::encode(&Relation::edge("e", FRIEND, "a", "b"), 0, &s).unwrap();
    let shifted = RelationRecord::new(record.bytes.clone(), record.value_offset - 1).unwrap();
    assert!(RelationCodec::decode(&shifted, false, &s).unwrap_err().is_fatal());
}
