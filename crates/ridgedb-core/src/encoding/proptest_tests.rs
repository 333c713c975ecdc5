//! Property-based tests for relation records and ordered encoding.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]

use proptest::prelude::*;

use crate::encoding::sortable::{decode_ordered, encode_ordered};
use crate::encoding::{RecordHeader, RelationCodec, RelationRecord};
use crate::schema::{Cardinality, RelationType, Schema, SortOrder};
use crate::types::{DataType, Relation, SchemaId, Value};

const AGE: SchemaId = SchemaId::new(20);
const NAME: SchemaId = SchemaId::new(21);
const SCORE: SchemaId = SchemaId::new(22);
const ANY: SchemaId = SchemaId::new(23);
const KNOWS_ASC: SchemaId = SchemaId::new(30);
const KNOWS_DESC: SchemaId = SchemaId::new(31);
const NICK: SchemaId = SchemaId::new(32);

fn schema() -> Schema {
    let mut s = Schema::new();
    s.add_type(RelationType::property_key(AGE, "age", DataType::Int)).expect("age");
    s.add_type(RelationType::property_key(NAME, "name", DataType::String)).expect("name");
    s.add_type(RelationType::property_key(SCORE, "score", DataType::Float)).expect("score");
    s.add_type(RelationType::property_key(ANY, "any", DataType::Generic)).expect("any");
    s.add_type(
        RelationType::edge_label(KNOWS_ASC, "knows").with_sort_key(vec![AGE, NAME]),
    )
    .expect("knows");
    s.add_type(
        RelationType::edge_label(KNOWS_DESC, "knows_desc")
            .with_sort_key(vec![AGE, NAME])
            .with_sort_order(SortOrder::Desc),
    )
    .expect("knows_desc");
    s.add_type(
        RelationType::property_key(NICK, "nick", DataType::String)
            .with_cardinality(Cardinality::List)
            .with_signature(vec![AGE]),
    )
    .expect("nick");
    s
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()).prop_map(Value::Float),
        ".*".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Bytes),
    ]
}

fn arb_id() -> impl Strategy<Value = String> {
    "[a-z0-9\\x00]{1,12}"
}

fn arb_edge(type_id: SchemaId) -> impl Strategy<Value = Relation> {
    (
        arb_id(),
        arb_id(),
        arb_id(),
        proptest::option::of(any::<i64>()),
        proptest::option::of(".*"),
        proptest::option::of(any::<f64>().prop_filter("not NaN", |f| !f.is_nan())),
        proptest::option::of(arb_value()),
    )
        .prop_map(move |(id, out, inn, age, name, score, any)| {
            let mut edge = Relation::edge(id, type_id, out, inn);
            if let Some(age) = age {
                edge = edge.with_property(AGE, age);
            }
            if let Some(name) = name {
                edge = edge.with_property(NAME, name);
            }
            if let Some(score) = score {
                edge = edge.with_property(SCORE, score);
            }
            if let Some(any) = any {
                edge = edge.with_property(ANY, any);
            }
            edge
        })
}

fn sort_key_edge(type_id: SchemaId, age: i64, name: &str) -> Vec<u8> {
    let edge =
        Relation::edge("e", type_id, "v", "w").with_property(AGE, age).with_property(NAME, name);
    RelationCodec::encode(&edge, 0, &schema()).expect("encode").key().to_vec()
}

proptest! {
    #[test]
    fn edge_roundtrip(edge in arb_edge(KNOWS_ASC), position in 0usize..2) {
        let s = schema();
        let record = RelationCodec::encode(&edge, position, &s).expect("encode");
        let decoded = RelationCodec::decode(&record, false, &s).expect("decode");
        let owner = edge.vertex(position).clone();
        prop_assert_eq!(decoded.into_relation(owner), edge);
    }

    #[test]
    fn desc_edge_roundtrip(edge in arb_edge(KNOWS_DESC)) {
        let s = schema();
        let record = RelationCodec::encode(&edge, 0, &s).expect("encode");
        let decoded = RelationCodec::decode(&record, false, &s).expect("decode");
        prop_assert_eq!(decoded.into_relation(edge.vertex(0).clone()), edge);
    }

    #[test]
    fn list_property_roundtrip(value in ".*", age in proptest::option::of(any::<i64>())) {
        let s = schema();
        let mut prop = Relation::property("p", NICK, "v", value);
        if let Some(age) = age {
            prop = prop.with_property(AGE, age);
        }
        let record = RelationCodec::encode(&prop, 0, &s).expect("encode");
        let decoded = RelationCodec::decode(&record, false, &s).expect("decode");
        prop_assert_eq!(decoded.into_relation("v"), prop);
    }

    #[test]
    fn ascending_keys_follow_sort_key(a in any::<(i64, String)>(), b in any::<(i64, String)>()) {
        prop_assume!(a != b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(sort_key_edge(KNOWS_ASC, lo.0, &lo.1) < sort_key_edge(KNOWS_ASC, hi.0, &hi.1));
    }

    #[test]
    fn descending_keys_reverse_sort_key(a in any::<(i64, String)>(), b in any::<(i64, String)>()) {
        prop_assume!(a != b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(
            sort_key_edge(KNOWS_DESC, lo.0, &lo.1) > sort_key_edge(KNOWS_DESC, hi.0, &hi.1)
        );
    }

    #[test]
    fn encoding_is_deterministic(edge in arb_edge(KNOWS_ASC)) {
        let s = schema();
        let first = RelationCodec::encode(&edge, 0, &s).expect("encode");
        let mut reordered = edge.clone();
        reordered.properties = edge.properties.iter().rev().map(|(k, v)| (*k, v.clone())).collect();
        let second = RelationCodec::encode(&reordered, 0, &s).expect("encode");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn ordered_ints_sort_like_values(a in any::<i64>(), b in any::<i64>()) {
        let (ea, eb) = (encode_ordered(&Value::Int(a)), encode_ordered(&Value::Int(b)));
        prop_assert_eq!(a.cmp(&b), ea.cmp(&eb));
        prop_assert_eq!(decode_ordered(&ea, DataType::Int).expect("decode"), Value::Int(a));
    }

    #[test]
    fn ordered_floats_sort_like_values(
        a in any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
        b in any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
    ) {
        prop_assume!(a != b);
        let (ea, eb) = (encode_ordered(&Value::Float(a)), encode_ordered(&Value::Float(b)));
        prop_assert_eq!(a < b, ea < eb);
    }

    #[test]
    fn ordered_strings_sort_like_values(a in ".*", b in ".*") {
        let ea = encode_ordered(&Value::String(a.clone()));
        let eb = encode_ordered(&Value::String(b.clone()));
        prop_assert_eq!(a.as_bytes().cmp(b.as_bytes()), ea.cmp(&eb));
    }

    /// Arbitrary bytes must decode to a relation or an error, never panic.
    #[test]
    fn arbitrary_records_dont_crash(
        bytes in prop::collection::vec(any::<u8>(), 0..200),
        offset in any::<usize>(),
        full in any::<bool>(),
    ) {
        let s = schema();
        let offset = if bytes.is_empty() { 0 } else { offset % (bytes.len() + 1) };
        let record = RelationRecord::new(bytes, offset).expect("offset in range");
        let _ = RelationCodec::decode(&record, !full, &s);
    }

    #[test]
    fn truncated_records_dont_crash(edge in arb_edge(KNOWS_ASC)) {
        let s = schema();
        let record = RelationCodec::encode(&edge, 0, &s).expect("encode");
        for cut in 0..record.bytes.len() {
            let bytes = record.bytes[..cut].to_vec();
            let offset = record.value_offset.min(cut);
            let truncated = RelationRecord::new(bytes, offset).expect("offset in range");
            let _ = RelationCodec::decode(&truncated, false, &s);
        }
    }

    #[test]
    fn header_roundtrip(type_id in 0u64..=SchemaId::MAX, invisible in any::<bool>()) {
        let header = RecordHeader {
            type_id: SchemaId::new(type_id),
            direction: crate::encoding::HeaderDirection::EdgeIn,
            invisible,
        };
        let bytes = header.to_bytes().expect("encode");
        let decoded =
            RecordHeader::read(&mut crate::encoding::ByteReader::new(&bytes)).expect("decode");
        prop_assert_eq!(decoded, header);
    }
}
