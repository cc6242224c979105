//! Schema validation, cycles, omit-absent sequences and the cache.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use leafwire_core::codec::{cache, FieldKind, SchemaBuilder};
use leafwire_core::{impl_record, Codec, ErrorClass, Record, Result, SchemaError, WireError};

fn schema_err<R: Record>() -> SchemaError {
    match R::schema() {
        Err(WireError::Schema(e)) => e,
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[derive(Debug, Default, Record)]
struct TwoVersions {
    #[wire(version)]
    a: u8,
    #[wire(version)]
    b: u8,
}

#[derive(Debug, Default, Record)]
struct EarlyGate {
    #[wire(since = 1)]
    a: u8,
    #[wire(version)]
    ver: u8,
}

#[derive(Debug, Default, Record)]
struct Descending {
    #[wire(version)]
    ver: u8,
    #[wire(since = 3)]
    a: u8,
    #[wire(since = 2)]
    b: u8,
}

#[derive(Debug, Default, Record)]
struct WideVersion {
    #[wire(version)]
    ver: u64,
}

#[derive(Debug, Default, Record)]
struct StringVersion {
    #[wire(version)]
    ver: String,
}

#[test]
fn duplicate_version_field_is_rejected() {
    assert!(matches!(
        schema_err::<TwoVersions>(),
        SchemaError::DuplicateVersionField { field: "b", .. }
    ));
}

#[test]
fn versioned_field_before_version_field_is_rejected() {
    assert!(matches!(
        schema_err::<EarlyGate>(),
        SchemaError::VersionedBeforeVersionField { field: "a", .. }
    ));
}

#[test]
fn decreasing_min_version_is_rejected() {
    assert!(matches!(
        schema_err::<Descending>(),
        SchemaError::VersionOrder {
            field: "b",
            min_version: 2,
            previous: 3,
            ..
        }
    ));
}

#[test]
fn version_field_must_be_a_small_integer() {
    assert!(matches!(
        schema_err::<WideVersion>(),
        SchemaError::VersionFieldKind { kind: "u64", .. }
    ));
    assert!(matches!(
        schema_err::<StringVersion>(),
        SchemaError::VersionFieldKind { kind: "string", .. }
    ));
}

#[test]
fn schema_errors_are_programmer_errors() {
    let err = TwoVersions::schema().unwrap_err();
    assert_eq!(err.class(), ErrorClass::Programmer);
    assert_eq!(err.code().as_str(), "SCHEMA");

    // Encoding through a broken schema fails the same way.
    let err = Codec::default().marshal(&TwoVersions::default()).unwrap_err();
    assert!(err.is_fatal());
}

/// Declared by hand: an ungated field after the version field.
#[derive(Debug, Default)]
struct LateAlways {
    ver: u8,
    tail: u8,
}

impl Record for LateAlways {
    fn describe(schema: &mut SchemaBuilder<Self>) -> Result<()> {
        schema
            .version::<u8>("ver", |r| &r.ver, |r| &mut r.ver)?
            .field::<u8>("tail", |r| &r.tail, |r| &mut r.tail)?;
        Ok(())
    }
}

impl_record!(LateAlways);

#[test]
fn ungated_field_after_version_field_is_rejected() {
    assert!(matches!(
        schema_err::<LateAlways>(),
        SchemaError::VersionOrder {
            field: "tail",
            min_version: -2,
            ..
        }
    ));
}

/// Declared by hand and valid.
#[derive(Debug, Default, PartialEq)]
struct Manual {
    id: u32,
    ver: u16,
    note: String,
}

impl Record for Manual {
    fn describe(schema: &mut SchemaBuilder<Self>) -> Result<()> {
        schema
            .field::<u32>("id", |r| &r.id, |r| &mut r.id)?
            .version::<u16>("ver", |r| &r.ver, |r| &mut r.ver)?
            .since::<String>(1, "note", |r| &r.note, |r| &mut r.note)?;
        Ok(())
    }
}

impl_record!(Manual);

#[test]
fn hand_written_record_round_trips() {
    let codec = Codec::default();
    let rec = Manual {
        id: 5,
        ver: 1,
        note: "hi".to_owned(),
    };
    let out = codec.marshal(&rec).unwrap();
    assert_eq!(out.len(), 4 + 2 + 4);
    assert_eq!(codec.unmarshal::<Manual>(&out).unwrap(), rec);
}

#[derive(Debug, Default, Record)]
struct Node {
    id: u32,
    children: Vec<Node>,
}

#[derive(Debug, Default, Record)]
struct Ping {
    pong: Vec<Pong>,
}

#[derive(Debug, Default, Record)]
struct Pong {
    ping: Vec<Ping>,
}

#[test]
fn self_reference_is_rejected() {
    assert!(matches!(schema_err::<Node>(), SchemaError::Cycle { .. }));
    assert!(!cache::is_cached::<Node>());
}

#[test]
fn mutual_reference_is_rejected() {
    assert!(matches!(schema_err::<Ping>(), SchemaError::Cycle { .. }));
    assert!(!cache::is_cached::<Ping>());
    assert!(!cache::is_cached::<Pong>());
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Default, PartialEq, Record)]
#[wire(omit_absent)]
struct Sparse {
    items: Vec<Option<Point>>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Dense {
    items: Vec<Option<Point>>,
}

#[test]
fn omit_absent_encodes_only_present_elements() {
    let codec = Codec::default();
    let p1 = Point { x: 1, y: 2 };
    let p2 = Point { x: 3, y: 4 };
    let items = vec![None, Some(p1.clone()), None, Some(p2.clone())];

    let sparse = Sparse {
        items: items.clone(),
    };
    let out = codec.marshal(&sparse).unwrap();
    assert_eq!(out.len(), 2 + 2 * 8);
    assert_eq!(codec.encoded_size(&sparse).unwrap(), out.len());
    assert_eq!(&out[..2], &[2, 0]);

    let back: Sparse = codec.unmarshal(&out).unwrap();
    assert_eq!(back.items, vec![Some(p1), Some(p2)]);

    let dense = Dense { items };
    let out = codec.marshal(&dense).unwrap();
    assert_eq!(out.len(), 2 + 4 + 2 * 8);
    assert_eq!(codec.unmarshal::<Dense>(&out).unwrap(), dense);
}

#[test]
fn omit_absent_is_per_schema() {
    assert!(Sparse::schema().unwrap().omit_absent());
    assert!(!Dense::schema().unwrap().omit_absent());
}

#[test]
fn field_kinds_are_classified() {
    #[derive(Debug, Default, Record)]
    struct Kinds {
        a: Vec<u8>,
        b: Vec<u16>,
        c: [u32; 3],
        d: Option<Point>,
        e: Point,
        f: Vec<Vec<String>>,
    }

    let schema = Kinds::schema().unwrap();
    let kinds: Vec<&FieldKind> = schema.fields().iter().map(|f| f.kind()).collect();
    assert!(matches!(kinds[0], FieldKind::Bytes));
    assert!(matches!(kinds[1], FieldKind::Seq(e) if matches!(**e, FieldKind::U16)));
    assert!(matches!(kinds[2], FieldKind::Array { len: 3, .. }));
    assert_eq!(kinds[2].fixed_width(), Some(12));
    assert!(matches!(kinds[3], FieldKind::OptionalRecord(s) if s.name().ends_with("Point")));
    assert!(matches!(kinds[4], FieldKind::Record(_)));
    assert!(matches!(
        kinds[5].elem(),
        Some(FieldKind::Seq(inner)) if matches!(**inner, FieldKind::String)
    ));
}

#[derive(Debug, Default, Record)]
struct Contended {
    a: u64,
    b: Vec<Point>,
}

#[test]
fn concurrent_first_use_builds_one_schema() {
    let schemas: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| Contended::schema().unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for s in &schemas[1..] {
        assert!(Arc::ptr_eq(&schemas[0], s));
    }
    assert!(cache::is_cached::<Contended>());
}
