//! Version gating.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use leafwire_core::{Codec, Record};

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Login {
    kind: u8,
    #[wire(version)]
    ver: u16,
    user: String,
    #[wire(since = 2)]
    token: Vec<u8>,
    #[wire(since = 3)]
    region: u32,
}

/// The same message as an older peer declares it.
#[derive(Debug, Default, Clone, PartialEq, Record)]
struct LoginV1 {
    kind: u8,
    #[wire(version)]
    ver: u16,
    user: String,
}

fn login(ver: u16) -> Login {
    Login {
        kind: 9,
        ver,
        user: "ann".to_owned(),
        token: vec![0xAA, 0xBB],
        region: 7,
    }
}

#[test]
fn schema_records_gate_metadata() {
    let schema = Login::schema().unwrap();
    let mins: Vec<i64> = schema.fields().iter().map(|f| f.min_version()).collect();
    assert_eq!(mins, vec![-2, -1, 0, 2, 3]);
    assert_eq!(schema.version_field().unwrap().name(), "ver");
}

#[test]
fn only_fields_at_or_below_the_version_are_encoded() {
    let codec = Codec::default();

    // kind(1) + ver(2) + user(2+3)
    let v1 = codec.marshal(&login(1)).unwrap();
    assert_eq!(v1.len(), 8);
    assert_eq!(hex::encode(&v1), "0901000300616e6e");

    // + token(2+2)
    let v2 = codec.marshal(&login(2)).unwrap();
    assert_eq!(v2.len(), 12);

    // + region(4)
    let v3 = codec.marshal(&login(3)).unwrap();
    assert_eq!(v3.len(), 16);

    for ver in [1, 2, 3, 40] {
        let rec = login(ver);
        assert_eq!(
            codec.encoded_size(&rec).unwrap(),
            codec.marshal(&rec).unwrap().len(),
            "ver={ver}"
        );
    }
}

#[test]
fn gated_out_fields_decode_to_zero() {
    let codec = Codec::default();

    let back: Login = codec.unmarshal(&codec.marshal(&login(1)).unwrap()).unwrap();
    assert_eq!(back.user, "ann");
    assert!(back.token.is_empty());
    assert_eq!(back.region, 0);

    let back: Login = codec.unmarshal(&codec.marshal(&login(2)).unwrap()).unwrap();
    assert_eq!(back.token, vec![0xAA, 0xBB]);
    assert_eq!(back.region, 0);

    let back: Login = codec.unmarshal(&codec.marshal(&login(3)).unwrap()).unwrap();
    assert_eq!(back, login(3));
}

#[test]
fn gated_out_fields_keep_existing_values_on_decode_into() {
    let codec = Codec::default();
    let bytes = codec.marshal(&login(1)).unwrap();

    let mut target = Login {
        region: 55,
        ..Login::default()
    };
    codec.unmarshal_into(&bytes, &mut target).unwrap();
    assert_eq!(target.region, 55);
    assert_eq!(target.ver, 1);
}

#[test]
fn newer_schema_reads_older_peer() {
    let codec = Codec::default();
    let old = LoginV1 {
        kind: 1,
        ver: 1,
        user: "bob".to_owned(),
    };
    let bytes = codec.marshal(&old).unwrap();

    let back: Login = codec.unmarshal(&bytes).unwrap();
    assert_eq!(back.kind, 1);
    assert_eq!(back.user, "bob");
    assert!(back.token.is_empty());
    assert_eq!(back.region, 0);
}

#[test]
fn older_schema_reads_newer_peer_and_ignores_the_tail() {
    let codec = Codec::default();
    let bytes = codec.marshal(&login(3)).unwrap();

    let back: LoginV1 = codec.unmarshal(&bytes).unwrap();
    assert_eq!(back.ver, 3);
    assert_eq!(back.user, "ann");
}

#[derive(Debug, Default, PartialEq, Record)]
struct Signed {
    #[wire(version)]
    ver: i8,
    #[wire(since = 0)]
    body: u32,
    #[wire(since = 200)]
    late: u16,
}

#[derive(Debug, Default, PartialEq, Record)]
struct SignedWide {
    #[wire(version)]
    ver: i16,
    #[wire(since = 40000)]
    tail: u8,
}

#[test]
fn signed_version_field_reads_as_unsigned() {
    let codec = Codec::default();

    // 0xFF on the wire is version 255, so every later field is present.
    let back: Signed = codec.unmarshal(&[0xFF, 5, 0, 0, 0, 9, 0]).unwrap();
    assert_eq!(
        back,
        Signed {
            ver: -1,
            body: 5,
            late: 9
        }
    );

    let rec = Signed {
        ver: -1,
        body: 5,
        late: 9,
    };
    let out = codec.marshal(&rec).unwrap();
    assert_eq!(hex::encode(&out), "ff050000000900");
    assert_eq!(codec.encoded_size(&rec).unwrap(), 7);

    // 127 is below 200: `late` is gated out.
    let low = Signed {
        ver: 127,
        body: 1,
        late: 9,
    };
    assert_eq!(codec.marshal(&low).unwrap().len(), 5);

    // i16 -1 is version 65535.
    let wide = SignedWide { ver: -1, tail: 3 };
    let out = codec.marshal(&wide).unwrap();
    assert_eq!(&out[..], &[0xFF, 0xFF, 3]);
    assert_eq!(codec.unmarshal::<SignedWide>(&out).unwrap(), wide);
}

#[derive(Debug, Default, PartialEq, Record)]
struct Outer {
    #[wire(version)]
    ver: u8,
    inner: Login,
    #[wire(since = 1)]
    extra: u8,
}

#[test]
fn nested_records_gate_on_their_own_version() {
    let codec = Codec::default();
    let rec = Outer {
        ver: 0,
        inner: login(3),
        extra: 4,
    };
    let out = codec.marshal(&rec).unwrap();
    // ver(1) + inner v3 (16); `extra` gated out by the outer version.
    assert_eq!(out.len(), 17);

    let back: Outer = codec.unmarshal(&out).unwrap();
    assert_eq!(back.inner, login(3));
    assert_eq!(back.extra, 0);
}
