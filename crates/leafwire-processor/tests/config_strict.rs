#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use leafwire_core::ByteOrder;
use leafwire_processor::config;
use leafwire_processor::{ChanRouter, Registry};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
codec:
  byte_ordr: big # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
    assert!(err.is_fatal());
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.codec.byte_order, ByteOrder::Little);
    assert_eq!(cfg.router.inbox_capacity, 1024);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
codec:
  byte_order: big
router:
  inbox_capacity: 16
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.codec.byte_order, ByteOrder::Big);
    assert_eq!(cfg.router.inbox_capacity, 16);

    let processor = Registry::<()>::from_config(&cfg).freeze();
    assert_eq!(processor.byte_order(), ByteOrder::Big);

    let (router, _rx) = ChanRouter::<()>::from_config("inbox", &cfg.router);
    assert_eq!(router.name(), "inbox");
}

#[test]
fn rejects_unknown_byte_order() {
    let bad = r#"
version: 1
codec:
  byte_order: middle
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn inbox_capacity_range() {
    for bad in ["0", "1048577"] {
        let s = format!("version: 1\nrouter:\n  inbox_capacity: {bad}\n");
        assert!(config::load_from_str(&s).is_err(), "capacity={bad}");
    }
    let s = "version: 1\nrouter:\n  inbox_capacity: 1048576\n";
    assert!(config::load_from_str(s).is_ok());
}

#[test]
fn missing_file_is_a_config_error() {
    let err = config::load_from_file("/nonexistent/leafwire.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}
