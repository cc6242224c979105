//! Registration rules: idempotence, conflicts, attach-before-register, capacity.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use leafwire_core::error::{ErrorCode, WireError};
use leafwire_core::protocol::CommandId;
use leafwire_processor::{ChanRouter, Envelope, Registry, MAX_COMMANDS};

mod fixtures;
use fixtures::*;

#[test]
fn same_type_twice_is_a_noop() {
    let mut reg = Registry::<()>::default();
    reg.register::<Chat>(CHAT).unwrap();
    reg.register::<Chat>(CHAT).unwrap();
    reg.register_marker(PING).unwrap();
    reg.register_marker(PING).unwrap();
    assert_eq!(reg.len(), 2);
}

#[test]
fn second_type_on_one_id_is_rejected() {
    let mut reg = Registry::<()>::default();
    reg.register::<Chat>(CHAT).unwrap();

    let err = reg.register::<Login>(CHAT).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateCommand);
    assert!(err.is_fatal());
    match err {
        WireError::DuplicateCommand { command, existing } => {
            assert_eq!(command, CHAT);
            assert!(existing.ends_with("Chat"), "{existing}");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // A marker and a body type conflict too.
    assert!(matches!(
        reg.register_marker(CHAT),
        Err(WireError::DuplicateCommand { .. })
    ));
    assert_eq!(reg.len(), 1);
}

#[test]
fn attach_requires_registration() {
    let mut reg = Registry::<()>::default();
    let err = reg
        .set_handler(LOGIN, |_: &Envelope, _: &()| Ok(()))
        .unwrap_err();
    assert!(matches!(err, WireError::NotRegistered(c) if c == LOGIN));
    assert!(err.is_fatal());

    let (router, _rx) = ChanRouter::<()>::channel("inbox", 4);
    assert!(matches!(
        reg.set_router(LOGIN, router),
        Err(WireError::NotRegistered(_))
    ));
    assert!(matches!(
        reg.set_raw_handler(LOGIN, |_: CommandId, _: &bytes::Bytes, _: &()| Ok(())),
        Err(WireError::NotRegistered(_))
    ));
    assert!(reg.is_empty());
}

#[test]
fn capacity_is_bounded() {
    let mut reg = Registry::<()>::default();
    for raw in 0..MAX_COMMANDS as u32 {
        reg.register_marker(CommandId::from_raw(raw)).unwrap();
    }
    assert_eq!(reg.len(), MAX_COMMANDS);

    // Re-registering an existing id still succeeds when full.
    reg.register_marker(CommandId::from_raw(0)).unwrap();

    let err = reg
        .register_marker(CommandId::from_raw(MAX_COMMANDS as u32))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RegistryFull);
    assert_eq!(reg.len(), MAX_COMMANDS);
}
