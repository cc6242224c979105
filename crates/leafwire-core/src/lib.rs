//! leafwire core: schema-driven binary codec, envelope header protocol,
//! message traits and the shared error type.
//!
//! This crate carries no runtime or transport dependencies. Records are
//! described once per type (usually through `#[derive(Record)]`), their
//! schema is cached process-wide, and the codec walks that schema to size,
//! encode and decode instances under the version gate.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Truncated or hostile input surfaces as `WireError`, never as a panic or
//! an out-of-bounds read.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

// Lets derive output (`::leafwire_core::...`) resolve inside this crate.
extern crate self as leafwire_core;

pub mod codec;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorClass, ErrorCode, Result, SchemaError, WireError};

pub use codec::{ByteOrder, Codec, Record, StructSchema, WireField};
pub use protocol::{CommandId, ExternalMessage, Header, Json, Message, MessageFlags};

#[cfg(feature = "derive")]
pub use leafwire_derive::Record;
