//! leafwire processor library entry.
//!
//! This crate binds command ids to message types and wires decoding,
//! local handlers and external routers into one dispatch table:
//! - `Registry` is filled at startup (register, then attach);
//! - `Registry::freeze` yields the immutable, shareable `Processor`;
//! - the transport feeds complete messages to `Processor::unmarshal` /
//!   `route` and frames the chunks returned by `marshal`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod envelope;
pub mod framing;
pub mod handler;
pub mod processor;
pub mod registry;
pub mod router;

pub use envelope::{Envelope, Payload, RawMessage, UnmarshalError};
pub use framing::Framer;
pub use handler::{Handler, RawHandler};
pub use processor::{CommandEntry, Processor};
pub use registry::{Registry, MAX_COMMANDS};
pub use router::{ChanRouter, ExternalRouter, Routed};
