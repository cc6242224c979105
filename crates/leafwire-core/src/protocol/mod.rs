//! Envelope protocol.
//!
//! Every message on the wire is a small fixed header followed by a body:
//! - the header carries a flag byte, the packed command id and, for RPC
//!   traffic, a correlation id;
//! - the body is a native record, an externally encoded payload, or empty.
//!
//! Header parsing is panic-free: malformed input is reported as
//! `WireError` instead of panicking or indexing raw buffers.

pub mod command;
pub mod header;
pub mod message;

pub use command::{CommandId, MessageFlags};
pub use header::{Header, HEADER_LEN, RPC_HEADER_LEN};
pub use message::{Body, CodecKind, ExternalMessage, Json, Message};
