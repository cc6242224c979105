//! Decoded messages.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use leafwire_core::protocol::{CommandId, Header, Message, MessageFlags};
use leafwire_core::WireError;

/// Undecoded body, handed to a raw handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub command: CommandId,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// Marker message, or a command whose body failed to decode.
    #[default]
    Empty,
    Message(Arc<dyn Message>),
    Raw(RawMessage),
}

/// One message off the wire: header fields plus payload.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub flags: MessageFlags,
    pub command: CommandId,
    pub rpc_call_id: u32,
    pub payload: Payload,
}

impl Envelope {
    pub fn new(command: CommandId, payload: Payload) -> Self {
        Self {
            command,
            payload,
            ..Self::default()
        }
    }

    /// Correlation for an rpc reply: RPC flag plus call id, no payload.
    pub fn rpc(rpc_call_id: u32) -> Self {
        Self {
            flags: MessageFlags::RPC,
            rpc_call_id,
            ..Self::default()
        }
    }

    pub fn header(&self) -> Header {
        Header {
            flags: self.flags,
            command: self.command,
            rpc_call_id: self.rpc_call_id,
        }
    }

    pub fn is_rpc(&self) -> bool {
        self.flags.is_rpc()
    }

    pub fn message(&self) -> Option<&Arc<dyn Message>> {
        match &self.payload {
            Payload::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn downcast<T: Message>(&self) -> Option<&T> {
        self.message().and_then(|m| m.downcast_ref::<T>())
    }

    pub fn raw(&self) -> Option<&RawMessage> {
        match &self.payload {
            Payload::Raw(raw) => Some(raw),
            _ => None,
        }
    }
}

/// Unmarshal failure with whatever header fields were recovered.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct UnmarshalError {
    pub partial: Envelope,
    #[source]
    pub error: WireError,
}

impl From<UnmarshalError> for WireError {
    fn from(e: UnmarshalError) -> Self {
        e.error
    }
}
