//! Frozen command table: envelope (un)marshalling and routing.
//!
//! A `Processor` has no mutating methods; it is `Send + Sync` and meant to
//! be shared (`Arc<Processor<C>>`) across every connection task.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use leafwire_core::codec::{ByteOrder, Codec, StructSchema};
use leafwire_core::error::{Result, WireError};
use leafwire_core::protocol::{CodecKind, CommandId, Header, Message};

use crate::envelope::{Envelope, Payload, RawMessage, UnmarshalError};
use crate::registry::MessageInfo;

pub struct Processor<C = ()> {
    codec: Codec,
    messages: HashMap<CommandId, MessageInfo<C>>,
}

impl<C> fmt::Debug for Processor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("byte_order", &self.codec.byte_order())
            .field("messages", &self.messages.len())
            .finish()
    }
}

/// One registered command, as listed by [`Processor::range`].
#[derive(Debug, Clone, Copy)]
pub struct CommandEntry<'a> {
    pub command: CommandId,
    /// Body type; `None` for markers.
    pub type_name: Option<&'static str>,
    /// Native body schema; `None` for markers and alternate-codec bodies.
    pub schema: Option<&'a Arc<StructSchema>>,
}

fn warn_rpc_without_id(header: &Header) {
    if header.flags.is_rpc() && header.rpc_call_id == 0 {
        tracing::warn!(
            main = header.command.main(),
            sub = header.command.sub(),
            "rpc flag set without rpc call id"
        );
    }
}

impl<C> Processor<C> {
    pub(crate) fn new(codec: Codec, messages: HashMap<CommandId, MessageInfo<C>>) -> Self {
        Self { codec, messages }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.codec.byte_order()
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_registered(&self, command: CommandId) -> bool {
        self.messages.contains_key(&command)
    }

    /// Schema of a command's native body type.
    pub fn schema(&self, command: CommandId) -> Option<&Arc<StructSchema>> {
        self.messages
            .get(&command)
            .and_then(|i| i.body.as_ref())
            .and_then(|b| b.schema.as_ref())
    }

    /// Which codec owns a command's body; `None` for markers and unknown ids.
    pub fn codec_kind(&self, command: CommandId) -> Option<CodecKind> {
        self.messages
            .get(&command)
            .and_then(|i| i.body.as_ref())
            .map(|b| b.codec)
    }

    /// Registered commands in ascending id order.
    pub fn range(&self) -> Vec<CommandEntry<'_>> {
        let mut out: Vec<_> = self
            .messages
            .iter()
            .map(|(id, info)| CommandEntry {
                command: *id,
                type_name: info.body.as_ref().map(|b| b.type_name),
                schema: info.body.as_ref().and_then(|b| b.schema.as_ref()),
            })
            .collect();
        out.sort_unstable_by_key(|e| e.command);
        out
    }

    /// The 4 header bytes of a command id in the configured order.
    pub fn cmd_to_bytes(&self, command: CommandId) -> [u8; 4] {
        command.to_bytes(self.byte_order())
    }

    /// Parse one complete message.
    pub fn unmarshal(&self, data: Bytes) -> std::result::Result<Envelope, UnmarshalError> {
        let order = self.byte_order();
        let (header, offset) = match Header::decode(&data, order) {
            Ok(parsed) => parsed,
            Err(error) => {
                let mut partial = Envelope::default();
                if let Some((flags, command)) = Header::decode_prefix(&data, order) {
                    partial.flags = flags;
                    partial.command = command;
                }
                return Err(UnmarshalError { partial, error });
            }
        };

        let mut env = Envelope {
            flags: header.flags,
            command: header.command,
            rpc_call_id: header.rpc_call_id,
            payload: Payload::Empty,
        };

        let reserved = header.flags.reserved_bits();
        if reserved != 0 {
            return Err(UnmarshalError {
                partial: env,
                error: WireError::ReservedFlags(reserved),
            });
        }
        if header.flags.bits() != 0 {
            tracing::debug!(
                flags = header.flags.bits(),
                rpc_call_id = header.rpc_call_id,
                "message flags"
            );
        }
        warn_rpc_without_id(&header);

        let Some(info) = self.messages.get(&header.command) else {
            tracing::warn!(
                main = header.command.main(),
                sub = header.command.sub(),
                "message not registered"
            );
            let partial = Envelope {
                flags: header.flags,
                rpc_call_id: header.rpc_call_id,
                ..Envelope::default()
            };
            return Err(UnmarshalError {
                partial,
                error: WireError::UnknownCommand(header.command),
            });
        };

        let body = data.slice(offset..);
        if info.raw_handler.is_some() {
            env.payload = Payload::Raw(RawMessage {
                command: header.command,
                data: body,
            });
            return Ok(env);
        }

        match self.decode_body(info, &body) {
            Ok(payload) => {
                env.payload = payload;
                Ok(env)
            }
            Err(error) => {
                tracing::error!(
                    main = header.command.main(),
                    sub = header.command.sub(),
                    message = info.body_name(),
                    error = %error,
                    "body decode failed"
                );
                Err(UnmarshalError {
                    partial: env,
                    error,
                })
            }
        }
    }

    /// Decode a body without a header, by its command's registered type.
    /// Commands with a raw handler come back undecoded.
    pub fn unmarshal_body(&self, command: CommandId, body: &[u8]) -> Result<Payload> {
        let info = self
            .messages
            .get(&command)
            .ok_or(WireError::UnknownCommand(command))?;
        if info.raw_handler.is_some() {
            return Ok(Payload::Raw(RawMessage {
                command,
                data: Bytes::copy_from_slice(body),
            }));
        }
        self.decode_body(info, body)
    }

    fn decode_body(&self, info: &MessageInfo<C>, body: &[u8]) -> Result<Payload> {
        match &info.body {
            None => Ok(Payload::Empty),
            Some(b) => Ok(Payload::Message((b.decode)(body, &self.codec)?)),
        }
    }

    /// Header and body chunks for the framer. The flags and rpc call id
    /// are taken from `envelope` (usually the request being answered).
    pub fn marshal(
        &self,
        envelope: &Envelope,
        command: CommandId,
        payload: Option<&dyn Message>,
    ) -> Result<Vec<Bytes>> {
        let header = self.marshal_cmd(envelope, command);
        match payload {
            None => Ok(vec![header]),
            Some(p) => Ok(vec![header, self.encode_payload(command, p)?]),
        }
    }

    /// Header only.
    pub fn marshal_cmd(&self, envelope: &Envelope, command: CommandId) -> Bytes {
        let header = Header {
            flags: envelope.flags,
            command,
            rpc_call_id: envelope.rpc_call_id,
        };
        warn_rpc_without_id(&header);
        header.encode(self.byte_order())
    }

    /// Body only; the codec follows the payload's own type.
    pub fn marshal_body(&self, payload: &dyn Message) -> Result<Bytes> {
        payload.encode_body(&self.codec)
    }

    fn encode_payload(&self, command: CommandId, payload: &dyn Message) -> Result<Bytes> {
        if let Some(info) = self.messages.get(&command) {
            let matches = info
                .body
                .as_ref()
                .is_some_and(|b| b.type_id == Any::type_id(payload.as_any()));
            if !matches {
                return Err(WireError::PayloadMismatch {
                    command,
                    expected: info.body_name(),
                    actual: payload.type_name(),
                });
            }
        }

        payload.encode_body(&self.codec).map_err(|error| {
            tracing::error!(
                main = command.main(),
                sub = command.sub(),
                message = payload.type_name(),
                error = %error,
                "body encode failed"
            );
            error
        })
    }

    /// Deliver a decoded envelope to its command's handler and router.
    ///
    /// Raw payloads go to the raw handler only. Otherwise the handler runs
    /// in-line, then the router receives the envelope; the handler's result
    /// is returned.
    pub fn route(&self, envelope: &Envelope, ctx: &C) -> Result<()> {
        let command = envelope.command;
        let info = self
            .messages
            .get(&command)
            .ok_or(WireError::UnknownCommand(command))?;

        if let Payload::Raw(raw) = &envelope.payload {
            return match &info.raw_handler {
                Some(h) => h.handle_raw(raw.command, &raw.data, ctx),
                None => Err(WireError::Unhandled(command)),
            };
        }

        if info.handler.is_none() && info.router.is_none() {
            return Err(WireError::Unhandled(command));
        }

        let handled = match &info.handler {
            Some(h) => h.handle(envelope, ctx),
            None => Ok(()),
        };
        if let Some(router) = &info.router {
            router.deliver(command, envelope, ctx);
        }
        handled
    }

    /// Unmarshal then route.
    pub fn dispatch(&self, data: Bytes, ctx: &C) -> Result<()> {
        let envelope = self.unmarshal(data)?;
        self.route(&envelope, ctx)
    }
}
