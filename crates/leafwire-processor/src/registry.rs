//! Startup-time message registry.
//!
//! Registration is single-threaded and happens before any traffic. Each
//! command id maps to at most one body type; routers and handlers attach to
//! ids that are already registered. `freeze` hands the table to an
//! immutable [`Processor`].

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use leafwire_core::codec::{ByteOrder, Codec, Record, StructSchema};
use leafwire_core::error::{Result, WireError};
use leafwire_core::protocol::{CodecKind, CommandId, ExternalMessage, Message};

use crate::config::ProcessorConfig;
use crate::handler::{Handler, RawHandler};
use crate::processor::Processor;
use crate::router::ExternalRouter;

/// Most distinct command ids a registry accepts.
pub const MAX_COMMANDS: usize = u16::MAX as usize;

pub(crate) type DecodeFn = fn(&[u8], &Codec) -> Result<Arc<dyn Message>>;

fn decode_native<T: Record + Message>(buf: &[u8], codec: &Codec) -> Result<Arc<dyn Message>> {
    Ok(Arc::new(codec.unmarshal::<T>(buf)?))
}

fn decode_external<T: ExternalMessage + Message>(
    buf: &[u8],
    _: &Codec,
) -> Result<Arc<dyn Message>> {
    Ok(Arc::new(T::decode_external(buf)?))
}

/// Body type bound to a command id.
#[derive(Clone)]
pub(crate) struct BodyType {
    pub(crate) codec: CodecKind,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) schema: Option<Arc<StructSchema>>,
    pub(crate) decode: DecodeFn,
}

pub(crate) struct MessageInfo<C> {
    pub(crate) body: Option<BodyType>,
    pub(crate) router: Option<Arc<dyn ExternalRouter<C>>>,
    pub(crate) handler: Option<Arc<dyn Handler<C>>>,
    pub(crate) raw_handler: Option<Arc<dyn RawHandler<C>>>,
}

impl<C> MessageInfo<C> {
    fn new(body: Option<BodyType>) -> Self {
        Self {
            body,
            router: None,
            handler: None,
            raw_handler: None,
        }
    }

    pub(crate) fn body_name(&self) -> &'static str {
        self.body.as_ref().map_or("<marker>", |b| b.type_name)
    }
}

/// Mutable command table, consumed by [`Registry::freeze`].
pub struct Registry<C = ()> {
    codec: Codec,
    messages: HashMap<CommandId, MessageInfo<C>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new(ByteOrder::default())
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("byte_order", &self.codec.byte_order())
            .field("messages", &self.messages.len())
            .finish()
    }
}

impl<C> Registry<C> {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            codec: Codec::new(order),
            messages: HashMap::new(),
        }
    }

    pub fn from_config(cfg: &ProcessorConfig) -> Self {
        Self::new(cfg.codec.byte_order)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Bind `command` to a native record type.
    pub fn register<T: Record + Message>(&mut self, command: CommandId) -> Result<&mut Self> {
        let body = BodyType {
            codec: CodecKind::Native,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            schema: Some(T::schema()?),
            decode: decode_native::<T>,
        };
        self.insert(command, Some(body))
    }

    /// Bind `command` to a type owned by an alternate codec.
    pub fn register_external<T: ExternalMessage + Message>(
        &mut self,
        command: CommandId,
    ) -> Result<&mut Self> {
        let body = BodyType {
            codec: CodecKind::Alternate,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            schema: None,
            decode: decode_external::<T>,
        };
        self.insert(command, Some(body))
    }

    /// Register a command that carries no body.
    pub fn register_marker(&mut self, command: CommandId) -> Result<&mut Self> {
        self.insert(command, None)
    }

    fn insert(&mut self, command: CommandId, body: Option<BodyType>) -> Result<&mut Self> {
        if let Some(existing) = self.messages.get(&command) {
            let same = existing.body.as_ref().map(|b| b.type_id) == body.as_ref().map(|b| b.type_id);
            if same {
                return Ok(self);
            }
            return Err(WireError::DuplicateCommand {
                command,
                existing: existing.body_name(),
            });
        }
        if self.messages.len() >= MAX_COMMANDS {
            return Err(WireError::RegistryFull { max: MAX_COMMANDS });
        }

        let info = MessageInfo::new(body);
        tracing::debug!(
            main = command.main(),
            sub = command.sub(),
            message = info.body_name(),
            "message registered"
        );
        self.messages.insert(command, info);
        Ok(self)
    }

    fn entry(&mut self, command: CommandId) -> Result<&mut MessageInfo<C>> {
        self.messages
            .get_mut(&command)
            .ok_or(WireError::NotRegistered(command))
    }

    pub fn set_router(
        &mut self,
        command: CommandId,
        router: Arc<dyn ExternalRouter<C>>,
    ) -> Result<&mut Self> {
        self.entry(command)?.router = Some(router);
        Ok(self)
    }

    pub fn set_handler<H>(&mut self, command: CommandId, handler: H) -> Result<&mut Self>
    where
        H: Handler<C> + 'static,
    {
        self.entry(command)?.handler = Some(Arc::new(handler));
        Ok(self)
    }

    /// Bodies of `command` skip decoding and go to `handler` as bytes.
    pub fn set_raw_handler<H>(&mut self, command: CommandId, handler: H) -> Result<&mut Self>
    where
        H: RawHandler<C> + 'static,
    {
        self.entry(command)?.raw_handler = Some(Arc::new(handler));
        Ok(self)
    }

    pub fn freeze(self) -> Processor<C> {
        tracing::debug!(
            messages = self.messages.len(),
            byte_order = ?self.codec.byte_order(),
            "registry frozen"
        );
        Processor::new(self.codec, self.messages)
    }
}
