//! Local handlers.
//!
//! Handlers run synchronously on the caller's thread during `route`.
//! Closures with the matching signature implement the traits directly.

use bytes::Bytes;

use leafwire_core::error::Result;
use leafwire_core::protocol::CommandId;

use crate::envelope::Envelope;

pub trait Handler<C>: Send + Sync {
    fn handle(&self, envelope: &Envelope, ctx: &C) -> Result<()>;
}

impl<C, F> Handler<C> for F
where
    F: Fn(&Envelope, &C) -> Result<()> + Send + Sync,
{
    fn handle(&self, envelope: &Envelope, ctx: &C) -> Result<()> {
        self(envelope, ctx)
    }
}

/// Receives the undecoded body of its command.
pub trait RawHandler<C>: Send + Sync {
    fn handle_raw(&self, command: CommandId, data: &Bytes, ctx: &C) -> Result<()>;
}

impl<C, F> RawHandler<C> for F
where
    F: Fn(CommandId, &Bytes, &C) -> Result<()> + Send + Sync,
{
    fn handle_raw(&self, command: CommandId, data: &Bytes, ctx: &C) -> Result<()> {
        self(command, data, ctx)
    }
}
