//! Framing seam.
//!
//! The processor produces header/body chunks and consumes complete
//! messages; turning those into stream frames is the transport's job.
//! Implement [`Framer`] for the transport and use the helpers below.

use bytes::{Bytes, BytesMut};

use leafwire_core::error::Result;
use leafwire_core::protocol::{CommandId, Message};

use crate::envelope::{Envelope, UnmarshalError};
use crate::processor::Processor;

pub trait Framer {
    /// Join chunks into one frame.
    fn pack(&self, chunks: &[Bytes]) -> Result<Bytes>;

    /// Split one complete message off the front of `buf`. `Ok(None)` means
    /// more input is needed.
    fn unpack(&self, buf: &mut BytesMut) -> Result<Option<Bytes>>;
}

impl<C> Processor<C> {
    /// Marshal and frame one message.
    pub fn pack_message<F: Framer + ?Sized>(
        &self,
        framer: &F,
        envelope: &Envelope,
        command: CommandId,
        payload: Option<&dyn Message>,
    ) -> Result<Bytes> {
        framer.pack(&self.marshal(envelope, command, payload)?)
    }

    /// Frame a header with a body that is already encoded.
    pub fn pack_raw_body<F: Framer + ?Sized>(
        &self,
        framer: &F,
        envelope: &Envelope,
        command: CommandId,
        body: Bytes,
    ) -> Result<Bytes> {
        framer.pack(&[self.marshal_cmd(envelope, command), body])
    }

    /// Unpack every complete frame in `buf` and unmarshal each one.
    /// A partial trailing frame stays in `buf`.
    pub fn drain_frames<F: Framer + ?Sized>(
        &self,
        framer: &F,
        buf: &mut BytesMut,
    ) -> Result<Vec<std::result::Result<Envelope, UnmarshalError>>> {
        let mut out = Vec::new();
        while let Some(frame) = framer.unpack(buf)? {
            out.push(self.unmarshal(frame));
        }
        Ok(out)
    }
}
