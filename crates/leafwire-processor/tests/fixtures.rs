//! Message types and helpers shared by processor tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use leafwire_core::protocol::CommandId;
use leafwire_core::{Json, Record, Result, WireError};
use leafwire_processor::Framer;

pub const LOGIN: CommandId = CommandId::new(1, 1);
pub const CHAT: CommandId = CommandId::new(1, 2);
pub const PING: CommandId = CommandId::new(2, 0);
pub const PROFILE: CommandId = CommandId::new(3, 0);
pub const BLOB: CommandId = CommandId::new(4, 0);

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Login {
    #[wire(version)]
    pub ver: u8,
    pub user: String,
    #[wire(since = 2)]
    pub token: Vec<u8>,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Chat {
    pub room: u32,
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub level: u32,
}

pub type ProfileMsg = Json<Profile>;

/// Per-message context handed to handlers and routers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conn {
    pub id: u32,
}

/// u16 little-endian length-prefixed frames.
pub struct LenFramer;

impl Framer for LenFramer {
    fn pack(&self, chunks: &[Bytes]) -> Result<Bytes> {
        let len: usize = chunks.iter().map(Bytes::len).sum();
        let prefix = u16::try_from(len).map_err(|_| WireError::LengthOverflow { len })?;
        let mut out = BytesMut::with_capacity(2 + len);
        out.put_u16_le(prefix);
        for c in chunks {
            out.put_slice(c);
        }
        Ok(out.freeze())
    }

    fn unpack(&self, buf: &mut BytesMut) -> Result<Option<Bytes>> {
        if buf.len() < 2 {
            return Ok(None);
        }
        let len = usize::from(u16::from_le_bytes([buf[0], buf[1]]));
        if buf.len() < 2 + len {
            return Ok(None);
        }
        buf.advance(2);
        Ok(Some(buf.split_to(len).freeze()))
    }
}

pub fn join(chunks: &[Bytes]) -> Bytes {
    Bytes::from(chunks.concat())
}
