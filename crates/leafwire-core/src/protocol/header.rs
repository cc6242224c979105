//! Envelope header parsing (panic-free).
//!
//! Layout (configured byte order):
//! - byte 0: flags
//! - bytes 1..5: command id (u32)
//! - bytes 5..9: rpc call id (u32), only when the RPC flag is set
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::command::{CommandId, MessageFlags};
use crate::codec::ByteOrder;
use crate::error::{Result, WireError};

/// Header length without an rpc call id.
pub const HEADER_LEN: usize = 5;

/// Header length with an rpc call id.
pub const RPC_HEADER_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub flags: MessageFlags,
    pub command: CommandId,
    /// Meaningful only when `flags` carries RPC.
    pub rpc_call_id: u32,
}

fn get_u32(buf: &mut &[u8], order: ByteOrder) -> u32 {
    match order {
        ByteOrder::Little => buf.get_u32_le(),
        ByteOrder::Big => buf.get_u32(),
    }
}

impl Header {
    pub fn new(command: CommandId) -> Self {
        Self {
            flags: MessageFlags::NONE,
            command,
            rpc_call_id: 0,
        }
    }

    pub fn rpc(command: CommandId, rpc_call_id: u32) -> Self {
        Self {
            flags: MessageFlags::RPC,
            command,
            rpc_call_id,
        }
    }

    /// Encoded length: 5, or 9 with the RPC flag.
    pub fn len(&self) -> usize {
        if self.flags.is_rpc() {
            RPC_HEADER_LEN
        } else {
            HEADER_LEN
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn write(&self, buf: &mut BytesMut, order: ByteOrder) {
        buf.put_u8(self.flags.bits());
        buf.put_slice(&self.command.to_bytes(order));
        if self.flags.is_rpc() {
            match order {
                ByteOrder::Little => buf.put_u32_le(self.rpc_call_id),
                ByteOrder::Big => buf.put_u32(self.rpc_call_id),
            }
        }
    }

    pub fn encode(&self, order: ByteOrder) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());
        self.write(&mut buf, order);
        buf.freeze()
    }

    /// Parse a header, returning it with the offset of the body.
    pub fn decode(buf: &[u8], order: ByteOrder) -> Result<(Header, usize)> {
        let len = buf.len();
        let mut cur = buf;
        if cur.remaining() < HEADER_LEN {
            return Err(WireError::TooShort {
                len,
                need: HEADER_LEN,
            });
        }

        let flags = MessageFlags::from_bits(cur.get_u8());
        let command = CommandId::from_raw(get_u32(&mut cur, order));

        let rpc_call_id = if flags.is_rpc() {
            if cur.remaining() < 4 {
                return Err(WireError::TooShort {
                    len,
                    need: RPC_HEADER_LEN,
                });
            }
            get_u32(&mut cur, order)
        } else {
            0
        };

        let header = Header {
            flags,
            command,
            rpc_call_id,
        };
        Ok((header, header.len()))
    }

    /// Flags and command id, when at least the fixed part is present.
    pub fn decode_prefix(buf: &[u8], order: ByteOrder) -> Option<(MessageFlags, CommandId)> {
        let mut cur = buf;
        if cur.remaining() < HEADER_LEN {
            return None;
        }
        let flags = MessageFlags::from_bits(cur.get_u8());
        Some((flags, CommandId::from_raw(get_u32(&mut cur, order))))
    }
}
