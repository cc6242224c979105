//! Cursor types for the codec.
//!
//! Parsing rules (same as the header parser):
//! - Never index the input; every read goes through `Buf` after a
//!   `remaining()` check.
//! - The writer never grows past the size computed up front; the engine
//!   compares the final length against it.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::Deserialize;

use crate::error::{Result, WireError};

/// Width of every length / count prefix.
pub const PREFIX_LEN: usize = 2;

/// Largest value a length prefix can carry.
pub const MAX_PREFIXED_LEN: usize = u16::MAX as usize;

/// Byte order applied to numeric fields and length prefixes alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

macro_rules! put_num {
    ($name:ident, $ty:ty, $le:ident, $be:ident) => {
        pub fn $name(&mut self, v: $ty) {
            match self.order {
                ByteOrder::Little => self.buf.$le(v),
                ByteOrder::Big => self.buf.$be(v),
            }
        }
    };
}

macro_rules! get_num {
    ($name:ident, $ty:ty, $le:ident, $be:ident) => {
        pub fn $name(&mut self) -> Result<$ty> {
            self.need(std::mem::size_of::<$ty>())?;
            Ok(match self.order {
                ByteOrder::Little => self.buf.$le(),
                ByteOrder::Big => self.buf.$be(),
            })
        }
    };
}

/// Output cursor, preallocated to the exact encoded size.
#[derive(Debug)]
pub struct Writer {
    buf: BytesMut,
    order: ByteOrder,
}

impl Writer {
    pub fn with_capacity(capacity: usize, order: ByteOrder) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    put_num!(put_u16, u16, put_u16_le, put_u16);
    put_num!(put_u32, u32, put_u32_le, put_u32);
    put_num!(put_u64, u64, put_u64_le, put_u64);

    /// Write a u16 length / count prefix, rejecting anything above 65535.
    pub fn put_len(&mut self, len: usize) -> Result<()> {
        let len = u16::try_from(len).map_err(|_| WireError::LengthOverflow { len })?;
        self.put_u16(len);
        Ok(())
    }

    pub fn put_slice(&mut self, src: &[u8]) {
        self.buf.put_slice(src);
    }

    pub fn finish(self) -> BytesMut {
        self.buf
    }
}

/// Input cursor over a borrowed buffer.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, order }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, n: usize) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < n {
            return Err(WireError::UnexpectedEof { need: n, remaining });
        }
        Ok(())
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    get_num!(get_u16, u16, get_u16_le, get_u16);
    get_num!(get_u32, u32, get_u32_le, get_u32);
    get_num!(get_u64, u64, get_u64_le, get_u64);

    pub fn get_len(&mut self) -> Result<usize> {
        Ok(usize::from(self.get_u16()?))
    }

    /// Borrow the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn take_bytes(&mut self, n: usize) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self.take(n)?))
    }
}
