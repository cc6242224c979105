//! Command ids and message flags.

use std::fmt;

use crate::codec::ByteOrder;

/// Packed 32-bit command id: `main | (sub << 16)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CommandId(u32);

impl CommandId {
    pub const fn new(main: u16, sub: u16) -> Self {
        Self(main as u32 | (sub as u32) << 16)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Low 16 bits.
    pub const fn main(self) -> u16 {
        self.0 as u16
    }

    /// High 16 bits.
    pub const fn sub(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn split(self) -> (u16, u16) {
        (self.main(), self.sub())
    }

    /// The 4 header bytes of this id.
    pub fn to_bytes(self, order: ByteOrder) -> [u8; 4] {
        match order {
            ByteOrder::Little => self.0.to_le_bytes(),
            ByteOrder::Big => self.0.to_be_bytes(),
        }
    }
}

impl From<u32> for CommandId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<(u16, u16)> for CommandId {
    fn from((main, sub): (u16, u16)) -> Self {
        Self::new(main, sub)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.main(), self.sub())
    }
}

impl fmt::Debug for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandId({:#010x} {self})", self.0)
    }
}

/// Header flag byte. Only bit 0 (RPC) is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageFlags(u8);

impl MessageFlags {
    pub const NONE: Self = Self(0);

    /// An rpc call id follows the command id.
    pub const RPC: Self = Self(0x01);

    /// Bits with no assigned meaning.
    pub const RESERVED_MASK: u8 = !0x01;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn set(&mut self, flag: Self) {
        self.0 |= flag.0;
    }

    pub fn unset(&mut self, flag: Self) {
        self.0 &= !flag.0;
    }

    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    pub const fn is_rpc(self) -> bool {
        self.contains(Self::RPC)
    }

    pub const fn reserved_bits(self) -> u8 {
        self.0 & Self::RESERVED_MASK
    }
}

impl From<u8> for MessageFlags {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}
