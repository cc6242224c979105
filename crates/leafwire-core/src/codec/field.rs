//! Per-type wire rules.
//!
//! Every Rust type that can appear as a record field implements
//! [`WireField`]: it reports its [`FieldKind`] (used when the schema is
//! derived) and knows its own size, encoding and decoding. Records
//! implement it through `#[derive(Record)]` / `impl_record!`, which route
//! back into the schema engine.

use bytes::Bytes;

use super::buffer::{Reader, Writer, PREFIX_LEN};
use super::kind::FieldKind;
use super::record::Record;
use crate::error::{Result, WireError};

/// Encoding options inherited from the record that owns a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    /// Sequences of optional records carry only present elements.
    pub omit_absent: bool,
}

/// A value with a fixed wire representation.
pub trait WireField: Sized + Send + Sync + 'static {
    /// Classify the type. Structured kinds resolve their nested schema
    /// through the cache.
    fn kind() -> Result<FieldKind>;

    /// The value a field holds before decoding (and keeps when gated out).
    fn zero() -> Self;

    fn wire_size(&self, layout: Layout) -> Result<usize>;

    fn encode(&self, w: &mut Writer, layout: Layout) -> Result<()>;

    fn decode(&mut self, r: &mut Reader<'_>, layout: Layout) -> Result<()>;

    /// Runtime value when this field acts as a version field.
    fn version_value(&self) -> Option<i64> {
        None
    }

    /// Absent optional records are dropped from `omit_absent` sequences.
    fn is_absent(&self) -> bool {
        false
    }

    /// Size without the presence marker (`omit_absent` sequences).
    fn present_size(&self, layout: Layout) -> Result<usize> {
        self.wire_size(layout)
    }

    fn encode_present(&self, w: &mut Writer, layout: Layout) -> Result<()> {
        self.encode(w, layout)
    }

    fn decode_present(&mut self, r: &mut Reader<'_>, layout: Layout) -> Result<()> {
        self.decode(r, layout)
    }

    fn size_all(items: &[Self], layout: Layout) -> Result<usize> {
        items.iter().try_fold(0usize, |acc, e| {
            Ok::<usize, WireError>(acc + e.wire_size(layout)?)
        })
    }

    fn encode_all(items: &[Self], w: &mut Writer, layout: Layout) -> Result<()> {
        items.iter().try_for_each(|e| e.encode(w, layout))
    }

    fn decode_all(items: &mut [Self], r: &mut Reader<'_>, layout: Layout) -> Result<()> {
        items.iter_mut().try_for_each(|e| e.decode(r, layout))
    }

    /// Decode `n` sequence elements.
    fn decode_vec(n: usize, r: &mut Reader<'_>, layout: Layout) -> Result<Vec<Self>> {
        // Hostile counts must not allocate ahead of the input.
        let mut items = Vec::with_capacity(n.min(r.remaining()));
        for _ in 0..n {
            let mut e = Self::zero();
            if layout.omit_absent {
                e.decode_present(r, layout)?;
            } else {
                e.decode(r, layout)?;
            }
            items.push(e);
        }
        Ok(items)
    }
}

impl WireField for bool {
    fn kind() -> Result<FieldKind> {
        Ok(FieldKind::Bool)
    }

    fn zero() -> Self {
        false
    }

    fn wire_size(&self, _: Layout) -> Result<usize> {
        Ok(1)
    }

    fn encode(&self, w: &mut Writer, _: Layout) -> Result<()> {
        w.put_u8(u8::from(*self));
        Ok(())
    }

    fn decode(&mut self, r: &mut Reader<'_>, _: Layout) -> Result<()> {
        *self = r.get_u8()? != 0;
        Ok(())
    }
}

impl WireField for u8 {
    fn kind() -> Result<FieldKind> {
        Ok(FieldKind::U8)
    }

    fn zero() -> Self {
        0
    }

    fn wire_size(&self, _: Layout) -> Result<usize> {
        Ok(1)
    }

    fn encode(&self, w: &mut Writer, _: Layout) -> Result<()> {
        w.put_u8(*self);
        Ok(())
    }

    fn decode(&mut self, r: &mut Reader<'_>, _: Layout) -> Result<()> {
        *self = r.get_u8()?;
        Ok(())
    }

    fn version_value(&self) -> Option<i64> {
        Some(i64::from(*self))
    }

    fn size_all(items: &[Self], _: Layout) -> Result<usize> {
        Ok(items.len())
    }

    fn encode_all(items: &[Self], w: &mut Writer, _: Layout) -> Result<()> {
        w.put_slice(items);
        Ok(())
    }

    fn decode_all(items: &mut [Self], r: &mut Reader<'_>, _: Layout) -> Result<()> {
        items.copy_from_slice(r.take(items.len())?);
        Ok(())
    }

    fn decode_vec(n: usize, r: &mut Reader<'_>, _: Layout) -> Result<Vec<Self>> {
        Ok(r.take(n)?.to_vec())
    }
}

macro_rules! int_field {
    ($ty:ty, $kind:ident, $bits:ty, $put:ident, $get:ident, gate = $gate:literal) => {
        impl WireField for $ty {
            fn kind() -> Result<FieldKind> {
                Ok(FieldKind::$kind)
            }

            fn zero() -> Self {
                0
            }

            fn wire_size(&self, _: Layout) -> Result<usize> {
                Ok(std::mem::size_of::<$ty>())
            }

            fn encode(&self, w: &mut Writer, _: Layout) -> Result<()> {
                w.$put(*self as $bits);
                Ok(())
            }

            fn decode(&mut self, r: &mut Reader<'_>, _: Layout) -> Result<()> {
                *self = r.$get()? as $ty;
                Ok(())
            }

            fn version_value(&self) -> Option<i64> {
                // Read through the unsigned width: an i8 of -1 is version 255.
                if $gate {
                    Some(*self as $bits as i64)
                } else {
                    None
                }
            }

            fn size_all(items: &[Self], _: Layout) -> Result<usize> {
                Ok(items.len() * std::mem::size_of::<$ty>())
            }
        }
    };
}

int_field!(i8, I8, u8, put_u8, get_u8, gate = true);
int_field!(u16, U16, u16, put_u16, get_u16, gate = true);
int_field!(i16, I16, u16, put_u16, get_u16, gate = true);
int_field!(u32, U32, u32, put_u32, get_u32, gate = true);
int_field!(i32, I32, u32, put_u32, get_u32, gate = true);
int_field!(u64, U64, u64, put_u64, get_u64, gate = false);
int_field!(i64, I64, u64, put_u64, get_u64, gate = false);

impl WireField for String {
    fn kind() -> Result<FieldKind> {
        Ok(FieldKind::String)
    }

    fn zero() -> Self {
        String::new()
    }

    fn wire_size(&self, _: Layout) -> Result<usize> {
        Ok(PREFIX_LEN + self.len())
    }

    fn encode(&self, w: &mut Writer, _: Layout) -> Result<()> {
        w.put_len(self.len())?;
        w.put_slice(self.as_bytes());
        Ok(())
    }

    fn decode(&mut self, r: &mut Reader<'_>, _: Layout) -> Result<()> {
        let n = r.get_len()?;
        let raw = r.take(n)?;
        *self = std::str::from_utf8(raw)
            .map_err(|_| WireError::InvalidUtf8)?
            .to_owned();
        Ok(())
    }
}

impl WireField for Bytes {
    fn kind() -> Result<FieldKind> {
        Ok(FieldKind::Bytes)
    }

    fn zero() -> Self {
        Bytes::new()
    }

    fn wire_size(&self, _: Layout) -> Result<usize> {
        Ok(PREFIX_LEN + self.len())
    }

    fn encode(&self, w: &mut Writer, _: Layout) -> Result<()> {
        w.put_len(self.len())?;
        w.put_slice(self);
        Ok(())
    }

    fn decode(&mut self, r: &mut Reader<'_>, _: Layout) -> Result<()> {
        let n = r.get_len()?;
        *self = r.take_bytes(n)?;
        Ok(())
    }
}

/// Length-prefixed sequence. `Vec<u8>` is the bytes kind; the wire format
/// is the same either way.
impl<T: WireField> WireField for Vec<T> {
    fn kind() -> Result<FieldKind> {
        Ok(match T::kind()? {
            FieldKind::U8 => FieldKind::Bytes,
            elem => FieldKind::Seq(Box::new(elem)),
        })
    }

    fn zero() -> Self {
        Vec::new()
    }

    fn wire_size(&self, layout: Layout) -> Result<usize> {
        let body = if layout.omit_absent {
            self.iter().filter(|e| !e.is_absent()).try_fold(0usize, |acc, e| {
                Ok::<usize, WireError>(acc + e.present_size(layout)?)
            })?
        } else {
            T::size_all(self, layout)?
        };
        Ok(PREFIX_LEN + body)
    }

    fn encode(&self, w: &mut Writer, layout: Layout) -> Result<()> {
        if layout.omit_absent {
            let present = self.iter().filter(|e| !e.is_absent()).count();
            w.put_len(present)?;
            self.iter()
                .filter(|e| !e.is_absent())
                .try_for_each(|e| e.encode_present(w, layout))
        } else {
            w.put_len(self.len())?;
            T::encode_all(self, w, layout)
        }
    }

    fn decode(&mut self, r: &mut Reader<'_>, layout: Layout) -> Result<()> {
        let n = r.get_len()?;
        *self = T::decode_vec(n, r, layout)?;
        Ok(())
    }
}

/// Fixed array: static count, no prefix, every element on the wire.
impl<T: WireField, const N: usize> WireField for [T; N] {
    fn kind() -> Result<FieldKind> {
        Ok(FieldKind::Array {
            elem: Box::new(T::kind()?),
            len: N,
        })
    }

    fn zero() -> Self {
        std::array::from_fn(|_| T::zero())
    }

    fn wire_size(&self, layout: Layout) -> Result<usize> {
        T::size_all(self, layout)
    }

    fn encode(&self, w: &mut Writer, layout: Layout) -> Result<()> {
        T::encode_all(self, w, layout)
    }

    fn decode(&mut self, r: &mut Reader<'_>, layout: Layout) -> Result<()> {
        T::decode_all(self, r, layout)
    }
}

/// Optional nested record: 1-byte presence flag, then the fields.
impl<T: Record> WireField for Option<T> {
    fn kind() -> Result<FieldKind> {
        Ok(FieldKind::OptionalRecord(T::schema()?))
    }

    fn zero() -> Self {
        None
    }

    fn wire_size(&self, layout: Layout) -> Result<usize> {
        Ok(1 + self.present_size(layout)?)
    }

    fn encode(&self, w: &mut Writer, layout: Layout) -> Result<()> {
        match self {
            None => {
                w.put_u8(0);
                Ok(())
            }
            Some(v) => {
                w.put_u8(1);
                v.encode(w, layout)
            }
        }
    }

    fn decode(&mut self, r: &mut Reader<'_>, layout: Layout) -> Result<()> {
        if r.get_u8()? == 0 {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::zero).decode(r, layout)
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }

    fn present_size(&self, layout: Layout) -> Result<usize> {
        match self {
            Some(v) => v.wire_size(layout),
            None => Ok(0),
        }
    }

    fn encode_present(&self, w: &mut Writer, layout: Layout) -> Result<()> {
        match self {
            Some(v) => v.encode(w, layout),
            None => Ok(()),
        }
    }

    fn decode_present(&mut self, r: &mut Reader<'_>, layout: Layout) -> Result<()> {
        let mut v = T::zero();
        v.decode(r, layout)?;
        *self = Some(v);
        Ok(())
    }
}
