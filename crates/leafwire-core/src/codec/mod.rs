//! Schema-driven binary codec.
//!
//! Layout rules:
//! - numeric fields are fixed width in the configured byte order;
//! - strings, byte strings and sequences carry a u16 length / count prefix;
//! - fixed arrays carry no prefix;
//! - optional records carry a 1-byte presence flag;
//! - fields after the version field are gated by its runtime value.

use std::any::Any;

use bytes::Bytes;

pub mod buffer;
pub mod cache;
pub mod field;
pub mod kind;
pub mod record;
pub mod schema;

pub use buffer::{ByteOrder, Reader, Writer, MAX_PREFIXED_LEN, PREFIX_LEN};
pub use field::{Layout, WireField};
pub use kind::{FieldKind, ALWAYS, VERSION_FIELD};
pub use record::Record;
pub use schema::{FieldDescriptor, SchemaBuilder, StructSchema};

use crate::error::{Result, SchemaError, WireError};

/// Stateless encoder / decoder bound to one byte order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    order: ByteOrder,
}

impl Codec {
    pub fn new(order: ByteOrder) -> Self {
        Self { order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Exact encoded length of `rec`.
    pub fn size(&self, schema: &StructSchema, rec: Option<&dyn Any>) -> Result<usize> {
        record::size(schema, rec.ok_or(WireError::NilValue)?)
    }

    pub fn encode(&self, schema: &StructSchema, rec: Option<&dyn Any>) -> Result<Bytes> {
        let rec = rec.ok_or(WireError::NilValue)?;
        let expected = record::size(schema, rec)?;
        let mut w = Writer::with_capacity(expected, self.order);
        record::encode(schema, rec, &mut w)?;
        if w.len() != expected {
            return Err(SchemaError::SizeMismatch {
                record: schema.name(),
                expected,
                actual: w.len(),
            }
            .into());
        }
        Ok(w.finish().freeze())
    }

    /// Decode into `rec`. Gated-out fields keep their current values and
    /// trailing input is ignored.
    pub fn decode(&self, buf: &[u8], schema: &StructSchema, rec: &mut dyn Any) -> Result<()> {
        let mut r = Reader::new(buf, self.order);
        record::decode(schema, rec, &mut r)
    }

    pub fn encoded_size<R: Record>(&self, rec: &R) -> Result<usize> {
        let schema = R::schema()?;
        self.size(&schema, Some(rec as &dyn Any))
    }

    pub fn marshal<R: Record>(&self, rec: &R) -> Result<Bytes> {
        let schema = R::schema()?;
        self.encode(&schema, Some(rec as &dyn Any))
    }

    pub fn unmarshal<R: Record>(&self, buf: &[u8]) -> Result<R> {
        let mut rec = R::default();
        self.unmarshal_into(buf, &mut rec)?;
        Ok(rec)
    }

    pub fn unmarshal_into<R: Record>(&self, buf: &[u8], rec: &mut R) -> Result<()> {
        let schema = R::schema()?;
        self.decode(buf, &schema, rec)
    }
}
