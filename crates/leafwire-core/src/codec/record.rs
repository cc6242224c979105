//! Records and the schema walk.
//!
//! The walk is a small state machine over the field list. Fields before
//! the version field are unconditional; the version field establishes the
//! runtime version `V`; every later field is on the wire iff its
//! `min_version <= V`. Encode and size read `V` off the instance before
//! the version field is written; decode reads it right after the field is
//! decoded.

use std::any::Any;
use std::sync::Arc;

use super::buffer::{Reader, Writer};
use super::cache;
use super::field::WireField;
use super::kind::{FieldKind, ALWAYS, VERSION_FIELD};
use super::schema::{FieldDescriptor, SchemaBuilder, StructSchema};
use crate::error::{Result, SchemaError};

/// A user-declared message layout.
///
/// Usually derived:
///
/// ```ignore
/// #[derive(Debug, Default, Record)]
/// struct Login {
///     #[wire(version)]
///     ver: u16,
///     user: String,
///     #[wire(since = 2)]
///     token: Vec<u8>,
/// }
/// ```
pub trait Record: WireField + Default {
    /// Declare the fields, in wire order.
    fn describe(schema: &mut SchemaBuilder<Self>) -> Result<()>;

    /// The cached schema of this type, built on first use.
    fn schema() -> Result<Arc<StructSchema>> {
        cache::schema_of::<Self>()
    }
}

enum Step {
    Emit,
    Version,
    Skip,
}

struct Gate<'s> {
    schema: &'s StructSchema,
    current: Option<i64>,
}

impl<'s> Gate<'s> {
    fn new(schema: &'s StructSchema) -> Self {
        Self {
            schema,
            current: None,
        }
    }

    fn step(&self, f: &FieldDescriptor) -> Result<Step> {
        match (f.min_version(), self.current) {
            (ALWAYS, _) => Ok(Step::Emit),
            (VERSION_FIELD, None) => Ok(Step::Version),
            (VERSION_FIELD, Some(_)) => Err(SchemaError::DuplicateVersionField {
                record: self.schema.name(),
                field: f.name(),
            }
            .into()),
            (min, Some(v)) if min <= v => Ok(Step::Emit),
            (_, Some(_)) => Ok(Step::Skip),
            (_, None) => Err(SchemaError::VersionedBeforeVersionField {
                record: self.schema.name(),
                field: f.name(),
            }
            .into()),
        }
    }

    fn observe(&mut self, f: &FieldDescriptor, rec: &dyn Any) -> Result<()> {
        match f.access().version(rec)? {
            Some(v) => {
                self.current = Some(v);
                Ok(())
            }
            None => Err(SchemaError::VersionFieldKind {
                record: self.schema.name(),
                field: f.name(),
                kind: f.kind().name(),
            }
            .into()),
        }
    }
}

pub(crate) fn size(schema: &StructSchema, rec: &dyn Any) -> Result<usize> {
    let layout = schema.layout();
    let mut gate = Gate::new(schema);
    let mut total = 0usize;
    for f in schema.fields() {
        match gate.step(f)? {
            Step::Skip => continue,
            Step::Version => gate.observe(f, rec)?,
            Step::Emit => {}
        }
        total += f.access().size(rec, layout)?;
    }
    Ok(total)
}

pub(crate) fn encode(schema: &StructSchema, rec: &dyn Any, w: &mut Writer) -> Result<()> {
    let layout = schema.layout();
    let mut gate = Gate::new(schema);
    for f in schema.fields() {
        match gate.step(f)? {
            Step::Skip => continue,
            Step::Version => gate.observe(f, rec)?,
            Step::Emit => {}
        }
        f.access().encode(rec, w, layout)?;
    }
    Ok(())
}

pub(crate) fn decode(schema: &StructSchema, rec: &mut dyn Any, r: &mut Reader<'_>) -> Result<()> {
    let layout = schema.layout();
    let mut gate = Gate::new(schema);
    for f in schema.fields() {
        match gate.step(f)? {
            Step::Skip => continue,
            Step::Version => {
                f.access().decode(rec, r, layout)?;
                gate.observe(f, rec)?;
            }
            Step::Emit => f.access().decode(rec, r, layout)?,
        }
    }
    Ok(())
}

// Glue for `WireField` impls emitted by `#[derive(Record)]` and
// `impl_record!`. A nested record carries its own layout.

#[doc(hidden)]
pub fn record_kind<R: Record>() -> Result<FieldKind> {
    Ok(FieldKind::Record(R::schema()?))
}

#[doc(hidden)]
pub fn record_size<R: Record>(rec: &R) -> Result<usize> {
    let schema = R::schema()?;
    size(&schema, rec)
}

#[doc(hidden)]
pub fn record_encode<R: Record>(rec: &R, w: &mut Writer) -> Result<()> {
    let schema = R::schema()?;
    encode(&schema, rec, w)
}

#[doc(hidden)]
pub fn record_decode<R: Record>(rec: &mut R, r: &mut Reader<'_>) -> Result<()> {
    let schema = R::schema()?;
    decode(&schema, rec, r)
}

/// Implement [`WireField`] and `Message` for a record whose
/// [`Record::describe`] is written by hand.
#[macro_export]
macro_rules! impl_record {
    ($ty:ty) => {
        impl $crate::codec::WireField for $ty {
            fn kind() -> $crate::Result<$crate::codec::FieldKind> {
                $crate::codec::record::record_kind::<Self>()
            }

            fn zero() -> Self {
                ::core::default::Default::default()
            }

            fn wire_size(&self, _: $crate::codec::Layout) -> $crate::Result<usize> {
                $crate::codec::record::record_size(self)
            }

            fn encode(
                &self,
                w: &mut $crate::codec::Writer,
                _: $crate::codec::Layout,
            ) -> $crate::Result<()> {
                $crate::codec::record::record_encode(self, w)
            }

            fn decode(
                &mut self,
                r: &mut $crate::codec::Reader<'_>,
                _: $crate::codec::Layout,
            ) -> $crate::Result<()> {
                $crate::codec::record::record_decode(self, r)
            }
        }

        impl $crate::protocol::Message for $ty {
            fn codec_kind(&self) -> $crate::protocol::CodecKind {
                $crate::protocol::CodecKind::Native
            }

            fn encode_body(&self, codec: &$crate::codec::Codec) -> $crate::Result<$crate::protocol::Body> {
                codec.marshal(self)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }
    };
}
