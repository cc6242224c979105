//! Per-type schemas.
//!
//! A [`StructSchema`] is built once per record type by [`SchemaBuilder`]
//! (driven by `Record::describe`), validated, and then shared read-only
//! through the cache. Field values are reached through type-erased
//! accessors so the engine can walk any record without generics.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use super::buffer::{Reader, Writer};
use super::field::{Layout, WireField};
use super::kind::{FieldKind, ALWAYS, VERSION_FIELD};
use super::record::Record;
use crate::error::{Result, SchemaError};

pub(crate) trait FieldAccess: Send + Sync {
    fn size(&self, rec: &dyn Any, layout: Layout) -> Result<usize>;
    fn encode(&self, rec: &dyn Any, w: &mut Writer, layout: Layout) -> Result<()>;
    fn decode(&self, rec: &mut dyn Any, r: &mut Reader<'_>, layout: Layout) -> Result<()>;
    fn version(&self, rec: &dyn Any) -> Result<Option<i64>>;
}

struct Accessor<R, F> {
    get: fn(&R) -> &F,
    get_mut: fn(&mut R) -> &mut F,
}

fn cast<R: Any>(rec: &dyn Any) -> Result<&R> {
    rec.downcast_ref::<R>().ok_or_else(|| {
        SchemaError::RecordMismatch {
            expected: type_name::<R>(),
        }
        .into()
    })
}

fn cast_mut<R: Any>(rec: &mut dyn Any) -> Result<&mut R> {
    rec.downcast_mut::<R>().ok_or_else(|| {
        SchemaError::RecordMismatch {
            expected: type_name::<R>(),
        }
        .into()
    })
}

impl<R: Any, F: WireField> FieldAccess for Accessor<R, F> {
    fn size(&self, rec: &dyn Any, layout: Layout) -> Result<usize> {
        (self.get)(cast::<R>(rec)?).wire_size(layout)
    }

    fn encode(&self, rec: &dyn Any, w: &mut Writer, layout: Layout) -> Result<()> {
        (self.get)(cast::<R>(rec)?).encode(w, layout)
    }

    fn decode(&self, rec: &mut dyn Any, r: &mut Reader<'_>, layout: Layout) -> Result<()> {
        (self.get_mut)(cast_mut::<R>(rec)?).decode(r, layout)
    }

    fn version(&self, rec: &dyn Any) -> Result<Option<i64>> {
        Ok((self.get)(cast::<R>(rec)?).version_value())
    }
}

/// One field in declaration order.
pub struct FieldDescriptor {
    name: &'static str,
    kind: FieldKind,
    min_version: i64,
    access: Box<dyn FieldAccess>,
}

impl FieldDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// `ALWAYS`, `VERSION_FIELD`, or the lowest version carrying the field.
    pub fn min_version(&self) -> i64 {
        self.min_version
    }

    pub fn is_version_field(&self) -> bool {
        self.min_version == VERSION_FIELD
    }

    pub(crate) fn access(&self) -> &dyn FieldAccess {
        self.access.as_ref()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("min_version", &self.min_version)
            .finish()
    }
}

/// Ordered, validated field list of one record type.
pub struct StructSchema {
    name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldDescriptor>,
    omit_absent: bool,
    version_index: Option<usize>,
}

impl StructSchema {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn omit_absent(&self) -> bool {
        self.omit_absent
    }

    pub fn version_field(&self) -> Option<&FieldDescriptor> {
        self.version_index.and_then(|i| self.fields.get(i))
    }

    pub fn layout(&self) -> Layout {
        Layout {
            omit_absent: self.omit_absent,
        }
    }
}

impl fmt::Debug for StructSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructSchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("omit_absent", &self.omit_absent)
            .finish()
    }
}

/// Collects the field list of `R`. Fields are recorded in call order,
/// which is the wire order.
pub struct SchemaBuilder<R> {
    fields: Vec<FieldDescriptor>,
    omit_absent: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> SchemaBuilder<R> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            omit_absent: false,
            _record: PhantomData,
        }
    }

    /// Sequences of optional records in this record skip absent elements.
    pub fn omit_absent(&mut self, on: bool) -> &mut Self {
        self.omit_absent = on;
        self
    }

    /// A field that is always on the wire.
    pub fn field<F: WireField>(
        &mut self,
        name: &'static str,
        get: fn(&R) -> &F,
        get_mut: fn(&mut R) -> &mut F,
    ) -> Result<&mut Self> {
        self.push(name, ALWAYS, get, get_mut)
    }

    /// The record's version field.
    pub fn version<F: WireField>(
        &mut self,
        name: &'static str,
        get: fn(&R) -> &F,
        get_mut: fn(&mut R) -> &mut F,
    ) -> Result<&mut Self> {
        self.push(name, VERSION_FIELD, get, get_mut)
    }

    /// A field present only when the runtime version is at least `min_version`.
    pub fn since<F: WireField>(
        &mut self,
        min_version: u32,
        name: &'static str,
        get: fn(&R) -> &F,
        get_mut: fn(&mut R) -> &mut F,
    ) -> Result<&mut Self> {
        self.push(name, i64::from(min_version), get, get_mut)
    }

    fn push<F: WireField>(
        &mut self,
        name: &'static str,
        min_version: i64,
        get: fn(&R) -> &F,
        get_mut: fn(&mut R) -> &mut F,
    ) -> Result<&mut Self> {
        let kind = F::kind()?;
        self.fields.push(FieldDescriptor {
            name,
            kind,
            min_version,
            access: Box::new(Accessor { get, get_mut }),
        });
        Ok(self)
    }

    pub(crate) fn finish(self) -> Result<StructSchema> {
        let record = type_name::<R>();
        let mut version_index = None;
        let mut previous: Option<i64> = None;

        for (i, f) in self.fields.iter().enumerate() {
            match f.min_version {
                VERSION_FIELD => {
                    if version_index.is_some() {
                        return Err(SchemaError::DuplicateVersionField {
                            record,
                            field: f.name,
                        }
                        .into());
                    }
                    if !f.kind.can_gate() {
                        return Err(SchemaError::VersionFieldKind {
                            record,
                            field: f.name,
                            kind: f.kind.name(),
                        }
                        .into());
                    }
                    version_index = Some(i);
                }
                ALWAYS => {
                    // Ungated fields may only precede the version field.
                    if version_index.is_some() {
                        return Err(SchemaError::VersionOrder {
                            record,
                            field: f.name,
                            min_version: ALWAYS,
                            previous: previous.unwrap_or(VERSION_FIELD),
                        }
                        .into());
                    }
                }
                v => {
                    if version_index.is_none() {
                        return Err(SchemaError::VersionedBeforeVersionField {
                            record,
                            field: f.name,
                        }
                        .into());
                    }
                    if let Some(p) = previous {
                        if v < p {
                            return Err(SchemaError::VersionOrder {
                                record,
                                field: f.name,
                                min_version: v,
                                previous: p,
                            }
                            .into());
                        }
                    }
                    previous = Some(v);
                }
            }
        }

        Ok(StructSchema {
            name: record,
            type_id: TypeId::of::<R>(),
            fields: self.fields,
            omit_absent: self.omit_absent,
            version_index,
        })
    }
}
