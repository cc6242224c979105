//! Field kind taxonomy and version-gate sentinels.

use std::fmt;
use std::sync::Arc;

use super::schema::StructSchema;

/// `min_version` of the designated version field.
pub const VERSION_FIELD: i64 = -1;

/// `min_version` of a field that is never gated.
pub const ALWAYS: i64 = -2;

/// Wire classification of a field. Structured kinds carry the nested
/// schema shared from the cache.
#[derive(Clone)]
pub enum FieldKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    String,
    Bytes,
    Record(Arc<StructSchema>),
    OptionalRecord(Arc<StructSchema>),
    Array { elem: Box<FieldKind>, len: usize },
    Seq(Box<FieldKind>),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::U8 => "u8",
            FieldKind::I8 => "i8",
            FieldKind::U16 => "u16",
            FieldKind::I16 => "i16",
            FieldKind::U32 => "u32",
            FieldKind::I32 => "i32",
            FieldKind::U64 => "u64",
            FieldKind::I64 => "i64",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Record(_) => "record",
            FieldKind::OptionalRecord(_) => "optional record",
            FieldKind::Array { .. } => "array",
            FieldKind::Seq(_) => "sequence",
        }
    }

    /// Fixed encoded width, if the kind has one.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            FieldKind::Bool | FieldKind::U8 | FieldKind::I8 => Some(1),
            FieldKind::U16 | FieldKind::I16 => Some(2),
            FieldKind::U32 | FieldKind::I32 => Some(4),
            FieldKind::U64 | FieldKind::I64 => Some(8),
            FieldKind::Array { elem, len } => elem.fixed_width().map(|w| w * len),
            _ => None,
        }
    }

    /// Kinds allowed to carry the runtime version value.
    pub fn can_gate(&self) -> bool {
        matches!(
            self,
            FieldKind::U8
                | FieldKind::I8
                | FieldKind::U16
                | FieldKind::I16
                | FieldKind::U32
                | FieldKind::I32
        )
    }

    /// Nested schema of a structured kind.
    pub fn schema(&self) -> Option<&Arc<StructSchema>> {
        match self {
            FieldKind::Record(s) | FieldKind::OptionalRecord(s) => Some(s),
            _ => None,
        }
    }

    /// Element kind of sequences and arrays.
    pub fn elem(&self) -> Option<&FieldKind> {
        match self {
            FieldKind::Seq(e) | FieldKind::Array { elem: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Record(s) => write!(f, "Record({})", s.name()),
            FieldKind::OptionalRecord(s) => write!(f, "OptionalRecord({})", s.name()),
            FieldKind::Array { elem, len } => write!(f, "[{elem:?}; {len}]"),
            FieldKind::Seq(elem) => write!(f, "Seq({elem:?})"),
            other => f.write_str(other.name()),
        }
    }
}
