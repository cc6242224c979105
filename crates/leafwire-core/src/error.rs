//! Shared error type across leafwire crates.

use thiserror::Error;

use crate::protocol::command::CommandId;

/// Who is at fault when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad registration or schema declaration. Surfaces at startup and
    /// should abort the process; never retried.
    Programmer,
    /// Bad or unexpected traffic. Returned to the caller, which may drop,
    /// retry, or reply with a correlated error.
    Data,
}

/// Stable error codes (used by logs and test vectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NilValue,
    UnexpectedEof,
    LengthOverflow,
    InvalidUtf8,
    TooShort,
    ReservedFlags,
    UnknownCommand,
    Unhandled,
    External,
    PayloadMismatch,
    Schema,
    NotRegistered,
    DuplicateCommand,
    RegistryFull,
    Config,
}

impl ErrorCode {
    /// String representation used in logs and vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NilValue => "NIL_VALUE",
            ErrorCode::UnexpectedEof => "UNEXPECTED_EOF",
            ErrorCode::LengthOverflow => "LENGTH_OVERFLOW",
            ErrorCode::InvalidUtf8 => "INVALID_UTF8",
            ErrorCode::TooShort => "TOO_SHORT",
            ErrorCode::ReservedFlags => "RESERVED_FLAGS",
            ErrorCode::UnknownCommand => "UNKNOWN_COMMAND",
            ErrorCode::Unhandled => "UNHANDLED",
            ErrorCode::External => "EXTERNAL",
            ErrorCode::PayloadMismatch => "PAYLOAD_MISMATCH",
            ErrorCode::Schema => "SCHEMA",
            ErrorCode::NotRegistered => "NOT_REGISTERED",
            ErrorCode::DuplicateCommand => "DUPLICATE_COMMAND",
            ErrorCode::RegistryFull => "REGISTRY_FULL",
            ErrorCode::Config => "CONFIG",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WireError>;

/// Schema declaration problems, detected while a schema is derived or
/// (defensively) while it is walked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{record}: more than one version field ({field})")]
    DuplicateVersionField {
        record: &'static str,
        field: &'static str,
    },
    #[error("{record}.{field}: versioned field declared before the version field")]
    VersionedBeforeVersionField {
        record: &'static str,
        field: &'static str,
    },
    #[error("{record}.{field}: min version {min_version} is lower than preceding {previous}")]
    VersionOrder {
        record: &'static str,
        field: &'static str,
        min_version: i64,
        previous: i64,
    },
    #[error("{record}.{field}: version field must be an integer of at most 32 bits, got {kind}")]
    VersionFieldKind {
        record: &'static str,
        field: &'static str,
        kind: &'static str,
    },
    #[error("schema cycle through {record}")]
    Cycle { record: &'static str },
    #[error("record type mismatch: expected {expected}")]
    RecordMismatch { expected: &'static str },
    #[error("{record}: encoded {actual} bytes, sized {expected}")]
    SizeMismatch {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Unified error type used by core and processor.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("nil value")]
    NilValue,
    #[error("unexpected end of input: need {need} bytes, {remaining} remaining")]
    UnexpectedEof { need: usize, remaining: usize },
    #[error("length {len} exceeds the u16 prefix limit")]
    LengthOverflow { len: usize },
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,
    #[error("message too short: {len} bytes, need {need}")]
    TooShort { len: usize, need: usize },
    #[error("reserved flag bits set: {0:#04x}")]
    ReservedFlags(u8),
    #[error("command {0} not registered")]
    UnknownCommand(CommandId),
    #[error("command {0} not handled")]
    Unhandled(CommandId),
    #[error("alternate codec: {0}")]
    External(String),
    #[error("command {command}: payload {actual} does not match {expected}")]
    PayloadMismatch {
        command: CommandId,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("command {0} must be registered before attaching")]
    NotRegistered(CommandId),
    #[error("command {command} already registered as {existing}")]
    DuplicateCommand {
        command: CommandId,
        existing: &'static str,
    },
    #[error("too many messages (max = {max})")]
    RegistryFull { max: usize },
    #[error("config: {0}")]
    Config(String),
}

impl WireError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            WireError::NilValue => ErrorCode::NilValue,
            WireError::UnexpectedEof { .. } => ErrorCode::UnexpectedEof,
            WireError::LengthOverflow { .. } => ErrorCode::LengthOverflow,
            WireError::InvalidUtf8 => ErrorCode::InvalidUtf8,
            WireError::TooShort { .. } => ErrorCode::TooShort,
            WireError::ReservedFlags(_) => ErrorCode::ReservedFlags,
            WireError::UnknownCommand(_) => ErrorCode::UnknownCommand,
            WireError::Unhandled(_) => ErrorCode::Unhandled,
            WireError::External(_) => ErrorCode::External,
            WireError::PayloadMismatch { .. } => ErrorCode::PayloadMismatch,
            WireError::Schema(_) => ErrorCode::Schema,
            WireError::NotRegistered(_) => ErrorCode::NotRegistered,
            WireError::DuplicateCommand { .. } => ErrorCode::DuplicateCommand,
            WireError::RegistryFull { .. } => ErrorCode::RegistryFull,
            WireError::Config(_) => ErrorCode::Config,
        }
    }

    /// Programmer errors belong to startup; data errors to traffic.
    pub fn class(&self) -> ErrorClass {
        match self {
            WireError::PayloadMismatch { .. }
            | WireError::Schema(_)
            | WireError::NotRegistered(_)
            | WireError::DuplicateCommand { .. }
            | WireError::RegistryFull { .. }
            | WireError::Config(_) => ErrorClass::Programmer,
            _ => ErrorClass::Data,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Programmer
    }
}
