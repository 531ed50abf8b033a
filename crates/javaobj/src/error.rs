//! Object-stream decoder error type.

use javaobj_buffers::ReadError;
use thiserror::Error;

/// Error type for object-stream decoding.
///
/// Every error is fatal to the parse; no partial output is returned.
#[derive(Debug, Error)]
pub enum ObjectStreamError {
    #[error("premature end of input at offset {offset}")]
    EndOfInput { offset: usize },
    #[error("invalid UTF-8 sequence at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("string length {length} too large at offset {offset}")]
    StringTooLong { offset: usize, length: u64 },
    #[error("bad stream magic 0x{0:04x}")]
    BadMagic(u16),
    #[error("unsupported stream version {0}")]
    BadVersion(u16),
    #[error("unknown content tag 0x{byte:02x} at offset {offset}")]
    UnknownTag { byte: u8, offset: usize },
    #[error("{tag} not allowed here at offset {offset}")]
    DisallowedTag { tag: &'static str, offset: usize },
    #[error("{0}")]
    Unsupported(&'static str),
    #[error("unknown class serialization mode 0x{0:02x}")]
    UnknownClassMode(u8),
    #[error("unknown field type code 0x{code:02x} at offset {offset}")]
    UnknownTypeCode { code: u8, offset: usize },
    #[error("reference to unassigned handle 0x{handle:08x} at offset {offset}")]
    BadHandle { handle: u32, offset: usize },
    #[error("unexpected end-block marker at offset {offset}")]
    UnexpectedEndBlock { offset: usize },
    #[error("expected a string value at offset {offset}")]
    ExpectedString { offset: usize },
    #[error("expected a class descriptor at offset {offset}")]
    ExpectedClassDesc { offset: usize },
    #[error("instance without a class descriptor at offset {offset}")]
    MissingClassDesc { offset: usize },
    #[error("invalid array length {length} at offset {offset}")]
    InvalidArrayLength { length: i32, offset: usize },
    #[error("array class name `{0}` has no element type")]
    BadArrayClassName(String),
    #[error("serialVersionUID `{0}` must be exactly 16 hex digits")]
    InvalidUid(String),
    #[error("invalid annotation layout: {0}")]
    BadAnnotations(&'static str),
}

impl From<ReadError> for ObjectStreamError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::EndOfInput { offset } => ObjectStreamError::EndOfInput { offset },
            ReadError::InvalidUtf8 { offset } => ObjectStreamError::InvalidUtf8 { offset },
            ReadError::LengthOverflow { offset, length } => {
                ObjectStreamError::StringTooLong { offset, length }
            }
        }
    }
}
