//! Binary buffer utilities for javaobj.
//!
//! This crate provides the byte cursor underneath the object-stream
//! decoder: a bounds-checked, big-endian [`Reader`] over an immutable byte
//! slice, and a small auto-growing [`Writer`] used to assemble streams in
//! tests.
//!
//! All multi-byte integers and floats are big-endian, matching the wire
//! format. Every read is fallible: running past the end of the buffer is
//! reported as [`ReadError::EndOfInput`] with the offset at which the read
//! was attempted.
//!
//! # Example
//!
//! ```
//! use javaobj_buffers::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.u8(0x01);
//! writer.u16(0x0203);
//! writer.utf("hello");
//! let data = writer.flush();
//!
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.u8().unwrap(), 0x01);
//! assert_eq!(reader.u16().unwrap(), 0x0203);
//! assert_eq!(reader.utf().unwrap(), "hello");
//! ```

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

/// Error type for buffer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// A read would pass the end of the buffer; carries the cursor offset
    /// at which the read was attempted.
    EndOfInput { offset: usize },
    /// A length-prefixed string region was not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// A 64-bit string length with the high 32 bits set.
    LengthOverflow { offset: usize, length: u64 },
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::EndOfInput { offset } => {
                write!(f, "premature end of input at offset {}", offset)
            }
            ReadError::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 sequence at offset {}", offset)
            }
            ReadError::LengthOverflow { offset, length } => {
                write!(f, "string length {} too large at offset {}", length, offset)
            }
        }
    }
}

impl std::error::Error for ReadError {}
