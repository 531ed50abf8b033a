//! Decoder for the Java object-serialization stream format (stream magic
//! `0xACED`, protocol version 5).
//!
//! Given a complete byte buffer containing zero or more top-level
//! serialized objects, the decoder returns the full graph of decoded
//! values, preserving object identity (back references) and class
//! hierarchy. Decoding is read-only and one-shot; any violation of the
//! stream grammar is a hard parse failure.
//!
//! Referenceable values (strings, objects, arrays, class descriptors,
//! enum constants) live in a handle table owned by the returned
//! [`DecodedStream`]; they appear everywhere else as
//! [`JavaValue::Ref`] handles, so back references share identity by
//! construction.
//!
//! Classes that override default field serialization can be decoded via
//! the [`Registry`]: a custom class-data parser consumes their stream
//! bytes, and a post-processor can reshape the per-class value once its
//! annotation block is read. [`register_common_containers`] installs the
//! bundled post-processors for the common `java.util` containers.
//!
//! # Example
//!
//! ```
//! let mut data = vec![0xac, 0xed, 0x00, 0x05];
//! data.extend_from_slice(&[0x74, 0x00, 0x05]); // String tag, length 5
//! data.extend_from_slice(b"hello");
//!
//! let stream = javaobj::decode(&data).unwrap();
//! assert_eq!(stream.str_of(&stream.values[0]), Some("hello"));
//! ```

pub mod catalog;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod json;
pub mod registry;
pub mod values;

pub use catalog::register_common_containers;
pub use constants::Tag;
pub use decoder::{Content, DecodedStream, ObjectStreamDecoder};
pub use error::ObjectStreamError;
pub use json::{stream_to_json, to_json};
pub use registry::{ClassDataParser, PostProcessor, Registry};
pub use values::{
    ClassData, ClassDesc, FieldDesc, Handle, JavaArray, JavaEnum, JavaObject, JavaValue, Referent,
};

/// Decodes a complete stream using the process-wide registry.
pub fn decode(data: &[u8]) -> Result<DecodedStream, ObjectStreamError> {
    ObjectStreamDecoder::new(data).decode()
}
