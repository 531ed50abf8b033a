//! Object-stream decoder: tag dispatch, handle table, and the
//! object/array/enum builders.

use std::sync::Arc;

use javaobj_buffers::Reader;

use crate::constants::{sc_flags, type_codes, Tag, BASE_WIRE_HANDLE, STREAM_MAGIC, STREAM_VERSION};
use crate::error::ObjectStreamError;
use crate::registry::Registry;
use crate::values::{
    ClassData, ClassDesc, FieldDesc, Handle, JavaArray, JavaEnum, JavaObject, JavaValue, Referent,
};

/// Result of one `content` dispatch: a decoded value, or the end-block
/// marker that terminates an annotation block. The marker never leaks
/// into decoded values.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Value(JavaValue),
    End,
}

/// The tags admissible in the `classDesc` grammar position.
const CLASS_DESC_TAGS: &[Tag] = &[Tag::ClassDesc, Tag::ProxyClassDesc, Tag::Null, Tag::Reference];

/// One-shot decoder for a complete object-serialization stream.
///
/// Owns the byte cursor and the handle table for the lifetime of one
/// parse; [`ObjectStreamDecoder::decode`] consumes the decoder and
/// returns the full graph as a [`DecodedStream`].
pub struct ObjectStreamDecoder<'de> {
    /// The byte cursor. Public so custom class-data parsers can consume
    /// primitive stream bytes directly.
    pub reader: Reader<'de>,
    handles: Vec<Referent>,
    registry: Arc<Registry>,
}

impl<'de> ObjectStreamDecoder<'de> {
    /// Creates a decoder over `data` using the process-wide registry.
    pub fn new(data: &'de [u8]) -> Self {
        Self::with_registry(data, Registry::global())
    }

    /// Creates a decoder over `data` with an isolated registry.
    pub fn with_registry(data: &'de [u8], registry: Arc<Registry>) -> Self {
        ObjectStreamDecoder {
            reader: Reader::new(data),
            handles: Vec::new(),
            registry,
        }
    }

    /// Decodes the whole stream: validates magic and version, then reads
    /// top-level content until the buffer is exhausted.
    pub fn decode(mut self) -> Result<DecodedStream, ObjectStreamError> {
        let magic = self.reader.u16()?;
        if magic != STREAM_MAGIC {
            return Err(ObjectStreamError::BadMagic(magic));
        }
        let version = self.reader.u16()?;
        if version != STREAM_VERSION {
            return Err(ObjectStreamError::BadVersion(version));
        }
        let mut values = Vec::new();
        while !self.reader.is_eof() {
            values.push(self.content_value()?);
        }
        Ok(DecodedStream {
            values,
            handles: self.handles,
        })
    }

    /// Reads one content item that must be a decoded value; a stray
    /// end-block marker here is fatal.
    pub fn content_value(&mut self) -> Result<JavaValue, ObjectStreamError> {
        let offset = self.reader.x;
        match self.content(None)? {
            Content::Value(value) => Ok(value),
            Content::End => Err(ObjectStreamError::UnexpectedEndBlock { offset }),
        }
    }

    /// Reads one tag byte and dispatches on it. When `allow` is set, any
    /// tag outside the list is fatal, enforcing contextual grammar.
    pub fn content(&mut self, allow: Option<&[Tag]>) -> Result<Content, ObjectStreamError> {
        let offset = self.reader.x;
        let byte = self.reader.u8()?;
        let tag = Tag::from_byte(byte).ok_or(ObjectStreamError::UnknownTag { byte, offset })?;
        if let Some(allow) = allow {
            if !allow.contains(&tag) {
                return Err(ObjectStreamError::DisallowedTag {
                    tag: tag.name(),
                    offset,
                });
            }
        }
        let value = match tag {
            Tag::Null => JavaValue::Null,
            Tag::Reference => self.back_reference()?,
            Tag::ClassDesc => JavaValue::Ref(self.new_class_desc()?),
            Tag::Object => self.object()?,
            Tag::String => {
                let s = self.reader.utf()?;
                JavaValue::Ref(self.new_handle(Referent::Str(s)))
            }
            Tag::LongString => {
                let s = self.reader.long_utf()?;
                JavaValue::Ref(self.new_handle(Referent::Str(s)))
            }
            Tag::Array => self.array()?,
            Tag::Class => {
                let desc = self.class_desc()?;
                JavaValue::Ref(self.new_handle(Referent::Class { desc }))
            }
            Tag::BlockData => {
                let length = self.reader.u8()? as usize;
                JavaValue::Block(self.reader.buf(length)?.to_vec())
            }
            Tag::BlockDataLong => {
                let length = self.reader.u32()? as usize;
                JavaValue::Block(self.reader.buf(length)?.to_vec())
            }
            Tag::EndBlockData => return Ok(Content::End),
            Tag::Enum => self.enum_constant()?,
            Tag::ProxyClassDesc => {
                return Err(ObjectStreamError::Unsupported(
                    "proxy class descriptors are not supported",
                ))
            }
            Tag::Reset => {
                return Err(ObjectStreamError::Unsupported("stream reset is not supported"))
            }
            Tag::Exception => {
                return Err(ObjectStreamError::Unsupported(
                    "exception records are not supported",
                ))
            }
        };
        Ok(Content::Value(value))
    }

    /// Resolves a handle to its table entry.
    pub fn referent(&self, handle: Handle) -> Option<&Referent> {
        let index = handle.0.checked_sub(BASE_WIRE_HANDLE)? as usize;
        self.handles.get(index)
    }

    /// Collects an annotation block: content items until end-block.
    pub fn annotations(&mut self) -> Result<Vec<JavaValue>, ObjectStreamError> {
        let mut items = Vec::new();
        loop {
            match self.content(None)? {
                Content::End => return Ok(items),
                Content::Value(value) => items.push(value),
            }
        }
    }

    /// Reads one primitive value selected by a field type code.
    pub fn primitive(&mut self, code: u8) -> Result<JavaValue, ObjectStreamError> {
        let offset = self.reader.x;
        Ok(match code {
            b'B' => JavaValue::Byte(self.reader.i8()?),
            b'C' => JavaValue::Char(self.reader.u16()?),
            b'D' => JavaValue::Double(self.reader.f64()?),
            b'F' => JavaValue::Float(self.reader.f32()?),
            b'I' => JavaValue::Int(self.reader.i32()?),
            b'J' => JavaValue::Long(self.reader.i64()?),
            b'S' => JavaValue::Short(self.reader.i16()?),
            b'Z' => JavaValue::Bool(self.reader.u8()? != 0),
            _ => return Err(ObjectStreamError::UnknownTypeCode { code, offset }),
        })
    }

    /// Reads a content item that must resolve to a string (directly or
    /// via back reference).
    pub fn string_value(&mut self) -> Result<String, ObjectStreamError> {
        let offset = self.reader.x;
        let value = self.content_value()?;
        if let JavaValue::Ref(handle) = value {
            if let Some(Referent::Str(s)) = self.referent(handle) {
                return Ok(s.clone());
            }
        }
        Err(ObjectStreamError::ExpectedString { offset })
    }

    fn back_reference(&mut self) -> Result<JavaValue, ObjectStreamError> {
        let offset = self.reader.x;
        let wire = self.reader.u32()?;
        match wire.checked_sub(BASE_WIRE_HANDLE) {
            Some(index) if (index as usize) < self.handles.len() => {
                Ok(JavaValue::Ref(Handle(wire)))
            }
            _ => Err(ObjectStreamError::BadHandle { handle: wire, offset }),
        }
    }

    fn new_handle(&mut self, referent: Referent) -> Handle {
        let handle = Handle::from_index(self.handles.len());
        self.handles.push(referent);
        handle
    }

    fn fill(&mut self, handle: Handle, referent: Referent) {
        self.handles[handle.index()] = referent;
    }

    fn desc(&self, handle: Handle) -> Result<&ClassDesc, ObjectStreamError> {
        match self.referent(handle) {
            Some(Referent::ClassDesc(desc)) => Ok(desc),
            _ => Err(ObjectStreamError::ExpectedClassDesc {
                offset: self.reader.x,
            }),
        }
    }

    /// Reads the `classDesc` grammar position: a new descriptor, a back
    /// reference to one, or null.
    pub fn class_desc(&mut self) -> Result<Option<Handle>, ObjectStreamError> {
        let offset = self.reader.x;
        match self.content(Some(CLASS_DESC_TAGS))? {
            Content::Value(JavaValue::Null) => Ok(None),
            Content::Value(JavaValue::Ref(handle)) => match self.referent(handle) {
                Some(Referent::ClassDesc(_)) => Ok(Some(handle)),
                _ => Err(ObjectStreamError::ExpectedClassDesc { offset }),
            },
            _ => Err(ObjectStreamError::ExpectedClassDesc { offset }),
        }
    }

    /// Reads a full class descriptor. The handle is assigned after name
    /// and uid but before fields, annotations, and super, so children can
    /// reference the descriptor under construction.
    fn new_class_desc(&mut self) -> Result<Handle, ObjectStreamError> {
        let name = self.reader.utf()?;
        let serial_version_uid = self.reader.hex(8)?;
        let handle = self.new_handle(Referent::Pending);
        let flags = self.reader.u8()?;
        let count = self.reader.u16()?;
        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            fields.push(self.field_desc()?);
        }
        let annotations = self.annotations()?;
        let super_desc = self.class_desc()?;
        self.fill(
            handle,
            Referent::ClassDesc(ClassDesc {
                is_enum: flags & sc_flags::ENUM != 0,
                name,
                serial_version_uid,
                flags,
                fields,
                annotations,
                super_desc,
            }),
        );
        Ok(handle)
    }

    fn field_desc(&mut self) -> Result<FieldDesc, ObjectStreamError> {
        let offset = self.reader.x;
        let code = self.reader.u8()?;
        if !type_codes::is_primitive(code) && !type_codes::is_reference(code) {
            return Err(ObjectStreamError::UnknownTypeCode { code, offset });
        }
        let name = self.reader.utf()?;
        let class_name = if type_codes::is_reference(code) {
            Some(self.string_value()?)
        } else {
            None
        };
        Ok(FieldDesc {
            type_code: code,
            name,
            class_name,
        })
    }

    /// Builds an object: handle first, then class data along the
    /// inheritance chain, root class first.
    fn object(&mut self) -> Result<JavaValue, ObjectStreamError> {
        let offset = self.reader.x;
        let desc = self
            .class_desc()?
            .ok_or(ObjectStreamError::MissingClassDesc { offset })?;
        let handle = self.new_handle(Referent::Object(JavaObject::new(desc)));
        for class in self.super_chain(desc)? {
            let (name, key, flags) = {
                let d = self.desc(class)?;
                (d.name.clone(), d.registry_key(), d.flags)
            };
            let data = self.class_data(class, flags, &key)?;
            if let Referent::Object(object) = &mut self.handles[handle.index()] {
                object.apply(name, data);
            }
        }
        Ok(JavaValue::Ref(handle))
    }

    /// The inheritance chain of a descriptor, root class first.
    fn super_chain(&self, desc: Handle) -> Result<Vec<Handle>, ObjectStreamError> {
        let mut chain = vec![desc];
        let mut current = desc;
        while let Some(parent) = self.desc(current)?.super_desc {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Reads the class data one class contributes, per its
    /// serialization mode (`flags & 0x0f`).
    fn class_data(
        &mut self,
        class: Handle,
        flags: u8,
        key: &str,
    ) -> Result<ClassData, ObjectStreamError> {
        match flags & 0x0f {
            // serializable, default field values, no annotation block
            0x02 => Ok(ClassData {
                fields: self.default_fields(class)?,
                annotations: None,
            }),
            // serializable with a writer override: custom parser (or
            // default fields), then the annotation block, then the
            // post-processor
            0x03 => {
                let parser = self.registry.parser(key);
                let mut data = match parser {
                    Some(parser) => parser(self, class)?,
                    None => ClassData {
                        fields: self.default_fields(class)?,
                        annotations: None,
                    },
                };
                data.annotations = Some(self.annotations()?);
                let processor = self.registry.post_processor(key);
                match processor {
                    Some(processor) => processor(self, class, data),
                    None => Ok(data),
                }
            }
            // externalizable without block data
            0x04 => Err(ObjectStreamError::Unsupported(
                "can't parse version 1 external content",
            )),
            // externalizable with block data: annotation block only
            0x0c => Ok(ClassData {
                fields: Vec::new(),
                annotations: Some(self.annotations()?),
            }),
            other => Err(ObjectStreamError::UnknownClassMode(other)),
        }
    }

    /// Reads default field values in declared order.
    fn default_fields(
        &mut self,
        class: Handle,
    ) -> Result<Vec<(String, JavaValue)>, ObjectStreamError> {
        let fields = self.desc(class)?.fields.clone();
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            let value = if type_codes::is_primitive(field.type_code) {
                self.primitive(field.type_code)?
            } else {
                self.content_value()?
            };
            out.push((field.name, value));
        }
        Ok(out)
    }

    /// Builds an array: handle before the length and elements, so
    /// elements can reference the array itself.
    fn array(&mut self) -> Result<JavaValue, ObjectStreamError> {
        let offset = self.reader.x;
        let desc = self
            .class_desc()?
            .ok_or(ObjectStreamError::MissingClassDesc { offset })?;
        let class_name = self.desc(desc)?.name.clone();
        let element_code = match class_name.as_bytes() {
            [b'[', code, ..] => *code,
            _ => return Err(ObjectStreamError::BadArrayClassName(class_name)),
        };
        let handle = self.new_handle(Referent::Array(JavaArray {
            class: desc,
            elements: Vec::new(),
        }));
        let length_offset = self.reader.x;
        let length = self.reader.i32()?;
        if length < 0 {
            return Err(ObjectStreamError::InvalidArrayLength {
                length,
                offset: length_offset,
            });
        }
        let mut elements = Vec::new();
        for _ in 0..length {
            let value = if type_codes::is_primitive(element_code) {
                self.primitive(element_code)?
            } else {
                self.content_value()?
            };
            elements.push(value);
        }
        if let Referent::Array(array) = &mut self.handles[handle.index()] {
            array.elements = elements;
        }
        Ok(JavaValue::Ref(handle))
    }

    /// Builds an enum constant: the handle slot is reserved before the
    /// constant name is read and filled afterwards.
    fn enum_constant(&mut self) -> Result<JavaValue, ObjectStreamError> {
        let offset = self.reader.x;
        let desc = self
            .class_desc()?
            .ok_or(ObjectStreamError::MissingClassDesc { offset })?;
        let handle = self.new_handle(Referent::Pending);
        let name = self.string_value()?;
        self.fill(handle, Referent::Enum(JavaEnum { class: desc, name }));
        Ok(JavaValue::Ref(handle))
    }
}

/// The decoded stream: the ordered top-level values plus the handle
/// table they reference into.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStream {
    /// Top-level values, in stream order.
    pub values: Vec<JavaValue>,
    handles: Vec<Referent>,
}

impl DecodedStream {
    /// Resolves a handle to its table entry.
    pub fn referent(&self, handle: Handle) -> Option<&Referent> {
        let index = handle.0.checked_sub(BASE_WIRE_HANDLE)? as usize;
        self.handles.get(index)
    }

    /// Resolves a value's referent, when it is a back reference.
    pub fn resolve(&self, value: &JavaValue) -> Option<&Referent> {
        match value {
            JavaValue::Ref(handle) => self.referent(*handle),
            _ => None,
        }
    }

    /// The handle a value carries, when it is a back reference.
    pub fn handle_of(&self, value: &JavaValue) -> Option<Handle> {
        match value {
            JavaValue::Ref(handle) => Some(*handle),
            _ => None,
        }
    }

    /// The string a value resolves to: a decoded string, or an enum
    /// constant's name (loose string equality for enum wrappers).
    pub fn str_of(&self, value: &JavaValue) -> Option<&str> {
        match self.resolve(value)? {
            Referent::Str(s) => Some(s),
            Referent::Enum(e) => Some(&e.name),
            _ => None,
        }
    }

    /// The object a value resolves to.
    pub fn object_of(&self, value: &JavaValue) -> Option<&JavaObject> {
        match self.resolve(value)? {
            Referent::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The array a value resolves to.
    pub fn array_of(&self, value: &JavaValue) -> Option<&JavaArray> {
        match self.resolve(value)? {
            Referent::Array(array) => Some(array),
            _ => None,
        }
    }

    /// The enum constant a value resolves to.
    pub fn enum_of(&self, value: &JavaValue) -> Option<&JavaEnum> {
        match self.resolve(value)? {
            Referent::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// The class descriptor a handle resolves to.
    pub fn class_desc(&self, handle: Handle) -> Option<&ClassDesc> {
        match self.referent(handle)? {
            Referent::ClassDesc(desc) => Some(desc),
            _ => None,
        }
    }
}
