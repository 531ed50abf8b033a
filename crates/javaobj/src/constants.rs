//! Object-stream protocol constants.

/// Stream magic, the first two bytes of every stream.
pub const STREAM_MAGIC: u16 = 0xaced;

/// Stream protocol version, the next two bytes.
pub const STREAM_VERSION: u16 = 5;

/// The wire value of the first assigned handle.
pub const BASE_WIRE_HANDLE: u32 = 0x007e_0000;

/// The byte value of the first content tag; tags are dispatched as
/// `byte - TAG_BASE` into the ordered tag list.
pub const TAG_BASE: u8 = 0x70;

/// Serialization-mode flag bits carried by a class descriptor.
pub mod sc_flags {
    /// The class defines a `writeObject` method.
    pub const WRITE_METHOD: u8 = 0x01;
    /// The class is serializable.
    pub const SERIALIZABLE: u8 = 0x02;
    /// The class is externalizable.
    pub const EXTERNALIZABLE: u8 = 0x04;
    /// Externalizable data is written in block-data mode.
    pub const BLOCK_DATA: u8 = 0x08;
    /// The class is an enum type.
    pub const ENUM: u8 = 0x10;
}

/// Content tags, in stream order starting at [`TAG_BASE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Null,
    Reference,
    ClassDesc,
    Object,
    String,
    Array,
    Class,
    BlockData,
    EndBlockData,
    Reset,
    BlockDataLong,
    Exception,
    LongString,
    ProxyClassDesc,
    Enum,
}

impl Tag {
    const ALL: [Tag; 15] = [
        Tag::Null,
        Tag::Reference,
        Tag::ClassDesc,
        Tag::Object,
        Tag::String,
        Tag::Array,
        Tag::Class,
        Tag::BlockData,
        Tag::EndBlockData,
        Tag::Reset,
        Tag::BlockDataLong,
        Tag::Exception,
        Tag::LongString,
        Tag::ProxyClassDesc,
        Tag::Enum,
    ];

    /// Maps a raw stream byte onto a tag, or `None` when out of range.
    pub fn from_byte(byte: u8) -> Option<Tag> {
        let index = byte.wrapping_sub(TAG_BASE) as usize;
        Tag::ALL.get(index).copied()
    }

    /// The tag's wire byte.
    pub fn byte(self) -> u8 {
        TAG_BASE + self as u8
    }

    /// The tag's display name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Null => "Null",
            Tag::Reference => "Reference",
            Tag::ClassDesc => "ClassDesc",
            Tag::Object => "Object",
            Tag::String => "String",
            Tag::Array => "Array",
            Tag::Class => "Class",
            Tag::BlockData => "BlockData",
            Tag::EndBlockData => "EndBlockData",
            Tag::Reset => "Reset",
            Tag::BlockDataLong => "BlockDataLong",
            Tag::Exception => "Exception",
            Tag::LongString => "LongString",
            Tag::ProxyClassDesc => "ProxyClassDesc",
            Tag::Enum => "Enum",
        }
    }
}

/// Field type codes used in field descriptors.
pub mod type_codes {
    /// Returns `true` for the eight primitive type codes.
    pub fn is_primitive(code: u8) -> bool {
        matches!(
            code,
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z'
        )
    }

    /// Returns `true` for the object (`L`) and array (`[`) type codes.
    pub fn is_reference(code: u8) -> bool {
        matches!(code, b'L' | b'[')
    }
}
