#![allow(dead_code)]

//! Wire-level stream builder for the decode matrices.
//!
//! Assembles streams byte-for-byte: magic and version up front, tags and
//! big-endian payloads on demand. Handle allocation mirrors the stream's
//! own assignment order (one handle per referenceable construct, in
//! order of appearance), so tests can predict the wire handle of any
//! value they emit.

use javaobj_buffers::Writer;

pub const BASE: u32 = 0x007e_0000;

pub const TC_NULL: u8 = 0x70;
pub const TC_REFERENCE: u8 = 0x71;
pub const TC_CLASSDESC: u8 = 0x72;
pub const TC_OBJECT: u8 = 0x73;
pub const TC_STRING: u8 = 0x74;
pub const TC_ARRAY: u8 = 0x75;
pub const TC_CLASS: u8 = 0x76;
pub const TC_BLOCKDATA: u8 = 0x77;
pub const TC_ENDBLOCKDATA: u8 = 0x78;
pub const TC_BLOCKDATALONG: u8 = 0x7a;
pub const TC_LONGSTRING: u8 = 0x7c;
pub const TC_ENUM: u8 = 0x7e;

pub fn uid_bytes(uid: &str) -> [u8; 8] {
    assert_eq!(uid.len(), 16, "uid must be 16 hex digits");
    let mut out = [0u8; 8];
    for (i, chunk) in out.iter_mut().enumerate() {
        *chunk = u8::from_str_radix(&uid[i * 2..i * 2 + 2], 16).unwrap();
    }
    out
}

/// A canary object: holds its own wire handles so tests can assert the
/// self-reference decoded to the same object.
pub struct Canary {
    pub class: u32,
    pub object: u32,
}

pub struct StreamBuilder {
    pub w: Writer,
    next: u32,
}

impl StreamBuilder {
    pub fn new() -> Self {
        let mut w = Writer::new();
        w.u16(0xaced);
        w.u16(0x0005);
        StreamBuilder { w, next: BASE }
    }

    pub fn finish(self) -> Vec<u8> {
        self.w.flush()
    }

    /// Claims the next wire handle, mirroring the decoder's assignment.
    pub fn alloc(&mut self) -> u32 {
        let handle = self.next;
        self.next += 1;
        handle
    }

    pub fn null(&mut self) {
        self.w.u8(TC_NULL);
    }

    pub fn reference(&mut self, handle: u32) {
        self.w.u8(TC_REFERENCE);
        self.w.u32(handle);
    }

    pub fn string(&mut self, s: &str) -> u32 {
        self.w.u8(TC_STRING);
        self.w.utf(s);
        self.alloc()
    }

    pub fn long_string(&mut self, s: &str) -> u32 {
        self.w.u8(TC_LONGSTRING);
        self.w.long_utf(s);
        self.alloc()
    }

    pub fn block(&mut self, bytes: &[u8]) {
        self.w.u8(TC_BLOCKDATA);
        self.w.u8(bytes.len() as u8);
        self.w.bytes(bytes);
    }

    pub fn end_block(&mut self) {
        self.w.u8(TC_ENDBLOCKDATA);
    }

    /// Starts a class descriptor: tag, name, uid, handle, flags, field
    /// count. The caller then writes the declared fields, the annotation
    /// block, and the super descriptor.
    pub fn begin_class_desc(&mut self, name: &str, uid: &str, flags: u8, field_count: u16) -> u32 {
        self.w.u8(TC_CLASSDESC);
        self.w.utf(name);
        self.w.bytes(&uid_bytes(uid));
        let handle = self.alloc();
        self.w.u8(flags);
        self.w.u16(field_count);
        handle
    }

    pub fn prim_field(&mut self, code: u8, name: &str) {
        self.w.u8(code);
        self.w.utf(name);
    }

    /// Writes an object/array field descriptor; the class-name string
    /// claims a handle.
    pub fn obj_field(&mut self, code: u8, name: &str, class_name: &str) -> u32 {
        self.w.u8(code);
        self.w.utf(name);
        self.string(class_name)
    }

    /// Closes a descriptor with an empty annotation block and no super.
    pub fn end_class_desc(&mut self) {
        self.end_block();
        self.null();
    }

    /// Writes a canary object: class `Canary` with a `name` string field
    /// and a `self` field referencing the object itself. Pass the class
    /// handle of a previous canary to back-reference its descriptor.
    pub fn canary(&mut self, label: &str, class: Option<u32>) -> Canary {
        self.w.u8(TC_OBJECT);
        let class = match class {
            Some(handle) => {
                self.reference(handle);
                handle
            }
            None => {
                let handle = self.begin_class_desc("Canary", "00000000000000c1", 0x02, 2);
                self.obj_field(b'L', "name", "Ljava/lang/String;");
                self.obj_field(b'L', "self", "LCanary;");
                self.end_class_desc();
                handle
            }
        };
        let object = self.alloc();
        self.string(label);
        self.reference(object);
        Canary { class, object }
    }
}
