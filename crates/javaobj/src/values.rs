//! Decoded value model: handles, values, and the referenceable kinds.

use crate::constants::BASE_WIRE_HANDLE;

/// A stream handle: the stable integer identity of a referenceable value.
///
/// Handles are assigned in strict creation order starting at
/// `0x007e0000`; the handle table is a dense arena indexed by
/// `handle - 0x007e0000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u32);

impl Handle {
    /// The arena index of this handle.
    pub fn index(self) -> usize {
        (self.0 - BASE_WIRE_HANDLE) as usize
    }

    /// The handle for a given arena index.
    pub fn from_index(index: usize) -> Self {
        Handle(BASE_WIRE_HANDLE + index as u32)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// A decoded stream value.
///
/// Referenceable kinds (strings, objects, arrays, class descriptors, enum
/// constants) appear as [`JavaValue::Ref`]; their content lives once in
/// the handle table, so back references share identity by construction.
/// [`JavaValue::List`] and [`JavaValue::Map`] never come off the wire —
/// they are views synthesized by post-processors.
#[derive(Debug, Clone, PartialEq)]
pub enum JavaValue {
    Null,
    Bool(bool),
    Byte(i8),
    /// A UTF-16 code unit.
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// An opaque block-data byte run.
    Block(Vec<u8>),
    /// A back reference into the handle table.
    Ref(Handle),
    /// Post-processor view: an ordered sequence.
    List(Vec<JavaValue>),
    /// Post-processor view: an ordered key/value mapping.
    Map(Vec<(JavaValue, JavaValue)>),
}

/// A handle-table entry: one referenceable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Referent {
    /// A string (short or long form).
    Str(String),
    /// A class descriptor.
    ClassDesc(ClassDesc),
    /// An object instance.
    Object(JavaObject),
    /// An array instance.
    Array(JavaArray),
    /// An enum constant.
    Enum(JavaEnum),
    /// A class value (the `Class` tag); wraps its descriptor handle.
    Class { desc: Option<Handle> },
    /// A slot reserved before its value finished construction.
    Pending,
}

/// A parsed class descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDesc {
    /// Fully qualified class name.
    pub name: String,
    /// `serialVersionUID` as exactly 16 lowercase hex digits.
    pub serial_version_uid: String,
    /// The raw flag byte.
    pub flags: u8,
    /// Whether the flag byte carries the enum bit (`0x10`).
    pub is_enum: bool,
    /// Declared fields, in stream order.
    pub fields: Vec<FieldDesc>,
    /// Annotation values written after the field list.
    pub annotations: Vec<JavaValue>,
    /// The super-class descriptor, or `None` at the root.
    pub super_desc: Option<Handle>,
}

impl ClassDesc {
    /// The registry key for this descriptor: `name@serialVersionUid`.
    pub fn registry_key(&self) -> String {
        format!("{}@{}", self.name, self.serial_version_uid)
    }
}

/// A single field declaration inside a class descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
    /// Type code: one of `B C D F I J S Z` (primitives), `L` (object),
    /// `[` (array).
    pub type_code: u8,
    /// Field name.
    pub name: String,
    /// For `L`/`[` fields, the class or element type name.
    pub class_name: Option<String>,
}

/// The per-class data contributed by one class along the inheritance
/// chain: an ordered field map plus the trailing annotation block (the
/// reserved `@` slot), when the class wrote one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassData {
    pub fields: Vec<(String, JavaValue)>,
    pub annotations: Option<Vec<JavaValue>>,
}

impl ClassData {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&JavaValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// A decoded object instance.
///
/// `fields` is the flattened view: classes are applied in inheritance
/// order (root first), so a name written by a deeper class shadows the
/// value an ancestor wrote, in place. `extends` preserves the unshadowed
/// per-class breakdown in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaObject {
    /// Handle of the object's class descriptor.
    pub class: Handle,
    /// Flattened ordered field map.
    pub fields: Vec<(String, JavaValue)>,
    /// Annotation block of the most-derived class that produced one.
    pub annotations: Option<Vec<JavaValue>>,
    /// Per-class data keyed by class name, root class first.
    pub extends: Vec<(String, ClassData)>,
}

impl JavaObject {
    pub(crate) fn new(class: Handle) -> Self {
        JavaObject {
            class,
            fields: Vec::new(),
            annotations: None,
            extends: Vec::new(),
        }
    }

    /// Looks up a field in the flattened view.
    pub fn field(&self, name: &str) -> Option<&JavaValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Looks up the per-class data contributed by the named ancestor.
    pub fn extends_class(&self, class_name: &str) -> Option<&ClassData> {
        self.extends
            .iter()
            .find(|(n, _)| n == class_name)
            .map(|(_, d)| d)
    }

    /// Applies one class's data: records it under `extends` and copies
    /// its named entries onto the flattened map, shadowing in place.
    pub(crate) fn apply(&mut self, class_name: String, data: ClassData) {
        for (name, value) in &data.fields {
            match self.fields.iter_mut().find(|(n, _)| n == name) {
                Some((_, slot)) => *slot = value.clone(),
                None => self.fields.push((name.clone(), value.clone())),
            }
        }
        if data.annotations.is_some() {
            self.annotations = data.annotations.clone();
        }
        self.extends.push((class_name, data));
    }
}

/// A decoded array instance.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaArray {
    /// Handle of the array's class descriptor.
    pub class: Handle,
    /// Elements in stream order.
    pub elements: Vec<JavaValue>,
}

/// A decoded enum constant: a string wrapper carrying its class, so back
/// references to the constant are distinguishable from plain string back
/// references while still comparing equal to the constant name.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaEnum {
    /// Handle of the enum's class descriptor.
    pub class: Handle,
    /// The constant name.
    pub name: String,
}

impl PartialEq<str> for JavaEnum {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for JavaEnum {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}
