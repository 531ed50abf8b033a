mod common;

use std::sync::Arc;

use javaobj::{
    ClassData, Handle, JavaValue, ObjectStreamDecoder, ObjectStreamError, Referent, Registry,
};

use common::{StreamBuilder, BASE, TC_ARRAY, TC_CLASS, TC_ENUM, TC_OBJECT, TC_REFERENCE};

fn decode_with(data: &[u8], registry: Arc<Registry>) -> javaobj::DecodedStream {
    ObjectStreamDecoder::with_registry(data, registry)
        .decode()
        .expect("stream decodes")
}

fn decode(data: &[u8]) -> javaobj::DecodedStream {
    decode_with(data, Arc::new(Registry::new()))
}

/// Asserts a decoded canary: literal label, self-reference identity.
fn assert_canary(stream: &javaobj::DecodedStream, value: &JavaValue, label: &str) {
    let object = stream.object_of(value).expect("canary is an object");
    assert_eq!(stream.str_of(object.field("name").unwrap()), Some(label));
    assert_eq!(
        stream.handle_of(object.field("self").unwrap()),
        stream.handle_of(value),
    );
}

#[test]
fn string_payload_between_canaries() {
    let mut b = StreamBuilder::new();
    let begin = b.canary("Begin", None);
    b.string("sometext");
    b.canary("End", Some(begin.class));
    let stream = decode(&b.finish());

    assert_eq!(stream.values.len(), 3);
    assert_canary(&stream, &stream.values[0], "Begin");
    assert_eq!(stream.str_of(&stream.values[1]), Some("sometext"));
    assert_canary(&stream, &stream.values[2], "End");
}

#[test]
fn primitive_fields_decode_in_declared_order() {
    let mut b = StreamBuilder::new();
    b.w.u8(TC_OBJECT);
    let class = b.begin_class_desc("PrimitiveFields", "0000123456789abc", 0x02, 8);
    b.prim_field(b'I', "i");
    b.prim_field(b'S', "s");
    b.prim_field(b'J', "l");
    b.prim_field(b'B', "by");
    b.prim_field(b'D', "d");
    b.prim_field(b'F', "f");
    b.prim_field(b'Z', "bo");
    b.prim_field(b'C', "c");
    b.end_class_desc();
    b.alloc(); // object handle
    b.w.i32(-123);
    b.w.i16(-456);
    b.w.i64(-789);
    b.w.i8(-21);
    b.w.f64(12.34);
    b.w.f32(76.5);
    b.w.u8(1);
    b.w.u16(0x1234);
    let stream = decode(&b.finish());

    let object = stream.object_of(&stream.values[0]).unwrap();
    assert_eq!(object.field("i"), Some(&JavaValue::Int(-123)));
    assert_eq!(object.field("s"), Some(&JavaValue::Short(-456)));
    assert_eq!(object.field("l"), Some(&JavaValue::Long(-789)));
    assert_eq!(object.field("by"), Some(&JavaValue::Byte(-21)));
    assert_eq!(object.field("d"), Some(&JavaValue::Double(12.34)));
    assert_eq!(object.field("f"), Some(&JavaValue::Float(76.5)));
    assert_eq!(object.field("bo"), Some(&JavaValue::Bool(true)));
    assert_eq!(object.field("c"), Some(&JavaValue::Char(0x1234)));

    let desc = stream.class_desc(Handle(class)).unwrap();
    assert_eq!(desc.serial_version_uid, "0000123456789abc");
    assert_eq!(desc.name, "PrimitiveFields");
    let field_names: Vec<&str> = desc.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(field_names, ["i", "s", "l", "by", "d", "f", "bo", "c"]);
}

#[test]
fn back_reference_preserves_identity() {
    let mut b = StreamBuilder::new();
    b.w.u8(TC_OBJECT);
    b.begin_class_desc("Solo", "0000000000000001", 0x02, 1);
    b.prim_field(b'I', "n");
    b.end_class_desc();
    let object = b.alloc();
    b.w.i32(7);
    b.reference(object);
    let stream = decode(&b.finish());

    assert_eq!(stream.values.len(), 2);
    assert_eq!(stream.values[0], stream.values[1]);
    assert_eq!(stream.handle_of(&stream.values[0]), Some(Handle(object)));
    assert_eq!(stream.handle_of(&stream.values[1]), Some(Handle(object)));
    assert_eq!(
        stream.object_of(&stream.values[1]).unwrap().field("n"),
        Some(&JavaValue::Int(7))
    );
}

#[test]
fn inheritance_shadows_but_keeps_per_class_view() {
    let mut b = StreamBuilder::new();
    b.w.u8(TC_OBJECT);
    b.begin_class_desc("Derived", "0000000000000002", 0x02, 1);
    b.prim_field(b'I', "foo");
    b.end_block();
    // super
    b.begin_class_desc("Base", "0000000000000003", 0x02, 1);
    b.prim_field(b'I', "foo");
    b.end_class_desc();
    b.alloc(); // object handle
    b.w.i32(123); // Base.foo, root class first
    b.w.i32(345); // Derived.foo
    let stream = decode(&b.finish());

    let object = stream.object_of(&stream.values[0]).unwrap();
    assert_eq!(object.field("foo"), Some(&JavaValue::Int(345)));
    let class_names: Vec<&str> = object.extends.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(class_names, ["Base", "Derived"]);
    assert_eq!(
        object.extends_class("Base").unwrap().field("foo"),
        Some(&JavaValue::Int(123))
    );
    assert_eq!(
        object.extends_class("Derived").unwrap().field("foo"),
        Some(&JavaValue::Int(345))
    );
}

fn int_string_parser(
    decoder: &mut ObjectStreamDecoder<'_>,
    _class: Handle,
) -> Result<ClassData, ObjectStreamError> {
    let foo = decoder.reader.i32()?;
    let bar = decoder.content_value()?;
    Ok(ClassData {
        fields: vec![("foo".into(), JavaValue::Int(foo)), ("bar".into(), bar)],
        annotations: None,
    })
}

#[test]
fn custom_format_with_annotations() {
    let registry = Arc::new(Registry::new());
    registry
        .register_parser("CustomWritten", "00000000000000aa", Arc::new(int_string_parser))
        .unwrap();

    let mut b = StreamBuilder::new();
    b.w.u8(TC_OBJECT);
    b.begin_class_desc("CustomWritten", "00000000000000aa", 0x03, 0);
    b.end_class_desc();
    b.alloc(); // object handle
    b.w.i32(12345); // custom data
    b.string("Hello, World!");
    b.block(&[0xde, 0xad, 0xbe]); // annotations
    b.string("and more");
    b.end_block();
    let stream = decode_with(&b.finish(), registry);

    let object = stream.object_of(&stream.values[0]).unwrap();
    assert_eq!(object.field("foo"), Some(&JavaValue::Int(12345)));
    assert_eq!(
        stream.str_of(object.field("bar").unwrap()),
        Some("Hello, World!")
    );
    let annotations = object.annotations.as_ref().expect("annotation block");
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0], JavaValue::Block(vec![0xde, 0xad, 0xbe]));
    assert_eq!(stream.str_of(&annotations[1]), Some("and more"));
    // the per-class view carries the same block under `@`
    assert_eq!(
        object.extends_class("CustomWritten").unwrap().annotations,
        object.annotations
    );
}

#[test]
fn enum_constant_shares_identity() {
    let mut b = StreamBuilder::new();
    b.w.u8(TC_ENUM);
    let suit = b.begin_class_desc("Suit", "0000000000000010", 0x12, 0);
    b.end_block();
    b.begin_class_desc("java.lang.Enum", "0000000000000000", 0x12, 0);
    b.end_class_desc();
    let constant = b.alloc(); // deferred enum handle, before its name
    b.string("SPADES");
    b.w.u8(TC_REFERENCE);
    b.w.u32(constant);
    let stream = decode(&b.finish());

    assert_eq!(stream.values.len(), 2);
    assert_eq!(
        stream.handle_of(&stream.values[0]),
        stream.handle_of(&stream.values[1])
    );
    let decoded = stream.enum_of(&stream.values[1]).unwrap();
    assert_eq!(*decoded, "SPADES");
    assert_eq!(stream.str_of(&stream.values[0]), Some("SPADES"));

    let desc = stream.class_desc(Handle(suit)).unwrap();
    assert!(desc.is_enum);
    let super_desc = stream.class_desc(desc.super_desc.unwrap()).unwrap();
    assert_eq!(super_desc.name, "java.lang.Enum");
    assert!(super_desc.is_enum);
}

#[test]
fn primitive_int_array() {
    let mut b = StreamBuilder::new();
    b.w.u8(TC_ARRAY);
    let class = b.begin_class_desc("[I", "05a0aef8ed84c961", 0x02, 0);
    b.end_class_desc();
    b.alloc(); // array handle
    b.w.i32(3);
    b.w.i32(12);
    b.w.i32(34);
    b.w.i32(56);
    let stream = decode(&b.finish());

    let array = stream.array_of(&stream.values[0]).unwrap();
    assert_eq!(
        array.elements,
        vec![JavaValue::Int(12), JavaValue::Int(34), JavaValue::Int(56)]
    );
    assert_eq!(array.class, Handle(class));
    assert_eq!(stream.class_desc(Handle(class)).unwrap().name, "[I");
}

#[test]
fn reference_array_can_contain_itself() {
    let mut b = StreamBuilder::new();
    b.w.u8(TC_ARRAY);
    b.begin_class_desc("[Ljava.lang.Object;", "90ce589f1073296c", 0x02, 0);
    b.end_class_desc();
    let array = b.alloc();
    b.w.i32(2);
    b.string("first");
    b.reference(array); // forward element referencing the array itself
    let stream = decode(&b.finish());

    let decoded = stream.array_of(&stream.values[0]).unwrap();
    assert_eq!(stream.str_of(&decoded.elements[0]), Some("first"));
    assert_eq!(
        stream.handle_of(&decoded.elements[1]),
        Some(Handle(array))
    );
}

#[test]
fn long_string_of_131072_bytes() {
    let payload = "x".repeat(131_072);
    let mut b = StreamBuilder::new();
    b.long_string(&payload);
    let stream = decode(&b.finish());

    let s = stream.str_of(&stream.values[0]).unwrap();
    assert_eq!(s.len(), 131_072);
    assert_eq!(s.chars().next(), Some('x'));
    assert_eq!(s.chars().last(), Some('x'));
}

#[test]
fn class_tag_yields_descriptor() {
    let mut b = StreamBuilder::new();
    b.w.u8(TC_CLASS);
    let desc = b.begin_class_desc("com.example.Plain", "0000000000000020", 0x02, 0);
    b.end_class_desc();
    let class_value = b.alloc(); // the Class value gets its own handle
    let stream = decode(&b.finish());

    assert_eq!(stream.handle_of(&stream.values[0]), Some(Handle(class_value)));
    match stream.resolve(&stream.values[0]) {
        Some(Referent::Class { desc: Some(handle) }) => {
            assert_eq!(*handle, Handle(desc));
            assert_eq!(stream.class_desc(*handle).unwrap().name, "com.example.Plain");
        }
        other => panic!("expected a class referent, got {:?}", other),
    }
}

#[test]
fn externalizable_block_data_mode() {
    let mut b = StreamBuilder::new();
    b.w.u8(TC_OBJECT);
    b.begin_class_desc("Ext", "0000000000000030", 0x0c, 0);
    b.end_class_desc();
    b.alloc(); // object handle
    b.block(&[1, 2]); // externalizable annotation block
    b.string("payload");
    b.end_block();
    let stream = decode(&b.finish());

    let object = stream.object_of(&stream.values[0]).unwrap();
    assert!(object.fields.is_empty());
    let annotations = object.annotations.as_ref().unwrap();
    assert_eq!(annotations[0], JavaValue::Block(vec![1, 2]));
    assert_eq!(stream.str_of(&annotations[1]), Some("payload"));
}

#[test]
fn string_handles_are_dense_and_ordered() {
    let mut b = StreamBuilder::new();
    let first = b.string("a");
    let second = b.string("b");
    let stream = decode(&b.finish());

    assert_eq!(first, BASE);
    assert_eq!(second, BASE + 1);
    assert_eq!(stream.referent(Handle(first)), Some(&Referent::Str("a".into())));
    assert_eq!(stream.referent(Handle(second)), Some(&Referent::Str("b".into())));
}
