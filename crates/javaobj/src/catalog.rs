//! Built-in post-processors for the common container classes.
//!
//! Each container writes its payload through a writer override: a leading
//! block-data header with the declared counts, followed by the entries as
//! annotation objects. The post-processors here re-read that header,
//! check the declared count against the annotation items, and synthesize
//! a `map`/`list`/`set` view entry on the per-class value.

use std::sync::Arc;

use javaobj_buffers::Reader;

use crate::decoder::ObjectStreamDecoder;
use crate::error::ObjectStreamError;
use crate::registry::Registry;
use crate::values::{ClassData, Handle, JavaValue};

/// Installs post-processors for `java.util.HashMap`, `Hashtable`,
/// `ArrayList`, `ArrayDeque`, `HashSet`, and `EnumMap`.
pub fn register_common_containers(registry: &Registry) -> Result<(), ObjectStreamError> {
    registry.register_post_processor("java.util.HashMap", "0507dac1c31660d1", Arc::new(hash_map))?;
    registry.register_post_processor(
        "java.util.Hashtable",
        "13bb0f25214ae4b8",
        Arc::new(hash_table),
    )?;
    registry.register_post_processor(
        "java.util.ArrayList",
        "7881d21d99c7619d",
        Arc::new(array_list),
    )?;
    registry.register_post_processor(
        "java.util.ArrayDeque",
        "207cda2e240da08b",
        Arc::new(array_deque),
    )?;
    registry.register_post_processor("java.util.HashSet", "ba44859596b8b734", Arc::new(hash_set))?;
    registry.register_post_processor("java.util.EnumMap", "065d7df7be907ca1", Arc::new(enum_map))?;
    Ok(())
}

/// Splits an annotation block into its leading block-data header and the
/// entry values that follow it.
fn split(data: &ClassData) -> Result<(Reader<'_>, &[JavaValue]), ObjectStreamError> {
    let annotations = data
        .annotations
        .as_deref()
        .ok_or(ObjectStreamError::BadAnnotations("missing annotation block"))?;
    match annotations.split_first() {
        Some((JavaValue::Block(header), rest)) => Ok((Reader::new(header), rest)),
        _ => Err(ObjectStreamError::BadAnnotations(
            "expected a leading block-data header",
        )),
    }
}

fn pairs(entries: &[JavaValue], size: i32) -> Result<JavaValue, ObjectStreamError> {
    let size = usize::try_from(size)
        .map_err(|_| ObjectStreamError::BadAnnotations("negative entry count"))?;
    if entries.len() != size * 2 {
        return Err(ObjectStreamError::BadAnnotations(
            "entry count does not match annotation items",
        ));
    }
    let mut out = Vec::with_capacity(size);
    let mut iter = entries.iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        out.push((key.clone(), value.clone()));
    }
    Ok(JavaValue::Map(out))
}

fn items(entries: &[JavaValue], size: i32) -> Result<JavaValue, ObjectStreamError> {
    let size = usize::try_from(size)
        .map_err(|_| ObjectStreamError::BadAnnotations("negative element count"))?;
    if entries.len() != size {
        return Err(ObjectStreamError::BadAnnotations(
            "element count does not match annotation items",
        ));
    }
    Ok(JavaValue::List(entries.to_vec()))
}

// header: buckets, size; entries are key/value pairs
fn hash_map(
    _decoder: &ObjectStreamDecoder<'_>,
    _class: Handle,
    mut data: ClassData,
) -> Result<ClassData, ObjectStreamError> {
    let map = {
        let (mut header, entries) = split(&data)?;
        let _buckets = header.i32()?;
        let size = header.i32()?;
        pairs(entries, size)?
    };
    data.fields.push(("map".into(), map));
    Ok(data)
}

// header: length, count; entries are key/value pairs
fn hash_table(
    _decoder: &ObjectStreamDecoder<'_>,
    _class: Handle,
    mut data: ClassData,
) -> Result<ClassData, ObjectStreamError> {
    let map = {
        let (mut header, entries) = split(&data)?;
        let _length = header.i32()?;
        let count = header.i32()?;
        pairs(entries, count)?
    };
    data.fields.push(("map".into(), map));
    Ok(data)
}

// header: size; entries are the elements in order
fn array_list(
    _decoder: &ObjectStreamDecoder<'_>,
    _class: Handle,
    mut data: ClassData,
) -> Result<ClassData, ObjectStreamError> {
    let list = {
        let (mut header, entries) = split(&data)?;
        let size = header.i32()?;
        items(entries, size)?
    };
    data.fields.push(("list".into(), list));
    Ok(data)
}

// header: size; entries are the elements front to back
fn array_deque(
    _decoder: &ObjectStreamDecoder<'_>,
    _class: Handle,
    mut data: ClassData,
) -> Result<ClassData, ObjectStreamError> {
    let list = {
        let (mut header, entries) = split(&data)?;
        let size = header.i32()?;
        items(entries, size)?
    };
    data.fields.push(("list".into(), list));
    Ok(data)
}

// header: capacity, load factor, size; entries are the members
fn hash_set(
    _decoder: &ObjectStreamDecoder<'_>,
    _class: Handle,
    mut data: ClassData,
) -> Result<ClassData, ObjectStreamError> {
    let set = {
        let (mut header, entries) = split(&data)?;
        let _capacity = header.i32()?;
        let _load_factor = header.f32()?;
        let size = header.i32()?;
        items(entries, size)?
    };
    data.fields.push(("set".into(), set));
    Ok(data)
}

// header: size; entries are key/value pairs
fn enum_map(
    _decoder: &ObjectStreamDecoder<'_>,
    _class: Handle,
    mut data: ClassData,
) -> Result<ClassData, ObjectStreamError> {
    let map = {
        let (mut header, entries) = split(&data)?;
        let size = header.i32()?;
        pairs(entries, size)?
    };
    data.fields.push(("map".into(), map));
    Ok(data)
}
