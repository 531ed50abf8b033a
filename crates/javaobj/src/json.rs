//! Projection of a decoded graph onto `serde_json::Value` for
//! inspection.
//!
//! Back references are resolved through the handle table; a handle
//! already on the projection path (a cycle) renders as the string
//! `"@ref:<handle>"`.

use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::decoder::DecodedStream;
use crate::values::{Handle, JavaValue, Referent};

/// Projects all top-level values as a JSON array.
pub fn stream_to_json(stream: &DecodedStream) -> Json {
    Json::Array(
        stream
            .values
            .iter()
            .map(|value| to_json(stream, value))
            .collect(),
    )
}

/// Projects one decoded value.
pub fn to_json(stream: &DecodedStream, value: &JavaValue) -> Json {
    project(stream, value, &mut Vec::new())
}

fn project(stream: &DecodedStream, value: &JavaValue, path: &mut Vec<Handle>) -> Json {
    match value {
        JavaValue::Null => Json::Null,
        JavaValue::Bool(v) => Json::Bool(*v),
        JavaValue::Byte(v) => Json::Number((*v).into()),
        JavaValue::Char(v) => Json::String(
            char::from_u32(*v as u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
                .to_string(),
        ),
        JavaValue::Short(v) => Json::Number((*v).into()),
        JavaValue::Int(v) => Json::Number((*v).into()),
        JavaValue::Long(v) => Json::Number((*v).into()),
        JavaValue::Float(v) => float_to_json(*v as f64),
        JavaValue::Double(v) => float_to_json(*v),
        JavaValue::Block(bytes) => {
            Json::Array(bytes.iter().map(|b| Json::Number((*b).into())).collect())
        }
        JavaValue::List(values) => Json::Array(
            values
                .iter()
                .map(|value| project(stream, value, path))
                .collect(),
        ),
        JavaValue::Map(entries) => map_to_json(stream, entries, path),
        JavaValue::Ref(handle) => ref_to_json(stream, *handle, path),
    }
}

fn float_to_json(value: f64) -> Json {
    Number::from_f64(value).map(Json::Number).unwrap_or(Json::Null)
}

/// Maps render as a JSON object when every key projects to a string,
/// otherwise as an array of `[key, value]` pairs.
fn map_to_json(
    stream: &DecodedStream,
    entries: &[(JavaValue, JavaValue)],
    path: &mut Vec<Handle>,
) -> Json {
    let projected: Vec<(Json, Json)> = entries
        .iter()
        .map(|(key, value)| (project(stream, key, path), project(stream, value, path)))
        .collect();
    if projected.iter().all(|(key, _)| key.is_string()) {
        let mut object = JsonMap::new();
        for (key, value) in projected {
            if let Json::String(key) = key {
                object.insert(key, value);
            }
        }
        Json::Object(object)
    } else {
        Json::Array(
            projected
                .into_iter()
                .map(|(key, value)| Json::Array(vec![key, value]))
                .collect(),
        )
    }
}

fn ref_to_json(stream: &DecodedStream, handle: Handle, path: &mut Vec<Handle>) -> Json {
    if path.contains(&handle) {
        return Json::String(format!("@ref:{}", handle));
    }
    let Some(referent) = stream.referent(handle) else {
        return Json::Null;
    };
    path.push(handle);
    let out = match referent {
        Referent::Str(s) => Json::String(s.clone()),
        Referent::Enum(e) => Json::String(e.name.clone()),
        Referent::ClassDesc(desc) => Json::String(desc.name.clone()),
        Referent::Class { desc } => desc
            .and_then(|d| stream.class_desc(d))
            .map(|d| Json::String(d.name.clone()))
            .unwrap_or(Json::Null),
        Referent::Array(array) => Json::Array(
            array
                .elements
                .iter()
                .map(|value| project(stream, value, path))
                .collect(),
        ),
        Referent::Object(object) => {
            let mut map = JsonMap::new();
            if let Some(desc) = stream.class_desc(object.class) {
                map.insert("class".into(), Json::String(desc.name.clone()));
            }
            for (name, value) in &object.fields {
                map.insert(name.clone(), project(stream, value, path));
            }
            Json::Object(map)
        }
        Referent::Pending => Json::Null,
    };
    path.pop();
    out
}
