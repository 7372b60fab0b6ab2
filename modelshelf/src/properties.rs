//! Custom-property metadata and its wire codec.
//!
//! Every resource carries an open `customProperties` map. On the wire each
//! value is a tagged object: scalars carry their own field
//! (`boolValue`, `intValue`, `doubleValue`, `stringValue`), while lists and
//! maps are JSON-encoded, base64-encoded and shipped as a `structValue`
//! string. Int64 values travel as decimal strings.
//!
//! Struct payloads keep the registry's positional-list encoding: a top-level
//! list becomes a JSON object keyed `"0"`, `"1"`, ... and is recognized on
//! decode by all keys being decimal-digit strings. Known ambiguity, kept for
//! wire compatibility: a genuine map whose keys are all digit strings
//! decodes as a list. See [`PropertyValue::from_wire`].

use std::collections::BTreeMap;

use base64ct::{Base64, Encoding};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{Error, Result};

const METADATA_TYPE: &str = "metadataType";
const BOOL_TYPE: &str = "MetadataBoolValue";
const INT_TYPE: &str = "MetadataIntValue";
const DOUBLE_TYPE: &str = "MetadataDoubleValue";
const STRING_TYPE: &str = "MetadataStringValue";
const STRUCT_TYPE: &str = "MetadataStructValue";

/// Open metadata map attached to a resource.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single custom-property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer value; carried as a decimal string on the wire.
    Int(i64),
    /// Floating-point value.
    Double(f64),
    /// String value.
    Str(String),
    /// List value; wire-encoded as a digit-keyed struct payload.
    List(Vec<PropertyValue>),
    /// Map value; wire-encoded as a struct payload.
    Map(Properties),
}

impl PropertyValue {
    /// Encode into the tagged wire object.
    pub fn to_wire(&self) -> Value {
        match self {
            PropertyValue::Bool(b) => tagged(BOOL_TYPE, "boolValue", Value::Bool(*b)),
            PropertyValue::Int(i) => tagged(INT_TYPE, "intValue", Value::String(i.to_string())),
            PropertyValue::Double(d) => tagged(DOUBLE_TYPE, "doubleValue", Value::from(*d)),
            PropertyValue::Str(s) => tagged(STRING_TYPE, "stringValue", Value::String(s.clone())),
            PropertyValue::List(items) => {
                let mut positional = Map::new();
                for (index, item) in items.iter().enumerate() {
                    if let Some(encoded) = item.to_plain_json() {
                        positional.insert(index.to_string(), encoded);
                    }
                }
                tagged(STRUCT_TYPE, "structValue", encode_struct(Value::Object(positional)))
            }
            PropertyValue::Map(entries) => {
                let mut object = Map::new();
                for (key, value) in entries {
                    if let Some(encoded) = value.to_plain_json() {
                        object.insert(key.clone(), encoded);
                    }
                }
                tagged(STRUCT_TYPE, "structValue", encode_struct(Value::Object(object)))
            }
        }
    }

    /// Decode a tagged wire object.
    ///
    /// Returns `Ok(None)` for an unrecognized (or missing) `metadataType`:
    /// such properties are dropped, never treated as errors, so newer servers
    /// don't break older clients. Malformed payloads of a known type are
    /// reported as [`Error::Serialization`].
    pub fn from_wire(value: &Value) -> Result<Option<Self>> {
        let Some(object) = value.as_object() else {
            return Err(codec_error("property value is not an object"));
        };
        let metadata_type = object.get(METADATA_TYPE).and_then(Value::as_str);
        match metadata_type {
            Some(BOOL_TYPE) => match object.get("boolValue").and_then(Value::as_bool) {
                Some(b) => Ok(Some(PropertyValue::Bool(b))),
                None => Err(codec_error("boolValue missing or not a boolean")),
            },
            Some(INT_TYPE) => match object.get("intValue") {
                Some(Value::String(raw)) => raw
                    .parse::<i64>()
                    .map(|i| Some(PropertyValue::Int(i)))
                    .map_err(|_| codec_error("intValue is not a decimal int64 string")),
                Some(Value::Number(n)) if n.as_i64().is_some() => {
                    Ok(Some(PropertyValue::Int(n.as_i64().unwrap())))
                }
                _ => Err(codec_error("intValue missing or not an integer")),
            },
            Some(DOUBLE_TYPE) => match object.get("doubleValue").and_then(Value::as_f64) {
                Some(d) => Ok(Some(PropertyValue::Double(d))),
                None => Err(codec_error("doubleValue missing or not a number")),
            },
            Some(STRING_TYPE) => match object.get("stringValue").and_then(Value::as_str) {
                Some(s) => Ok(Some(PropertyValue::Str(s.to_string()))),
                None => Err(codec_error("stringValue missing or not a string")),
            },
            Some(STRUCT_TYPE) => {
                let Some(encoded) = object.get("structValue").and_then(Value::as_str) else {
                    return Err(codec_error("structValue missing or not a string"));
                };
                let decoded = decode_struct(encoded)?;
                Ok(Self::from_plain_json(&decoded))
            }
            _ => Ok(None),
        }
    }

    /// Plain-JSON encoding used inside struct payloads.
    ///
    /// Nested lists stay real JSON arrays; only the top-level list takes the
    /// positional-object encoding.
    fn to_plain_json(&self) -> Option<Value> {
        match self {
            PropertyValue::Bool(b) => Some(Value::Bool(*b)),
            PropertyValue::Int(i) => Some(Value::from(*i)),
            PropertyValue::Double(d) => Some(Value::from(*d)),
            PropertyValue::Str(s) => Some(Value::String(s.clone())),
            PropertyValue::List(items) => Some(Value::Array(
                items.iter().filter_map(PropertyValue::to_plain_json).collect(),
            )),
            PropertyValue::Map(entries) => {
                let mut object = Map::new();
                for (key, value) in entries {
                    if let Some(encoded) = value.to_plain_json() {
                        object.insert(key.clone(), encoded);
                    }
                }
                Some(Value::Object(object))
            }
        }
    }

    /// Inverse of [`to_plain_json`]. `null` entries have no representation
    /// and are dropped.
    fn from_plain_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(PropertyValue::Int(i))
                } else {
                    n.as_f64().map(PropertyValue::Double)
                }
            }
            Value::String(s) => Some(PropertyValue::Str(s.clone())),
            Value::Array(items) => Some(PropertyValue::List(
                items.iter().filter_map(PropertyValue::from_plain_json).collect(),
            )),
            Value::Object(object) => {
                if is_positional(object) {
                    let mut indexed: Vec<(usize, &Value)> = object
                        .iter()
                        .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
                        .collect();
                    indexed.sort_by_key(|(i, _)| *i);
                    Some(PropertyValue::List(
                        indexed
                            .into_iter()
                            .filter_map(|(_, v)| PropertyValue::from_plain_json(v))
                            .collect(),
                    ))
                } else {
                    let mut entries = Properties::new();
                    for (key, value) in object {
                        if let Some(parsed) = PropertyValue::from_plain_json(value) {
                            entries.insert(key.clone(), parsed);
                        }
                    }
                    Some(PropertyValue::Map(entries))
                }
            }
        }
    }
}

/// Positional-list detection: every key is a decimal-digit string.
///
/// Matches the original encoding, where `all()` over an empty key set holds,
/// so an empty struct payload decodes as an empty list.
fn is_positional(object: &Map<String, Value>) -> bool {
    object.keys().all(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
}

fn tagged(metadata_type: &str, field: &str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(METADATA_TYPE.to_string(), Value::String(metadata_type.to_string()));
    object.insert(field.to_string(), value);
    Value::Object(object)
}

fn encode_struct(json: Value) -> Value {
    Value::String(Base64::encode_string(json.to_string().as_bytes()))
}

fn decode_struct(encoded: &str) -> Result<Value> {
    let bytes = Base64::decode_vec(encoded)
        .map_err(|_| codec_error("structValue is not valid base64"))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| codec_error("structValue does not contain valid JSON"))
}

fn codec_error(message: &str) -> Error {
    Error::Serialization(<serde_json::Error as de::Error>::custom(message))
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

/// Deserializer for `customProperties` maps.
///
/// Entries with an unrecognized `metadataType` are dropped with a warning;
/// malformed entries of a known type fail the decode.
pub(crate) fn deserialize_properties<'de, D>(deserializer: D) -> std::result::Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    let mut properties = Properties::new();
    for (key, value) in raw {
        match PropertyValue::from_wire(&value) {
            Ok(Some(parsed)) => {
                properties.insert(key, parsed);
            }
            Ok(None) => {
                warn!(property = %key, "dropping custom property with unrecognized metadata type");
            }
            Err(error) => return Err(de::Error::custom(format!("custom property {key}: {error}"))),
        }
    }
    Ok(properties)
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(d: f64) -> Self {
        PropertyValue::Double(d)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Str(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Str(s)
    }
}
