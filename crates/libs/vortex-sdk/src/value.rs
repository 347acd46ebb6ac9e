//! Application-level dynamic values and their wire codec.
//!
//! Payloads, filters and metadata values are arbitrary JSON-like trees. They
//! are modelled as the closed [`DynamicValue`] sum type, and [`encode`] /
//! [`decode`] map it to and from [`WireValue`] by exhaustive matching.
//!
//! Numbers are IEEE-754 doubles on both sides: integers beyond 2^53 lose
//! precision. Map key order is not preserved.

use crate::wire::{Kind, WireList, WireStruct, WireValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DynamicValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<DynamicValue>),
    Map(HashMap<String, DynamicValue>),
}

impl DynamicValue {
    /// Converts any serializable value, falling back to its `Debug` rendering
    /// when it has no JSON-like representation.
    pub fn from_serializable<T: Serialize + Debug + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => Self::from(json),
            Err(_) => DynamicValue::String(format!("{value:?}")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        match self {
            DynamicValue::Map(fields) => fields.get(key),
            _ => None,
        }
    }
}

pub fn encode(value: &DynamicValue) -> WireValue {
    let kind = match value {
        DynamicValue::Null => Kind::NullValue,
        DynamicValue::Bool(flag) => Kind::BoolValue(*flag),
        DynamicValue::Number(number) => Kind::NumberValue(*number),
        DynamicValue::String(text) => Kind::StringValue(text.clone()),
        DynamicValue::List(items) => {
            Kind::ListValue(WireList { values: items.iter().map(encode).collect() })
        }
        DynamicValue::Map(fields) => {
            Kind::StructValue(WireStruct { fields: encode_fields(fields) })
        }
    };
    WireValue::from_kind(kind)
}

/// Inverse of [`encode`]. A value without a kind decodes to `Null`.
pub fn decode(wire: &WireValue) -> DynamicValue {
    let Some(kind) = wire.kind.as_ref() else {
        return DynamicValue::Null;
    };
    match kind {
        Kind::NullValue => DynamicValue::Null,
        Kind::BoolValue(flag) => DynamicValue::Bool(*flag),
        Kind::NumberValue(number) => DynamicValue::Number(*number),
        Kind::StringValue(text) => DynamicValue::String(text.clone()),
        Kind::ListValue(list) => DynamicValue::List(list.values.iter().map(decode).collect()),
        Kind::StructValue(record) => DynamicValue::Map(decode_fields(&record.fields)),
    }
}

pub fn encode_fields(fields: &HashMap<String, DynamicValue>) -> HashMap<String, WireValue> {
    fields.iter().map(|(key, value)| (key.clone(), encode(value))).collect()
}

pub fn decode_fields(fields: &HashMap<String, WireValue>) -> HashMap<String, DynamicValue> {
    fields.iter().map(|(key, value)| (key.clone(), decode(value))).collect()
}

impl From<JsonValue> for DynamicValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => DynamicValue::Null,
            JsonValue::Bool(flag) => DynamicValue::Bool(flag),
            JsonValue::Number(number) => number
                .as_f64()
                .map(DynamicValue::Number)
                .unwrap_or_else(|| DynamicValue::String(number.to_string())),
            JsonValue::String(text) => DynamicValue::String(text),
            JsonValue::Array(items) => {
                DynamicValue::List(items.into_iter().map(DynamicValue::from).collect())
            }
            JsonValue::Object(fields) => DynamicValue::Map(
                fields.into_iter().map(|(key, value)| (key, DynamicValue::from(value))).collect(),
            ),
        }
    }
}

/// Non-finite numbers have no JSON form and become `null`.
impl From<DynamicValue> for JsonValue {
    fn from(value: DynamicValue) -> Self {
        match value {
            DynamicValue::Null => JsonValue::Null,
            DynamicValue::Bool(flag) => JsonValue::Bool(flag),
            DynamicValue::Number(number) => {
                JsonNumber::from_f64(number).map(JsonValue::Number).unwrap_or(JsonValue::Null)
            }
            DynamicValue::String(text) => JsonValue::String(text),
            DynamicValue::List(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            DynamicValue::Map(fields) => JsonValue::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, JsonValue::from(value)))
                    .collect::<JsonMap<_, _>>(),
            ),
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        DynamicValue::Bool(value)
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        DynamicValue::Number(value)
    }
}

impl From<f32> for DynamicValue {
    fn from(value: f32) -> Self {
        DynamicValue::Number(f64::from(value))
    }
}

impl From<i32> for DynamicValue {
    fn from(value: i32) -> Self {
        DynamicValue::Number(f64::from(value))
    }
}

impl From<u32> for DynamicValue {
    fn from(value: u32) -> Self {
        DynamicValue::Number(f64::from(value))
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        DynamicValue::Number(value as f64)
    }
}

impl From<u64> for DynamicValue {
    fn from(value: u64) -> Self {
        DynamicValue::Number(value as f64)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::String(value.to_owned())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        DynamicValue::String(value)
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DynamicValue::Null)
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(items: Vec<T>) -> Self {
        DynamicValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DynamicValue>> From<HashMap<String, T>> for DynamicValue {
    fn from(fields: HashMap<String, T>) -> Self {
        DynamicValue::Map(fields.into_iter().map(|(key, value)| (key, value.into())).collect())
    }
}

impl<T: Into<DynamicValue>> From<BTreeMap<String, T>> for DynamicValue {
    fn from(fields: BTreeMap<String, T>) -> Self {
        DynamicValue::Map(fields.into_iter().map(|(key, value)| (key, value.into())).collect())
    }
}

impl<K: Into<String>, V: Into<DynamicValue>> FromIterator<(K, V)> for DynamicValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        DynamicValue::Map(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}
