//! Conversion to and from the host JSON representation.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

use super::{datetime_text, Array, Object, Value};

impl Value {
    /// Host representation for glue code. Nodes become their canonical HTML
    /// string, date-times RFC 3339 strings, non-finite floats `null`. Object
    /// key order follows `serde_json::Map`; serialize the value directly to
    /// keep insertion order.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::None => JsonValue::Null,
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::DateTime(d) => JsonValue::String(datetime_text(d)),
            Value::Array(a) => JsonValue::Array(a.iter().map(Value::to_json).collect()),
            Value::Object(o) => {
                let mut map = Map::with_capacity(o.len());
                for (k, v) in o.iter() {
                    map.insert(k.clone(), v.to_json());
                }
                JsonValue::Object(map)
            }
            Value::Node(n) => JsonValue::String(n.canonical_html().to_string()),
        }
    }

    /// Strings are never sniffed as dates; use [`Value::parse_datetime`] for that.
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::None,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::None),
            },
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect::<Array>())
            }
            JsonValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect::<Object>(),
            ),
        }
    }

    pub fn parse_datetime(input: &str) -> Option<Value> {
        DateTime::parse_from_rfc3339(input)
            .ok()
            .map(|d| Value::DateTime(d.with_timezone(&Utc)))
    }
}

/// Same mapping as [`Value::to_json`], but objects keep insertion order.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for item in a.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (k, v) in o.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            scalar => scalar.to_json().serialize(serializer),
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        Value::from_json(json)
    }
}
