//! The closed set of runtime values and their identity contract.
//!
//! Every kind has a type identity, canonical text (`Display`), a cross-kind
//! total order (`compare`), a content hash consistent with that order, and a
//! copy operation. Ordering across kinds follows the rank table on
//! [`ValueType::rank`].

mod array;
mod hash;
mod json;
mod number;
mod object;
mod parse;
mod types;

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::node::HtmlNode;

pub use array::Array;
pub use hash::Fnv64;
pub use object::Object;
pub use parse::{parse_boolean, parse_float, parse_int};
pub use types::ValueType;

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Array(Array),
    Object(Object),
    Node(Arc<dyn HtmlNode>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::None => ValueType::None,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
            Value::Node(_) => ValueType::Node,
        }
    }

    pub fn node(node: impl HtmlNode + 'static) -> Self {
        Value::Node(Arc::new(node))
    }

    /// Strict total order over all kinds.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::None, Value::None) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => number::compare_floats(*a, *b),
            (Value::Int(a), Value::Float(b)) => number::compare_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => number::compare_int_float(*b, *a).reverse(),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.compare(b),
            (Value::Object(a), Value::Object(b)) => a.compare(b),
            (Value::Node(a), Value::Node(b)) => a.canonical_html().cmp(b.canonical_html()),
            _ => self.value_type().compare(&other.value_type()),
        }
    }

    /// 64-bit FNV-1a over `kind:content`. Equal values (by `compare`) always
    /// hash equal; Int and Float share the `number` tag for that reason.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = Fnv64::new();
        self.write_hash(&mut hasher);
        hasher.finish()
    }

    fn write_hash(&self, hasher: &mut Fnv64) {
        match self {
            Value::None => hasher.tagged(ValueType::None.name(), b""),
            Value::Boolean(b) => hasher.tagged(ValueType::Boolean.name(), bool_text(*b).as_bytes()),
            Value::Int(i) => hasher.tagged("number", i.to_string().as_bytes()),
            Value::Float(f) => hasher.tagged("number", number::canonical_float(*f).as_bytes()),
            Value::String(s) => hasher.tagged(ValueType::String.name(), s.as_bytes()),
            Value::DateTime(d) => {
                hasher.tagged(ValueType::DateTime.name(), datetime_text(d).as_bytes())
            }
            Value::Array(a) => a.write_hash(hasher),
            Value::Object(o) => o.write_hash(hasher),
            Value::Node(n) => hasher.tagged(ValueType::Node.name(), n.canonical_html().as_bytes()),
        }
    }

    /// Independent copy. Arrays and objects are deep-copied; nodes share
    /// their immutable backend handle.
    pub fn copy(&self) -> Value {
        self.clone()
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Boolean(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::DateTime(_) | Value::Node(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of either numeric kind.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Arc<dyn HtmlNode>> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }
}

fn bool_text(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

fn datetime_text(d: &DateTime<Utc>) -> String {
    d.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Boolean(b) => f.write_str(bool_text(*b)),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::DateTime(d) => f.write_str(&datetime_text(d)),
            Value::Array(_) | Value::Object(_) => {
                let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
            Value::Node(n) => f.write_str(n.canonical_html()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl std::hash::Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::DateTime(d)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Array::from(values))
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Arc<dyn HtmlNode>> for Value {
    fn from(n: Arc<dyn HtmlNode>) -> Self {
        Value::Node(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::None)
    }
}
