//! Nested get/set over arrays, objects and nodes.
//!
//! A segment that cannot be resolved (missing key, index out of range, a
//! value with no structure) is not an error: `get_in` yields `Value::None`
//! and `set_in` leaves the root untouched.

use std::fmt;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::values::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(i64),
}

impl PathSegment {
    /// Strings become keys and ints indices; other kinds cannot address anything.
    pub fn from_value(value: &Value) -> Option<PathSegment> {
        match value {
            Value::String(s) => Some(PathSegment::Key(s.clone())),
            Value::Int(i) => Some(PathSegment::Index(*i)),
            _ => None,
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<i64> for PathSegment {
    fn from(index: i64) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Build a path from language values, stopping at the first segment that
/// cannot address anything (`None` means the whole path is unresolvable).
pub fn path_from_values(values: &[Value]) -> Option<Vec<PathSegment>> {
    values.iter().map(PathSegment::from_value).collect()
}

/// Walk `path` from `root`. An empty path yields the root itself.
///
/// Nodes resolve their own segment (which may reach a live browser) and the
/// walk continues on the resolved value with the remaining path.
pub fn get_in<'a>(root: &'a Value, path: &'a [PathSegment]) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        let Some((segment, rest)) = path.split_first() else {
            return Ok(root.clone());
        };

        match (root, segment) {
            (Value::Object(obj), PathSegment::Key(key)) => match obj.get(key) {
                Some(next) => get_in(next, rest).await,
                None => Ok(Value::None),
            },
            (Value::Array(arr), PathSegment::Index(index)) => match arr.get(*index) {
                Some(next) => get_in(next, rest).await,
                None => Ok(Value::None),
            },
            (Value::Node(node), segment) => {
                let resolved = node.resolve(segment).await?;
                if rest.is_empty() {
                    Ok(resolved)
                } else {
                    get_in(&resolved, rest).await
                }
            }
            _ => Ok(Value::None),
        }
    })
}

/// Assign `value` at `path`. Only arrays and objects are writable; an
/// intermediate miss, a node along the way or an empty path is a no-op.
/// Array indices must already exist, object keys are inserted as needed.
pub fn set_in(root: &mut Value, path: &[PathSegment], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = match (current, segment) {
            (Value::Object(obj), PathSegment::Key(key)) => match obj.get_mut(key) {
                Some(next) => next,
                None => return,
            },
            (Value::Array(arr), PathSegment::Index(index)) => match arr.get_mut(*index) {
                Some(next) => next,
                None => return,
            },
            _ => return,
        };
    }

    match (current, last) {
        (Value::Object(obj), PathSegment::Key(key)) => obj.set(key.clone(), value),
        (Value::Array(arr), PathSegment::Index(index)) => {
            arr.set(*index, value);
        }
        _ => {}
    }
}
