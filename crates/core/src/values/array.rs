use std::cmp::Ordering;
use std::hash::Hasher;

use super::hash::Fnv64;
use super::{Value, ValueType};

/// Ordered, index-addressed sequence of values.
#[derive(Debug, Clone, Default)]
pub struct Array(Vec<Value>);

impl Array {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    /// Negative or out-of-range indices resolve to nothing.
    pub fn get(&self, index: i64) -> Option<&Value> {
        usize::try_from(index).ok().and_then(|i| self.0.get(i))
    }

    pub fn get_mut(&mut self, index: i64) -> Option<&mut Value> {
        usize::try_from(index).ok().and_then(|i| self.0.get_mut(i))
    }

    /// Replace the element at `index`. Returns `false` if the index is out of range.
    pub fn set(&mut self, index: i64, value: impl Into<Value>) -> bool {
        match self.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.compare(b));
    }

    /// Element-wise up to the shorter length, then by length.
    pub fn compare(&self, other: &Array) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.compare(b) {
                Ordering::Equal => continue,
                non_eq => return non_eq,
            }
        }
        self.0.len().cmp(&other.0.len())
    }

    pub(crate) fn write_hash(&self, hasher: &mut Fnv64) {
        hasher.write(ValueType::Array.name().as_bytes());
        hasher.write(b":[");
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                hasher.write(b",");
            }
            hasher.write_u64(item.content_hash());
        }
        hasher.write(b"]");
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_miss() {
        let arr: Array = vec![Value::from(1), Value::from(2)].into();
        assert!(arr.get(-1).is_none());
        assert!(arr.get(2).is_none());
        assert_eq!(arr.get(1), Some(&Value::Int(2)));
    }

    #[test]
    fn test_set_out_of_range_is_rejected() {
        let mut arr: Array = vec![Value::from("a")].into();
        assert!(!arr.set(3, "b"));
        assert_eq!(arr.len(), 1);
        assert!(arr.set(0, "b"));
        assert_eq!(arr.get(0), Some(&Value::from("b")));
    }

    #[test]
    fn test_compare_prefix_then_length() {
        let short: Array = vec![Value::from(1)].into();
        let long: Array = vec![Value::from(1), Value::from(0)].into();
        let bigger: Array = vec![Value::from(2)].into();
        assert_eq!(short.compare(&long), Ordering::Less);
        assert_eq!(bigger.compare(&long), Ordering::Greater);
    }

    #[test]
    fn test_mixed_kinds_sort() {
        let mut arr: Array = vec![
            Value::from("b"),
            Value::from(3),
            Value::None,
            Value::from(true),
            Value::from(1.5),
        ]
        .into();
        arr.sort();
        let rendered: Vec<String> = arr.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["", "true", "1.5", "3", "b"]);
    }
}
