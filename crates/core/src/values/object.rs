use std::cmp::Ordering;
use std::hash::Hasher;

use indexmap::IndexMap;

use super::hash::Fnv64;
use super::{Value, ValueType};

/// Key-addressed mapping that preserves insertion order.
#[derive(Debug, Clone, Default)]
pub struct Object(IndexMap<String, Value>);

impl Object {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Insert or overwrite; an existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    fn sorted_entries(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<(&String, &Value)> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Pairwise over entries sorted by key (key first, then value), then by
    /// entry count. Insertion order does not take part in ordering.
    pub fn compare(&self, other: &Object) -> Ordering {
        let left = self.sorted_entries();
        let right = other.sorted_entries();

        for ((lk, lv), (rk, rv)) in left.iter().zip(right.iter()) {
            let ord = lk.cmp(rk).then_with(|| lv.compare(rv));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        left.len().cmp(&right.len())
    }

    pub(crate) fn write_hash(&self, hasher: &mut Fnv64) {
        hasher.write(ValueType::Object.name().as_bytes());
        hasher.write(b":{");
        for (i, (key, value)) in self.sorted_entries().into_iter().enumerate() {
            if i > 0 {
                hasher.write(b",");
            }
            hasher.write(key.as_bytes());
            hasher.write(b":");
            hasher.write_u64(value.content_hash());
        }
        hasher.write(b"}");
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
