use std::cmp::Ordering;
use std::fmt;

/// Kind identity of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    Boolean,
    Int,
    Float,
    String,
    DateTime,
    Array,
    Object,
    Node,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::Boolean => "boolean",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::DateTime => "datetime",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Node => "node",
        }
    }

    /// Position in the cross-kind order. Int and Float share a rank and are
    /// ordered against each other by numeric value.
    pub fn rank(&self) -> u8 {
        match self {
            ValueType::None => 0,
            ValueType::Boolean => 1,
            ValueType::Int | ValueType::Float => 2,
            ValueType::String => 3,
            ValueType::DateTime => 4,
            ValueType::Array => 5,
            ValueType::Object => 6,
            ValueType::Node => 7,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }

    pub fn compare(&self, other: &ValueType) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_table_is_fixed() {
        let ordered = [
            ValueType::None,
            ValueType::Boolean,
            ValueType::Int,
            ValueType::String,
            ValueType::DateTime,
            ValueType::Array,
            ValueType::Object,
            ValueType::Node,
        ];
        for pair in ordered.windows(2) {
            assert_eq!(pair[0].compare(&pair[1]), Ordering::Less, "{} < {}", pair[0], pair[1]);
        }
        assert_eq!(ValueType::Int.compare(&ValueType::Float), Ordering::Equal);
    }
}
