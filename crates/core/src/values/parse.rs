//! Lenient parsing helpers for host input.

use super::Value;
use crate::error::{Error, Result};

/// Accepts a boolean or the strings `"true"`/`"false"` in any case.
pub fn parse_boolean(input: &Value) -> Result<bool> {
    match input {
        Value::Boolean(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(Error::InvalidType("expected 'bool'".to_string())),
    }
}

/// Accepts an int, an integral float, or a decimal integer string.
pub fn parse_int(input: &Value) -> Result<i64> {
    match input {
        Value::Int(i) => Ok(*i),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidType("expected 'int'".to_string())),
        _ => Err(Error::InvalidType("expected 'int'".to_string())),
    }
}

pub fn parse_float(input: &Value) -> Result<f64> {
    match input {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidType("expected 'float'".to_string())),
        _ => Err(Error::InvalidType("expected 'float'".to_string())),
    }
}
