//! Argument checks shared by the built-in functions.

use std::sync::Arc;

use harvest_core::{Error, HtmlNode, NodeKind, Result, Value, ValueType};

pub fn validate_args(args: &[Value], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(Error::InvalidArgumentCount {
            min,
            max,
            actual: args.len(),
        });
    }
    Ok(())
}

pub fn validate_type(value: &Value, allowed: &[ValueType]) -> Result<()> {
    let actual = value.value_type();
    if allowed.iter().any(|t| *t == actual) {
        return Ok(());
    }
    Err(Error::InvalidType(format!(
        "expected {}, got {}",
        join_names(allowed.iter().map(|t| t.name())),
        actual.name()
    )))
}

/// Check that `value` is a node of one of the `allowed` kinds and hand it back.
pub fn validate_node<'a>(value: &'a Value, allowed: &[NodeKind]) -> Result<&'a Arc<dyn HtmlNode>> {
    let expected = || join_names(allowed.iter().map(|k| k.name()));
    match value.as_node() {
        Some(node) if allowed.contains(&node.kind()) => Ok(node),
        Some(node) => Err(Error::InvalidType(format!(
            "expected {}, got {}",
            expected(),
            node.kind()
        ))),
        None => Err(Error::InvalidType(format!(
            "expected {}, got {}",
            expected(),
            value.value_type().name()
        ))),
    }
}

/// String argument at `index`; the caller has already checked the count.
pub fn string_arg(args: &[Value], index: usize) -> Result<&str> {
    let value = args
        .get(index)
        .ok_or_else(|| Error::MissingArgument(format!("argument {}", index + 1)))?;
    validate_type(value, &[ValueType::String])?;
    Ok(value.as_str().unwrap_or_default())
}

pub fn int_arg(args: &[Value], index: usize) -> Result<i64> {
    let value = args
        .get(index)
        .ok_or_else(|| Error::MissingArgument(format!("argument {}", index + 1)))?;
    validate_type(value, &[ValueType::Int])?;
    Ok(value.as_int().unwrap_or_default())
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(" or ")
}
