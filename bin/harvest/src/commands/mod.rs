pub mod attach;
pub mod query;

use harvest_core::Value;

/// Print a result value as pretty JSON on stdout.
pub fn print_value(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
