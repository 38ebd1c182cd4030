//! Accessors over raw attribute maps.
//!
//! Plan values are loosely typed JSON. These helpers read them the way a
//! plan writer means them: numbers may arrive as strings, repeated blocks
//! arrive as arrays of objects, and empty strings mean "not set".

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

/// Raw attribute map of a resource.
pub type Attributes = serde_json::Map<String, Value>;

/// Get a non-empty string attribute.
pub fn str_value<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a str> {
    attrs
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Get a numeric attribute, accepting JSON numbers and numeric strings.
pub fn decimal_value(attrs: &Attributes, key: &str) -> Option<Decimal> {
    attrs.get(key).and_then(to_decimal)
}

/// Convert a JSON scalar to a decimal.
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

/// Get a non-negative whole count, truncating fractions.
pub fn count_value(attrs: &Attributes, key: &str) -> Option<u32> {
    decimal_value(attrs, key).and_then(|d| d.trunc().to_u32())
}

/// Get a boolean attribute (absent means false).
pub fn bool_value(attrs: &Attributes, key: &str) -> bool {
    match attrs.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Get the objects of a repeated block.
///
/// A single object is treated as a block repeated once.
pub fn blocks<'a>(attrs: &'a Attributes, key: &str) -> Vec<&'a Attributes> {
    match attrs.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        Some(Value::Object(obj)) => vec![obj],
        _ => Vec::new(),
    }
}

/// Get the first object of a repeated block.
pub fn first_block<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a Attributes> {
    blocks(attrs, key).into_iter().next()
}

/// Render a scalar the way catalog attribute values are written.
///
/// Null, arrays and objects render as an empty string.
pub fn to_filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
