//! Small helpers for emitting JavaScript tokens

use serde_json::Value;

/// Quote `value` as a double-quoted JavaScript string literal.
///
/// JSON string syntax is a subset of JavaScript string syntax, so the JSON
/// encoder produces a correctly escaped literal.
pub fn quote(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Returns `true` if `name` can be written as a bare identifier name
/// (after a `.` or as an unquoted object key).
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '$' || c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '$' || c == '_' || c.is_alphanumeric())
}

/// `object.name`, or `object["name"]` when `name` is not an identifier name
pub fn property_access(object: &str, name: &str) -> String {
    if is_identifier_name(name) {
        format!("{object}.{name}")
    } else {
        format!("{object}[{}]", quote(name))
    }
}

/// Object literal or pattern key for `name`
pub fn property_key(name: &str) -> String {
    if is_identifier_name(name) {
        name.to_string()
    } else {
        quote(name)
    }
}
