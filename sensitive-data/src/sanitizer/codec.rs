//! JSON decoding and re-encoding of strings that carry structured data.

use serde_json::Value as JsonValue;
use tracing::error;

use crate::{
    error::{Error, Result},
    value::Value,
};

/// Decodes `text` if it holds a JSON object or array.
///
/// Anything else, including valid JSON scalars, is `None`: such strings are
/// free text as far as masking is concerned.
pub(super) fn decode_structure(text: &str) -> Option<Value> {
    let first = *text.trim_start().as_bytes().first()?;
    if !matches!(first, b'{' | b'[') {
        return None;
    }
    match serde_json::from_str::<JsonValue>(text) {
        Ok(json @ (JsonValue::Object(_) | JsonValue::Array(_))) => {
            Some(Value::from_decoded_json(json))
        }
        _ => None,
    }
}

pub(super) fn encode(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|source| {
        error!(error = %source, "failed to re-encode sanitized JSON");
        Error::Encode(source)
    })
}

/// Removes one level of backslash escaping: `\x` becomes `x` and `\\`
/// becomes `\`. A trailing lone backslash is dropped.
pub(super) fn strip_slashes(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                unescaped.push(escaped);
            }
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}

/// Adds one level of escaping to backslashes and double quotes.
pub(super) fn add_slashes(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
