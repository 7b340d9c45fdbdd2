use std::borrow::Cow;

use super::{impl_priority, StringSanitizer};
use crate::keys::KeyMatcher;

/// Masks `"key": value` pairs inside text that only looks like JSON.
///
/// Strings that decode as JSON are masked structurally before they reach the
/// string pipeline. This sanitizer covers what is left: truncated payloads,
/// JSON embedded in a log line, or JSON escaped inside another string. For
/// every masked key it rewrites:
/// - string values: `"password": "hunter2"` to `"password": "*REDACTED*"`
/// - arrays: `"cvv": [1, 2]` to `"cvv": ["*REDACTED*"]`
/// - scalars and one level of object: `"token": 42` to `"token": "*REDACTED*"`
///
/// Escaped keys (`\"token\"`) get escaped quotes around the mask.
#[derive(Clone, Copy, Debug)]
pub struct JsonStringSanitizer {
    priority: i32,
}

impl_priority!(JsonStringSanitizer);

impl StringSanitizer for JsonStringSanitizer {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn sanitize_string<'a>(
        &self,
        input: &'a str,
        mask_pattern: &str,
        keys_to_mask: &KeyMatcher,
    ) -> Cow<'a, str> {
        if !input.contains(':') {
            return Cow::Borrowed(input);
        }

        let lowered = input.to_lowercase();
        let mut current = Cow::Borrowed(input);
        for key in keys_to_mask.iter().filter(|key| lowered.contains(key)) {
            let masked = match mask_key(&current, key, mask_pattern) {
                Cow::Borrowed(_) => None,
                Cow::Owned(masked) => Some(masked),
            };
            if let Some(masked) = masked {
                current = Cow::Owned(masked);
            }
        }
        current
    }
}

struct Replacement {
    start: usize,
    end: usize,
    text: String,
}

fn mask_key<'a>(input: &'a str, key: &str, mask_pattern: &str) -> Cow<'a, str> {
    let mut output = String::new();
    let mut cursor = 0;
    for (quote_at, _) in input.match_indices('"') {
        if quote_at < cursor {
            continue;
        }
        let Some(key_len) = key_end(&input[quote_at + 1..], key) else {
            continue;
        };

        let quote = if input[..quote_at].ends_with('\\') { "\\\"" } else { "\"" };
        let value_start = quote_at + 1 + key_len;
        let Some(replacement) = scan_value(&input[value_start..], mask_pattern, quote) else {
            continue;
        };

        output.push_str(&input[cursor..value_start + replacement.start]);
        output.push_str(&replacement.text);
        cursor = value_start + replacement.end;
    }

    if cursor == 0 {
        return Cow::Borrowed(input);
    }
    output.push_str(&input[cursor..]);
    Cow::Owned(output)
}

// `text` starts right after an opening quote. Returns the offset just past
// `key":` or `key\":`, whitespace around the colon included.
fn key_end(text: &str, key: &str) -> Option<usize> {
    let rest = &text[key_len_ignoring_case(text, key)?..];
    let rest = rest.strip_prefix('\\').unwrap_or(rest);
    let rest = rest.strip_prefix('"')?.trim_start();
    let rest = rest.strip_prefix(':')?.trim_start();
    Some(text.len() - rest.len())
}

// Byte length of the prefix of `text` that lower-cases to `key`.
fn key_len_ignoring_case(text: &str, key: &str) -> Option<usize> {
    if key.is_empty() {
        return Some(0);
    }
    let mut expected = key.chars();
    for (index, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            if expected.next() != Some(lower) {
                return None;
            }
        }
        if expected.as_str().is_empty() {
            return Some(index + c.len_utf8());
        }
    }
    None
}

// Offsets are relative to `rest`, which starts right after the colon.
fn scan_value(rest: &str, mask_pattern: &str, quote: &str) -> Option<Replacement> {
    let opening = ["\\\"", "\""].into_iter().find(|q| rest.starts_with(q));
    if let Some(opening) = opening {
        let body = &rest[opening.len()..];
        let len = body.find(['\\', '"'])?;
        let closed = body[len..].starts_with('"') || body[len..].starts_with("\\\"");
        if len == 0 || !closed || &body[..len] == mask_pattern {
            return None;
        }
        return Some(Replacement {
            start: opening.len(),
            end: opening.len() + len,
            text: mask_pattern.to_owned(),
        });
    }

    let masked = format!("{quote}{mask_pattern}{quote}");
    if let Some(items) = rest.strip_prefix('[') {
        if let Some(len) = items.find(']').filter(|len| *len > 0) {
            if items[..len] == masked {
                return None;
            }
            return Some(Replacement {
                start: 1,
                end: 1 + len,
                text: masked,
            });
        }
    }

    Some(Replacement {
        start: 0,
        end: scalar_end(rest)?,
        text: masked,
    })
}

// A scalar runs to the next `,` or `}`. A `}` directly followed by another
// terminator closes a nested object and is swallowed with it.
fn scalar_end(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    match rest.find([',', '}']) {
        Some(0) => None,
        Some(limit)
            if bytes[limit] == b'}'
                && matches!(bytes.get(limit + 1), Some(b',' | b'}' | b']')) =>
        {
            Some(limit + 1)
        }
        Some(limit) => Some(limit),
        None => rest.rfind(']').filter(|end| *end > 0),
    }
}
