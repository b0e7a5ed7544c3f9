//! Fail-soft parsing of structured payloads embedded in completion text.
//!
//! Completion output is untrusted: it may wrap JSON in markdown fences, surround
//! it with prose, truncate it, or ignore the requested schema entirely. Every
//! function here returns `None`/empty instead of an error so callers can fall
//! back to a neutral value.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Candidate start positions tried before giving up on a response.
const MAX_CANDIDATES: usize = 16;

/// Locate and parse the first JSON object or array embedded in `response`.
pub fn parse_value(response: &str) -> Option<Value> {
    parse_value_where(response, |_| true)
}

/// Locate the first embedded JSON value for which `accept` holds.
///
/// Candidates that parse but are rejected (a `[1]` citation in front of the
/// payload, say) are skipped and the scan moves on.
pub fn parse_value_where(response: &str, accept: impl Fn(&Value) -> bool) -> Option<Value> {
    let body = strip_code_fence(response);
    scan(body, &accept).or_else(|| {
        if body.len() == response.len() {
            None
        } else {
            scan(response, &accept)
        }
    })
}

fn scan(text: &str, accept: &dyn Fn(&Value) -> bool) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        if (value.is_object() || value.is_array()) && accept(&value) {
            return Some(value);
        }
    }

    text.char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .take(MAX_CANDIDATES)
        .find_map(|(start, _)| {
            let end = find_balanced_end(text, start)?;
            serde_json::from_str::<Value>(&text[start..=end])
                .ok()
                .filter(|value| accept(value))
        })
}

/// Parse an object payload into `T`.
pub fn parse_object<T: DeserializeOwned>(response: &str) -> Option<T> {
    let value = parse_value_where(response, Value::is_object)?;
    serde_json::from_value(value).ok()
}

/// Parse a list payload.
///
/// Accepts a bare array of objects or an object holding the array under
/// `key`. Items that do not fit `T` are dropped individually so one malformed
/// entry does not discard its siblings. Returns `None` when no list could be
/// found at all.
pub fn parse_list<T: DeserializeOwned>(response: &str, key: &str) -> Option<Vec<T>> {
    let value = parse_value_where(response, |value| match value {
        Value::Array(items) => items.iter().all(Value::is_object),
        Value::Object(map) => map.get(key).is_some_and(Value::is_array),
        _ => false,
    })?;

    match value {
        Value::Array(items) => Some(items_of(items)),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Some(items_of(items)),
            _ => None,
        },
        _ => None,
    }
}

/// Read `key` (or its snake_case spelling) from an object as a lenient list.
pub fn list_field<T: DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    let field = value
        .get(key)
        .or_else(|| value.get(to_snake_case(key).as_str()));

    match field {
        Some(Value::Array(items)) => items_of(items.clone()),
        _ => vec![],
    }
}

fn items_of<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

fn strip_code_fence(response: &str) -> &str {
    let Some(open) = response.find("```") else {
        return response;
    };
    let after = &response[open + 3..];
    // Skip an info string such as `json` up to the end of the fence line
    let content = match after.find('\n') {
        Some(newline) if after[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &after[newline + 1..]
        }
        _ => after,
    };
    match content.find("```") {
        Some(close) => &content[..close],
        None => content,
    }
}

/// Index of the bracket closing the one at `start`, skipping string literals.
fn find_balanced_end(s: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in s[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
