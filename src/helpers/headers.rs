//! Raw header-block parsing.

use serde_json::Value;

use crate::config::HeaderBucket;

/// Headers for which only the first occurrence is kept when a raw block
/// repeats them.
const SINGLE_VALUE_HEADERS: &[&str] = &[
    "age",
    "authorization",
    "content-length",
    "content-type",
    "etag",
    "expires",
    "from",
    "host",
    "if-modified-since",
    "if-unmodified-since",
    "last-modified",
    "location",
    "max-forwards",
    "proxy-authorization",
    "referer",
    "retry-after",
    "user-agent",
];

/// Folds one lower-cased header into a bucket: repeated headers are joined
/// with `", "` except for the single-value set above (first occurrence
/// wins) and `set-cookie`, which is collected into an array of values.
pub(crate) fn append_header_value(parsed: &mut HeaderBucket, key: String, value: String) {
    if parsed.contains_key(&key) && SINGLE_VALUE_HEADERS.contains(&key.as_str()) {
        return;
    }

    if key == "set-cookie" {
        match parsed.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            _ => {
                parsed.insert(key, Value::Array(vec![Value::String(value)]));
            }
        }
    } else {
        match parsed.get_mut(&key) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            _ => {
                parsed.insert(key, Value::String(value));
            }
        }
    }
}

/// Parses a raw `name: value` header block into a bucket.
///
/// Keys are lower-cased; duplicate handling follows
/// [`append_header_value`].
pub fn parse_raw_headers(raw: &str) -> HeaderBucket {
    let mut parsed = HeaderBucket::new();

    for line in raw.lines() {
        let Some(index) = line.find(':') else { continue };
        let key = line[..index].trim().to_ascii_lowercase();
        let value = line[index + 1..].trim().to_string();
        if key.is_empty() {
            continue;
        }
        append_header_value(&mut parsed, key, value);
    }

    parsed
}

/// Folds any case-variant of `normalized` in the bucket into the
/// canonical spelling, keeping the existing value.
pub fn normalize_header_name(headers: &mut HeaderBucket, normalized: &str) {
    let variants: Vec<String> = headers
        .keys()
        .filter(|name| name.as_str() != normalized && name.eq_ignore_ascii_case(normalized))
        .cloned()
        .collect();

    for name in variants {
        if let Some(value) = headers.remove(&name) {
            headers.insert(normalized.to_string(), value);
        }
    }
}
