//! URL assembly helpers.
//!
//! These implement the query-string semantics the transport adapter relies
//! on: values are percent-encoded but a handful of characters meaningful in
//! query strings (`@ : $ , [ ]`) are left readable, spaces become `+`, and
//! any URL fragment is stripped before the query is appended.

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::{Map, Value};

use crate::config::ParamsSerializer;

lazy_static! {
    /// Matches scheme-qualified (`https://...`) and protocol-relative
    /// (`//host/...`) URLs.
    static ref ABSOLUTE_URL: Regex =
        Regex::new(r"^([a-zA-Z][a-zA-Z\d+\-.]*:)?//").expect("Invalid absolute-URL pattern");
}

/// Characters escaped in query components. Everything non-alphanumeric is
/// encoded except the set query strings conventionally keep readable.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'@')
    .remove(b':')
    .remove(b'$')
    .remove(b',')
    .remove(b'[')
    .remove(b']');

/// Returns `true` when `url` carries its own scheme or authority and must
/// not be combined with a base URL.
pub fn is_absolute_url(url: &str) -> bool {
    ABSOLUTE_URL.is_match(url)
}

/// Joins a base URL and a relative path with exactly one `/` between them.
///
/// An empty relative part returns the base unchanged.
pub fn combine_url(base_url: &str, relative_url: &str) -> String {
    if relative_url.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        relative_url.trim_start_matches('/')
    )
}

fn encode(component: &str) -> String {
    utf8_percent_encode(component, QUERY)
        .to_string()
        .replace("%20", "+")
}

fn serialize_params(params: &Map<String, Value>) -> String {
    let mut parts: Vec<String> = Vec::new();

    for (key, value) in params {
        if value.is_null() {
            continue;
        }

        let (key, values): (String, Vec<&Value>) = match value {
            Value::Array(items) => (format!("{key}[]"), items.iter().collect()),
            other => (key.clone(), vec![other]),
        };

        for value in values {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Object(_) => value.to_string(),
                other => other.to_string(),
            };
            parts.push(format!("{}={}", encode(&key), encode(&rendered)));
        }
    }

    parts.join("&")
}

/// Appends serialized `params` to `url`.
///
/// A caller-supplied serializer takes precedence over the built-in rules.
/// Any `#fragment` is stripped before the query is appended; an existing
/// query string is extended with `&`.
pub fn build_url(
    url: &str,
    params: Option<&Map<String, Value>>,
    serializer: Option<&ParamsSerializer>,
) -> String {
    let params = match params {
        Some(params) if !params.is_empty() => params,
        _ => return url.to_string(),
    };

    let serialized = match serializer {
        Some(serialize) => serialize(params),
        None => serialize_params(params),
    };

    if serialized.is_empty() {
        return url.to_string();
    }

    let mut url = match url.find('#') {
        Some(index) => url[..index].to_string(),
        None => url.to_string(),
    };
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(&serialized);
    url
}
