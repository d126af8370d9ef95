//! Request and response body transforms.
//!
//! A transform pipeline is an ordered sequence of functions applied to the
//! body before dispatch (request transforms) or after the transport
//! settles (response transforms). Every function runs, in order, each
//! receiving the current body and shared mutable access to the effective
//! headers: header changes made by an earlier transform are visible to
//! later ones and end up on the wire.

use serde_json::Value;
use std::sync::Arc;

use crate::config::HeaderBucket;
use crate::error::Result;
use crate::helpers::normalize_header_name;

/// A single body transform stage.
pub type BodyTransformer = Arc<dyn Fn(Value, &mut HeaderBucket) -> Result<Value> + Send + Sync>;

/// Applies `fns` to `data` in order, threading the headers through the
/// whole chain. No stage is skipped; the first failing stage aborts the
/// pipeline.
pub fn transform_data(
    data: Value,
    headers: &mut HeaderBucket,
    fns: &[BodyTransformer],
) -> Result<Value> {
    let mut data = data;
    for transform in fns {
        data = transform(data, headers)?;
    }
    Ok(data)
}

fn set_content_type_if_unset(headers: &mut HeaderBucket, value: &str) {
    if !headers.contains_key("Content-Type") {
        headers.insert("Content-Type".to_string(), Value::String(value.to_string()));
    }
}

/// The stock request transform: serializes mapping/array bodies to JSON
/// text and marks the content type when the caller did not pick one.
/// Scalar bodies pass through untouched.
pub fn default_request_transforms() -> Vec<BodyTransformer> {
    vec![Arc::new(|data, headers| {
        normalize_header_name(headers, "Accept");
        normalize_header_name(headers, "Content-Type");

        match data {
            Value::Object(_) | Value::Array(_) => {
                set_content_type_if_unset(headers, "application/json;charset=utf-8");
                Ok(Value::String(serde_json::to_string(&data)?))
            }
            other => Ok(other),
        }
    })]
}

/// The stock response transform: attempts a JSON parse of string bodies,
/// leaving the string untouched when parsing fails.
pub fn default_response_transforms() -> Vec<BodyTransformer> {
    vec![Arc::new(|data, _headers| match data {
        Value::String(text) => Ok(serde_json::from_str(&text).unwrap_or(Value::String(text))),
        other => Ok(other),
    })]
}
