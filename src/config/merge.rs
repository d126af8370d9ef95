//! Deep merge of request configurations.
//!
//! `merge` combines a base config and an override config into a new config
//! that shares no nested mapping storage with either input, so
//! caller-held configs (instance defaults in particular) survive the
//! in-place header flattening performed later in the pipeline. Plain JSON
//! mappings merge recursively; any non-mapping override value (scalars,
//! arrays, and explicit `null`/`false` included) fully replaces whatever
//! the base held at that key.

use serde_json::{Map, Value};

use super::headers::HeaderBucket;
use super::RequestConfig;

/// Deep-merges two JSON values.
///
/// When both operands are objects the merge recurses key-wise; otherwise
/// the `target` value wins outright. The result owns all of its storage.
pub fn merge_json(source: &Value, target: &Value) -> Value {
    match (source, target) {
        (Value::Object(source), Value::Object(target)) => {
            let mut merged = source.clone();
            for (key, value) in target {
                let value = match merged.get(key) {
                    Some(existing) => merge_json(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (_, overriding) => overriding.clone(),
    }
}

pub(crate) fn merge_buckets(source: &HeaderBucket, target: &HeaderBucket) -> HeaderBucket {
    match merge_json(&Value::Object(source.clone()), &Value::Object(target.clone())) {
        Value::Object(merged) => merged,
        _ => unreachable!("merging two objects yields an object"),
    }
}

fn merge_params(
    source: Option<&Map<String, Value>>,
    target: Option<&Map<String, Value>>,
) -> Option<Map<String, Value>> {
    match (source, target) {
        (Some(source), Some(target)) => Some(merge_buckets(source, target)),
        (None, Some(params)) | (Some(params), None) => Some(params.clone()),
        (None, None) => None,
    }
}

fn merge_data(source: Option<&Value>, target: Option<&Value>) -> Option<Value> {
    match (source, target) {
        (Some(source), Some(target)) => Some(merge_json(source, target)),
        (None, Some(data)) | (Some(data), None) => Some(data.clone()),
        (None, None) => None,
    }
}

/// Combines a base config and an override config into a new config.
///
/// Fields set in `target` win; unset fields inherit from `source`. Header
/// buckets, params, and mapping-shaped bodies are deep-merged; everything
/// else is replaced wholesale. The result holds no shared mutable state
/// with either operand.
pub fn merge(source: &RequestConfig, target: &RequestConfig) -> RequestConfig {
    RequestConfig {
        url: target.url.clone().or_else(|| source.url.clone()),
        method: target.method.or(source.method),
        base_url: target.base_url.clone().or_else(|| source.base_url.clone()),
        headers: source.headers.merged(&target.headers),
        params: merge_params(source.params.as_ref(), target.params.as_ref()),
        data: merge_data(source.data.as_ref(), target.data.as_ref()),
        timeout: target.timeout.or(source.timeout),
        with_credentials: target.with_credentials.or(source.with_credentials),
        response_type: target.response_type.or(source.response_type),
        params_serializer: target
            .params_serializer
            .clone()
            .or_else(|| source.params_serializer.clone()),
        on_upload_progress: target
            .on_upload_progress
            .clone()
            .or_else(|| source.on_upload_progress.clone()),
        on_download_progress: target
            .on_download_progress
            .clone()
            .or_else(|| source.on_download_progress.clone()),
        validate_status: target
            .validate_status
            .clone()
            .or_else(|| source.validate_status.clone()),
        adapter: target.adapter.clone().or_else(|| source.adapter.clone()),
        auth: target.auth.clone().or_else(|| source.auth.clone()),
        transform_request: target
            .transform_request
            .clone()
            .or_else(|| source.transform_request.clone()),
        transform_response: target
            .transform_response
            .clone()
            .or_else(|| source.transform_response.clone()),
        cancel_token: target
            .cancel_token
            .clone()
            .or_else(|| source.cancel_token.clone()),
        xsrf_cookie_name: target
            .xsrf_cookie_name
            .clone()
            .or_else(|| source.xsrf_cookie_name.clone()),
        xsrf_header_name: target
            .xsrf_header_name
            .clone()
            .or_else(|| source.xsrf_header_name.clone()),
    }
}
