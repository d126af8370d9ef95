//! Response model.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{HeaderBucket, Method, RequestConfig};

/// Lightweight description of the request the transport actually issued,
/// attached to responses and failures for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestHandle {
    /// The method sent on the wire.
    pub method: Method,
    /// The final URL, query string included.
    pub url: String,
}

/// A settled HTTP response.
///
/// Carries the effective config that produced it by reference, so callers
/// can introspect the request without re-deriving it.
#[derive(Debug, Clone)]
pub struct Response {
    /// Response body, after the adapter's decoding and (once the pipeline
    /// completes) the response transforms.
    pub data: Value,
    /// HTTP status code.
    pub status: u16,
    /// Status reason phrase.
    pub status_text: String,
    /// Response headers: lower-cased names, duplicates folded, with
    /// `set-cookie` collected into an array.
    pub headers: HeaderBucket,
    /// The effective config of the call that produced this response.
    pub config: Arc<RequestConfig>,
    /// The request the transport issued.
    pub request: Option<RequestHandle>,
}
