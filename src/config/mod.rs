//! Request configuration.
//!
//! A [`RequestConfig`] describes one logical request: target, method,
//! header buckets, body, transforms, cancellation, and the knobs the
//! transport adapter honors. Configs are combined with [`merge`] (instance
//! defaults + call-site overrides) into a fresh effective config owned
//! exclusively by that call's chain; no merge or flatten step mutates a
//! config still owned by a prior caller.
//!
//! # Example
//!
//! ```rust
//! use courier::config::{Method, RequestConfig};
//! use std::time::Duration;
//!
//! let config = RequestConfig::new()
//!     .method(Method::Post)
//!     .url("/users")
//!     .header("Authorization", "Bearer token")
//!     .timeout(Duration::from_secs(5));
//! assert_eq!(config.method, Some(Method::Post));
//! ```

pub mod headers;
pub mod merge;


use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::adapter::Adapter;
use crate::cancel::CancelToken;
use crate::transform::BodyTransformer;

pub use headers::{HeaderBucket, HeaderConfig};
pub use merge::{merge, merge_json};

/// The closed set of supported HTTP methods.
///
/// Replaces free-form method strings: header buckets and verb helpers are
/// keyed by this enum, so unknown methods are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// GET, the default when a config leaves the method unset.
    #[default]
    Get,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
}

impl Method {
    /// All supported methods, in a stable order.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Delete,
        Method::Head,
        Method::Options,
        Method::Post,
        Method::Put,
        Method::Patch,
    ];

    /// Lowercase name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a method string is outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid HTTP method: {0}")]
pub struct InvalidMethod(pub String);

impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidMethod(s.to_string()))
    }
}

/// Basic-auth credentials injected by the transport adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    /// User name.
    pub username: String,
    /// Password, if any.
    pub password: Option<String>,
}

impl BasicAuth {
    /// Creates basic-auth credentials.
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// How the adapter decodes the response body before the response
/// transforms run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Body delivered as a string; the default response transform will
    /// still attempt a JSON parse.
    #[default]
    Text,
    /// Body parsed as JSON by the adapter, falling back to a string when
    /// parsing fails.
    Json,
}

/// Progress of an upload or download, reported by the transport adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Bytes transferred so far.
    pub loaded: u64,
    /// Total bytes when known up front.
    pub total: Option<u64>,
}

/// Decides whether a status code settles as success.
pub type StatusValidator = Arc<dyn Fn(u16) -> bool + Send + Sync>;

/// Caller-supplied replacement for the built-in query serialization.
pub type ParamsSerializer = Arc<dyn Fn(&Map<String, Value>) -> String + Send + Sync>;

/// Observer for upload/download progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Configuration for one logical request.
///
/// Unset (`None`) fields inherit from the other operand during a
/// [`merge`]; the flattened per-request state is produced by the
/// dispatcher without touching the original.
#[derive(Clone, Default)]
pub struct RequestConfig {
    /// Request URL, absolute or relative to `base_url`.
    pub url: Option<String>,
    /// HTTP method; `GET` when left unset.
    pub method: Option<Method>,
    /// Base URL prepended to relative request URLs.
    pub base_url: Option<String>,
    /// Header buckets (common / per-method / per-request).
    pub headers: HeaderConfig,
    /// Query parameters appended to the URL by the adapter.
    pub params: Option<Map<String, Value>>,
    /// Request body, fed through the request transforms.
    pub data: Option<Value>,
    /// Transport-level timeout; `None` disables the timer.
    pub timeout: Option<Duration>,
    /// Enables credentialed requests and XSRF header injection.
    pub with_credentials: Option<bool>,
    /// Response body decoding mode.
    pub response_type: Option<ResponseType>,
    /// Custom query serializer.
    pub params_serializer: Option<ParamsSerializer>,
    /// Upload progress observer.
    pub on_upload_progress: Option<ProgressCallback>,
    /// Download progress observer.
    pub on_download_progress: Option<ProgressCallback>,
    /// Status validation applied by the transport's settle step. When
    /// absent, every completed response settles as success.
    pub validate_status: Option<StatusValidator>,
    /// Per-call transport adapter override.
    pub adapter: Option<Arc<dyn Adapter>>,
    /// Basic-auth credentials.
    pub auth: Option<BasicAuth>,
    /// Ordered request body transforms.
    pub transform_request: Option<Vec<BodyTransformer>>,
    /// Ordered response body transforms.
    pub transform_response: Option<Vec<BodyTransformer>>,
    /// Cancellation token for this request.
    pub cancel_token: Option<CancelToken>,
    /// Cookie read for XSRF protection.
    pub xsrf_cookie_name: Option<String>,
    /// Header the XSRF cookie value is written to.
    pub xsrf_header_name: Option<String>,
}

impl RequestConfig {
    /// Creates an empty config; every field inherits during a merge.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock defaults a fresh client starts from: `Accept` header,
    /// urlencoded `Content-Type` buckets for body-bearing methods, default
    /// transforms, 2xx status validation, and the conventional XSRF names.
    pub fn defaults() -> Self {
        let mut headers = HeaderConfig::default();
        headers.common.insert(
            "Accept".to_string(),
            Value::String("application/json, text/plain, */*".to_string()),
        );
        for method in [Method::Post, Method::Put, Method::Patch] {
            headers.for_method_mut(method).insert(
                "Content-Type".to_string(),
                Value::String("application/x-www-form-urlencoded".to_string()),
            );
        }

        Self {
            headers,
            validate_status: Some(Arc::new(|status| (200..300).contains(&status))),
            transform_request: Some(crate::transform::default_request_transforms()),
            transform_response: Some(crate::transform::default_response_transforms()),
            xsrf_cookie_name: Some("XSRF-TOKEN".to_string()),
            xsrf_header_name: Some("X-XSRF-TOKEN".to_string()),
            ..Self::default()
        }
    }

    /// Sets the request URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a per-request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.direct.insert(name.into(), value.into());
        self
    }

    /// Sets a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the request body.
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables or disables credentialed requests.
    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = Some(enabled);
        self
    }

    /// Sets the response body decoding mode.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Sets a custom query serializer.
    pub fn params_serializer(
        mut self,
        serializer: impl Fn(&Map<String, Value>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.params_serializer = Some(Arc::new(serializer));
        self
    }

    /// Sets the upload progress observer.
    pub fn on_upload_progress(
        mut self,
        callback: impl Fn(ProgressEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_upload_progress = Some(Arc::new(callback));
        self
    }

    /// Sets the download progress observer.
    pub fn on_download_progress(
        mut self,
        callback: impl Fn(ProgressEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_download_progress = Some(Arc::new(callback));
        self
    }

    /// Sets the settle-step status validator.
    pub fn validate_status(
        mut self,
        validate: impl Fn(u16) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validate_status = Some(Arc::new(validate));
        self
    }

    /// Sets a per-call transport adapter.
    pub fn adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Sets basic-auth credentials.
    pub fn auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Replaces the request body transforms.
    pub fn transform_request(mut self, transforms: Vec<BodyTransformer>) -> Self {
        self.transform_request = Some(transforms);
        self
    }

    /// Replaces the response body transforms.
    pub fn transform_response(mut self, transforms: Vec<BodyTransformer>) -> Self {
        self.transform_response = Some(transforms);
        self
    }

    /// Attaches a cancellation token.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Sets the cookie consulted for XSRF protection.
    pub fn xsrf_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.xsrf_cookie_name = Some(name.into());
        self
    }

    /// Sets the header the XSRF cookie value is written to.
    pub fn xsrf_header_name(mut self, name: impl Into<String>) -> Self {
        self.xsrf_header_name = Some(name.into());
        self
    }

    /// Serializable summary of the data-bearing fields, used by error
    /// reports. Callback and adapter fields are omitted.
    pub fn describe(&self) -> Value {
        json!({
            "url": self.url,
            "method": self.method,
            "base_url": self.base_url,
            "headers": self.headers,
            "params": self.params,
            "timeout_ms": self.timeout.map(|t| t.as_millis() as u64),
            "with_credentials": self.with_credentials,
            "response_type": self.response_type,
        })
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("data", &self.data)
            .field("timeout", &self.timeout)
            .field("with_credentials", &self.with_credentials)
            .field("response_type", &self.response_type)
            .field("auth", &self.auth.as_ref().map(|auth| auth.username.as_str()))
            .field(
                "transform_request",
                &self.transform_request.as_ref().map(Vec::len),
            )
            .field(
                "transform_response",
                &self.transform_response.as_ref().map(Vec::len),
            )
            .field("has_adapter", &self.adapter.is_some())
            .field("has_cancel_token", &self.cancel_token.is_some())
            .field("has_validate_status", &self.validate_status.is_some())
            .finish()
    }
}
