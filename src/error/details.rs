//! Detail structure for normalized transport failures.

use serde_json::{json, Value};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::config::RequestConfig;
use crate::response::{RequestHandle, Response};

/// The enumerated kinds of transport failure.
///
/// Deliberately not `#[non_exhaustive]`: the set is part of the pipeline
/// contract and callers are expected to branch on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation failed below the HTTP layer (DNS, connect, TLS).
    Network,
    /// The configured timeout elapsed before the transport settled.
    Timeout,
    /// The in-flight transfer was aborted before completing.
    Abort,
    /// The response status was rejected by `validate_status`.
    StatusValidation,
}

impl ErrorKind {
    /// The kind's name as used in serialized error reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Network => "NetworkError",
            Self::Timeout => "TimeoutError",
            Self::Abort => "AbortError",
            Self::StatusValidation => "StatusValidationError",
        }
    }
}

/// Details of a normalized transport failure.
///
/// Extracted to a separate struct and boxed to keep the error enum small.
#[derive(Debug)]
pub struct RequestErrorDetails {
    /// What failed.
    pub kind: ErrorKind,
    /// Descriptive message.
    pub message: String,
    /// Wire-level code: `"ECONNABORTED"` for timeouts and aborts, `""` for
    /// network errors, absent for status validation.
    pub code: Option<Cow<'static, str>>,
    /// The effective config that produced the failure.
    pub config: Arc<RequestConfig>,
    /// The response, when the failure happened after one was received.
    pub response: Option<Response>,
    /// Handle describing the issued request, when one was issued.
    pub request: Option<RequestHandle>,
}

impl RequestErrorDetails {
    /// Serializes the failure for reporting.
    ///
    /// The attached response and request handle are excluded; `message`,
    /// `name`, `config`, and `code` are included.
    pub fn to_json(&self) -> Value {
        json!({
            "message": self.message,
            "name": self.kind.name(),
            "config": self.config.describe(),
            "code": self.code,
        })
    }
}

impl fmt::Display for RequestErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
