//! Error handling for the request pipeline.
//!
//! Failures are tagged so downstream code can branch exhaustively instead
//! of probing optional fields:
//!
//! - [`Error::Cancelled`]: the request was cancelled through a
//!   [`CancelToken`](crate::cancel::CancelToken). Deliberately plain (no
//!   attached config/response) and recognized by
//!   [`is_cancel`](crate::cancel::is_cancel), so cancellation is never
//!   mistaken for a transport failure.
//! - [`Error::Request`]: a normalized transport failure. Carries an
//!   [`ErrorKind`], the effective config that produced it, an optional
//!   response and request handle, and the wire-level `code`
//!   (`"ECONNABORTED"` for timeouts and aborts, `""` for network errors).
//! - [`Error::Pipeline`]: a failure raised inside user-supplied pipeline
//!   stages (interceptors, transformers) or while preparing a request body.
//!
//! Details of `Request` errors are boxed to keep the enum small, and
//! expose a [`to_json`](RequestErrorDetails::to_json) serialization that
//! excludes the response and request handle but keeps `message`, `name`,
//! `config`, and `code`.
//!
//! # Example
//!
//! ```rust,no_run
//! use courier::error::{Error, ErrorKind};
//!
//! fn describe(err: &Error) -> &'static str {
//!     match err {
//!         Error::Cancelled(_) => "cancelled",
//!         Error::Request(details) => match details.kind {
//!             ErrorKind::Network => "network failure",
//!             ErrorKind::Timeout => "timed out",
//!             ErrorKind::Abort => "aborted",
//!             ErrorKind::StatusValidation => "bad status",
//!         },
//!         Error::Pipeline(_) => "pipeline stage failed",
//!         _ => "unknown",
//!     }
//! }
//! ```

mod details;

use std::borrow::Cow;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error as ThisError;

use crate::cancel::CancelReason;
use crate::config::RequestConfig;
use crate::response::{RequestHandle, Response};

pub use details::{ErrorKind, RequestErrorDetails};

/// Result type alias for all pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

fn cancel_display(reason: &Option<CancelReason>) -> String {
    reason
        .as_ref()
        .map_or_else(|| "Request cancelled".to_string(), ToString::to_string)
}

/// The primary error type of the crate.
#[derive(ThisError, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request was cancelled. Carries the reason when the cancel call
    /// supplied a message.
    #[error("{}", cancel_display(.0))]
    Cancelled(Option<CancelReason>),

    /// A normalized transport failure. Boxed to keep the enum small.
    #[error("{0}")]
    Request(Box<RequestErrorDetails>),

    /// A failure raised inside a pipeline stage.
    #[error("{0}")]
    Pipeline(Cow<'static, str>),
}

impl Error {
    /// Creates a cancellation error.
    pub fn cancelled(reason: Option<CancelReason>) -> Self {
        Self::Cancelled(reason)
    }

    /// Creates a network error (`code = ""`).
    pub fn network(
        message: impl Into<String>,
        config: Arc<RequestConfig>,
        request: Option<RequestHandle>,
    ) -> Self {
        Self::Request(Box::new(RequestErrorDetails {
            kind: ErrorKind::Network,
            message: message.into(),
            code: Some(Cow::Borrowed("")),
            config,
            response: None,
            request,
        }))
    }

    /// Creates a timeout error (`code = "ECONNABORTED"`).
    pub fn timeout(
        message: impl Into<String>,
        config: Arc<RequestConfig>,
        request: Option<RequestHandle>,
    ) -> Self {
        Self::Request(Box::new(RequestErrorDetails {
            kind: ErrorKind::Timeout,
            message: message.into(),
            code: Some(Cow::Borrowed("ECONNABORTED")),
            config,
            response: None,
            request,
        }))
    }

    /// Creates an abort error (`code = "ECONNABORTED"`).
    pub fn abort(
        message: impl Into<String>,
        config: Arc<RequestConfig>,
        request: Option<RequestHandle>,
    ) -> Self {
        Self::Request(Box::new(RequestErrorDetails {
            kind: ErrorKind::Abort,
            message: message.into(),
            code: Some(Cow::Borrowed("ECONNABORTED")),
            config,
            response: None,
            request,
        }))
    }

    /// Creates a status-validation error carrying the full response.
    ///
    /// The message is the contractually fixed
    /// `"Request failed with status code N"`.
    pub fn status(response: Response) -> Self {
        Self::Request(Box::new(RequestErrorDetails {
            kind: ErrorKind::StatusValidation,
            message: format!("Request failed with status code {}", response.status),
            code: None,
            config: Arc::clone(&response.config),
            request: response.request.clone(),
            response: Some(response),
        }))
    }

    /// Creates a pipeline-stage error.
    /// Accepts both `&'static str` (zero allocation) and `String`.
    pub fn pipeline(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Pipeline(message.into())
    }

    /// Whether this error is a cancellation.
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns the cancellation reason, when this is a cancellation that
    /// recorded one.
    pub fn cancel_reason(&self) -> Option<&CancelReason> {
        match self {
            Self::Cancelled(reason) => reason.as_ref(),
            _ => None,
        }
    }

    /// Returns the transport failure details, when present.
    pub fn as_request(&self) -> Option<&RequestErrorDetails> {
        match self {
            Self::Request(details) => Some(details),
            _ => None,
        }
    }

    /// Returns the transport failure kind, when present.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_request().map(|details| details.kind)
    }

    /// Returns the wire-level code, when present.
    pub fn code(&self) -> Option<&str> {
        self.as_request()
            .and_then(|details| details.code.as_deref())
    }

    /// Returns the response attached to the failure, when present.
    pub fn response(&self) -> Option<&Response> {
        self.as_request()
            .and_then(|details| details.response.as_ref())
    }

    /// Returns the effective config that produced the failure, when
    /// present.
    pub fn config(&self) -> Option<&Arc<RequestConfig>> {
        self.as_request().map(|details| &details.config)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Pipeline(Cow::Owned(format!("serialization failed: {err}")))
    }
}

/// Errors raised while constructing a client or adapter, before any
/// request exists.
#[derive(ThisError, Debug)]
#[non_exhaustive]
pub enum BuildError {
    /// The underlying transport could not be initialized.
    #[error("failed to initialize transport: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync + 'static>),
}
