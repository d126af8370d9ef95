//! Cooperative request cancellation.
//!
//! A [`CancelToken`] is a one-shot, observable cancellation signal shared
//! across a single logical request. The token side is handed to the request
//! config; the [`Canceler`] side is kept by whoever may abort the request.
//! Cancellation is cooperative: the pipeline observes the token at its
//! checkpoints and the transport adapter races the token's signal against
//! the in-flight operation.
//!
//! # Example
//!
//! ```rust
//! use courier::cancel::CancelToken;
//!
//! let source = CancelToken::source();
//! let token = source.token.clone();
//!
//! source.cancel.cancel(Some("operation superseded"));
//! assert_eq!(token.reason().unwrap().message, "operation superseded");
//! assert!(token.throw_if_requested().is_err());
//! ```

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken as SignalToken;

use crate::error::{Error, Result};

/// The payload carried by a resolved cancellation, distinguishing
/// cancellation from transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelReason {
    /// Human-readable description supplied to the cancel call.
    pub message: String,
}

impl CancelReason {
    /// Creates a reason from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cancel: {}", self.message)
    }
}

#[derive(Debug)]
struct Inner {
    signal: SignalToken,
    reason: Mutex<Option<CancelReason>>,
}

/// One-shot observable cancellation signal for a single logical request.
///
/// Wraps at most one [`CancelReason`], created by the first cancel call
/// that carries a message. Once a reason exists, further cancel calls are
/// no-ops. Cancelling without a message resolves the signal while leaving
/// the reason unset; `throw_if_requested` then stays quiet even though
/// observers of [`CancelToken::cancelled`] are woken. This mirrors the
/// behavior callers of the original client depend on.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

/// The cancelling side of a [`CancelToken`].
#[derive(Debug, Clone)]
pub struct Canceler {
    inner: Arc<Inner>,
}

/// A token together with its cancel handle, as returned by
/// [`CancelToken::source`].
#[derive(Debug)]
pub struct CancelSource {
    /// The observable token, to be placed in a request config.
    pub token: CancelToken,
    /// The handle that cancels the token.
    pub cancel: Canceler,
}

impl CancelToken {
    /// Creates a token, running `executor` synchronously with the
    /// [`Canceler`] so the caller can capture it for later invocation.
    pub fn new(executor: impl FnOnce(Canceler)) -> Self {
        let inner = Arc::new(Inner {
            signal: SignalToken::new(),
            reason: Mutex::new(None),
        });
        executor(Canceler {
            inner: Arc::clone(&inner),
        });
        Self { inner }
    }

    /// Convenience constructor returning the token together with its
    /// cancel handle.
    pub fn source() -> CancelSource {
        let mut captured = None;
        let token = Self::new(|cancel| captured = Some(cancel));
        CancelSource {
            token,
            cancel: captured.expect("executor runs synchronously"),
        }
    }

    /// Returns the stored reason, if a cancel call has produced one.
    pub fn reason(&self) -> Option<CancelReason> {
        self.inner.reason.lock().clone()
    }

    /// Returns an error carrying the stored reason if one exists.
    pub fn throw_if_requested(&self) -> Result<()> {
        match self.reason() {
            Some(reason) => Err(Error::cancelled(Some(reason))),
            None => Ok(()),
        }
    }

    /// Resolves once the token is cancelled, with the reason if one was
    /// recorded. Resolves immediately when already cancelled; never errors.
    pub async fn cancelled(&self) -> Option<CancelReason> {
        self.inner.signal.cancelled().await;
        self.reason()
    }

    /// Whether the signal has been resolved (with or without a reason).
    pub fn is_cancelled(&self) -> bool {
        self.inner.signal.is_cancelled()
    }
}

impl Canceler {
    /// Cancels the associated token.
    ///
    /// The first call that supplies a message records the reason; calls
    /// after a reason exists are no-ops. A `None` message resolves the
    /// signal without recording a reason.
    pub fn cancel(&self, message: Option<&str>) {
        {
            let mut reason = self.inner.reason.lock();
            if reason.is_some() {
                return;
            }
            if let Some(message) = message {
                *reason = Some(CancelReason::new(message));
            }
        }
        self.inner.signal.cancel();
    }
}

/// Returns `true` when the error is a cancellation, as opposed to a
/// transport or pipeline failure.
pub fn is_cancel(error: &Error) -> bool {
    matches!(error, Error::Cancelled(_))
}
