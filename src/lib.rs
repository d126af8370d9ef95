//! # courier
//!
//! An interceptor-driven HTTP request client: requests are described by a
//! [`RequestConfig`], transformed through a configurable pipeline, executed
//! by a pluggable transport [`Adapter`], and settled into a normalized
//! [`Response`] or [`Error`].
//!
//! # Features
//!
//! - **Interceptors**: ordered fulfill/reject handler pairs around every
//!   dispatch, with stable handles and snapshot-at-call-time semantics
//! - **Config merging**: per-call configs deep-merged from immutable
//!   instance defaults, with no shared mutable state between calls
//! - **Transforms**: ordered request/response body transform chains with
//!   shared header access
//! - **Cancellation**: cooperative one-shot tokens raced by the transport
//! - **Errors**: tagged failure kinds with the effective config attached
//!
//! # Example
//!
//! ```rust,no_run
//! use courier::prelude::*;
//!
//! # async fn example() -> courier::error::Result<()> {
//! let client = Client::builder()
//!     .defaults(RequestConfig::new().base_url("https://api.example.com"))
//!     .build()
//!     .expect("transport initializes");
//!
//! client.interceptors().request.add(
//!     InterceptorPair::new().on_fulfilled(|config: RequestConfig| async move {
//!         Ok(config.header("X-Request-Id", "abc123"))
//!     }),
//! );
//!
//! let response = client.get("/users", None).await?;
//! println!("{} {}", response.status, response.data);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

// Re-exports of external dependencies
pub use serde_json;

// Core modules
pub mod adapter;
pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod interceptor;
pub mod logging;
pub mod response;
pub mod transform;

// Re-exports of core types for convenience
pub use adapter::{settle, Adapter, CookieRead, ReqwestAdapter};
pub use cancel::{is_cancel, CancelReason, CancelSource, CancelToken, Canceler};
pub use client::{all, Client, ClientBuilder, Interceptors};
pub use config::{
    merge, BasicAuth, HeaderBucket, HeaderConfig, InvalidMethod, Method, ProgressEvent,
    RequestConfig, ResponseType,
};
pub use error::{BuildError, Error, ErrorKind, RequestErrorDetails, Result};
pub use interceptor::{InterceptorManager, InterceptorPair};
pub use response::{RequestHandle, Response};
pub use transform::{transform_data, BodyTransformer};

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```rust
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adapter::{Adapter, CookieRead, ReqwestAdapter};
    pub use crate::cancel::{is_cancel, CancelReason, CancelSource, CancelToken, Canceler};
    pub use crate::client::{all, Client, ClientBuilder, Interceptors};
    pub use crate::config::{
        BasicAuth, HeaderBucket, HeaderConfig, Method, ProgressEvent, RequestConfig, ResponseType,
    };
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::interceptor::{InterceptorManager, InterceptorPair};
    pub use crate::logging::{init_logging, try_init_logging, LogConfig, LogFormat, LogLevel};
    pub use crate::response::{RequestHandle, Response};
    pub use crate::transform::{transform_data, BodyTransformer};
    pub use serde_json::{json, Value};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
