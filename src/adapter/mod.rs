//! Transport adapters.
//!
//! An adapter performs the actual network operation for one effective
//! config. The pipeline treats it as an opaque async function with a fixed
//! contract:
//!
//! - issue the operation described by the config, honoring `timeout`,
//!   `auth`, `response_type`, params serialization, progress callbacks,
//!   and XSRF header injection when `with_credentials` is set;
//! - reject with the cancellation reason when the config's token resolves
//!   before completion;
//! - reject with a normalized failure (`code` of `"ECONNABORTED"` or
//!   `""`, config and request handle attached) on network error, abort,
//!   or timeout;
//! - on completion, apply [`settle`]: resolve iff the config's
//!   `validate_status` accepts the status (or is absent), otherwise
//!   reject with a status-validation failure carrying the full response.

mod reqwest;

pub use self::reqwest::ReqwestAdapter;

use async_trait::async_trait;

use crate::config::RequestConfig;
use crate::error::{Error, Result};
use crate::response::Response;

/// A transport capable of executing one effective request config.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Executes the request and settles it into a response or a
    /// normalized failure.
    async fn call(&self, config: RequestConfig) -> Result<Response>;
}

/// Read access to a cookie store, consulted for XSRF protection.
pub trait CookieRead: Send + Sync {
    /// Returns the value of the named cookie, if present.
    fn read(&self, name: &str) -> Option<String>;
}

/// The settle step of the transport boundary: validates the response
/// status and splits success from failure.
///
/// Resolves when the config carries no validator or the validator accepts
/// the status; otherwise rejects with
/// `"Request failed with status code N"` carrying the full response.
pub fn settle(response: Response) -> Result<Response> {
    let accepted = response
        .config
        .validate_status
        .as_ref()
        .map_or(true, |validate| validate(response.status));

    if accepted {
        Ok(response)
    } else {
        Err(Error::status(response))
    }
}
