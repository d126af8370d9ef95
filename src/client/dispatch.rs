//! The dispatch step at the center of the interceptor chain.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::adapter::Adapter;
use crate::cancel::CancelToken;
use crate::config::{HeaderConfig, RequestConfig};
use crate::error::{Error, Result};
use crate::helpers::url::{combine_url, is_absolute_url};
use crate::response::Response;
use crate::transform::transform_data;

fn throw_if_cancellation_requested(token: Option<&CancelToken>) -> Result<()> {
    match token {
        Some(token) => token.throw_if_requested(),
        None => Ok(()),
    }
}

/// Resolves the effective adapter, URL, headers, and request body, invokes
/// the transport, and normalizes the outcome.
///
/// Cancellation is checked twice, before the transport is invoked and
/// after it settles, because a cancel call may race the in-flight
/// operation.
#[instrument(
    name = "dispatch",
    skip_all,
    fields(
        method = %config.method.unwrap_or_default(),
        url = %config.url.as_deref().unwrap_or(""),
    )
)]
pub(crate) async fn dispatch_request(
    mut config: RequestConfig,
    default_adapter: &Arc<dyn Adapter>,
) -> Result<Response> {
    // Checkpoint one: a token cancelled with a reason before dispatch
    // short-circuits the transport entirely.
    throw_if_cancellation_requested(config.cancel_token.as_ref())?;

    let adapter = config
        .adapter
        .clone()
        .unwrap_or_else(|| Arc::clone(default_adapter));
    let method = config.method.unwrap_or_default();

    let url = config.url.clone().unwrap_or_default();
    config.url = Some(match &config.base_url {
        Some(base) if !is_absolute_url(&url) => combine_url(base, &url),
        _ => url,
    });

    let mut flat = config.headers.flatten(method);
    let request_fns = config.transform_request.clone().unwrap_or_default();
    let data = transform_data(
        config.data.take().unwrap_or(Value::Null),
        &mut flat,
        &request_fns,
    )?;
    config.data = match data {
        Value::Null => None,
        data => Some(data),
    };
    config.headers = HeaderConfig::from_flat(flat);

    let cancel_token = config.cancel_token.clone();
    let response_fns = config.transform_response.clone().unwrap_or_default();

    match adapter.call(config).await {
        Ok(mut response) => {
            // Checkpoint two: a cancellation that raced the transport wins
            // over the completed response.
            throw_if_cancellation_requested(cancel_token.as_ref())?;

            let mut headers = std::mem::take(&mut response.headers);
            response.data = transform_data(
                std::mem::take(&mut response.data),
                &mut headers,
                &response_fns,
            )?;
            response.headers = headers;
            debug!(status = response.status, "request resolved");
            Ok(response)
        }
        Err(err) => {
            // Cancellation signals pass through untouched.
            if err.is_cancel() {
                return Err(err);
            }
            // A late cancellation wins over the transport's own failure.
            throw_if_cancellation_requested(cancel_token.as_ref())?;

            let err = match err {
                Error::Request(mut details) => {
                    // Best effort: a failure response body gets the same
                    // transforms as a success body; the original body is
                    // kept when a transform fails.
                    if let Some(response) = details.response.as_mut() {
                        let mut headers = std::mem::take(&mut response.headers);
                        if let Ok(data) =
                            transform_data(response.data.clone(), &mut headers, &response_fns)
                        {
                            response.data = data;
                        }
                        response.headers = headers;
                    }
                    Error::Request(details)
                }
                other => other,
            };
            debug!(error = %err, "request rejected");
            Err(err)
        }
    }
}
