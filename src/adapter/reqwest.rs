//! reqwest-backed transport adapter.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{settle, Adapter, CookieRead};
use crate::config::{
    HeaderBucket, Method, ProgressCallback, ProgressEvent, RequestConfig, ResponseType,
};
use crate::error::{BuildError, Error, Result};
use crate::helpers::headers::append_header_value;
use crate::helpers::url::build_url;
use crate::response::{RequestHandle, Response};

/// Transport adapter executing requests through a shared
/// [`reqwest::Client`].
///
/// Honors the full adapter contract: per-request timeout (the whole
/// operation, send and body read, is bounded by one timer), basic auth,
/// XSRF header injection from an attached cookie store, query
/// serialization, upload/download progress reporting, cancellation racing,
/// and status settling.
#[derive(Clone)]
pub struct ReqwestAdapter {
    client: reqwest::Client,
    cookies: Option<Arc<dyn CookieRead>>,
}

impl ReqwestAdapter {
    /// Creates an adapter with a stock client.
    pub fn new() -> std::result::Result<Self, BuildError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!("courier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| BuildError::Transport(Box::new(err)))?;
        Ok(Self {
            client,
            cookies: None,
        })
    }

    /// Creates an adapter around a caller-configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            cookies: None,
        }
    }

    /// Attaches a cookie store, enabling XSRF header injection for
    /// credentialed requests.
    #[must_use]
    pub fn cookie_store(mut self, cookies: Arc<dyn CookieRead>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    async fn execute(
        &self,
        config: Arc<RequestConfig>,
        method: Method,
        url: String,
        handle: RequestHandle,
    ) -> Result<Response> {
        let mut flat = config.headers.flatten(method);

        if config.with_credentials.unwrap_or(false) {
            if let (Some(store), Some(cookie), Some(header)) = (
                self.cookies.as_ref(),
                config.xsrf_cookie_name.as_deref(),
                config.xsrf_header_name.as_deref(),
            ) {
                if let Some(value) = store.read(cookie) {
                    flat.insert(header.to_string(), Value::String(value));
                }
            }
        }

        let mut request = self
            .client
            .request(to_reqwest_method(method), &url)
            .headers(bucket_to_header_map(&flat, config.data.is_none()));

        if let Some(auth) = &config.auth {
            request = request.basic_auth(&auth.username, auth.password.as_deref());
        }

        if let Some(data) = &config.data {
            let body = match data {
                Value::String(text) => text.clone().into_bytes(),
                other => serde_json::to_vec(other)?,
            };
            request = match &config.on_upload_progress {
                Some(callback) => request.body(progress_body(body, Arc::clone(callback))),
                None => request.body(body),
            };
        }

        let response = request.send().await.map_err(|err| {
            warn!(error = %err, "transport send failed");
            Error::network(
                format!("Network Error: {err}"),
                Arc::clone(&config),
                Some(handle.clone()),
            )
        })?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let headers = headers_to_bucket(response.headers());
        let total = response.content_length();

        let mut stream = response.bytes_stream();
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| {
                warn!(error = %err, "response body read aborted");
                Error::abort(
                    "Request aborted".to_string(),
                    Arc::clone(&config),
                    Some(handle.clone()),
                )
            })?;
            body.extend_from_slice(&chunk);
            if let Some(callback) = &config.on_download_progress {
                callback(ProgressEvent {
                    loaded: body.len() as u64,
                    total,
                });
            }
        }

        debug!(
            status = status.as_u16(),
            body_length = body.len(),
            "transport completed"
        );

        settle(Response {
            data: decode_body(&body, config.response_type.unwrap_or_default()),
            status: status.as_u16(),
            status_text,
            headers,
            config: Arc::clone(&config),
            request: Some(handle),
        })
    }
}

#[async_trait]
impl Adapter for ReqwestAdapter {
    #[instrument(
        name = "http_transport",
        skip_all,
        fields(method = %config.method.unwrap_or_default(), url = tracing::field::Empty)
    )]
    async fn call(&self, config: RequestConfig) -> Result<Response> {
        let config = Arc::new(config);
        let method = config.method.unwrap_or_default();
        let url = build_url(
            config.url.as_deref().unwrap_or(""),
            config.params.as_ref(),
            config.params_serializer.as_ref(),
        );
        tracing::Span::current().record("url", url.as_str());
        let handle = RequestHandle {
            method,
            url: url.clone(),
        };

        let work = async {
            match config.timeout {
                Some(timeout) if !timeout.is_zero() => {
                    let operation =
                        self.execute(Arc::clone(&config), method, url, handle.clone());
                    match tokio::time::timeout(timeout, operation).await {
                        Ok(result) => result,
                        Err(_elapsed) => {
                            warn!(timeout_ms = %timeout.as_millis(), "transport timed out");
                            Err(Error::timeout(
                                format!("timeout of {}ms exceeded", timeout.as_millis()),
                                Arc::clone(&config),
                                Some(handle.clone()),
                            ))
                        }
                    }
                }
                _ => {
                    self.execute(Arc::clone(&config), method, url, handle.clone())
                        .await
                }
            }
        };

        match config.cancel_token.clone() {
            Some(token) => {
                tokio::select! {
                    reason = token.cancelled() => Err(Error::cancelled(reason)),
                    result = work => result,
                }
            }
            None => work.await,
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
    }
}

fn bucket_to_header_map(bucket: &HeaderBucket, strip_content_type: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in bucket {
        // A content type makes no sense without a body.
        if strip_content_type && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        let Some(value) = value.as_str() else { continue };
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "skipping invalid header"),
        }
    }
    headers
}

fn headers_to_bucket(headers: &HeaderMap) -> HeaderBucket {
    let mut bucket = HeaderBucket::new();
    for (name, value) in headers {
        append_header_value(
            &mut bucket,
            name.as_str().to_string(),
            value.to_str().unwrap_or("").to_string(),
        );
    }
    bucket
}

fn progress_body(body: Vec<u8>, callback: ProgressCallback) -> reqwest::Body {
    const CHUNK_SIZE: usize = 16 * 1024;

    let total = body.len() as u64;
    let chunks: Vec<Bytes> = body.chunks(CHUNK_SIZE).map(Bytes::copy_from_slice).collect();
    let mut loaded: u64 = 0;
    let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        loaded += chunk.len() as u64;
        callback(ProgressEvent {
            loaded,
            total: Some(total),
        });
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    reqwest::Body::wrap_stream(stream)
}

fn decode_body(body: &[u8], response_type: ResponseType) -> Value {
    match response_type {
        ResponseType::Json => serde_json::from_slice(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
        ResponseType::Text => Value::String(String::from_utf8_lossy(body).into_owned()),
    }
}
