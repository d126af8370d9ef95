use serde_json::Value;
use std::future::Future;
use tracing::debug;

use super::builder::Client;
use super::dispatch::dispatch_request;
use crate::config::{merge, Method, RequestConfig};
use crate::error::Result;
use crate::interceptor::InterceptorPair;
use crate::response::Response;

async fn step<T>(pair: &InterceptorPair<T>, state: Result<T>) -> Result<T> {
    match state {
        Ok(value) => match &pair.fulfilled {
            Some(fulfilled) => fulfilled(value).await,
            None => Ok(value),
        },
        Err(err) => match &pair.rejected {
            Some(rejected) => rejected(err).await,
            None => Err(err),
        },
    }
}

impl Client {
    /// Runs one request through the full pipeline.
    ///
    /// The effective config is the instance defaults deep-merged with
    /// `config` (method defaulting to `GET`). The interceptor registries
    /// are snapshot when the chain is built: handlers registered after
    /// this call starts do not affect it.
    pub async fn request(&self, config: RequestConfig) -> Result<Response> {
        let mut effective = merge(&self.defaults, &config);
        effective.method = Some(effective.method.unwrap_or_default());
        debug!(
            method = %effective.method.unwrap_or_default(),
            url = %effective.url.as_deref().unwrap_or(""),
            "running request chain"
        );

        let request_pairs = self.interceptors.request.snapshot();
        let response_pairs = self.interceptors.response.snapshot();

        // Most recently registered request interceptor runs first,
        // closest to the caller.
        let mut state: Result<RequestConfig> = Ok(effective);
        for pair in request_pairs.iter().rev() {
            state = step(pair, state).await;
        }

        let mut result: Result<Response> = match state {
            Ok(config) => dispatch_request(config, &self.adapter).await,
            Err(err) => Err(err),
        };

        for pair in &response_pairs {
            result = step(pair, result).await;
        }
        result
    }

    async fn request_without_data(
        &self,
        method: Method,
        url: &str,
        config: Option<RequestConfig>,
    ) -> Result<Response> {
        let mut config = config.unwrap_or_default();
        config.method = Some(method);
        config.url = Some(url.to_string());
        self.request(config).await
    }

    async fn request_with_data(
        &self,
        method: Method,
        url: &str,
        data: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<Response> {
        let mut config = config.unwrap_or_default();
        config.method = Some(method);
        config.url = Some(url.to_string());
        if data.is_some() {
            config.data = data;
        }
        self.request(config).await
    }

    /// Executes a GET request.
    pub async fn get(&self, url: &str, config: Option<RequestConfig>) -> Result<Response> {
        self.request_without_data(Method::Get, url, config).await
    }

    /// Executes a DELETE request.
    pub async fn delete(&self, url: &str, config: Option<RequestConfig>) -> Result<Response> {
        self.request_without_data(Method::Delete, url, config).await
    }

    /// Executes a HEAD request.
    pub async fn head(&self, url: &str, config: Option<RequestConfig>) -> Result<Response> {
        self.request_without_data(Method::Head, url, config).await
    }

    /// Executes an OPTIONS request.
    pub async fn options(&self, url: &str, config: Option<RequestConfig>) -> Result<Response> {
        self.request_without_data(Method::Options, url, config).await
    }

    /// Executes a POST request with an optional body.
    pub async fn post(
        &self,
        url: &str,
        data: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<Response> {
        self.request_with_data(Method::Post, url, data, config).await
    }

    /// Executes a PUT request with an optional body.
    pub async fn put(
        &self,
        url: &str,
        data: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<Response> {
        self.request_with_data(Method::Put, url, data, config).await
    }

    /// Executes a PATCH request with an optional body.
    pub async fn patch(
        &self,
        url: &str,
        data: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<Response> {
        self.request_with_data(Method::Patch, url, data, config).await
    }
}

/// Awaits a set of request futures, resolving with every value or with
/// the first failure.
pub async fn all<T, F>(requests: impl IntoIterator<Item = F>) -> Result<Vec<T>>
where
    F: Future<Output = Result<T>>,
{
    futures_util::future::try_join_all(requests).await
}
