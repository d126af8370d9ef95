use std::fmt;
use std::sync::Arc;

use crate::adapter::{Adapter, ReqwestAdapter};
use crate::config::{merge, RequestConfig};
use crate::error::BuildError;
use crate::interceptor::InterceptorManager;
use crate::response::Response;

/// The request- and response-phase interceptor registries of a client.
#[derive(Default)]
pub struct Interceptors {
    /// Runs before dispatch, most recently registered first.
    pub request: InterceptorManager<RequestConfig>,
    /// Runs after dispatch, in registration order.
    pub response: InterceptorManager<Response>,
}

/// An HTTP request client.
///
/// Cheap to clone; clones share the same defaults, adapter, and
/// interceptor registries.
#[derive(Clone)]
pub struct Client {
    pub(crate) defaults: Arc<RequestConfig>,
    pub(crate) adapter: Arc<dyn Adapter>,
    pub(crate) interceptors: Arc<Interceptors>,
}

impl Client {
    /// Creates a client with stock defaults and the bundled reqwest
    /// adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport cannot be initialized.
    pub fn new() -> Result<Self, BuildError> {
        Self::builder().build()
    }

    /// Creates a builder for customizing defaults and the adapter.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The immutable instance defaults merged into every call.
    pub fn defaults(&self) -> &RequestConfig {
        &self.defaults
    }

    /// The interceptor registries of this client.
    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Creates a new client whose defaults are this client's defaults
    /// deep-merged with `instance_config`. The new client shares the
    /// adapter but starts with fresh interceptor registries.
    pub fn create(&self, instance_config: RequestConfig) -> Client {
        Client {
            defaults: Arc::new(merge(&self.defaults, &instance_config)),
            adapter: Arc::clone(&self.adapter),
            interceptors: Arc::new(Interceptors::default()),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("defaults", &self.defaults)
            .field("request_interceptors", &self.interceptors.request.len())
            .field("response_interceptors", &self.interceptors.response.len())
            .finish()
    }
}

/// Fluent builder for [`Client`].
pub struct ClientBuilder {
    defaults: RequestConfig,
    adapter: Option<Arc<dyn Adapter>>,
}

impl ClientBuilder {
    /// Creates a builder seeded with [`RequestConfig::defaults`].
    pub fn new() -> Self {
        Self {
            defaults: RequestConfig::defaults(),
            adapter: None,
        }
    }

    /// Deep-merges `config` over the accumulated defaults.
    #[must_use]
    pub fn defaults(mut self, config: RequestConfig) -> Self {
        self.defaults = merge(&self.defaults, &config);
        self
    }

    /// Replaces the transport adapter.
    #[must_use]
    pub fn adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Builds the client, falling back to the bundled reqwest adapter
    /// when none was provided.
    ///
    /// # Errors
    ///
    /// Returns an error when the bundled transport cannot be initialized.
    pub fn build(self) -> Result<Client, BuildError> {
        let adapter: Arc<dyn Adapter> = match self.adapter {
            Some(adapter) => adapter,
            None => Arc::new(ReqwestAdapter::new()?),
        };
        Ok(Client {
            defaults: Arc::new(self.defaults),
            adapter,
            interceptors: Arc::new(Interceptors::default()),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
