//! Request builder factory.

use crate::awaitable::ensure_capable;
use crate::{
    AwaitableFactory, Deferred, Error, RequestBuilder, ReqwestTransport, Transport,
    TransportConfig,
};
use http::Method;
use std::sync::Arc;

/// Hands out [`RequestBuilder`]s that share one transport and one
/// awaitable factory.
#[derive(Clone)]
pub struct Agent {
    transport: Arc<dyn Transport>,
    awaitable: Arc<dyn AwaitableFactory>,
}

impl Agent {
    /// Create an agent over a reqwest transport with the given configuration.
    pub fn new(config: TransportConfig) -> crate::Result<Self> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::try_new(
            config,
        )?)))
    }

    /// Create an agent over a custom transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            awaitable: Arc::new(Deferred),
        }
    }

    /// Use `factory` for every builder created from now on.
    pub fn with_awaitable(mut self, factory: Arc<dyn AwaitableFactory>) -> Result<Self, Error> {
        ensure_capable(factory.as_ref())?;
        self.awaitable = factory;
        Ok(self)
    }

    /// Get the transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Create a HEAD request builder.
    pub fn head(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::HEAD, url)
    }

    /// Create an OPTIONS request builder.
    pub fn options(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::OPTIONS, url)
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.transport.clone(), method, url)
            .with_awaitable(self.awaitable.clone())
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::default()))
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("awaitable", &self.awaitable.name())
            .finish_non_exhaustive()
    }
}
