//! Transport seam and the reqwest-backed implementation.

use crate::{Response, Result, TransportConfig, TransportError};
use async_trait::async_trait;
use http::{HeaderMap, Method};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A fully composed outgoing request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, without the query string.
    pub url: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request payload.
    pub body: Option<Vec<u8>>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

/// Sends composed requests over the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the response or the transport's error.
    async fn send(&self, request: TransportRequest) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: TransportRequest) -> Result<Response> {
        (**self).send(request).await
    }
}

/// Transport backed by a pooled reqwest client.
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    config: Arc<TransportConfig>,
}

impl ReqwestTransport {
    /// Create a transport with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, like
    /// `reqwest::Client::new`. Use [`ReqwestTransport::try_new`] to handle
    /// that case.
    pub fn new(config: TransportConfig) -> Self {
        Self::try_new(config).expect("Failed to build HTTP client")
    }

    /// Create a transport, returning an error if the client cannot be built.
    pub fn try_new(config: TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .brotli(config.brotli);

        if config.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        } else {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        Ok(Self {
            inner: builder.build()?,
            config: Arc::new(config),
        })
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn build_url(request: &TransportRequest) -> Result<url::Url> {
        let mut url = url::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        if !request.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<Response> {
        let url = Self::build_url(&request)?;
        let timeout = request.timeout.unwrap_or(self.config.timeout);
        debug!(method = %request.method, url = %url, "Sending HTTP request");

        let mut builder = self.inner.request(request.method, url);

        for (name, value) in &self.config.default_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = builder.headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let classify = |e: reqwest::Error| TransportError::from_reqwest(e, timeout);
        let response = builder.send().await.map_err(classify)?;
        let response = Response::from_reqwest(response).await.map_err(classify)?;
        debug!(status = %response.status(), url = %response.url(), "Received HTTP response");

        if self.config.error_for_status {
            response.error_for_status()
        } else {
            Ok(response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, query: &[(&str, &str)]) -> TransportRequest {
        TransportRequest {
            method: Method::GET,
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    #[test]
    fn test_build_url_appends_query() {
        let url = ReqwestTransport::build_url(&request(
            "http://localhost:8080/api/pets",
            &[("status", "sold"), ("api_key", "special key")],
        ))
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/pets?status=sold&api_key=special+key"
        );
    }

    #[test]
    fn test_build_url_rejects_relative() {
        let err = ReqwestTransport::build_url(&request("/api/pets", &[])).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_classified() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = ReqwestTransport::default()
            .send(request(&format!("http://{addr}/pets"), &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)), "{err:?}");
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut slow = request(&format!("{}/pets", server.uri()), &[]);
        slow.timeout = Some(Duration::from_millis(100));

        let err = ReqwestTransport::default().send(slow).await.unwrap_err();
        assert!(
            matches!(err, TransportError::Timeout(limit) if limit == Duration::from_millis(100)),
            "{err:?}"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::default();
        assert!(transport.config().gzip);
        assert!(transport.config().error_for_status);
    }
}
