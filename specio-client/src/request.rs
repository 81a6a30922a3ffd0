//! Request builder.

use crate::awaitable::ensure_capable;
use crate::template::{self, Params};
use crate::{
    Awaitable, AwaitableFactory, Deferred, Error, Response, Transport, TransportRequest,
};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use specio_spec::ApiKeyLocation;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// URL under construction.
///
/// Base path, host and scheme are kept apart from the path and joined only
/// when the URL is read, so the order in which they are applied does not
/// matter and each one is applied at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    path: String,
    absolute: bool,
    base_path: Option<String>,
    host: Option<String>,
    scheme: Option<String>,
}

impl Target {
    fn new(url: String) -> Self {
        Self {
            absolute: !url.starts_with('/'),
            path: url,
            base_path: None,
            host: None,
            scheme: None,
        }
    }

    fn compose(&self) -> String {
        if self.absolute {
            return match &self.scheme {
                Some(scheme) => replace_scheme(&self.path, scheme),
                None => self.path.clone(),
            };
        }

        let mut url = match &self.base_path {
            Some(base) => join_base_path(base, &self.path),
            None => self.path.clone(),
        };
        if let Some(host) = &self.host {
            url = format!("{}{}", host.trim_end_matches('/'), url);
        }
        if let Some(scheme) = &self.scheme {
            url = format!("{scheme}://{url}");
        }
        url
    }
}

fn join_base_path(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() || base.starts_with('/') {
        format!("{base}/{path}")
    } else {
        format!("/{base}/{path}")
    }
}

fn replace_scheme(url: &str, scheme: &str) -> String {
    match url.split_once("://") {
        Some((_, rest)) => format!("{scheme}://{rest}"),
        None => format!("{scheme}://{url}"),
    }
}

/// HTTP request builder.
///
/// Each bound operation call produces its own builder; nothing is shared
/// with other in-flight requests apart from the transport handle.
pub struct RequestBuilder {
    transport: Arc<dyn Transport>,
    awaitable: Arc<dyn AwaitableFactory>,
    method: Method,
    target: Target,
    params: Params,
    query: Params,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    /// Create a builder for `url`, which may be a path (`/pets/{id}`) or an
    /// absolute URL.
    pub fn new(transport: Arc<dyn Transport>, method: Method, url: impl Into<String>) -> Self {
        Self {
            transport,
            awaitable: Arc::new(Deferred),
            method,
            target: Target::new(url.into()),
            params: Params::new(),
            query: Params::new(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Set the awaitable factory without checking its capabilities.
    pub(crate) fn with_awaitable(mut self, awaitable: Arc<dyn AwaitableFactory>) -> Self {
        self.awaitable = awaitable;
        self
    }

    /// Prefix the path with `base_path`.
    ///
    /// Ignored when the URL is absolute or a base path was already applied.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        if !self.target.absolute && self.target.base_path.is_none() {
            self.target.base_path = Some(base_path.into());
        }
        self
    }

    /// Prefix the URL with `host`.
    ///
    /// A host given with a scheme (`http://localhost:8080`) also sets the
    /// scheme unless one is already set. Ignored when the URL is absolute or
    /// a host was already applied.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        if self.target.absolute || self.target.host.is_some() {
            return self;
        }
        let host = host.into();
        match host.split_once("://") {
            Some((scheme, rest)) => {
                if self.target.scheme.is_none() {
                    self.target.scheme = Some(scheme.to_string());
                }
                self.target.host = Some(rest.to_string());
            }
            None => self.target.host = Some(host),
        }
        self
    }

    /// Set the scheme, replacing any scheme already present.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.target.scheme = Some(scheme.into());
        self
    }

    /// Fill `{name}` placeholders in the URL.
    ///
    /// A name that was already supplied keeps its first value.
    pub fn params(mut self, params: impl Into<Params>) -> Self {
        let params: Params = params.into();
        for (name, value) in params {
            if !self.params.contains(&name) {
                self.params.insert(name, value);
            }
        }
        self
    }

    /// Add query parameters, keeping those already attached.
    pub fn query(mut self, query: impl Into<Params>) -> Self {
        self.query.extend(query.into());
        self
    }

    /// Add a single query parameter.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value.into());
        self
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => debug!(header = %name, "Skipping invalid header"),
        }
        self
    }

    /// Attach a credential as a header or query parameter.
    pub fn credential(
        self,
        name: impl Into<String>,
        location: ApiKeyLocation,
        value: impl Into<String>,
    ) -> Self {
        match location {
            ApiKeyLocation::Header => self.header(name, value),
            ApiKeyLocation::Query => self.query_param(name, value),
        }
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.body = Some(text.into().into_bytes());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Self {
        match serde_json::to_vec(json) {
            Ok(bytes) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.body = Some(bytes);
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize JSON body");
            }
        }
        self
    }

    /// Set the request body as form data.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        match serde_urlencoded::to_string(form) {
            Ok(encoded) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                self.body = Some(encoded.into_bytes());
            }
            Err(e) => {
                error!(error = %e, "Failed to encode form data");
            }
        }
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a different awaitable factory for this request.
    ///
    /// Fails immediately if the factory cannot resolve, reject and chain.
    pub fn use_promise(mut self, factory: Arc<dyn AwaitableFactory>) -> Result<Self, Error> {
        ensure_capable(factory.as_ref())?;
        self.awaitable = factory;
        Ok(self)
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URL as it would be sent, without the query string.
    pub fn url(&self) -> String {
        template::resolve(&self.target.compose(), &self.params)
    }

    /// Headers attached so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Query parameters attached so far.
    pub fn query_pairs(&self) -> &Params {
        &self.query
    }

    /// Request body, if any.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Awaitable factory that [`RequestBuilder::send`] will use.
    pub fn awaitable(&self) -> &dyn AwaitableFactory {
        self.awaitable.as_ref()
    }

    /// Hand the request to the transport.
    pub fn send(self) -> Awaitable<Response> {
        let request = TransportRequest {
            url: self.url(),
            method: self.method,
            query: self.query.into_vec(),
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
        };
        debug!(
            method = %request.method,
            url = %request.url,
            awaitable = self.awaitable.name(),
            "Dispatching request"
        );

        let transport = self.transport;
        self.awaitable
            .make(Box::pin(async move { transport.send(request).await }))
    }

    /// Send and resolve with the response body as text.
    pub fn as_text(self) -> Awaitable<String> {
        self.send().and_then(|response| response.text())
    }

    /// Send and resolve with the decoded JSON body.
    pub fn as_json(self) -> Awaitable<serde_json::Value> {
        self.send().and_then(|response| response.body())
    }
}

impl IntoFuture for RequestBuilder {
    type Output = crate::Result<Response>;
    type IntoFuture = Awaitable<Response>;

    fn into_future(self) -> Self::IntoFuture {
        self.send()
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url())
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("awaitable", &self.awaitable.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capabilities, Result as TransportResult, TransportError};
    use async_trait::async_trait;
    use bytes::Bytes;
    use http::StatusCode;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<TransportRequest>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: TransportRequest) -> TransportResult<Response> {
            let url = url::Url::parse(&request.url)
                .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
            self.requests.lock().push(request);
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            Ok(Response::from_parts(
                StatusCode::OK,
                headers,
                Bytes::from_static(br#"{"ok":true}"#),
                url,
            ))
        }
    }

    #[derive(Debug)]
    struct Incomplete;

    impl AwaitableFactory for Incomplete {
        fn name(&self) -> &str {
            "incomplete"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities {
                resolve: true,
                reject: false,
                chain: false,
            }
        }

        fn make(
            &self,
            request: crate::BoxFuture<TransportResult<Response>>,
        ) -> Awaitable<Response> {
            Awaitable::new(request)
        }
    }

    fn get(url: &str) -> RequestBuilder {
        RequestBuilder::new(Arc::new(Recorder::default()), Method::GET, url)
    }

    #[test]
    fn test_base_path() {
        assert_eq!(get("/foo").base_path("/api").url(), "/api/foo");
    }

    #[test]
    fn test_base_path_is_applied_once() {
        let once = get("/foo").base_path("/api").url();
        let twice = get("/foo").base_path("/api").base_path("/api").url();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_root_base_path_does_not_double_slash() {
        assert_eq!(get("/foo").base_path("/").url(), "/foo");
        assert_eq!(get("/").base_path("/").url(), "/");
    }

    #[test]
    fn test_host() {
        let req = get("/foo").base_path("/api").host("localhost:8080");
        assert_eq!(req.url(), "localhost:8080/api/foo");
    }

    #[test]
    fn test_scheme_prepends() {
        let req = get("/foo")
            .base_path("/api")
            .host("localhost:8080")
            .scheme("http");
        assert_eq!(req.url(), "http://localhost:8080/api/foo");
    }

    #[test]
    fn test_scheme_replaces_existing() {
        let req = get("/foo")
            .base_path("/api")
            .host("http://localhost:8080")
            .scheme("https");
        assert_eq!(req.url(), "https://localhost:8080/api/foo");
    }

    #[test]
    fn test_composition_is_order_independent() {
        let expected = "http://localhost:8080/api/foo/bar";
        let a = get("/foo/{id}")
            .base_path("/api")
            .host("localhost:8080")
            .scheme("http")
            .params([("id", "bar")]);
        let b = get("/foo/{id}")
            .params([("id", "bar")])
            .scheme("http")
            .host("localhost:8080")
            .base_path("/api");
        let c = get("/foo/{id}")
            .host("localhost:8080")
            .params([("id", "bar")])
            .base_path("/api")
            .scheme("http");
        assert_eq!(a.url(), expected);
        assert_eq!(b.url(), expected);
        assert_eq!(c.url(), expected);
    }

    #[test]
    fn test_absolute_url_ignores_base_path_and_host() {
        let req = get("http://example.org/foo")
            .base_path("/api")
            .host("localhost:8080");
        assert_eq!(req.url(), "http://example.org/foo");

        let req = get("http://example.org/foo").scheme("https");
        assert_eq!(req.url(), "https://example.org/foo");
    }

    #[test]
    fn test_params() {
        let req = get("/foo/{id}").base_path("/api").params([("id", "bar")]);
        assert_eq!(req.url(), "/api/foo/bar");

        let req = get("/foo/{foo-id}/bar/{bar-id}")
            .base_path("/api")
            .params([("foo-id", 1), ("bar-id", 2)]);
        assert_eq!(req.url(), "/api/foo/1/bar/2");
    }

    #[test]
    fn test_params_first_value_wins() {
        let req = get("/foo/{id}")
            .params([("id", "first")])
            .params([("id", "second")]);
        assert_eq!(req.url(), "/foo/first");
    }

    #[test]
    fn test_query_merges_with_credential() {
        let req = get("/pets")
            .credential("api_key", ApiKeyLocation::Query, "special-key")
            .query([("status", "sold")]);

        let pairs: Vec<_> = req.query_pairs().iter().collect();
        assert_eq!(pairs, vec![("api_key", "special-key"), ("status", "sold")]);
    }

    #[test]
    fn test_header_credential() {
        let req = get("/pets").credential("api_key", ApiKeyLocation::Header, "special-key");
        assert_eq!(req.headers()["api_key"], "special-key");
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let req = get("/pets").header("bad header", "x");
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let req = get("/pets").json(&serde_json::json!({ "name": "doggie" }));
        assert_eq!(req.headers()[http::header::CONTENT_TYPE], "application/json");
        assert_eq!(req.body_bytes(), Some(br#"{"name":"doggie"}"#.as_slice()));
    }

    #[test]
    fn test_form_body() {
        let req = get("/pets").form(&[("name", "doggie"), ("status", "sold")]);
        assert_eq!(req.body_bytes(), Some(b"name=doggie&status=sold".as_slice()));
    }

    #[test]
    fn test_use_promise_rejects_incomplete_factory() {
        let result = get("/foo").use_promise(Arc::new(Incomplete));
        assert!(matches!(result, Err(Error::InvalidPromiseConstructor(_))));
    }

    #[test]
    fn test_use_promise_sets_factory() {
        let req = get("/foo").use_promise(Arc::new(crate::Spawned::new())).unwrap();
        assert_eq!(req.awaitable().name(), "spawned");
    }

    #[tokio::test]
    async fn test_send_hands_composed_request_to_transport() {
        let recorder = Arc::new(Recorder::default());
        let response = RequestBuilder::new(recorder.clone(), Method::POST, "/pets/{id}")
            .base_path("/v2")
            .host("petstore.example")
            .scheme("https")
            .params([("id", 9)])
            .query([("verbose", "true")])
            .header("X-Trace", "1")
            .text("hello")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let requests = recorder.requests.lock();
        let sent = &requests[0];
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, "https://petstore.example/v2/pets/9");
        assert_eq!(
            sent.query,
            vec![("verbose".to_string(), "true".to_string())]
        );
        assert_eq!(sent.headers["x-trace"], "1");
        assert_eq!(sent.body.as_deref(), Some(b"hello".as_slice()));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let err = get("/relative/only").send().await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_as_json_and_into_future() {
        let body = get("http://localhost/pets").as_json().await.unwrap();
        assert_eq!(body["ok"], true);

        let response = get("http://localhost/pets").await.unwrap();
        assert_eq!(response.text().unwrap(), r#"{"ok":true}"#);
    }
}
