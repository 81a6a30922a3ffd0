//! Generated client.

use crate::awaitable::ensure_capable;
use crate::binder::{self, Binding};
use crate::server::{RequestHandler, TestServer};
use crate::template::Params;
use crate::{
    Agent, Awaitable, AwaitableFactory, Deferred, Error, RequestBuilder, ReqwestTransport,
    Response, Transport, TransportConfig,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use specio_spec::{DocumentFormat, HttpMethod, Specification};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Client-wide defaults read by every call.
#[derive(Clone)]
struct Settings {
    scheme: String,
    host: String,
    base_path: String,
    api_key: Option<String>,
    awaitable: Arc<dyn AwaitableFactory>,
}

struct Shared {
    transport: Arc<dyn Transport>,
    settings: RwLock<Settings>,
}

impl Shared {
    fn snapshot(&self) -> Settings {
        self.settings.read().clone()
    }
}

/// A bound operation.
///
/// Every call builds a fresh [`RequestBuilder`] from the client settings
/// current at that moment.
#[derive(Clone)]
pub struct Operation {
    binding: Binding,
    shared: Arc<Shared>,
}

impl Operation {
    /// Operation id.
    pub fn id(&self) -> &str {
        &self.binding.operation_id
    }

    /// Path template.
    pub fn path(&self) -> &str {
        &self.binding.path
    }

    pub fn method(&self) -> HttpMethod {
        self.binding.method
    }

    /// Bind-time details of this operation.
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Start a request seeded with the operation's method and path and the
    /// client's scheme, host, base path and credential.
    pub fn request(&self) -> RequestBuilder {
        let settings = self.shared.snapshot();

        let mut request = RequestBuilder::new(
            self.shared.transport.clone(),
            self.binding.http_method(),
            self.binding.path.as_str(),
        )
        .with_awaitable(settings.awaitable)
        .base_path(settings.base_path)
        .host(settings.host)
        .scheme(settings.scheme);

        if let Some(injection) = self.binding.injection() {
            match &settings.api_key {
                Some(key) => request = injection.apply(request, key),
                None => debug!(
                    operation_id = %self.binding.operation_id,
                    "No API key set, sending without credential"
                ),
            }
        }

        request
    }

    /// Call an operation that takes no body.
    pub fn call(&self, params: impl Into<Params>, query: impl Into<Params>) -> Awaitable<Response> {
        self.request().params(params).query(query).send()
    }

    /// Call an operation with a JSON body.
    pub fn call_with_body<B: Serialize + ?Sized>(
        &self,
        params: impl Into<Params>,
        body: &B,
        query: impl Into<Params>,
    ) -> Awaitable<Response> {
        if !self.binding.method.carries_body() {
            debug!(
                operation_id = %self.binding.operation_id,
                method = %self.binding.method,
                "Attaching a body to a method that does not carry one"
            );
        }
        self.request().params(params).json(body).query(query).send()
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Bound operations keyed by operation id.
#[derive(Debug, Clone, Default)]
pub struct Api {
    operations: BTreeMap<String, Operation>,
}

impl Api {
    pub fn get(&self, operation_id: &str) -> Option<&Operation> {
        self.operations.get(operation_id)
    }

    pub fn contains(&self, operation_id: &str) -> bool {
        self.operations.contains_key(operation_id)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operation)> {
        self.operations.iter().map(|(id, op)| (id.as_str(), op))
    }

    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }
}

/// Client generated from a [`Specification`].
///
/// ```no_run
/// use specio_client::SpecioClient;
/// use specio_spec::Specification;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let spec = Specification::from_yaml_str(r#"
/// host: petstore.swagger.io
/// basePath: /v2
/// paths:
///   /pet/{petId}:
///     get:
///       operationId: getPetById
/// "#)?;
/// let client = SpecioClient::new(spec);
/// let pet = client.operation("getPetById")?
///     .request()
///     .params([("petId", 1)])
///     .as_json()
///     .await?;
/// println!("{pet}");
/// # Ok(())
/// # }
/// ```
pub struct SpecioClient {
    spec: Specification,
    api: Api,
    shared: Arc<Shared>,
    server: Mutex<Option<TestServer>>,
}

impl SpecioClient {
    /// Bind `spec` over a default reqwest transport.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized. Use
    /// [`SpecioClient::with_config`] to get that failure as an error.
    pub fn new(spec: Specification) -> Self {
        Self::with_transport(spec, Arc::new(ReqwestTransport::default()))
    }

    /// Bind `spec` over a reqwest transport built from `config`.
    pub fn with_config(spec: Specification, config: TransportConfig) -> Result<Self, Error> {
        Ok(Self::with_transport(
            spec,
            Arc::new(ReqwestTransport::try_new(config)?),
        ))
    }

    /// Bind `spec` over a custom transport.
    pub fn with_transport(spec: Specification, transport: Arc<dyn Transport>) -> Self {
        let settings = Settings {
            scheme: spec.scheme().to_string(),
            host: spec.host().to_string(),
            base_path: spec.base_path().to_string(),
            api_key: None,
            awaitable: Arc::new(Deferred),
        };
        let shared = Arc::new(Shared {
            transport,
            settings: RwLock::new(settings),
        });

        let operations = binder::bind(&spec)
            .into_iter()
            .map(|(id, binding)| {
                let operation = Operation {
                    binding,
                    shared: shared.clone(),
                };
                (id, operation)
            })
            .collect();

        let api = Api { operations };
        info!(operations = api.len(), host = %spec.host(), "Generated client");

        Self {
            spec,
            api,
            shared,
            server: Mutex::new(None),
        }
    }

    /// Fetch a JSON or YAML document from `url` and bind it.
    pub async fn load(url: &str) -> Result<Self, Error> {
        Self::load_with(url, Arc::new(ReqwestTransport::try_new(TransportConfig::default())?))
            .await
    }

    /// Like [`SpecioClient::load`], fetching with `transport` and binding over it.
    pub async fn load_with(url: &str, transport: Arc<dyn Transport>) -> Result<Self, Error> {
        debug!(%url, "Loading specification");
        let response = Agent::with_transport(transport.clone())
            .get(url)
            .header("accept", "application/json, application/yaml;q=0.9, */*;q=0.8")
            .send()
            .await?
            .error_for_status()?;

        let text = response.text()?;
        let format = response
            .content_type()
            .and_then(DocumentFormat::from_content_type)
            .unwrap_or_else(|| DocumentFormat::sniff(&text));
        let spec = Specification::parse(&text, format)?;

        Ok(Self::with_transport(spec, transport))
    }

    /// The specification this client was generated from.
    pub fn spec(&self) -> &Specification {
        &self.spec
    }

    /// Bound operations.
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Look up a bound operation.
    pub fn operation(&self, operation_id: &str) -> Result<&Operation, Error> {
        self.api
            .get(operation_id)
            .ok_or_else(|| Error::UnknownOperation(operation_id.to_string()))
    }

    /// Use `factory` for every subsequent call.
    ///
    /// Returns an error, and keeps the current factory, when `factory`
    /// cannot resolve, reject and chain.
    pub fn use_promise(&self, factory: Arc<dyn AwaitableFactory>) -> Result<&Self, Error> {
        ensure_capable(factory.as_ref())?;
        debug!(awaitable = factory.name(), "Switching awaitable factory");
        self.shared.settings.write().awaitable = factory;
        Ok(self)
    }

    /// Set the API key attached to operations guarded by an `apiKey` scheme.
    pub fn use_api_key(&self, key: impl Into<String>) -> &Self {
        self.shared.settings.write().api_key = Some(key.into());
        self
    }

    /// Serve `handler` locally on `port` and point the client at it.
    ///
    /// Port `0` binds a free port. Resolves once the listener is bound; the
    /// host becomes `localhost:<port>`.
    pub async fn use_app(&self, handler: impl RequestHandler, port: u16) -> Result<&Self, Error> {
        let server = TestServer::bind(handler, port)
            .await
            .map_err(Error::Server)?;
        let host = format!("localhost:{}", server.port());
        info!(%host, "Serving app for client");

        self.shared.settings.write().host = host;
        *self.server.lock() = Some(server);
        Ok(self)
    }

    /// Stop the server started by [`SpecioClient::use_app`].
    pub fn close_app(&self) {
        if self.server.lock().take().is_some() {
            debug!("Stopped app server");
        }
    }

    /// Address of the server started by [`SpecioClient::use_app`].
    pub fn app_addr(&self) -> Option<std::net::SocketAddr> {
        self.server.lock().as_ref().map(TestServer::local_addr)
    }

    pub fn scheme(&self) -> String {
        self.shared.settings.read().scheme.clone()
    }

    pub fn host(&self) -> String {
        self.shared.settings.read().host.clone()
    }

    pub fn base_path(&self) -> String {
        self.shared.settings.read().base_path.clone()
    }

    pub fn api_key(&self) -> Option<String> {
        self.shared.settings.read().api_key.clone()
    }

    /// Name of the awaitable factory in use.
    pub fn awaitable(&self) -> String {
        self.shared.settings.read().awaitable.name().to_string()
    }
}

impl std::fmt::Debug for SpecioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecioClient")
            .field("host", &self.host())
            .field("operations", &self.api.len())
            .finish_non_exhaustive()
    }
}
