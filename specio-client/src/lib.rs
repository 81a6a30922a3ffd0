//! # Specio Client
//!
//! Turns a Swagger 2.0 document into a client whose operations are called
//! by `operationId`. Each call builds its own request from the path
//! template, the document's scheme, host and base path, and any API key the
//! operation's security definition asks for.
//!
//! ## Features
//!
//! - **Operation binding**: one callable per `operationId`, last one wins on duplicates
//! - **Order-independent URL composition**: base path, host and scheme apply once each
//! - **API key injection**: header or query, read from the client at call time
//! - **Pluggable awaitables**: choose how requests are driven with [`AwaitableFactory`]
//! - **Pluggable transport**: reqwest by default, any [`Transport`] for tests
//! - **Local app serving**: point a client at an in-process handler with `use_app`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use specio_client::SpecioClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SpecioClient::load("https://petstore.swagger.io/v2/swagger.json").await?;
//!     client.use_api_key("special-key");
//!
//!     let inventory = client
//!         .operation("getInventory")?
//!         .request()
//!         .as_json()
//!         .await?;
//!
//!     println!("{inventory}");
//!     Ok(())
//! }
//! ```
//!
//! ## Serving a Local App
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use specio_client::SpecioClient;
//! use specio_spec::Specification;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let spec = Specification::from_json_str(r#"{
//!         "basePath": "/api",
//!         "paths": { "/resources/{id}": { "get": { "operationId": "getResource" } } }
//!     }"#)?;
//!
//!     let client = SpecioClient::new(spec);
//!     client
//!         .use_app(
//!             |req: http::Request<Bytes>| async move {
//!                 http::Response::new(Bytes::from(format!("Hello from {}", req.uri().path())))
//!             },
//!             0,
//!         )
//!         .await?;
//!
//!     let text = client
//!         .operation("getResource")?
//!         .request()
//!         .params([("id", "foo")])
//!         .as_text()
//!         .await?;
//!     assert_eq!(text, "Hello from /api/resources/foo");
//!     Ok(())
//! }
//! ```

mod agent;
mod awaitable;
pub mod binder;
mod client;
mod config;
mod error;
mod request;
mod response;
pub mod security;
mod server;
pub mod template;
mod transport;

pub use agent::Agent;
pub use awaitable::{Awaitable, AwaitableFactory, BoxFuture, Capabilities, Deferred, Spawned};
pub use binder::Binding;
pub use client::{Api, Operation, SpecioClient};
pub use config::{TransportConfig, TransportConfigBuilder};
pub use error::{Error, Result, TransportError};
pub use request::RequestBuilder;
pub use response::Response;
pub use security::CredentialInjection;
pub use server::{RequestHandler, TestServer};
pub use template::Params;
pub use transport::{ReqwestTransport, Transport, TransportRequest};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use specio_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::agent::Agent;
    pub use crate::awaitable::{Awaitable, AwaitableFactory, Capabilities, Deferred, Spawned};
    pub use crate::client::{Api, Operation, SpecioClient};
    pub use crate::config::{TransportConfig, TransportConfigBuilder};
    pub use crate::error::{Error, Result, TransportError};
    pub use crate::request::RequestBuilder;
    pub use crate::response::Response;
    pub use crate::server::{RequestHandler, TestServer};
    pub use crate::template::Params;
    pub use crate::transport::{ReqwestTransport, Transport, TransportRequest};
    pub use http::{HeaderMap, Method, StatusCode, header};
}
