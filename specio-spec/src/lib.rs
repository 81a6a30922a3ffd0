//! Swagger 2.0 document model for the specio client generator
//!
//! This crate holds the declarative side of specio: the specification
//! document a client is generated from, with lenient parsing so that
//! documents declaring schemes or fields the client does not act on still
//! load.
//!
//! ## Parsing a Document
//!
//! ```
//! use specio_spec::{HttpMethod, Specification};
//!
//! let spec = Specification::from_json_str(r#"{
//!     "basePath": "/api",
//!     "paths": {
//!         "/resources/{id}": { "get": { "operationId": "getResource" } }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(spec.base_path(), "/api");
//! assert_eq!(spec.host(), "localhost");
//! let (path, method, op) = spec.operations().next().unwrap();
//! assert_eq!(path, "/resources/{id}");
//! assert_eq!(method, HttpMethod::Get);
//! assert_eq!(op.operation_id(), Some("getResource"));
//! ```
//!
//! ## Building a Document in Code
//!
//! ```
//! use specio_spec::{ApiKeyLocation, HttpMethod, OperationBuilder, SpecificationBuilder};
//!
//! let spec = SpecificationBuilder::new()
//!     .host("petstore.swagger.io")
//!     .base_path("/v2")
//!     .api_key_auth("api_key", "api_key", ApiKeyLocation::Header)
//!     .operation(
//!         "/store/inventory",
//!         HttpMethod::Get,
//!         OperationBuilder::new("getInventory").security("api_key").build(),
//!     )
//!     .build();
//!
//! assert!(spec.security_definition("api_key").is_some());
//! ```

pub mod builder;
pub mod error;
pub mod loader;
pub mod spec;

pub use builder::*;
pub use error::{Result, SpecError};
pub use loader::DocumentFormat;
pub use spec::*;
